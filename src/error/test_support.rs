use super::{ConfigError, DistributedError, HttpError, MetricsError, ValidationError};

impl From<&'static str> for ValidationError {
    fn from(message: &'static str) -> Self {
        ValidationError::TestExpectation { message }
    }
}

impl From<String> for ValidationError {
    fn from(value: String) -> Self {
        ValidationError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ConfigError {
    fn from(message: &'static str) -> Self {
        ConfigError::TestExpectation { message }
    }
}

impl From<String> for ConfigError {
    fn from(value: String) -> Self {
        ConfigError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for HttpError {
    fn from(message: &'static str) -> Self {
        HttpError::TestExpectation { message }
    }
}

impl From<String> for HttpError {
    fn from(value: String) -> Self {
        HttpError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for MetricsError {
    fn from(message: &'static str) -> Self {
        MetricsError::TestExpectation { message }
    }
}

impl From<String> for MetricsError {
    fn from(value: String) -> Self {
        MetricsError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for DistributedError {
    fn from(message: &'static str) -> Self {
        DistributedError::TestExpectation { message }
    }
}

impl From<String> for DistributedError {
    fn from(value: String) -> Self {
        DistributedError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}
