use thiserror::Error;

#[derive(Debug, Error)]
pub enum DistributedError {
    #[error("Bind error on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error during {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error during {context}: {source}")]
    Serialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Request {path} to {addr} failed: {source}")]
    Request {
        addr: String,
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("Request {path} to {addr} returned status {status}.")]
    UnexpectedStatus {
        addr: String,
        path: &'static str,
        status: u16,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
