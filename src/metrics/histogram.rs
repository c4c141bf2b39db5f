use hdrhistogram::Histogram;

use crate::error::MetricsError;

#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new(3).map_err(|err| MetricsError::Histogram {
            context: "create",
            source: err.to_string().into(),
        })?;
        Ok(Self { hist })
    }

    /// Record a latency value in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency_ms: u64) -> Result<(), MetricsError> {
        let value = latency_ms.max(1);
        self.hist
            .record(value)
            .map_err(|err| MetricsError::Histogram {
                context: "record",
                source: err.to_string().into(),
            })
    }

    #[must_use]
    pub fn percentiles(&self) -> (u64, u64, u64) {
        if self.count() == 0 {
            return (0, 0, 0);
        }

        (
            self.hist.value_at_quantile(0.5),
            self.hist.value_at_quantile(0.9),
            self.hist.value_at_quantile(0.99),
        )
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}
