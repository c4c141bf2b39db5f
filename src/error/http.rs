use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("URL list was empty.")]
    UrlListEmpty,
    #[error("Failed to read URL file '{path}': {source}")]
    ReadUrlFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("URL file '{path}' was empty.")]
    UrlFileEmpty { path: PathBuf },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme in '{url}'. Use http or https.")]
    UnsupportedScheme { url: String },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
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
