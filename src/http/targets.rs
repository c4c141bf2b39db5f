use std::path::Path;

use url::Url;

use crate::error::{AppError, AppResult, HttpError};

/// Reads a newline-delimited URL list. CRLF and LF files are both accepted;
/// blank lines are skipped.
///
/// # Errors
///
/// Returns an error when the file cannot be read, holds no URLs, or holds an
/// invalid URL.
pub async fn load_targets(path: &Path) -> AppResult<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|err| {
        AppError::http(HttpError::ReadUrlFile {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match parse_targets(&content) {
        Err(HttpError::UrlListEmpty) => Err(AppError::http(HttpError::UrlFileEmpty {
            path: path.to_path_buf(),
        })),
        other => other.map_err(AppError::from),
    }
}

/// Parses the content of a target list file.
///
/// # Errors
///
/// Returns an error when no URL remains after skipping blank lines, or when a
/// line is not an absolute http(s) URL.
pub fn parse_targets(content: &str) -> Result<Vec<String>, HttpError> {
    let lines = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();
    validate_targets(lines)
}

/// Validates an already-split URL list (e.g. one posted to `/initUrls`).
///
/// # Errors
///
/// Returns an error when the list is empty or a URL is invalid.
pub fn validate_targets(urls: Vec<String>) -> Result<Vec<String>, HttpError> {
    if urls.is_empty() {
        return Err(HttpError::UrlListEmpty);
    }
    for url in &urls {
        let parsed = Url::parse(url).map_err(|err| HttpError::InvalidUrl {
            url: url.clone(),
            source: err,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HttpError::UnsupportedScheme { url: url.clone() });
        }
    }
    Ok(urls)
}
