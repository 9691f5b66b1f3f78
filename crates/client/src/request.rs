//! Validation of the single URL an extraction run is started with.

use pagetext_core::Error;
use url::Url;

/// Error type for request validation failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestError {
    #[error("missing URL")]
    Empty,

    #[error("URL must start with https://: {0}")]
    InsecureScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<RequestError> for Error {
    fn from(err: RequestError) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

/// The URL to extract text from.
///
/// Only `https://` URLs are accepted. The check is made on the raw input,
/// before any parsing, so `HTTPS://` and schemeless input are rejected too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    url: Url,
}

impl ExtractionRequest {
    pub fn parse(input: &str) -> Result<Self, RequestError> {
        if input.trim().is_empty() {
            return Err(RequestError::Empty);
        }

        if !input.starts_with("https://") {
            return Err(RequestError::InsecureScheme(input.to_string()));
        }

        let url = Url::parse(input).map_err(|e| RequestError::InvalidUrl(e.to_string()))?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(RequestError::InvalidUrl(format!("no host in {input}")));
        }

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}
