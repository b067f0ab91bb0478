use super::{client::TransportError, Source};

#[derive(thiserror::Error, Debug)]
pub enum OpenApiError {
    #[error("[{origin}] HTTP error requesting {url}: {error}")]
    Transport {
        origin: Source,
        url: String,
        #[source]
        error: TransportError,
    },

    #[error("[{origin}] error response from {url}: code {code}, message {message}")]
    Api {
        origin: Source,
        url: String,
        code: String,
        message: String,
    },

    #[error("[{origin}] result code {code} still returned after {attempts} attempts at {url}: {message}")]
    TransientResult {
        origin: Source,
        url: String,
        code: String,
        message: String,
        attempts: u32,
    },

    #[error("[{origin}] malformed response from {url}: {reason}")]
    Parse {
        origin: Source,
        url: String,
        reason: String,
    },

    #[error("[{origin}] cannot build request paths on base URL {base}")]
    InvalidUrl { origin: Source, base: String },
}

impl OpenApiError {
    pub fn parse(origin: Source, url: &url::Url, reason: impl ToString) -> Self {
        OpenApiError::Parse {
            origin,
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type OpenApiResult<T> = Result<T, OpenApiError>;
