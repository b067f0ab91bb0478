use crate::geo::TransformError;
use crate::openapi::client::TransportError;
use crate::openapi::error::OpenApiError;
use crate::store::error::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum CollectorError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] TransportError),

    #[error("Open API error: {0}")]
    OpenApi(#[from] OpenApiError),

    #[error("[gyunggi] coordinate transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<CollectorError> for std::io::Error {
    fn from(e: CollectorError) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, e)
    }
}

pub type CollectorResult<T> = Result<T, CollectorError>;
