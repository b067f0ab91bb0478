//! Plumbing shared by the Seoul and Gyunggi open data services.
//!
//! Both services answer with JSON, wrap failures in a top level
//! `{"RESULT": {"CODE", "MESSAGE"}}` envelope and report `INFO-000` on success.

pub mod client;
pub mod error;
pub mod pagination;
pub mod serde_helpers;

use std::fmt::Display;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use self::error::{OpenApiError, OpenApiResult};

pub const SUCCESS_CODE: &str = "INFO-000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Seoul,
    Gyunggi,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Seoul => "seoul",
            Source::Gyunggi => "gyunggi",
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response format requested from the services
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocType {
    Json,
    Xml,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Json => "json",
            DocType::Xml => "xml",
        }
    }
}

impl Display for DocType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(DocType::Json),
            "xml" => Ok(DocType::Xml),
            other => Err(format!("Unknown document type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultCode {
    #[serde(rename = "CODE", default)]
    pub code: String,
    #[serde(rename = "MESSAGE", default)]
    pub message: String,
}

impl ResultCode {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

#[derive(Deserialize)]
struct FailureEnvelope {
    #[serde(rename = "RESULT")]
    result: Option<ResultCode>,
}

/// One decoded page of a paginated listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub total_count: u64,
    pub result: ResultCode,
    pub rows: Vec<T>,
}

/// Decodes a response body into the success schema `T`.
///
/// A body matching the failure envelope with a non-empty code is an API error,
/// anything else that doesn't fit `T` is a parse error.
pub fn decode_body<T>(origin: Source, url: &Url, body: &str) -> OpenApiResult<T>
where
    T: DeserializeOwned,
{
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| OpenApiError::parse(origin, url, e))?;

    if let Ok(FailureEnvelope {
        result: Some(result),
    }) = FailureEnvelope::deserialize(&value)
    {
        if !result.code.is_empty() {
            return Err(OpenApiError::Api {
                origin,
                url: url.to_string(),
                code: result.code,
                message: result.message,
            });
        }
    }

    serde_json::from_value(value).map_err(|e| OpenApiError::parse(origin, url, e))
}
