use std::{env, path::PathBuf, time::Duration};

use url::Url;

use crate::error::{CollectorError, CollectorResult};
use crate::openapi::pagination::{PagingPolicy, MAX_PAGE_SIZE};
use crate::openapi::DocType;

const DEFAULT_SEOUL_BASE_URL: &str = "http://openapi.seoul.go.kr:8088/";
const DEFAULT_GYUNGGI_BASE_URL: &str = "https://openapi.gg.go.kr/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub base_url: Url,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub seoul: SourceConfig,
    pub gyunggi: SourceConfig,
    pub doc_type: DocType,
    pub paging: PagingPolicy,
    pub request_timeout: Duration,
    pub database_path: PathBuf,
}

impl CollectorConfig {
    pub fn from_env() -> CollectorResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> CollectorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> CollectorResult<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| CollectorError::Config(format!("{} must be set", key)))
        };
        let base_url = |key: &str, default: &str| -> CollectorResult<Url> {
            let value = lookup(key).unwrap_or_else(|| default.to_string());
            let url = Url::parse(&value)
                .map_err(|e| CollectorError::Config(format!("{} is not a URL: {}", key, e)))?;
            if url.cannot_be_a_base() {
                return Err(CollectorError::Config(format!("{} cannot be a base URL", key)));
            }
            Ok(url)
        };

        let doc_type: DocType = parse_or(&lookup, "DOC_TYPE", DocType::Json)?;
        if doc_type != DocType::Json {
            return Err(CollectorError::Config(format!(
                "DOC_TYPE {} is not supported, only json responses can be decoded",
                doc_type
            )));
        }

        let page_size: u64 = parse_or(&lookup, "PAGE_SIZE", MAX_PAGE_SIZE)?;
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(CollectorError::Config(format!(
                "PAGE_SIZE must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        let defaults = PagingPolicy::default();
        let max_attempts: u32 = parse_or(&lookup, "PAGE_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(CollectorError::Config(
                "PAGE_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        let retry_backoff_ms: u64 = parse_or(
            &lookup,
            "RETRY_BACKOFF_MS",
            defaults.retry_backoff.as_millis() as u64,
        )?;
        let timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(CollectorConfig {
            seoul: SourceConfig {
                base_url: base_url("SEOUL_BASE_URL", DEFAULT_SEOUL_BASE_URL)?,
                api_key: required("SEOUL_API_KEY")?,
            },
            gyunggi: SourceConfig {
                base_url: base_url("GYUNGGI_BASE_URL", DEFAULT_GYUNGGI_BASE_URL)?,
                api_key: required("GYUNGGI_API_KEY")?,
            },
            doc_type,
            paging: PagingPolicy {
                page_size,
                max_attempts,
                retry_backoff: Duration::from_millis(retry_backoff_ms),
            },
            request_timeout: Duration::from_secs(timeout_secs),
            database_path: PathBuf::from(required("DATABASE_PATH")?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> CollectorResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| CollectorError::Config(format!("Invalid {} {:?}: {}", key, value, e))),
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> CollectorResult<CollectorConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CollectorConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("SEOUL_API_KEY", "seoul-key"),
        ("GYUNGGI_API_KEY", "gyunggi-key"),
        ("DATABASE_PATH", "stations.sqlite"),
    ];

    #[test]
    fn test_defaults() {
        let config = config(&REQUIRED).unwrap();

        assert_eq!(config.seoul.api_key, "seoul-key");
        assert_eq!(config.seoul.base_url.as_str(), DEFAULT_SEOUL_BASE_URL);
        assert_eq!(config.gyunggi.base_url.as_str(), DEFAULT_GYUNGGI_BASE_URL);
        assert_eq!(config.doc_type, DocType::Json);
        assert_eq!(config.paging.page_size, 1000);
        assert_eq!(config.paging.max_attempts, 3);
        assert_eq!(config.paging.retry_backoff, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.database_path, PathBuf::from("stations.sqlite"));
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("PAGE_SIZE", "250"),
            ("PAGE_ATTEMPTS", "5"),
            ("RETRY_BACKOFF_MS", "20"),
            ("REQUEST_TIMEOUT_SECS", "3"),
            ("GYUNGGI_BASE_URL", "http://localhost:9000/gg/"),
        ]);

        let config = config(&vars).unwrap();

        assert_eq!(config.paging.page_size, 250);
        assert_eq!(config.paging.max_attempts, 5);
        assert_eq!(config.paging.retry_backoff, Duration::from_millis(20));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.gyunggi.base_url.as_str(), "http://localhost:9000/gg/");
    }

    #[test]
    fn test_missing_api_key() {
        let err = config(&REQUIRED[1..]).unwrap_err();
        assert!(err.to_string().contains("SEOUL_API_KEY"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        for extra in [
            ("PAGE_SIZE", "0"),
            ("PAGE_SIZE", "1001"),
            ("PAGE_SIZE", "lots"),
            ("PAGE_ATTEMPTS", "0"),
            ("DOC_TYPE", "xml"),
            ("SEOUL_BASE_URL", "not a url"),
            ("SEOUL_BASE_URL", "mailto:bus@example.com"),
        ] {
            let mut vars = REQUIRED.to_vec();
            vars.push(extra);
            assert!(
                matches!(config(&vars), Err(CollectorError::Config(_))),
                "{:?} should be rejected",
                extra
            );
        }
    }
}
