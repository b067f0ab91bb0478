use std::time::Duration;

use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Empty response body")]
    EmptyBody,
}

/// One blocking round trip per call, the body is returned as text
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, url: &Url) -> Result<String, TransportError>;
}

#[derive(Clone)]
pub struct OpenApiClient {
    client: reqwest::Client,
}

impl OpenApiClient {
    pub fn new(timeout: Duration) -> Result<OpenApiClient, TransportError> {
        let client = OpenApiClient {
            client: reqwest::Client::builder()
                .connect_timeout(timeout)
                .timeout(timeout)
                .build()?,
        };

        Ok(client)
    }
}

impl Transport for OpenApiClient {
    async fn get(&self, url: &Url) -> Result<String, TransportError> {
        log::debug!("Requesting {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;

        let data_str = response.text().await?;
        log::trace!("Response: {}", data_str);
        if data_str.trim().is_empty() {
            return Err(TransportError::EmptyBody);
        }

        Ok(data_str)
    }
}
