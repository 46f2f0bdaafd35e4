//! Remote call client.
//!
//! One outbound request/response exchange per call: no internal retry, bounded
//! by the timeout configured on the underlying client. Retrying, if wanted, is
//! the caller's job.

use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use driveproc_core::RemoteError;

#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
}

impl RemoteClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Execute one exchange and decode the JSON response body.
    pub async fn call<B, T>(&self, method: Method, url: &str, body: &B) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.exchange(method, url, body).await?;

        response
            .json::<T>()
            .await
            .map_err(|source| RemoteError::BadBody {
                url: url.to_string(),
                source,
            })
    }

    /// Execute one exchange and discard the response body.
    pub async fn send<B>(&self, method: Method, url: &str, body: &B) -> Result<(), RemoteError>
    where
        B: Serialize + ?Sized,
    {
        self.exchange(method, url, body).await?;
        Ok(())
    }

    async fn exchange<B>(
        &self,
        method: Method,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, RemoteError>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(method = %method, url = url, "Sending request");

        let response = self
            .client
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(|source| RemoteError::from_transport(url, source))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}
