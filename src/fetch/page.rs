use crate::config::{Config, RetryPolicy};
use crate::fetch::build_http_client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Errors produced by the transport layer
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Fetches URLs as decoded text or binary payloads
///
/// One fetcher is shared across the whole run; a global semaphore caps the
/// number of simultaneous in-flight requests regardless of how many workers
/// are active.
pub struct PageFetcher {
    client: Client,
    inflight: Arc<Semaphore>,
}

impl PageFetcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.fetch)?;
        Ok(Self {
            client,
            inflight: Arc::new(Semaphore::new(config.limits.max_inflight_fetches)),
        })
    }

    /// Fetches a URL and decodes the body as UTF-8
    ///
    /// The body is decoded as UTF-8 unconditionally; catalog pages are UTF-8
    /// even where response headers claim another charset.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|e| classify(url, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Fetches a URL as raw bytes, along with the declared content type
    pub async fn fetch_bytes(&self, url: &str) -> Result<(Vec<u8>, String), FetchError> {
        let response = self.get(url).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let bytes = response.bytes().await.map_err(|e| classify(url, e))?;
        Ok((bytes.to_vec(), content_type))
    }

    /// Sends a GET request and checks the response status
    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        // The semaphore is owned by the fetcher and never closed.
        let _permit = self
            .inflight
            .acquire()
            .await
            .expect("fetch semaphore closed");

        tracing::trace!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

/// Maps a reqwest error to the fetch error taxonomy
fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Runs a fetch operation under a bounded retry policy
///
/// Retrying belongs to callers, not to the fetcher: listing traversal and
/// product workers decide what is worth repeating. With the default policy
/// (zero retries) the operation runs exactly once.
///
/// # Arguments
///
/// * `policy` - Retry budget and backoff base
/// * `op` - The fetch operation; called once per attempt
///
/// # Returns
///
/// The first successful result, or the last error once the budget is spent
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    "Retry {}/{} after {:?}: {}",
                    attempt,
                    policy.max_retries,
                    delay,
                    err
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
