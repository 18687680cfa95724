use super::client::HttpClient;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::warn;

/// An [`HttpClient`] wrapper that retries transport errors, `429` and `5xx`
/// responses with exponential backoff (`base_delay * 2^attempt`).
///
/// A request whose body cannot be cloned is sent exactly once.
pub struct Retrying<C> {
    inner: C,
    max_retries: u32,
    base_delay: Duration,
}

impl<C> Retrying<C> {
    pub fn new(inner: C, max_retries: u32, base_delay: Duration) -> Self {
        Self { inner, max_retries, base_delay }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(16))
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl<C: HttpClient> HttpClient for Retrying<C> {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let mut pending = req;
        let mut attempt = 0;

        loop {
            let spare = if attempt < self.max_retries { pending.try_clone() } else { None };
            let url = pending.url().to_string();
            let result = self.inner.execute(pending).await;

            let Some(next) = spare else {
                return result;
            };

            match &result {
                Ok(resp) if !is_retryable(resp.status()) => return result,
                Ok(resp) => {
                    warn!(%url, status = resp.status().as_u16(), attempt, "Retrying after error status")
                }
                Err(e) => warn!(%url, error = %e, attempt, "Retrying after transport error"),
            }

            tokio::time::sleep(self.backoff(attempt)).await;
            pending = next;
            attempt += 1;
        }
    }
}
