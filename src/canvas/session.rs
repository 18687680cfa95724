use crate::canvas::client::CanvasClient;
use crate::fetch::{BearerAuth, HttpClient, Retrying};
use crate::settings::Settings;
use anyhow::{Result, bail};
use std::sync::Arc;
use std::time::Duration;

/// Everything needed to talk to Canvas on behalf of one user.
///
/// Built per CLI invocation or per HTTP request and passed down explicitly.
#[derive(Clone)]
pub struct CanvasSession {
    pub base_url: String,
    pub user_id: String,
    token: String,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

/// Transport stack used for Canvas calls: retry outside auth, over a shared
/// pooled client.
pub type SessionTransport = Retrying<BearerAuth<Arc<dyn HttpClient>>>;

impl CanvasSession {
    pub fn new(settings: &Settings, token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            bail!("Canvas API token is required");
        }

        Ok(Self {
            base_url: settings.canvas_base_url.clone(),
            user_id: settings.canvas_user_id.clone(),
            token: token.to_string(),
            max_retries: settings.http_max_retries,
            retry_base_delay: settings.http_retry_base_delay,
        })
    }

    /// Builds a client for this session on top of `http`.
    pub fn client(&self, http: Arc<dyn HttpClient>) -> Result<CanvasClient<SessionTransport>> {
        let transport = Retrying::new(
            BearerAuth::new(http, &self.token)?,
            self.max_retries,
            self.retry_base_delay,
        );
        Ok(CanvasClient::new(transport, &self.base_url, &self.user_id))
    }
}

impl std::fmt::Debug for CanvasSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasSession")
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}
