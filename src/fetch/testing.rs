//! In-memory [`HttpClient`] used by unit tests in place of the network.

use super::client::HttpClient;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A canned HTTP response.
#[derive(Clone)]
pub(crate) struct Canned {
    status: u16,
    body: String,
    link: Option<String>,
}

impl Canned {
    pub(crate) fn json(body: &str) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: &str) -> Self {
        Self { status, body: body.to_string(), link: None }
    }

    pub(crate) fn with_next(mut self, next: &str) -> Self {
        self.link = Some(format!("<{next}>; rel=\"next\""));
        self
    }

    fn into_response(self) -> reqwest::Response {
        let mut builder = axum::http::Response::builder()
            .status(self.status)
            .header("content-type", "application/json");
        if let Some(link) = self.link {
            builder = builder.header("link", link);
        }
        reqwest::Response::from(builder.body(self.body).unwrap())
    }
}

#[derive(Default)]
struct State {
    queue: VecDeque<Canned>,
    routes: Vec<(String, Canned)>,
    fallback: Option<Canned>,
    seen: Vec<(String, Option<String>)>,
}

/// Answers requests from a queue first, then from URL-substring routes, then
/// from a fallback; anything else is a `404`. Records every request.
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    state: Arc<Mutex<State>>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ok(body: &str) -> Self {
        Self::new().fallback(Canned::json(body))
    }

    pub(crate) fn then(self, canned: Canned) -> Self {
        self.state.lock().unwrap().queue.push_back(canned);
        self
    }

    pub(crate) fn route(self, url_contains: &str, canned: Canned) -> Self {
        self.state.lock().unwrap().routes.push((url_contains.to_string(), canned));
        self
    }

    pub(crate) fn fallback(self, canned: Canned) -> Self {
        self.state.lock().unwrap().fallback = Some(canned);
        self
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.state.lock().unwrap().seen.iter().map(|(url, _)| url.clone()).collect()
    }

    pub(crate) fn authorization_headers(&self) -> Vec<Option<String>> {
        self.state.lock().unwrap().seen.iter().map(|(_, auth)| auth.clone()).collect()
    }
}

#[async_trait]
impl HttpClient for Recorder {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let url = req.url().to_string();
        let auth = req
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut state = self.state.lock().unwrap();
        state.seen.push((url.clone(), auth));

        let canned = state
            .queue
            .pop_front()
            .or_else(|| {
                state
                    .routes
                    .iter()
                    .find(|(pattern, _)| url.contains(pattern.as_str()))
                    .map(|(_, canned)| canned.clone())
            })
            .or_else(|| state.fallback.clone())
            .unwrap_or_else(|| Canned::status(404, "{\"errors\":[{\"message\":\"not found\"}]}"));

        Ok(canned.into_response())
    }
}
