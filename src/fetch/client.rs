use async_trait::async_trait;
use reqwest::{Request, Response};
use std::sync::Arc;

/// Sends a prepared request. Wrappers such as [`super::BearerAuth`] and
/// [`super::Retrying`] implement it by decorating an inner client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
