mod basic;
mod client;
mod pagination;
mod retry;
pub mod auth;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::BearerAuth;
pub use basic::BasicClient;
pub use client::HttpClient;
pub use pagination::next_link;
pub use retry::Retrying;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Upper bound on pages followed by [`fetch_all`].
pub const DEFAULT_MAX_PAGES: usize = 100;

/// One decoded response body plus the `rel="next"` link, if any.
#[derive(Debug)]
pub struct Page<T> {
    pub body: T,
    pub next: Option<String>,
}

/// GETs `url` and decodes the JSON body.
///
/// Non-success statuses are errors carrying the status and response body.
pub async fn fetch_json<C, T>(client: &C, url: &str) -> Result<Page<T>>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let req = reqwest::Request::new(
        reqwest::Method::GET,
        url.parse().with_context(|| format!("Invalid URL '{url}'"))?,
    );

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("Request to {url} failed"))?;

    let status = resp.status();
    let next = next_link(resp.headers());

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("{url} returned status {status}: {body}");
    }

    let body = resp
        .json::<T>()
        .await
        .with_context(|| format!("Failed to parse response from {url}"))?;

    Ok(Page { body, next })
}

/// Follows `rel="next"` links from `url`, concatenating every page.
///
/// Stops with an error after `max_pages` pages so a cyclic link chain cannot
/// loop forever.
#[tracing::instrument(skip(client, url), fields(url = %url))]
pub async fn fetch_all<C, T>(client: &C, url: &str, max_pages: usize) -> Result<Vec<T>>
where
    C: HttpClient + ?Sized,
    T: DeserializeOwned,
{
    let mut items = Vec::new();
    let mut next = Some(url.to_string());
    let mut pages = 0;

    while let Some(current) = next {
        if pages == max_pages {
            bail!("Gave up after {max_pages} pages starting at {url}");
        }

        let page: Page<Vec<T>> = fetch_json(client, &current).await?;
        pages += 1;
        debug!(page = pages, items = page.body.len(), "Page received");

        items.extend(page.body);
        next = page.next;
    }

    Ok(items)
}
