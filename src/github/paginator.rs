use reqwest::header::{HeaderMap, LINK};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::github::client::check_response;
use crate::github::rate_limiter::RateLimiter;

/// Walks a paged listing by following the `rel="next"` cursor GitHub puts in
/// the `Link` header.
pub struct Paginator<'a> {
    client: &'a Client,
    rate_limiter: &'a RateLimiter,
    next_url: Option<String>,
    context: String,
    pages_fetched: u32,
}

impl<'a> Paginator<'a> {
    pub fn new(
        client: &'a Client,
        rate_limiter: &'a RateLimiter,
        first_url: String,
        context: impl Into<String>,
    ) -> Self {
        Self {
            client,
            rate_limiter,
            next_url: Some(first_url),
            context: context.into(),
            pages_fetched: 0,
        }
    }

    /// Returns `None` once the cursor is exhausted or a page comes back empty.
    pub async fn next_page<T: DeserializeOwned>(&mut self) -> Result<Option<Vec<T>>> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };

        tracing::debug!("Fetching: {}", url);
        let response = self.client.get(&url).send().await?;
        let response = check_response(response, self.rate_limiter, &self.context).await?;

        self.next_url = next_link(response.headers());
        self.pages_fetched += 1;

        let items: Vec<T> = response.json().await?;
        if items.is_empty() {
            self.next_url = None;
            return Ok(None);
        }

        Ok(Some(items))
    }

    pub async fn fetch_all<T: DeserializeOwned>(mut self) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        while let Some(items) = self.next_page().await? {
            all_items.extend(items);
        }
        Ok(all_items)
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }
}

/// Extracts the `rel="next"` target from a `Link` header.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let url = parts.next()?.trim().strip_prefix('<')?.strip_suffix('>')?;
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        is_next.then(|| url.to_string())
    })
}
