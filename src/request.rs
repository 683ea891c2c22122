use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::{warn_time, Result, BASE_URL};

/// Source of neighbourhood pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the page markup, or `None` when the page is unavailable.
    /// An available but empty page is `Some(String::new())`.
    async fn fetch(&self, city: &str, neighbourhood: &str) -> Option<String>;
}

/// Fetches neighbourhood pages from the developer's site.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn page_url(&self, city: &str, neighbourhood: &str) -> String {
        format!("{}/mieszkania-{city}/{neighbourhood}/", self.base_url)
    }

    /// Requests a page and returns the HTML if the server answered with 200.
    async fn request_page_html(&self, city: &str, neighbourhood: &str) -> Result<Option<String>> {
        let res = self
            .client
            .get(self.page_url(city, neighbourhood))
            .send()
            .await?;
        if res.status() != StatusCode::OK {
            warn_time!(
                "Could not retrieve the page contents for {} and {}! HTTP Status code {}!",
                city,
                neighbourhood,
                res.status().as_u16()
            );
            return Ok(None);
        }
        let html = res.text().await?;
        Ok(Some(html))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, city: &str, neighbourhood: &str) -> Option<String> {
        match self.request_page_html(city, neighbourhood).await {
            Ok(html) => html,
            Err(err) => {
                warn_time!("Request for {} and {} failed: {}", city, neighbourhood, err);
                None
            }
        }
    }
}
