//! HTTP listing client

use crate::listing::{ListingPage, ListingSource, parse_listing};
use crate::FetchError;
use gamedex_config::ApiConfig;

/// Fetches listing pages with `GET <base_url>?page=<n>&limit=<n>`
pub struct HttpListing {
    base_url: String,
    client: reqwest::Client,
}

impl HttpListing {
    /// Create a client for the configured endpoint
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone());

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ListingSource for HttpListing {
    async fn fetch_page(&self, page: u32, limit: u32) -> Result<ListingPage, FetchError> {
        tracing::debug!(
            "Fetching listing page {} (limit {}) from {}",
            page,
            limit,
            self.base_url
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("page", page), ("limit", limit)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let listing = parse_listing(&body)?;

        tracing::debug!(
            "Listing page {} returned {} records ({} total pages)",
            page,
            listing.records.len(),
            listing.total_pages
        );

        Ok(listing)
    }
}
