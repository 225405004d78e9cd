//! SoloSphere HTTP Client
//!
//! A type-safe HTTP client for the SoloSphere marketplace API.
//!
//! The client keeps a cookie store, so a session obtained with
//! [`MarketplaceClient::sign_in`] is sent automatically on later calls.
//!
//! # Example
//!
//! ```no_run
//! use solosphere_client::MarketplaceClient;
//! use solosphere_core::dto::session::TokenRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = MarketplaceClient::new("http://localhost:5000")?;
//!
//!     client.sign_in(&TokenRequest::new("buyer@example.com")).await?;
//!     let jobs = client.list_my_jobs("buyer@example.com").await?;
//!
//!     println!("Posted {} jobs", jobs.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod bids;
mod jobs;
mod session;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// HTTP client for the SoloSphere API
///
/// Methods are organized into logical groups:
/// - Session (sign in, sign out)
/// - Jobs (post, browse, search, maintain)
/// - Bids (place, list, update status)
#[derive(Debug, Clone)]
pub struct MarketplaceClient {
    /// Base URL of the server (e.g., "http://localhost:5000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl MarketplaceClient {
    /// Create a new client with its own cookie store
    ///
    /// # Example
    /// ```
    /// use solosphere_client::MarketplaceClient;
    ///
    /// let client = MarketplaceClient::new("http://localhost:5000").unwrap();
    /// ```
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a new client with a custom HTTP client
    ///
    /// The session endpoints rely on cookies; build the client with
    /// `cookie_store(true)` to stay signed in between calls.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build an endpoint URL from path segments, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("Request failed with {}: {}", status, error_text);
            return Err(ClientError::from_body(status.as_u16(), &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
