//! Session endpoints

use crate::MarketplaceClient;
use crate::error::Result;
use solosphere_core::dto::session::{SessionResponse, TokenRequest};

impl MarketplaceClient {
    /// Obtain a session cookie for the given identity
    pub async fn sign_in(&self, req: &TokenRequest) -> Result<SessionResponse> {
        let url = format!("{}/jwt", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        let session = self.handle_response(response).await?;
        tracing::debug!("Signed in as {}", req.email);
        Ok(session)
    }

    /// Drop the session cookie
    pub async fn sign_out(&self) -> Result<SessionResponse> {
        let url = format!("{}/logOut", self.base_url);
        let response = self.client.post(&url).send().await?;

        self.handle_response(response).await
    }
}
