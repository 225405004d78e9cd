//! Bid-related API endpoints

use crate::MarketplaceClient;
use crate::error::Result;
use solosphere_core::domain::bid::Bid;
use solosphere_core::dto::ack::{InsertResult, UpdateResult};
use solosphere_core::dto::bid::{BidPatch, CreateBid};
use uuid::Uuid;

impl MarketplaceClient {
    /// Place a bid on a job
    ///
    /// A second bid by the same freelancer on the same job fails with a
    /// 400 (see [`crate::ClientError::is_bad_request`]).
    pub async fn submit_bid(&self, req: &CreateBid) -> Result<InsertResult> {
        let url = format!("{}/bids", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Bids placed by a freelancer
    pub async fn list_my_bids(&self, email: &str) -> Result<Vec<Bid>> {
        let url = self.endpoint(&["myBids", email])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Bids received on a buyer's jobs
    pub async fn list_bid_requests(&self, email: &str) -> Result<Vec<Bid>> {
        let url = self.endpoint(&["bidRequests", email])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Move a bid to a new status
    pub async fn update_bid_status(&self, bid_id: Uuid, status: &str) -> Result<UpdateResult> {
        let url = format!("{}/bid/{}", self.base_url, bid_id);
        let response = self
            .client
            .patch(&url)
            .json(&BidPatch::status(status))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
