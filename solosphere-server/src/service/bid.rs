//! Bid Service
//!
//! Business logic for placing bids and moving them through review.
//!
//! Submitting a bid is two independent store writes: the bid insert, then
//! the job's bid-count increment. The insert is the authoritative action; a
//! failed increment is logged and leaves the count stale rather than undoing
//! the bid.

use solosphere_core::domain::bid::Bid;
use solosphere_core::dto::ack::{InsertResult, UpdateResult};
use solosphere_core::dto::bid::{BidPatch, CreateBid};
use uuid::Uuid;

use crate::repository::bid::{BIDDER_EMAIL_FIELD, BUYER_EMAIL_FIELD, JOB_ID_FIELD, STATUS_FIELD};
use crate::repository::bid_repository;
use crate::service::{check_string_field, job_service};
use crate::store::{ID_KEY, Store, StoreError};

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum BidError {
    #[error("{email} has already placed a bid on job {job_id}")]
    DuplicateBid { email: String, job_id: Uuid },

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Place a bid on a job
///
/// Fails with `DuplicateBid` if this bidder already bid on the job; the
/// check and the insert are one atomic store operation.
pub async fn submit_bid(store: &dyn Store, req: CreateBid) -> Result<InsertResult, BidError> {
    let email = req.email.clone();
    let job_id = req.job_id;

    let id = match bid_repository::insert(store, req).await {
        Ok(id) => id,
        Err(StoreError::Conflict(_)) => {
            tracing::info!("Duplicate bid from {} on job {} rejected", email, job_id);
            return Err(BidError::DuplicateBid { email, job_id });
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Bid {} placed by {} on job {}", id, email, job_id);

    if let Err(err) = job_service::increment_bid_count(store, job_id).await {
        tracing::error!(
            "Bid {} recorded but bid count of job {} not updated: {}",
            id,
            job_id,
            err
        );
    }

    Ok(InsertResult::new(id))
}

/// All bids one bidder placed
pub async fn list_bids_by_bidder(store: &dyn Store, email: &str) -> Result<Vec<Bid>, BidError> {
    let bids = bid_repository::find_by_bidder(store, email).await?;
    Ok(bids)
}

/// All bids placed on jobs owned by one buyer
pub async fn list_bid_requests(store: &dyn Store, buyer_email: &str) -> Result<Vec<Bid>, BidError> {
    let bids = bid_repository::find_by_buyer(store, buyer_email).await?;
    Ok(bids)
}

/// Merge a patch (typically a new status) into a bid
///
/// An unknown id is acknowledged with a zero match count.
pub async fn update_bid_status(
    store: &dyn Store,
    id: Uuid,
    patch: BidPatch,
) -> Result<UpdateResult, BidError> {
    let mut fields = patch.into_inner();

    // the (bidder, job) pair identifies the bid and stays fixed
    fields.remove(ID_KEY);
    fields.remove(BIDDER_EMAIL_FIELD);
    fields.remove(JOB_ID_FIELD);

    for key in [STATUS_FIELD, BUYER_EMAIL_FIELD] {
        check_string_field(&fields, key).map_err(BidError::InvalidInput)?;
    }

    let outcome = bid_repository::merge(store, id, fields).await?;

    if outcome.matched == 0 {
        tracing::debug!("Status update for unknown bid {} ignored", id);
    } else {
        tracing::info!("Bid {} updated", id);
    }

    Ok(UpdateResult {
        acknowledged: true,
        matched_count: outcome.matched,
        modified_count: outcome.modified,
        upserted_id: None,
    })
}
