//! Bid API Handlers
//!
//! HTTP endpoints for placing bids and tracking them.

use axum::{
    Json,
    extract::{Path, State},
};
use solosphere_core::domain::bid::Bid;
use solosphere_core::dto::ack::{InsertResult, UpdateResult};
use solosphere_core::dto::bid::{BidPatch, CreateBid};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::bid_service;

/// POST /bids
/// Place a bid on a job
pub async fn submit_bid(
    State(state): State<AppState>,
    Json(req): Json<CreateBid>,
) -> ApiResult<Json<InsertResult>> {
    tracing::info!("Bid from {} on job {}", req.email, req.job_id);

    let ack = bid_service::submit_bid(state.store.as_ref(), req).await?;
    Ok(Json(ack))
}

/// GET /myBids/{email}
/// List bids placed by a freelancer
pub async fn list_my_bids(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<Bid>>> {
    let bids = bid_service::list_bids_by_bidder(state.store.as_ref(), &email).await?;
    Ok(Json(bids))
}

/// GET /bidRequests/{email}
/// List bids received on a buyer's jobs
pub async fn list_bid_requests(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<Bid>>> {
    let bids = bid_service::list_bid_requests(state.store.as_ref(), &email).await?;
    Ok(Json(bids))
}

/// PATCH /bid/{id}
/// Update a bid's status
pub async fn update_bid_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<BidPatch>,
) -> ApiResult<Json<UpdateResult>> {
    tracing::debug!("Updating bid {}: {:?}", id, patch.0.get("status"));

    let ack = bid_service::update_bid_status(state.store.as_ref(), id, patch).await?;
    Ok(Json(ack))
}
