//! Smart teller routes: multi-leg batch postings and their transitions.
//!
//! Teller routes use the `{success, message, entity}` envelope the teller UI
//! expects, unlike the `{code, ...}` envelope of the transaction routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use harambee_core::ledger::{
    EntryEvent, EntryKind, EntryStatus, EntryType, LedgerError, LegInput,
};
use harambee_db::entities::ledger_entries;
use harambee_db::repositories::{PostBatchInput, PostingRepository};

/// Creates the smart teller routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/smart-teller", post(create_batch))
        .route("/smart-teller/{reference}/status", put(update_status))
}

// ============================================================================
// Request Types
// ============================================================================

/// One requested leg of a teller batch.
#[derive(Debug, Deserialize)]
pub struct BatchLegRequest {
    /// Account to post against (member or GL).
    pub account_id: Uuid,
    /// "debit" or "credit".
    pub entry_type: String,
    /// Leg amount as a decimal string.
    pub amount: String,
    /// Free-text remarks for this leg.
    pub remarks: Option<String>,
}

/// Request body for creating a teller batch.
#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    /// SACCO the posting belongs to.
    pub sacco_id: Uuid,
    /// The requested legs; total debits must equal total credits.
    pub legs: Vec<BatchLegRequest>,
    /// Initial status (defaults to "pending").
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for a batch status transition.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Target status: "approved", "rejected", or "cancelled".
    pub status: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/smart-teller` - Create an N-leg balanced posting.
async fn create_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateBatchRequest>,
) -> Response {
    if payload.sacco_id != auth.sacco_id() {
        return failure(StatusCode::FORBIDDEN, "You are not a member of this SACCO");
    }

    let status = match payload.status.as_deref() {
        None => EntryStatus::Pending,
        Some(s) => match EntryStatus::parse(s) {
            Some(s) => s,
            None => return failure(StatusCode::BAD_REQUEST, "Invalid status"),
        },
    };

    let mut legs = Vec::with_capacity(payload.legs.len());
    for leg in payload.legs {
        let Some(entry_type) = EntryType::parse(&leg.entry_type) else {
            return failure(
                StatusCode::BAD_REQUEST,
                "entry_type must be 'debit' or 'credit'",
            );
        };
        let Ok(amount) = Decimal::from_str(&leg.amount) else {
            return failure(StatusCode::BAD_REQUEST, "Invalid amount format");
        };
        legs.push(LegInput {
            account_id: leg.account_id,
            entry_type,
            amount,
            remarks: leg.remarks,
        });
    }

    match posting_repo(&state)
        .post_batch(PostBatchInput {
            sacco_id: payload.sacco_id,
            legs,
            kind: EntryKind::TellerBatch,
            status,
            created_by: auth.user_id(),
        })
        .await
    {
        Ok(entries) => {
            info!(
                sacco_id = %payload.sacco_id,
                reference = %entries[0].reference_number,
                legs = entries.len(),
                "teller batch created"
            );
            success(
                StatusCode::CREATED,
                "Teller posting created",
                json!(entries.iter().map(entry_json).collect::<Vec<_>>()),
            )
        }
        Err(e) => ledger_failure(&e),
    }
}

/// PUT `/smart-teller/{reference}/status` - Approve, reject, or cancel a batch.
async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reference): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Response {
    let event = match EntryStatus::parse(&payload.status) {
        Some(EntryStatus::Approved) => EntryEvent::Approve,
        Some(EntryStatus::Rejected) => EntryEvent::Reject,
        Some(EntryStatus::Cancelled) => EntryEvent::Cancel,
        _ => {
            return failure(
                StatusCode::BAD_REQUEST,
                "Status must be approved, rejected, or cancelled",
            );
        }
    };

    let repo = posting_repo(&state);

    match repo.find_by_reference(&reference).await {
        Ok(legs) if legs.iter().all(|l| l.sacco_id == auth.sacco_id()) => legs,
        Ok(_) => return ledger_failure(&LedgerError::ReferenceNotFound(reference)),
        Err(e) => return ledger_failure(&e),
    };

    match repo
        .transition_reference(&reference, event, auth.user_id(), false)
        .await
    {
        Ok(entries) => {
            info!(%reference, %event, actor = %auth.user_id(), "teller batch transition");
            success(
                StatusCode::OK,
                "Teller posting status updated",
                json!(entries.iter().map(entry_json).collect::<Vec<_>>()),
            )
        }
        Err(e) => ledger_failure(&e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn posting_repo(state: &AppState) -> PostingRepository {
    PostingRepository::new((*state.db).clone(), state.references.clone())
}

fn success(status: StatusCode, message: &str, entity: serde_json::Value) -> Response {
    (
        status,
        Json(json!({
            "success": true,
            "message": message,
            "entity": entity
        })),
    )
        .into_response()
}

fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "entity": serde_json::Value::Null
        })),
    )
        .into_response()
}

fn ledger_failure(e: &LedgerError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %e, "teller operation failed");
        return failure(status, "An error occurred");
    }
    failure(status, &e.to_string())
}

fn entry_json(entry: &ledger_entries::Model) -> serde_json::Value {
    json!({
        "id": entry.id,
        "transaction_code": entry.transaction_code,
        "reference_number": entry.reference_number,
        "sacco_id": entry.sacco_id,
        "account_id": entry.account_id,
        "account_kind": entry.account_kind,
        "entry_type": entry.entry_type,
        "amount": entry.amount.to_string(),
        "status": entry.status,
        "kind": entry.kind,
        "remarks": entry.remarks,
        "created_by": entry.created_by,
        "approved_by": entry.approved_by,
        "approved_at": entry.approved_at.map(|t| t.to_rfc3339()),
        "is_deleted": entry.is_deleted,
        "created_at": entry.created_at.to_rfc3339(),
        "updated_at": entry.updated_at.to_rfc3339(),
    })
}
