//! Transaction routes: posting, approval, update, reversal, and till cash.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use harambee_core::ledger::{
    EntryEvent, EntryKind, EntryStatus, EntryType, LedgerError,
};
use harambee_db::entities::ledger_entries;
use harambee_db::repositories::{
    CashTransactionInput, EntryFilter, PostPairInput, PostingRepository, TillRepository,
    UpdateEntryInput,
};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions", get(list_transactions))
        .route("/transactions/cash", post(cash_transaction))
        .route("/transactions/{id}", get(get_transaction))
        .route("/transactions/{id}", put(update_transaction))
        .route("/transactions/{id}", delete(delete_transaction))
        .route(
            "/transactions/reference/{reference}/approve",
            put(approve_transaction),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// SACCO the posting belongs to.
    pub sacco_id: Uuid,
    /// Account the funds leave.
    pub debit_account_id: Uuid,
    /// Account the funds enter.
    pub credit_account_id: Uuid,
    /// Amount as a decimal string.
    pub amount: String,
    /// Business classification (defaults to "transfer").
    #[serde(default)]
    pub kind: Option<String>,
    /// Initial status (defaults to "pending").
    #[serde(default)]
    pub status: Option<String>,
    /// Free-text remarks.
    pub remarks: Option<String>,
}

/// Request body for updating a pending transaction.
#[derive(Debug, Deserialize)]
pub struct UpdateTransactionRequest {
    /// New amount for both legs.
    pub amount: Option<String>,
    /// New business classification.
    pub kind: Option<String>,
    /// New remarks for this leg.
    pub remarks: Option<String>,
    /// New status; runs the transition engine.
    pub status: Option<String>,
}

/// Request body for a till cash transaction.
#[derive(Debug, Deserialize)]
pub struct CashTransactionRequest {
    /// SACCO the posting belongs to.
    pub sacco_id: Uuid,
    /// The member account at the counter.
    pub account_id: Uuid,
    /// Amount as a decimal string.
    pub amount: String,
    /// Side applied to the member account: "debit" (withdrawal) or
    /// "credit" (deposit).
    pub transaction_type: String,
    /// Free-text remarks.
    pub remarks: Option<String>,
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by reference number.
    pub reference: Option<String>,
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by account.
    pub account_id: Option<Uuid>,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/transactions` - Create a balanced entry pair.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> Response {
    if let Err(response) = check_tenancy(payload.sacco_id, &auth) {
        return response;
    }

    let Some(amount) = parse_amount(&payload.amount) else {
        return validation_error("Invalid amount format");
    };

    let kind = match payload.kind.as_deref() {
        None => EntryKind::Transfer,
        Some(s) => match EntryKind::parse(s) {
            Some(k) => k,
            None => return validation_error("Invalid transaction kind"),
        },
    };

    let status = match payload.status.as_deref() {
        None => EntryStatus::Pending,
        Some(s) => match EntryStatus::parse(s) {
            Some(s) => s,
            None => return validation_error("Invalid status"),
        },
    };

    let repo = posting_repo(&state);
    match repo
        .post_pair(PostPairInput {
            sacco_id: payload.sacco_id,
            debit_account_id: payload.debit_account_id,
            credit_account_id: payload.credit_account_id,
            amount,
            kind,
            status,
            remarks: payload.remarks,
            created_by: auth.user_id(),
        })
        .await
    {
        Ok(entries) => {
            info!(
                sacco_id = %payload.sacco_id,
                reference = %entries[0].reference_number,
                "transaction created"
            );
            envelope(
                StatusCode::CREATED,
                "Transaction created",
                json!(entries.iter().map(entry_json).collect::<Vec<_>>()),
            )
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/transactions` - List entries with filters.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Response {
    let filter = EntryFilter {
        reference: query.reference,
        status: query.status.as_deref().and_then(EntryStatus::parse),
        account_id: query.account_id,
    };

    match posting_repo(&state).list_entries(auth.sacco_id(), filter).await {
        Ok(entries) => envelope(
            StatusCode::OK,
            "Transactions",
            json!(entries.iter().map(entry_json).collect::<Vec<_>>()),
        ),
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/transactions/{id}` - Fetch one entry leg.
async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    match posting_repo(&state).find_entry(id).await {
        Ok(entry) if entry.sacco_id == auth.sacco_id() => {
            envelope(StatusCode::OK, "Transaction", entry_json(&entry))
        }
        Ok(_) => ledger_error_response(&LedgerError::EntryNotFound(id)),
        Err(e) => ledger_error_response(&e),
    }
}

/// PUT `/transactions/reference/{reference}/approve` - Approve a pending pair.
async fn approve_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reference): Path<String>,
) -> Response {
    match posting_repo(&state)
        .approve_reference(&reference, auth.user_id())
        .await
    {
        Ok(entries) => {
            info!(%reference, approver = %auth.user_id(), "transaction approved");
            envelope(
                StatusCode::OK,
                "Transaction approved",
                json!(entries.iter().map(entry_json).collect::<Vec<_>>()),
            )
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// PUT `/transactions/{id}` - Update a pending entry, or run a status
/// transition when `status` is the only field.
async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionRequest>,
) -> Response {
    let repo = posting_repo(&state);

    if let Some(status) = payload.status.as_deref() {
        if payload.amount.is_some() || payload.kind.is_some() || payload.remarks.is_some() {
            return validation_error("A status change must be the only field in the request");
        }

        let event = match EntryStatus::parse(status) {
            Some(EntryStatus::Approved) => EntryEvent::Approve,
            Some(EntryStatus::Rejected) => EntryEvent::Reject,
            Some(EntryStatus::Cancelled) => EntryEvent::Cancel,
            _ => return validation_error("Status must be approved, rejected, or cancelled"),
        };

        let entry = match repo.find_entry(id).await {
            Ok(entry) if entry.sacco_id == auth.sacco_id() => entry,
            Ok(_) => return ledger_error_response(&LedgerError::EntryNotFound(id)),
            Err(e) => return ledger_error_response(&e),
        };

        return match repo
            .transition_reference(&entry.reference_number, event, auth.user_id(), true)
            .await
        {
            Ok(entries) => envelope(
                StatusCode::OK,
                "Transaction status updated",
                json!(entries.iter().map(entry_json).collect::<Vec<_>>()),
            ),
            Err(e) => ledger_error_response(&e),
        };
    }

    let amount = match payload.amount.as_deref() {
        None => None,
        Some(raw) => match parse_amount(raw) {
            Some(a) => Some(a),
            None => return validation_error("Invalid amount format"),
        },
    };

    let kind = match payload.kind.as_deref() {
        None => None,
        Some(raw) => match EntryKind::parse(raw) {
            Some(k) => Some(k),
            None => return validation_error("Invalid transaction kind"),
        },
    };

    match repo.find_entry(id).await {
        Ok(entry) if entry.sacco_id == auth.sacco_id() => entry,
        Ok(_) => return ledger_error_response(&LedgerError::EntryNotFound(id)),
        Err(e) => return ledger_error_response(&e),
    };

    match repo
        .update_entry(
            id,
            UpdateEntryInput {
                amount,
                kind,
                remarks: payload.remarks,
            },
        )
        .await
    {
        Ok(entry) => envelope(StatusCode::OK, "Transaction updated", entry_json(&entry)),
        Err(e) => ledger_error_response(&e),
    }
}

/// DELETE `/transactions/{id}` - Reverse the posting this leg belongs to.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    let repo = posting_repo(&state);

    match repo.find_entry(id).await {
        Ok(entry) if entry.sacco_id == auth.sacco_id() => entry,
        Ok(_) => return ledger_error_response(&LedgerError::EntryNotFound(id)),
        Err(e) => return ledger_error_response(&e),
    };

    match repo.reverse_entry(id, auth.user_id()).await {
        Ok(entries) => {
            info!(entry = %id, "transaction reversed");
            envelope(
                StatusCode::OK,
                "Transaction reversed",
                json!(entries.iter().map(entry_json).collect::<Vec<_>>()),
            )
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/transactions/cash` - Till deposit or withdrawal.
async fn cash_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CashTransactionRequest>,
) -> Response {
    if payload.sacco_id != auth.sacco_id() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "success": false,
                "message": "You are not a member of this SACCO",
                "entity": serde_json::Value::Null
            })),
        )
            .into_response();
    }

    let Some(amount) = parse_amount(&payload.amount) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "Invalid amount format",
                "entity": serde_json::Value::Null
            })),
        )
            .into_response();
    };

    let Some(member_side) = EntryType::parse(&payload.transaction_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "message": "transaction_type must be 'debit' or 'credit'",
                "entity": serde_json::Value::Null
            })),
        )
            .into_response();
    };

    let till_repo = TillRepository::new((*state.db).clone(), posting_repo(&state));
    match till_repo
        .cash_transaction(CashTransactionInput {
            sacco_id: payload.sacco_id,
            member_account_id: payload.account_id,
            amount,
            member_side,
            remarks: payload.remarks,
            cashier_id: auth.user_id(),
        })
        .await
    {
        Ok(entries) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Cash transaction posted",
                "entity": entries.iter().map(entry_json).collect::<Vec<_>>()
            })),
        )
            .into_response(),
        Err(e) => {
            let status = StatusCode::from_u16(e.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                error!(error = %e, "cash transaction failed");
            }
            (
                status,
                Json(json!({
                    "success": false,
                    "message": public_message(&e),
                    "entity": serde_json::Value::Null
                })),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn posting_repo(state: &AppState) -> PostingRepository {
    PostingRepository::new((*state.db).clone(), state.references.clone())
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw).ok()
}

fn check_tenancy(sacco_id: Uuid, auth: &AuthUser) -> Result<(), Response> {
    if sacco_id == auth.sacco_id() {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "code": 403,
                "message": "You are not a member of this SACCO",
                "entity": serde_json::Value::Null
            })),
        )
            .into_response())
    }
}

fn envelope(status: StatusCode, message: &str, entity: serde_json::Value) -> Response {
    (
        status,
        Json(json!({
            "code": status.as_u16(),
            "message": message,
            "entity": entity
        })),
    )
        .into_response()
}

fn validation_error(message: &str) -> Response {
    envelope(StatusCode::BAD_REQUEST, message, serde_json::Value::Null)
}

/// Server-side failures are reported with a generic message.
fn public_message(e: &LedgerError) -> String {
    if e.http_status_code() >= 500 {
        "An error occurred".to_string()
    } else {
        e.to_string()
    }
}

fn ledger_error_response(e: &LedgerError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %e, "ledger operation failed");
    }
    (
        status,
        Json(json!({
            "code": status.as_u16(),
            "error": e.error_code(),
            "message": public_message(e),
            "entity": serde_json::Value::Null
        })),
    )
        .into_response()
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
