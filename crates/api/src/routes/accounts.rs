//! Account routes: polymorphic balance lookup.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use harambee_core::ledger::LedgerError;
use harambee_db::repositories::{AccountRepository, ResolvedAccount};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/accounts/{id}", get(get_account))
}

/// GET `/accounts/{id}` - Resolve a member or GL account with balances.
async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.resolve(id).await {
        // A wrong-tenant account reads as not found; cross-SACCO callers
        // learn nothing about which table matched.
        Ok(account) if account.sacco_id() == auth.sacco_id() => {
            envelope(StatusCode::OK, "Account", account_json(&account))
        }
        Ok(_) => error_response(&LedgerError::AccountNotFound(id)),
        Err(e) => error_response(&e),
    }
}

fn account_json(account: &ResolvedAccount) -> serde_json::Value {
    match account {
        ResolvedAccount::Member(m) => json!({
            "id": m.id,
            "kind": "member",
            "sacco_id": m.sacco_id,
            "member_id": m.member_id,
            "account_number": m.account_number,
            "currency": m.currency,
            "clear_balance": m.clear_balance.to_string(),
            "unsupervised_credits": m.unsupervised_credits.to_string(),
            "unsupervised_debits": m.unsupervised_debits.to_string(),
            "frozen_amount": m.frozen_amount.to_string(),
            "pending_charges": m.pending_charges.to_string(),
            "available_balance": m.available_balance.to_string(),
            "is_active": m.is_active,
        }),
        ResolvedAccount::Gl(g) => json!({
            "id": g.id,
            "kind": "gl",
            "sacco_id": g.sacco_id,
            "code": g.code,
            "name": g.name,
            "currency": g.currency,
            "available_balance": g.available_balance.to_string(),
            "is_active": g.is_active,
        }),
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

fn error_response(e: &LedgerError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %e, "account lookup failed");
    }
    let message = if status.is_server_error() {
        "An error occurred".to_string()
    } else {
        e.to_string()
    };
    (
        status,
        Json(json!({
            "code": status.as_u16(),
            "error": e.error_code(),
            "message": message,
            "entity": serde_json::Value::Null
        })),
    )
        .into_response()
}
