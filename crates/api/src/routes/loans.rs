//! Loan application routes: lookup and disbursement.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use harambee_core::loan::LoanError;
use harambee_db::entities::loan_applications;
use harambee_db::repositories::{DisbursementOutcome, LoanRepository, PostingRepository};

/// Creates the loan application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/loan-applications/{id}", get(get_application))
        .route("/loan-applications/{id}/disburse", put(disburse))
}

/// GET `/loan-applications/{id}` - Fetch one application.
async fn get_application(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    match loan_repo(&state).find_application(auth.sacco_id(), id).await {
        Ok(application) => envelope(
            StatusCode::OK,
            "Loan application",
            application_json(&application),
        ),
        Err(e) => loan_error_response(&e),
    }
}

/// PUT `/loan-applications/{id}/disburse` - Run the disbursement orchestrator.
///
/// Requires the cashier role. Creates the loan account, posts debit till-GL /
/// credit loan-account, and marks the application Disbursed, atomically.
async fn disburse(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    match loan_repo(&state)
        .disburse(auth.sacco_id(), id, auth.user_id(), auth.is_cashier())
        .await
    {
        Ok(outcome) => {
            info!(
                application = %outcome.application.id,
                loan_account = %outcome.loan_account.id,
                cashier = %auth.user_id(),
                "loan disbursed"
            );
            envelope(StatusCode::OK, "Loan disbursed", outcome_json(&outcome))
        }
        Err(e) => loan_error_response(&e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn loan_repo(state: &AppState) -> LoanRepository {
    let posting = PostingRepository::new((*state.db).clone(), state.references.clone());
    LoanRepository::new((*state.db).clone(), posting)
}

fn application_json(application: &loan_applications::Model) -> serde_json::Value {
    json!({
        "id": application.id,
        "sacco_id": application.sacco_id,
        "member_id": application.member_id,
        "product_id": application.product_id,
        "amount": application.amount.to_string(),
        "status": application.status,
        "main_repayment_account_id": application.main_repayment_account_id,
        "disbursed_by": application.disbursed_by,
        "disbursed_at": application.disbursed_at.map(|t| t.to_rfc3339()),
        "created_at": application.created_at.to_rfc3339(),
        "updated_at": application.updated_at.to_rfc3339(),
    })
}

fn outcome_json(outcome: &DisbursementOutcome) -> serde_json::Value {
    json!({
        "application": application_json(&outcome.application),
        "loan_account": {
            "id": outcome.loan_account.id,
            "member_id": outcome.loan_account.member_id,
            "account_number": outcome.loan_account.account_number,
            "currency": outcome.loan_account.currency,
            "clear_balance": outcome.loan_account.clear_balance.to_string(),
            "available_balance": outcome.loan_account.available_balance.to_string(),
        },
        "entries": outcome.entries.iter().map(|e| json!({
            "id": e.id,
            "reference_number": e.reference_number,
            "account_id": e.account_id,
            "entry_type": e.entry_type,
            "amount": e.amount.to_string(),
            "status": e.status,
        })).collect::<Vec<_>>(),
    })
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

fn loan_error_response(e: &LoanError) -> Response {
    let status =
        StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %e, "loan operation failed");
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
