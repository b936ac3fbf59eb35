//! Pending payment queue and reconciliation routes.
//!
//! Submission is public (customers propose payments); everything else
//! sits behind the session middleware.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use fiado_core::auth::Action;
use fiado_core::debt::PaymentType;
use fiado_core::payment::{PaymentError, PendingPaymentStatus};
use fiado_db::entities::pending_payments;
use fiado_db::repositories::pending_payment::{PendingPaymentRepository, SubmitPaymentInput};

use crate::routes::debts::{debt_to_response, parse_amount};
use crate::{AppState, anchor, middleware::AuthUser};

/// Creates the public pending-payment routes.
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/pending-payments", post(submit_payment))
}

/// Creates the protected pending-payment routes.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/pending-payments", get(list_payments))
        .route("/pending-payments/{id}", get(get_payment))
        .route("/pending-payments/debt/{debt_id}", get(list_by_debt))
        .route(
            "/pending-payments/customer/{customer_id}",
            get(list_by_customer),
        )
        .route("/pending-payments/{id}/approve", patch(approve_payment))
        .route("/pending-payments/{id}/reject", patch(reject_payment))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a payment proposal.
#[derive(Debug, Deserialize)]
pub struct SubmitPaymentRequest {
    /// Debt the payment is proposed against.
    pub debt_id: Uuid,
    /// Proposed amount, as a decimal string.
    pub amount: String,
    /// How the payment was made (cash, transfer, card, ledger).
    pub payment_type: String,
    /// Free-form payment reference (receipt number, memo).
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Chain proof supplied by the submitter, recorded as-is.
    pub ledger_reference: Option<String>,
}

/// Query parameters for listing pending payments.
#[derive(Debug, Deserialize)]
pub struct ListPaymentsQuery {
    /// Optional status filter (pending, approved, rejected).
    pub status: Option<String>,
}

/// Response for a pending payment.
#[derive(Debug, Serialize)]
pub struct PendingPaymentResponse {
    /// Pending payment ID.
    pub id: Uuid,
    /// Debt the payment targets.
    pub debt_id: Uuid,
    /// Customer who owes the debt.
    pub customer_id: Uuid,
    /// Proposed amount.
    pub amount: String,
    /// Payment type.
    pub payment_type: String,
    /// Payment reference.
    pub reference: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Queue status.
    pub status: String,
    /// Submitter-supplied chain proof.
    pub ledger_reference: Option<String>,
    /// When the decision was made.
    pub decided_at: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/pending-payments` - Submit a payment proposal (public).
async fn submit_payment(
    State(state): State<AppState>,
    Json(payload): Json<SubmitPaymentRequest>,
) -> Response {
    let amount = match parse_amount(&payload.amount) {
        Ok(a) => a,
        Err(response) => return response,
    };
    let Some(payment_type) = PaymentType::parse(&payload.payment_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "INVALID_PAYMENT_TYPE",
                "message": format!("Unknown payment type: {}", payload.payment_type)
            })),
        )
            .into_response();
    };

    let repo = PendingPaymentRepository::new((*state.db).clone());
    let input = SubmitPaymentInput {
        debt_id: payload.debt_id,
        amount,
        payment_type,
        reference: payload.reference,
        notes: payload.notes,
        ledger_reference: payload.ledger_reference,
    };

    match repo.submit(input).await {
        Ok(payment) => {
            info!(
                payment_id = %payment.id,
                debt_id = %payment.debt_id,
                amount = %amount,
                "Pending payment submitted"
            );
            (StatusCode::CREATED, Json(payment_to_response(payment))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to submit pending payment");
            payment_error_response(&e)
        }
    }
}

/// GET `/pending-payments` - List payments, optionally by status.
async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListPaymentsQuery>,
) -> Response {
    if let Err(response) = auth.require(Action::ViewDebts) {
        return response;
    }

    let status = match query.status.as_deref() {
        Some(raw) => match PendingPaymentStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "INVALID_STATUS",
                        "message": format!("Unknown status: {raw}")
                    })),
                )
                    .into_response();
            }
        },
        None => None,
    };

    let repo = PendingPaymentRepository::new((*state.db).clone());
    match repo.list(status).await {
        Ok(list) => payment_list_response(list),
        Err(e) => {
            error!(error = %e, "Failed to list pending payments");
            payment_error_response(&e)
        }
    }
}

/// GET `/pending-payments/{id}` - Fetch one pending payment.
async fn get_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = auth.require(Action::ViewDebts) {
        return response;
    }

    let repo = PendingPaymentRepository::new((*state.db).clone());
    match repo.find_by_id(id).await {
        Ok(payment) => (StatusCode::OK, Json(payment_to_response(payment))).into_response(),
        Err(e) => payment_error_response(&e),
    }
}

/// GET `/pending-payments/debt/{debt_id}` - List payments against a debt.
async fn list_by_debt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(debt_id): Path<Uuid>,
) -> Response {
    if let Err(response) = auth.require(Action::ViewDebts) {
        return response;
    }

    let repo = PendingPaymentRepository::new((*state.db).clone());
    match repo.list_by_debt(debt_id).await {
        Ok(list) => payment_list_response(list),
        Err(e) => {
            error!(error = %e, "Failed to list pending payments by debt");
            payment_error_response(&e)
        }
    }
}

/// GET `/pending-payments/customer/{customer_id}` - List a customer's payments.
async fn list_by_customer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(customer_id): Path<Uuid>,
) -> Response {
    if let Err(response) = auth.require(Action::ViewDebts) {
        return response;
    }

    let repo = PendingPaymentRepository::new((*state.db).clone());
    match repo.list_by_customer(customer_id).await {
        Ok(list) => payment_list_response(list),
        Err(e) => {
            error!(error = %e, "Failed to list pending payments by customer");
            payment_error_response(&e)
        }
    }
}

/// PATCH `/pending-payments/{id}/approve` - Approve and reconcile.
async fn approve_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = auth.require(Action::DecidePayments) {
        return response;
    }

    let repo = PendingPaymentRepository::new((*state.db).clone());
    match repo.approve(id).await {
        Ok(outcome) => {
            info!(
                payment_id = %outcome.payment.id,
                debt_id = %outcome.debt.id,
                amount = %outcome.payment.amount,
                "Pending payment approved"
            );

            let tx_hash = anchor::anchor_payment(
                &state,
                outcome.debt.id,
                outcome.debt.site_id,
                outcome.payment.amount,
                &outcome.payment.payment_type,
            )
            .await;

            let mut debt = debt_to_response(outcome.debt);
            if tx_hash.is_some() {
                debt.ledger_reference = tx_hash;
            }

            (
                StatusCode::OK,
                Json(json!({
                    "payment": payment_to_response(outcome.payment),
                    "debt": debt,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to approve pending payment");
            payment_error_response(&e)
        }
    }
}

/// PATCH `/pending-payments/{id}/reject` - Reject without touching the debt.
async fn reject_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = auth.require(Action::DecidePayments) {
        return response;
    }

    let repo = PendingPaymentRepository::new((*state.db).clone());
    match repo.reject(id).await {
        Ok(payment) => {
            info!(payment_id = %payment.id, "Pending payment rejected");
            (StatusCode::OK, Json(payment_to_response(payment))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to reject pending payment");
            payment_error_response(&e)
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn payment_to_response(payment: pending_payments::Model) -> PendingPaymentResponse {
    PendingPaymentResponse {
        id: payment.id,
        debt_id: payment.debt_id,
        customer_id: payment.customer_id,
        amount: payment.amount.to_string(),
        payment_type: payment.payment_type,
        reference: payment.reference,
        notes: payment.notes,
        status: payment.status,
        ledger_reference: payment.ledger_reference,
        decided_at: payment.decided_at.map(|t| t.to_rfc3339()),
        created_at: payment.created_at.to_rfc3339(),
        updated_at: payment.updated_at.to_rfc3339(),
    }
}

fn payment_list_response(list: Vec<pending_payments::Model>) -> Response {
    let items: Vec<PendingPaymentResponse> = list.into_iter().map(payment_to_response).collect();
    (StatusCode::OK, Json(json!({ "data": items }))).into_response()
}

fn payment_error_response(e: &PaymentError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "error": e.error_code(), "message": e.to_string() })),
    )
        .into_response()
}
