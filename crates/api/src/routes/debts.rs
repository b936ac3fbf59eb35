//! Debt ledger routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use fiado_core::auth::Action;
use fiado_core::debt::{DebtError, PaymentType};
use fiado_db::entities::debts;
use fiado_db::repositories::debt::{CreateDebtInput, DebtRepository};

use crate::{AppState, anchor, middleware::AuthUser};

/// Creates the debt routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/debts", post(create_debt))
        .route("/debts", get(list_debts))
        .route("/debts/{id}", get(get_debt))
        .route("/debts/site/{site_id}", get(list_debts_by_site))
        .route("/debts/customer/{customer_id}", get(list_debts_by_customer))
        .route("/debts/{id}/pay", patch(register_payment))
        .route("/debts/{id}", delete(delete_debt))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a debt.
#[derive(Debug, Deserialize)]
pub struct CreateDebtRequest {
    /// Site the debt belongs to.
    pub site_id: Uuid,
    /// Customer owing the debt.
    pub customer_id: Uuid,
    /// Total owed, as a decimal string.
    pub total_amount: String,
    /// What the debt is for.
    pub description: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request body for registering a direct payment.
#[derive(Debug, Deserialize)]
pub struct RegisterPaymentRequest {
    /// Payment amount, as a decimal string.
    pub amount: String,
    /// How the payment was made (cash, transfer, card, ledger).
    pub payment_type: String,
    /// Optional note appended to the debt.
    pub note: Option<String>,
}

/// Response for a debt.
#[derive(Debug, Serialize)]
pub struct DebtResponse {
    /// Debt ID.
    pub id: Uuid,
    /// Site ID.
    pub site_id: Uuid,
    /// Customer ID.
    pub customer_id: Uuid,
    /// User who recorded the debt.
    pub created_by: Uuid,
    /// Total owed.
    pub total_amount: String,
    /// Cumulative paid.
    pub paid_amount: String,
    /// Outstanding balance.
    pub pending_amount: String,
    /// Repayment status.
    pub status: String,
    /// Type of the most recent payment.
    pub last_payment_type: Option<String>,
    /// Chain transaction hash from the latest anchoring.
    pub ledger_reference: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/debts` - Record a new debt.
async fn create_debt(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateDebtRequest>,
) -> Response {
    if let Err(response) = auth.require(Action::ManageDebts) {
        return response;
    }

    let total_amount = match parse_amount(&payload.total_amount) {
        Ok(a) => a,
        Err(response) => return response,
    };

    let repo = DebtRepository::new((*state.db).clone());
    let input = CreateDebtInput {
        site_id: payload.site_id,
        customer_id: payload.customer_id,
        created_by: auth.user_id,
        total_amount,
        description: payload.description,
        notes: payload.notes,
    };

    match repo.create(input).await {
        Ok(debt) => {
            info!(debt_id = %debt.id, site_id = %debt.site_id, "Debt created");

            let tx_hash = anchor::anchor_debt_created(
                &state,
                debt.id,
                debt.site_id,
                debt.customer_id,
                debt.total_amount,
            )
            .await;

            let mut response = debt_to_response(debt);
            if tx_hash.is_some() {
                response.ledger_reference = tx_hash;
            }

            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create debt");
            debt_error_response(&e)
        }
    }
}

/// GET `/debts` - List all debts.
async fn list_debts(State(state): State<AppState>, auth: AuthUser) -> Response {
    if let Err(response) = auth.require(Action::ViewDebts) {
        return response;
    }

    let repo = DebtRepository::new((*state.db).clone());
    match repo.list().await {
        Ok(list) => debt_list_response(list),
        Err(e) => {
            error!(error = %e, "Failed to list debts");
            debt_error_response(&e)
        }
    }
}

/// GET `/debts/{id}` - Fetch one debt.
async fn get_debt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = auth.require(Action::ViewDebts) {
        return response;
    }

    let repo = DebtRepository::new((*state.db).clone());
    match repo.find_by_id(id).await {
        Ok(debt) => (StatusCode::OK, Json(debt_to_response(debt))).into_response(),
        Err(e) => debt_error_response(&e),
    }
}

/// GET `/debts/site/{site_id}` - List debts of a site.
async fn list_debts_by_site(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(site_id): Path<Uuid>,
) -> Response {
    if let Err(response) = auth.require(Action::ViewDebts) {
        return response;
    }

    let repo = DebtRepository::new((*state.db).clone());
    match repo.list_by_site(site_id).await {
        Ok(list) => debt_list_response(list),
        Err(e) => {
            error!(error = %e, "Failed to list debts by site");
            debt_error_response(&e)
        }
    }
}

/// GET `/debts/customer/{customer_id}` - List debts of a customer.
async fn list_debts_by_customer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(customer_id): Path<Uuid>,
) -> Response {
    if let Err(response) = auth.require(Action::ViewDebts) {
        return response;
    }

    let repo = DebtRepository::new((*state.db).clone());
    match repo.list_by_customer(customer_id).await {
        Ok(list) => debt_list_response(list),
        Err(e) => {
            error!(error = %e, "Failed to list debts by customer");
            debt_error_response(&e)
        }
    }
}

/// PATCH `/debts/{id}/pay` - Register a direct payment.
async fn register_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegisterPaymentRequest>,
) -> Response {
    if let Err(response) = auth.require(Action::ManageDebts) {
        return response;
    }

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

    let repo = DebtRepository::new((*state.db).clone());
    match repo
        .register_payment(id, amount, payment_type, payload.note.as_deref())
        .await
    {
        Ok(debt) => {
            info!(
                debt_id = %debt.id,
                amount = %amount,
                payment_type = %payment_type,
                "Payment registered"
            );

            let tx_hash = anchor::anchor_payment(
                &state,
                debt.id,
                debt.site_id,
                amount,
                payment_type.as_str(),
            )
            .await;

            let mut response = debt_to_response(debt);
            if tx_hash.is_some() {
                response.ledger_reference = tx_hash;
            }

            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to register payment");
            debt_error_response(&e)
        }
    }
}

/// DELETE `/debts/{id}` - Delete a debt without payments.
async fn delete_debt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Response {
    if let Err(response) = auth.require(Action::DeleteDebts) {
        return response;
    }

    let repo = DebtRepository::new((*state.db).clone());
    match repo.delete(id).await {
        Ok(()) => {
            info!(debt_id = %id, "Debt deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete debt");
            debt_error_response(&e)
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

pub(crate) fn debt_to_response(debt: debts::Model) -> DebtResponse {
    DebtResponse {
        id: debt.id,
        site_id: debt.site_id,
        customer_id: debt.customer_id,
        created_by: debt.created_by,
        total_amount: debt.total_amount.to_string(),
        paid_amount: debt.paid_amount.to_string(),
        pending_amount: debt.pending_amount.to_string(),
        status: debt.status,
        last_payment_type: debt.last_payment_type,
        ledger_reference: debt.ledger_reference,
        description: debt.description,
        notes: debt.notes,
        created_at: debt.created_at.to_rfc3339(),
        updated_at: debt.updated_at.to_rfc3339(),
    }
}

fn debt_list_response(list: Vec<debts::Model>) -> Response {
    let items: Vec<DebtResponse> = list.into_iter().map(debt_to_response).collect();
    (StatusCode::OK, Json(json!({ "data": items }))).into_response()
}

pub(crate) fn debt_error_response(e: &DebtError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({ "error": e.error_code(), "message": e.to_string() })),
    )
        .into_response()
}

#[allow(clippy::result_large_err)]
pub(crate) fn parse_amount(s: &str) -> Result<Decimal, Response> {
    Decimal::from_str(s).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "INVALID_AMOUNT",
                "message": format!("Invalid amount: {s}")
            })),
        )
            .into_response()
    })
}
