//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod debts;
pub mod health;
pub mod pending_payments;

/// Creates the API router with public and protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Everything behind session authentication
    let protected_routes = Router::new()
        .merge(debts::routes())
        .merge(pending_payments::protected_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Health and customer-facing payment submission stay public
    Router::new()
        .merge(health::routes())
        .merge(pending_payments::public_routes())
        .merge(protected_routes)
}
