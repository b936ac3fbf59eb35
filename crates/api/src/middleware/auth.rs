//! Session authentication middleware for protected routes.
//!
//! Callers present an opaque bearer token; the middleware resolves it
//! against the session store, loads the user, and exposes an [`AuthUser`]
//! to handlers.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use fiado_core::auth::{Action, Role, can};
use fiado_db::{SessionRepository, UserRepository};

use crate::AppState;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

fn unauthorized(error: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// Authentication middleware backed by the session store.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Looks up a live session for the token hash
/// 3. Loads the session's user and stores an [`AuthUser`] in request
///    extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return unauthorized(
            "missing_token",
            "Authorization header with Bearer token is required",
        );
    };

    let sessions = SessionRepository::new((*state.db).clone());
    let session = match sessions.find_valid_by_token(token).await {
        Ok(Some(session)) => session,
        Ok(None) => return unauthorized("invalid_token", "Unknown, expired, or revoked token"),
        Err(e) => {
            tracing::error!(error = %e, "Session lookup failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "DATABASE_ERROR",
                    "message": "Session lookup failed"
                })),
            )
                .into_response();
        }
    };

    let users = UserRepository::new((*state.db).clone());
    let user = match users.find_by_id(session.user_id).await {
        Ok(Some(user)) if user.status == "active" => user,
        Ok(_) => return unauthorized("invalid_token", "Session user is unknown or inactive"),
        Err(e) => {
            tracing::error!(error = %e, "User lookup failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "DATABASE_ERROR",
                    "message": "User lookup failed"
                })),
            )
                .into_response();
        }
    };

    let Some(role) = Role::parse(&user.role) else {
        tracing::error!(user_id = %user.id, role = %user.role, "User has unknown role");
        return unauthorized("invalid_token", "Session user has an unknown role");
    };

    request.extensions_mut().insert(AuthUser {
        user_id: user.id,
        role,
    });
    next.run(request).await
}

/// Authenticated caller resolved by the session middleware.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The session's user.
    pub user_id: Uuid,
    /// The user's role.
    pub role: Role,
}

impl AuthUser {
    /// Checks the access policy for an action.
    ///
    /// # Errors
    ///
    /// Returns a 403 response when the caller's role does not permit
    /// the action.
    #[allow(clippy::result_large_err)]
    pub fn require(&self, action: Action) -> Result<(), Response> {
        if can(self.role, action) {
            Ok(())
        } else {
            Err((
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "FORBIDDEN",
                    "message": "Your role does not permit this action"
                })),
            )
                .into_response())
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().copied().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "unauthorized",
                    "message": "Authentication required"
                })),
            )
        })
    }
}
