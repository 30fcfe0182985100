use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::{AuthError, PgAuthService};
use crate::ritmo::handlers::{valid_email, valid_password};

#[derive(ToSchema, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Registration successful", body = String),
        (status = 400, description = "Malformed input", body = String),
        (status = 409, description = "A user with this email already exists", body = String),
    ),
    tag = "auth"
)]
pub async fn signup(
    service: Extension<Arc<PgAuthService>>,
    payload: Option<Json<SignupRequest>>,
) -> impl IntoResponse {
    let request: SignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()),
    };

    if !valid_email(request.email.trim()) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string());
    }

    if !valid_password(&request.password) {
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string());
    }

    match service.signup(&request.email, &request.password).await {
        Ok(()) => (StatusCode::OK, "User created".to_string()),
        Err(AuthError::IdentityTaken) => {
            (StatusCode::CONFLICT, "User already exists".to_string())
        }
        Err(err) => {
            error!("Signup failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Signup failed".to_string(),
            )
        }
    }
}
