use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::auth::{AuthError, PgAuthService};
use crate::ritmo::handlers::valid_email;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse, content_type = "application/json"),
        (status = 400, description = "Malformed input", body = String),
        (status = 401, description = "Unauthorized", body = String),
    ),
    tag = "auth"
)]
pub async fn login(
    service: Extension<Arc<PgAuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
        }
    };

    if !valid_email(request.email.trim()) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    match service.login(&request.email, &request.password).await {
        Ok(token) => (StatusCode::OK, Json(TokenResponse { token })).into_response(),
        // Unknown identity and wrong password share one response.
        Err(AuthError::InvalidCredentials) => {
            debug!("Unauthorized");
            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response()
        }
        Err(err) => {
            error!("Login failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response()
        }
    }
}
