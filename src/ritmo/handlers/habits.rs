use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::{error, Instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{authorize, require_principal, AccessDecision, Role, TokenSigner};

#[derive(ToSchema, Serialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    /// How often the habit repeats, e.g. "daily" or "weekly".
    pub frequency: String,
}

#[utoipa::path(
    get,
    path = "/habits",
    responses(
        (status = 200, description = "Habits for the authenticated user", body = [Habit], content_type = "application/json"),
        (status = 401, description = "Missing, invalid or expired token", body = String),
        (status = 403, description = "Token is valid but the role is missing", body = String),
    ),
    tag = "habits"
)]
pub async fn habits(
    headers: HeaderMap,
    signer: Extension<Arc<TokenSigner>>,
    pool: Extension<PgPool>,
) -> impl IntoResponse {
    // Guard first: token verification and principal resolution happen before
    // the handler touches any habit data.
    let principal = match require_principal(&headers, &signer, &pool).await {
        Ok(principal) => principal,
        Err(status) => return status.into_response(),
    };

    if authorize(&principal, Role::User) == AccessDecision::Denied {
        return (StatusCode::FORBIDDEN, "Forbidden".to_string()).into_response();
    }

    match list_habits(&pool, principal.subject).await {
        Ok(habits) => (StatusCode::OK, Json(habits)).into_response(),
        Err(err) => {
            error!("Failed to list habits: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list habits".to_string(),
            )
                .into_response()
        }
    }
}

async fn list_habits(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Habit>> {
    let query = "SELECT id, name, frequency FROM habits WHERE user_id = $1 ORDER BY created_at";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| Habit {
            id: row.get::<Uuid, _>("id").to_string(),
            name: row.get("name"),
            frequency: row.get("frequency"),
        })
        .collect())
}
