use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use registrar_api_types::{LoginRequest, LoginResponse};

use super::{error::ApiError, state::AppState};

pub fn create_auth_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/login", post(login))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(response))
}
