use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use registrar_api_types::UserProfile;
use registrar_core::domain::Role;

use super::{course_id, error::ApiError, state::AppState};
use crate::auth::Principal;

pub fn create_course_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/course/{course_id}/students", get(students))
}

async fn students(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(course_id_raw): Path<String>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    principal.require_any_role(&[Role::Faculty, Role::Admin])?;
    let course_id = course_id(&course_id_raw)?;
    Ok(Json(state.reporting.course_students(&course_id).await?))
}
