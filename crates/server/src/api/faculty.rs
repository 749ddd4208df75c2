use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use registrar_api_types::{BacklogEntry, TaughtCourse, UserProfile};

use super::{error::ApiError, state::AppState, user_id};
use crate::auth::Principal;

pub fn create_faculty_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/faculty/profile/{faculty_id}", get(profile))
        .route("/api/faculty/courses/{faculty_id}", get(courses))
        .route("/api/faculty/backlogs/{faculty_id}", get(backlogs))
}

async fn profile(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(faculty_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let faculty_id = user_id(&faculty_id)?;
    principal.require_self_or_admin(&faculty_id)?;
    Ok(Json(state.reporting.faculty_profile(&faculty_id).await?))
}

async fn courses(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(faculty_id): Path<String>,
) -> Result<Json<Vec<TaughtCourse>>, ApiError> {
    let faculty_id = user_id(&faculty_id)?;
    principal.require_self_or_admin(&faculty_id)?;
    Ok(Json(state.reporting.taught_courses(&faculty_id).await?))
}

async fn backlogs(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(faculty_id): Path<String>,
) -> Result<Json<Vec<BacklogEntry>>, ApiError> {
    let faculty_id = user_id(&faculty_id)?;
    principal.require_self_or_admin(&faculty_id)?;
    Ok(Json(state.reporting.faculty_backlogs(&faculty_id).await?))
}
