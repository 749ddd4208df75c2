use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use registrar_api_types::{
    AdminStats, AllocateRequest, AllocationResponse, CourseSummary, DegreeFilter, DegreeHistory,
    DegreeSummary, MessageResponse, UserProfile,
};
use registrar_core::domain::DegreeType;

use super::{course_id, degree_id, error::ApiError, state::AppState, user_id};
use crate::auth::Principal;
use crate::repository::AllocationOutcome;

pub fn create_admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/degrees", get(degrees))
        .route("/api/admin/degree/{degree_id}/courses", get(degree_courses))
        .route("/api/admin/degree/{degree_id}/history", get(degree_history))
        .route("/api/admin/faculty", get(faculty))
        .route("/api/admin/courses", get(courses))
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/allocate", post(allocate))
        .route(
            "/api/admin/allocate/{faculty_id}/{course_id}",
            delete(remove_allocation),
        )
}

async fn degrees(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(filter): Query<DegreeFilter>,
) -> Result<Json<Vec<DegreeSummary>>, ApiError> {
    principal.require_admin()?;
    let degree_type = filter
        .degree_type
        .as_deref()
        .map(str::parse::<DegreeType>)
        .transpose()?;
    Ok(Json(state.reporting.degrees(degree_type).await?))
}

async fn degree_courses(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(raw): Path<String>,
) -> Result<Json<Vec<CourseSummary>>, ApiError> {
    principal.require_admin()?;
    Ok(Json(state.reporting.degree_courses(&degree_id(&raw)?).await?))
}

async fn degree_history(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(raw): Path<String>,
) -> Result<Json<DegreeHistory>, ApiError> {
    principal.require_admin()?;
    Ok(Json(state.reporting.degree_history(&degree_id(&raw)?).await?))
}

async fn faculty(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    principal.require_admin()?;
    Ok(Json(state.reporting.all_faculty().await?))
}

async fn courses(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<CourseSummary>>, ApiError> {
    principal.require_admin()?;
    Ok(Json(state.reporting.all_courses().await?))
}

async fn stats(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<AdminStats>, ApiError> {
    principal.require_admin()?;
    Ok(Json(state.reporting.stats().await?))
}

async fn allocate(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(request): Json<AllocateRequest>,
) -> Result<Json<AllocationResponse>, ApiError> {
    principal.require_admin()?;
    let faculty_id = user_id(&request.faculty_id)?;
    let course_id = course_id(&request.course_id)?;

    let outcome = state.store.allocations.allocate(&faculty_id, &course_id).await?;

    Ok(Json(AllocationResponse {
        message: "Allocation successful".to_string(),
        created: outcome == AllocationOutcome::Created,
    }))
}

async fn remove_allocation(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path((faculty_raw, course_raw)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    principal.require_admin()?;
    let faculty_id = user_id(&faculty_raw)?;
    let course_id = course_id(&course_raw)?;

    state.store.allocations.remove(&faculty_id, &course_id).await?;
    Ok(Json(MessageResponse::new("Allocation removed")))
}
