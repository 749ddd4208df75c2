//! HTTP JSON API.

mod admin;
mod auth;
mod course;
pub mod error;
mod extract;
mod faculty;
mod health;
pub mod state;
mod student;

use std::sync::Arc;

use axum::Router;
use registrar_core::domain::{CourseId, DegreeId, UserId};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use error::ApiError;
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::create_health_router())
        .merge(auth::create_auth_router())
        .merge(student::create_student_router())
        .merge(faculty::create_faculty_router())
        .merge(course::create_course_router())
        .merge(admin::create_admin_router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn user_id(raw: &str) -> Result<UserId, ApiError> {
    Ok(UserId::new(raw)?)
}

fn course_id(raw: &str) -> Result<CourseId, ApiError> {
    Ok(CourseId::new(raw)?)
}

fn degree_id(raw: &str) -> Result<DegreeId, ApiError> {
    Ok(DegreeId::new(raw)?)
}
