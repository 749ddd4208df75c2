use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use registrar_api_types::{
    EnrollRequest, EnrollResponse, EnrollableCourse, EnrolledCourse, UserProfile,
};
use registrar_core::domain::Semester;

use super::{course_id, error::ApiError, state::AppState, user_id};
use crate::auth::Principal;
use crate::service::CourseChoice;

pub fn create_student_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/student/profile/{student_id}", get(profile))
        .route("/api/student/enrolled/{student_id}", get(enrolled))
        .route("/api/student/enrollable/{student_id}", get(enrollable))
        .route("/api/student/enroll", post(enroll))
}

async fn profile(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(student_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let student_id = user_id(&student_id)?;
    principal.require_self_or_admin(&student_id)?;
    Ok(Json(state.reporting.student_profile(&student_id).await?))
}

async fn enrolled(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<EnrolledCourse>>, ApiError> {
    let student_id = user_id(&student_id)?;
    principal.require_self_or_admin(&student_id)?;
    Ok(Json(state.reporting.enrolled_courses(&student_id).await?))
}

async fn enrollable(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(student_id): Path<String>,
) -> Result<Json<Vec<EnrollableCourse>>, ApiError> {
    let student_id = user_id(&student_id)?;
    principal.require_self_or_admin(&student_id)?;
    Ok(Json(state.reporting.enrollable_courses(&student_id).await?))
}

async fn enroll(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(request): Json<EnrollRequest>,
) -> Result<Json<EnrollResponse>, ApiError> {
    let student_id = user_id(&request.student_id)?;
    principal.require_self_or_admin(&student_id)?;

    let choices = request
        .selected_courses
        .iter()
        .map(|selection| {
            Ok(CourseChoice {
                course_id: course_id(&selection.course_id)?,
                faculty_id: user_id(&selection.faculty_id)?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;
    let sem = request
        .sem
        .map(|sem| Semester::new(i64::from(sem)))
        .transpose()?;

    let receipt = state.registration.enroll(&student_id, &choices, sem).await?;
    Ok(Json(EnrollResponse {
        message: "Enrolled successfully".to_string(),
        total_credits: receipt.total_credits,
        enrollment_ids: receipt.enrollment_ids,
    }))
}
