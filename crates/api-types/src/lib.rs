//! Shared request/response types used by API-facing crates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    pub status: String,
}

impl HealthCheckResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// Auth

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub role: String,
    pub user_id: String,
    pub name: String,
}

/// Public view of a user. The credential hash is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub role: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "dept")]
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree_id: Option<String>,
}

// Student views

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrolledCourse {
    pub enrollment_id: i32,
    pub course_id: String,
    pub course_name: String,
    pub credits: u32,
    pub faculty_name: String,
    pub status: String,
    pub grade: Option<f64>,
    pub sem: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacultySummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollableCourse {
    pub id: String,
    pub name: String,
    pub credits: u32,
    pub max_enroll: u32,
    pub enrolled_count: u64,
    pub faculties: Vec<FacultySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSelection {
    pub course_id: String,
    pub faculty_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollRequest {
    pub student_id: String,
    #[serde(default)]
    pub selected_courses: Vec<CourseSelection>,
    /// Defaults to the student's current semester.
    #[serde(default)]
    pub sem: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollResponse {
    pub message: String,
    pub total_credits: u32,
    pub enrollment_ids: Vec<i32>,
}

// Faculty views

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaughtCourse {
    pub id: String,
    pub name: String,
    pub sem: u8,
    pub enrolled_count: u64,
    pub max_enroll: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogEntry {
    pub student_name: String,
    pub student_id: String,
    pub course_name: String,
    pub grade: String,
}

// Catalog and admin views

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeSummary {
    pub id: String,
    pub code: String,
    #[serde(rename = "type")]
    pub degree_type: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeFilter {
    #[serde(default, rename = "type")]
    pub degree_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub id: String,
    pub degree_id: String,
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub max_enroll: u32,
    pub year: u8,
    pub sem: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeHistory {
    pub total_completions: u64,
    pub avg_gpa: f64,
    pub course_breakdown: Vec<CourseRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_students: u64,
    pub total_faculty: u64,
    pub total_courses: u64,
    pub capacity_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocateRequest {
    pub faculty_id: String,
    pub course_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationResponse {
    pub message: String,
    /// False when the pair was already allocated.
    pub created: bool,
}
