use thiserror::Error;

use super::EnrollmentStatus;

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("unknown degree type: {0}")]
    UnknownDegreeType(String),

    #[error("unknown enrollment status: {0}")]
    UnknownEnrollmentStatus(String),

    #[error("invalid grade: {0}. grade must be in [0.0, 4.0]")]
    InvalidGrade(f64),

    #[error("invalid semester: {0}. semester must be in [1, 8]")]
    InvalidSemester(i64),

    #[error("invalid academic standing '{0}', expected UG-<year> or PG-<year>")]
    InvalidStanding(String),

    #[error("credit weight must be positive, got {0}")]
    InvalidCredits(i64),

    #[error("grade {grade:?} does not match enrollment status {status}")]
    GradeStatusMismatch {
        status: EnrollmentStatus,
        grade: Option<f64>,
    },

    #[error("minimum {minimum} credits required, selected {total}")]
    CreditsBelowMinimum { total: u32, minimum: u32 },

    #[error("at most {maximum} credits allowed, selected {total}")]
    CreditsAboveMaximum { total: u32, maximum: u32 },
}
