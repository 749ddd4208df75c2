use super::{DomainError, EnrollmentStatus};

/// Grade point on a 4.0 scale. Zero is reserved for a failed (backlog) course.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Grade(f64);

impl Grade {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 4.0;
    pub const FAIL: Self = Self(0.0);

    pub fn new(value: f64) -> Result<Self, DomainError> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidGrade(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_fail(self) -> bool {
        self.0 == Self::MIN
    }
}

impl TryFrom<f64> for Grade {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Grade> for f64 {
    fn from(value: Grade) -> Self {
        value.value()
    }
}

/// Status and grade of an enrollment, checked together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeRecord {
    status: EnrollmentStatus,
    grade: Option<Grade>,
}

impl GradeRecord {
    /// `enrolled` carries no grade, `backlog` carries exactly 0.0 and
    /// `completed` carries a passing grade.
    pub fn validate(status: EnrollmentStatus, grade: Option<Grade>) -> Result<Self, DomainError> {
        let consistent = match (status, grade) {
            (EnrollmentStatus::Enrolled, None) => true,
            (EnrollmentStatus::Backlog, Some(g)) => g.is_fail(),
            (EnrollmentStatus::Completed, Some(g)) => !g.is_fail(),
            _ => false,
        };

        if consistent {
            Ok(Self { status, grade })
        } else {
            Err(DomainError::GradeStatusMismatch {
                status,
                grade: grade.map(Grade::value),
            })
        }
    }

    pub fn enrolled() -> Self {
        Self {
            status: EnrollmentStatus::Enrolled,
            grade: None,
        }
    }

    pub fn backlog() -> Self {
        Self {
            status: EnrollmentStatus::Backlog,
            grade: Some(Grade::FAIL),
        }
    }

    pub fn completed(grade: Grade) -> Result<Self, DomainError> {
        Self::validate(EnrollmentStatus::Completed, Some(grade))
    }

    pub fn status(&self) -> EnrollmentStatus {
        self.status
    }

    pub fn grade(&self) -> Option<Grade> {
        self.grade
    }
}
