mod credit_policy;
mod degree_type;
mod enrollment_status;
mod error;
mod grade;
mod ids;
mod metrics;
mod role;
mod semester;
mod standing;

pub use credit_policy::{CreditPolicy, DEFAULT_MIN_CREDITS};
pub use degree_type::DegreeType;
pub use enrollment_status::EnrollmentStatus;
pub use error::DomainError;
pub use grade::{Grade, GradeRecord};
pub use ids::{CourseId, DegreeId, UserId};
pub use metrics::{DEFAULT_COURSE_CAPACITY, mean_grade, occupancy_percentage, round_to};
pub use role::Role;
pub use semester::Semester;
pub use standing::AcademicStanding;
