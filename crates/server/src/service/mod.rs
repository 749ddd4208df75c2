pub mod registration;
pub mod reporting;

pub use registration::{CourseChoice, EnrollmentReceipt, RegistrationService};
pub use reporting::ReportingService;
