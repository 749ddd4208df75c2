pub mod course;
pub mod degree;
pub mod enrollment;
pub mod faculty_course;
pub mod user;
