pub mod allocation_repository;
pub mod course_repository;
pub mod degree_repository;
pub mod enrollment_repository;
pub mod user_repository;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

pub use allocation_repository::{
    Allocation, AllocationOutcome, AllocationRepository, SeaOrmAllocationRepository,
};
pub use course_repository::{CourseRecord, CourseRepository, NewCourse, SeaOrmCourseRepository};
pub use degree_repository::{DegreeRecord, DegreeRepository, NewDegree, SeaOrmDegreeRepository};
pub use enrollment_repository::{
    EnrollmentRecord, EnrollmentRepository, NewEnrollment, SeaOrmEnrollmentRepository,
};
pub use user_repository::{
    NewUser, SeaOrmUserRepository, UserCredentials, UserRecord, UserRepository,
};

/// One handle per entity, shared by the services.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub degrees: Arc<dyn DegreeRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub allocations: Arc<dyn AllocationRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
}

impl Store {
    pub fn sea_orm(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(SeaOrmUserRepository::new(db.clone())),
            degrees: Arc::new(SeaOrmDegreeRepository::new(db.clone())),
            courses: Arc::new(SeaOrmCourseRepository::new(db.clone())),
            allocations: Arc::new(SeaOrmAllocationRepository::new(db.clone())),
            enrollments: Arc::new(SeaOrmEnrollmentRepository::new(db)),
        }
    }
}
