#![allow(dead_code)]

use registrar_core::domain::{
    AcademicStanding, CourseId, DegreeId, DegreeType, GradeRecord, Role, Semester, UserId,
};
use registrar_server::auth::CredentialHasher;
use registrar_server::db;
use registrar_server::repository::{NewCourse, NewDegree, NewEnrollment, NewUser, Store};
use sea_orm::DatabaseConnection;

pub const PASSWORD: &str = "secret123";
pub const CSE: &str = "deg_ug_cse";

pub async fn memory_db() -> DatabaseConnection {
    db::init_pool_and_migrate("sqlite::memory:")
        .await
        .expect("in-memory database should migrate")
}

/// Minimum argon2 cost; the hashes are still real PHC strings.
pub fn cheap_hasher() -> CredentialHasher {
    CredentialHasher::with_cost(8, 1).expect("argon2 params should be valid")
}

pub fn uid(raw: &str) -> UserId {
    UserId::new(raw).expect("valid user id")
}

pub fn cid(raw: &str) -> CourseId {
    CourseId::new(raw).expect("valid course id")
}

pub fn sem(value: i64) -> Semester {
    Semester::new(value).expect("valid semester")
}

/// Semester-2 course codes of the CSE fixture with their credits and capacity.
/// `A..E` sum to 19 credits; adding `F` makes 20.
pub const COURSES: &[(&str, &str, u32, u32)] = &[
    ("A", "Operating Systems", 4, 30),
    ("B", "Computer Networks", 4, 30),
    ("C", "Database Systems", 4, 30),
    ("D", "Compiler Design", 4, 30),
    ("E", "Software Testing", 3, 30),
    ("F", "Technical Seminar", 1, 30),
    ("H", "Research Lab", 4, 1),
];

/// Course id for a fixture code, scoped to CSE.
pub fn course(code: &str) -> CourseId {
    CourseId::scoped(code, "CSE").expect("valid course id")
}

pub struct Fixture {
    pub db: DatabaseConnection,
    pub store: Store,
    pub hasher: CredentialHasher,
}

impl Fixture {
    /// One UG degree with semester-2 courses, an admin, two faculty and two
    /// first-year students. `fac_01` teaches every course, `fac_02` only `A`.
    pub async fn new() -> Self {
        let db = memory_db().await;
        let store = Store::sea_orm(db.clone());
        let hasher = cheap_hasher();
        let fixture = Self { db, store, hasher };

        fixture
            .store
            .degrees
            .create(NewDegree {
                id: DegreeId::new(CSE).expect("valid degree id"),
                code: "CSE".to_string(),
                degree_type: DegreeType::Undergraduate,
                name: "B.E. Computer Science and Engineering".to_string(),
            })
            .await
            .expect("degree should be created");

        fixture.add_user("admin_01", Role::Admin, None).await;
        fixture.add_user("fac_01", Role::Faculty, None).await;
        fixture.add_user("fac_02", Role::Faculty, None).await;
        fixture.add_user("CSE001", Role::Student, Some(1)).await;
        fixture.add_user("CSE002", Role::Student, Some(1)).await;

        for (code, name, credits, capacity) in COURSES {
            fixture.add_course(code, name, *credits, *capacity, 2).await;
            fixture
                .store
                .allocations
                .allocate(&uid("fac_01"), &course(code))
                .await
                .expect("allocation should succeed");
        }
        fixture
            .store
            .allocations
            .allocate(&uid("fac_02"), &course("A"))
            .await
            .expect("allocation should succeed");

        fixture
    }

    pub async fn add_user(&self, id: &str, role: Role, year: Option<u8>) {
        let standing = year.map(|y| {
            AcademicStanding::new(DegreeType::Undergraduate, y).expect("valid standing")
        });
        let degree_id = (role == Role::Student).then(|| DegreeId::new(CSE).expect("valid id"));

        self.store
            .users
            .create(NewUser {
                id: uid(id),
                role,
                name: format!("User {id}"),
                email: format!("{}@college.edu", id.to_lowercase()),
                password_hash: self.hasher.hash(PASSWORD).expect("hash should succeed"),
                department: "CSE".to_string(),
                standing,
                designation: None,
                photo_url: None,
                degree_id,
            })
            .await
            .expect("user should be created");
    }

    pub async fn add_course(&self, code: &str, name: &str, credits: u32, capacity: u32, term: i64) {
        self.store
            .courses
            .create(NewCourse {
                code: code.to_string(),
                degree_id: DegreeId::new(CSE).expect("valid degree id"),
                degree_code: "CSE".to_string(),
                name: name.to_string(),
                credits,
                capacity,
                sem: sem(term),
            })
            .await
            .expect("course should be created");
    }

    pub async fn add_enrollment(&self, student: &str, code: &str, faculty: &str, record: GradeRecord) {
        self.store
            .enrollments
            .create(NewEnrollment {
                student_id: uid(student),
                course_id: course(code),
                faculty_id: uid(faculty),
                sem: sem(1),
                record,
            })
            .await
            .expect("enrollment should be created");
    }
}
