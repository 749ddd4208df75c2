mod common;

use std::collections::{BTreeSet, HashMap};

use common::{cheap_hasher, memory_db};
use registrar_core::domain::{EnrollmentStatus, Role, UserId};
use registrar_server::auth::{AuthService, TokenIssuer};
use registrar_server::repository::Store;
use registrar_server::seed::{Catalog, SeedOptions, SeedReport, Seeder};
use sea_orm::DatabaseConnection;

const COHORT_SIZE: u32 = 4;

fn options(backlog_probability: f64) -> SeedOptions {
    SeedOptions {
        backlog_probability,
        cohort_size: COHORT_SIZE,
        default_capacity: 30,
    }
}

async fn seed(db: &DatabaseConnection, backlog_probability: f64) -> SeedReport {
    let catalog = Catalog::builtin().expect("built-in catalog should load");
    Seeder::new(db.clone(), cheap_hasher(), catalog, options(backlog_probability))
        .expect("options should be valid")
        .run()
        .await
        .expect("seed should succeed")
}

async fn seeded_store(backlog_probability: f64) -> (DatabaseConnection, Store) {
    let db = memory_db().await;
    seed(&db, backlog_probability).await;
    let store = Store::sea_orm(db.clone());
    (db, store)
}

async fn counts(store: &Store) -> [u64; 5] {
    [
        store.users.count().await.expect("count users"),
        store.degrees.list(None).await.expect("list degrees").len() as u64,
        store.courses.count().await.expect("count courses"),
        store.allocations.count().await.expect("count allocations"),
        store.enrollments.count().await.expect("count enrollments"),
    ]
}

#[tokio::test]
async fn test_seeding_twice_yields_identical_counts() {
    let db = memory_db().await;
    let store = Store::sea_orm(db.clone());

    let first = seed(&db, 0.10).await;
    let after_first = counts(&store).await;
    let second = seed(&db, 0.10).await;
    let after_second = counts(&store).await;

    assert!(!first.skipped);
    assert!(second.skipped);
    assert_eq!(after_first, after_second);
    assert_eq!(
        after_first,
        [
            first.users,
            first.degrees,
            first.courses,
            first.allocations,
            first.enrollments
        ]
    );
}

#[tokio::test]
async fn test_report_matches_catalog() {
    let db = memory_db().await;
    let catalog = Catalog::builtin().expect("built-in catalog should load");
    let offerings: usize = catalog.courses.iter().map(|c| c.degrees.len()).sum();

    let report = seed(&db, 0.10).await;

    let staff = 1 + catalog.faculty.len() as u64;
    let students = catalog.cohorts.len() as u64 * u64::from(COHORT_SIZE);
    assert_eq!(report.users, staff + students);
    assert_eq!(report.degrees, catalog.degrees.len() as u64);
    assert_eq!(report.courses, offerings as u64);
    assert!(report.allocations >= report.courses);
    assert!(report.allocations <= report.courses * 2);
}

#[tokio::test]
async fn test_large_cohort_persists_every_reported_row() {
    let db = memory_db().await;
    let catalog = Catalog::builtin().expect("built-in catalog should load");
    let options = SeedOptions {
        cohort_size: 8,
        ..options(0.10)
    };
    let report = Seeder::new(db.clone(), cheap_hasher(), catalog, options)
        .expect("options should be valid")
        .run()
        .await
        .expect("seed should succeed");
    let store = Store::sea_orm(db.clone());

    assert!(report.enrollments > 1_000);
    assert_eq!(
        counts(&store).await,
        [
            report.users,
            report.degrees,
            report.courses,
            report.allocations,
            report.enrollments
        ]
    );
    assert_eq!(
        store
            .enrollments
            .count_by_status(EnrollmentStatus::Enrolled)
            .await
            .expect("count enrolled"),
        0
    );
}

#[tokio::test]
async fn test_history_covers_every_semester_before_the_current_one() {
    let (_db, store) = seeded_store(0.10).await;

    let students = store.users.list_by_role(Role::Student).await.expect("list students");
    assert!(!students.is_empty());

    for student in students {
        let standing = student.standing.expect("seeded students have a year");
        let rows = store
            .enrollments
            .list_by_student(&student.id)
            .await
            .expect("list enrollments");
        let semesters: BTreeSet<u8> = rows.iter().map(|row| row.sem.value()).collect();

        let expected = usize::from(standing.year()) * 2 - 1;
        assert_eq!(semesters.len(), expected, "student {}", student.id);
        assert!(semesters.iter().all(|s| *s < standing.current_semester().value()));
    }
}

#[tokio::test]
async fn test_history_grades_match_status() {
    let (_db, store) = seeded_store(0.10).await;

    let students = store.users.list_by_role(Role::Student).await.expect("list students");
    let mut completed = 0;
    for student in students {
        for row in store
            .enrollments
            .list_by_student(&student.id)
            .await
            .expect("list enrollments")
        {
            match row.status() {
                EnrollmentStatus::Completed => {
                    let grade = row.grade().expect("completed rows carry a grade");
                    assert!((2.5..=4.0).contains(&grade), "grade {grade}");
                    assert_eq!((grade * 100.0).round() / 100.0, grade);
                    completed += 1;
                }
                EnrollmentStatus::Backlog => assert_eq!(row.grade(), Some(0.0)),
                EnrollmentStatus::Enrolled => panic!("history never leaves open enrollments"),
            }
        }
    }
    assert!(completed > 0);
}

#[tokio::test]
async fn test_history_uses_lowest_allocated_faculty() {
    let (_db, store) = seeded_store(0.10).await;

    let courses = store.courses.list_all().await.expect("list courses");
    let ids: Vec<_> = courses.iter().map(|c| c.id.clone()).collect();
    let mut allocated: HashMap<_, Vec<UserId>> = HashMap::new();
    for allocation in store.allocations.list_by_courses(&ids).await.expect("list allocations") {
        allocated
            .entry(allocation.course_id)
            .or_default()
            .push(allocation.faculty_id);
    }

    for course in &courses {
        let faculty = allocated.get(&course.id).expect("every course is allocated");
        assert!((1..=2).contains(&faculty.len()), "course {}", course.id);
    }

    let history = store
        .enrollments
        .list_by_courses_and_status(&ids, EnrollmentStatus::Completed)
        .await
        .expect("list history");
    for row in history {
        let lowest = allocated[&row.course_id].iter().min().expect("allocated");
        assert_eq!(&row.faculty_id, lowest);
    }
}

#[tokio::test]
async fn test_seeding_is_deterministic_across_stores() {
    let (_a, first) = seeded_store(0.10).await;
    let (_b, second) = seeded_store(0.10).await;

    let student = UserId::new("CSE004").expect("valid id");
    let snapshot = |rows: Vec<registrar_server::repository::EnrollmentRecord>| {
        rows.into_iter()
            .map(|row| (row.status(), row.grade(), row.course_id, row.faculty_id, row.sem))
            .collect::<Vec<_>>()
    };

    let a = snapshot(first.enrollments.list_by_student(&student).await.expect("list"));
    let b = snapshot(second.enrollments.list_by_student(&student).await.expect("list"));
    assert!(!a.is_empty());
    assert_eq!(a, b);

    let profile_a = first.users.find_by_id(&student).await.expect("lookup");
    let profile_b = second.users.find_by_id(&student).await.expect("lookup");
    assert_eq!(profile_a.map(|u| u.name), profile_b.map(|u| u.name));
}

#[tokio::test]
async fn test_backlog_probability_extremes() {
    let (_db, all_backlogs) = seeded_store(1.0).await;
    assert_eq!(
        all_backlogs
            .enrollments
            .count_by_status(EnrollmentStatus::Completed)
            .await
            .expect("count"),
        0
    );

    let (_db, no_backlogs) = seeded_store(0.0).await;
    assert_eq!(
        no_backlogs
            .enrollments
            .count_by_status(EnrollmentStatus::Backlog)
            .await
            .expect("count"),
        0
    );
}

#[tokio::test]
async fn test_invalid_backlog_probability_is_rejected() {
    let db = memory_db().await;
    let catalog = Catalog::builtin().expect("built-in catalog should load");

    assert!(Seeder::new(db, cheap_hasher(), catalog, options(1.5)).is_err());
}

#[tokio::test]
async fn test_seeded_accounts_can_log_in() {
    let (_db, store) = seeded_store(0.10).await;
    let auth = AuthService::new(
        store.users.clone(),
        cheap_hasher(),
        TokenIssuer::new("test-secret", 5),
    );

    let admin = auth
        .login("admin@college.edu", "admin123")
        .await
        .expect("admin should log in");
    assert_eq!(admin.role, "admin");

    let student = auth
        .login("cse001@college.edu", "stud123")
        .await
        .expect("student should log in");
    assert_eq!(student.user_id, "CSE001");
    assert!(auth.login("cse001@college.edu", "wrong").await.is_err());
}
