mod common;

use common::{Fixture, course, sem, uid};
use registrar_core::domain::{CreditPolicy, DomainError, EnrollmentStatus};
use registrar_server::error::RegistrarError;
use registrar_server::service::{CourseChoice, RegistrationService};

fn choices(codes: &[&str], faculty: &str) -> Vec<CourseChoice> {
    codes
        .iter()
        .map(|code| CourseChoice {
            course_id: course(code),
            faculty_id: uid(faculty),
        })
        .collect()
}

fn service(fixture: &Fixture) -> RegistrationService {
    RegistrationService::new(fixture.db.clone(), CreditPolicy::default(), true)
}

async fn enrollment_count(fixture: &Fixture) -> u64 {
    fixture
        .store
        .enrollments
        .count()
        .await
        .expect("count should succeed")
}

#[tokio::test]
async fn test_nineteen_credits_are_rejected() {
    let fixture = Fixture::new().await;

    let err = service(&fixture)
        .enroll(&uid("CSE001"), &choices(&["A", "B", "C", "D", "E"], "fac_01"), None)
        .await
        .expect_err("19 credits should be rejected");

    assert!(matches!(
        err,
        RegistrarError::Domain(DomainError::CreditsBelowMinimum {
            total: 19,
            minimum: 20
        })
    ));
    assert_eq!(enrollment_count(&fixture).await, 0);
}

#[tokio::test]
async fn test_twenty_credits_are_accepted() {
    let fixture = Fixture::new().await;

    let receipt = service(&fixture)
        .enroll(
            &uid("CSE001"),
            &choices(&["A", "B", "C", "D", "E", "F"], "fac_01"),
            None,
        )
        .await
        .expect("20 credits should be accepted");

    assert_eq!(receipt.total_credits, 20);
    assert_eq!(receipt.enrollment_ids.len(), 6);
    assert_eq!(receipt.sem, sem(2));

    let rows = fixture
        .store
        .enrollments
        .list_by_student(&uid("CSE001"))
        .await
        .expect("list should succeed");
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|row| row.status() == EnrollmentStatus::Enrolled));
    assert!(rows.iter().all(|row| row.grade().is_none()));
    assert!(rows.iter().all(|row| row.faculty_id == uid("fac_01")));
}

#[tokio::test]
async fn test_explicit_semester_is_recorded() {
    let fixture = Fixture::new().await;

    let receipt = service(&fixture)
        .enroll(
            &uid("CSE001"),
            &choices(&["A", "B", "C", "D", "E", "F"], "fac_01"),
            Some(sem(3)),
        )
        .await
        .expect("enrollment should succeed");

    assert_eq!(receipt.sem, sem(3));
}

#[tokio::test]
async fn test_faculty_must_be_allocated_to_course() {
    let fixture = Fixture::new().await;
    let mut selection = choices(&["A", "C", "D", "E", "F"], "fac_01");
    selection.push(CourseChoice {
        course_id: course("B"),
        faculty_id: uid("fac_02"),
    });

    let err = service(&fixture)
        .enroll(&uid("CSE001"), &selection, None)
        .await
        .expect_err("unallocated faculty should be rejected");

    assert!(matches!(err, RegistrarError::Validation(_)));
    assert_eq!(enrollment_count(&fixture).await, 0);
}

#[tokio::test]
async fn test_duplicate_and_empty_selections_are_rejected() {
    let fixture = Fixture::new().await;
    let registration = service(&fixture);

    let err = registration
        .enroll(&uid("CSE001"), &[], None)
        .await
        .expect_err("empty selection should be rejected");
    assert!(matches!(err, RegistrarError::Validation(_)));

    let err = registration
        .enroll(
            &uid("CSE001"),
            &choices(&["A", "B", "C", "D", "E", "A"], "fac_01"),
            None,
        )
        .await
        .expect_err("duplicate course should be rejected");
    assert!(matches!(err, RegistrarError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_student_and_course_are_not_found() {
    let fixture = Fixture::new().await;
    let registration = service(&fixture);

    let err = registration
        .enroll(&uid("CSE999"), &choices(&["A"], "fac_01"), None)
        .await
        .expect_err("unknown student should fail");
    assert!(matches!(err, RegistrarError::NotFound { entity: "student", .. }));

    let err = registration
        .enroll(&uid("fac_02"), &choices(&["A"], "fac_01"), None)
        .await
        .expect_err("faculty is not a student");
    assert!(matches!(err, RegistrarError::NotFound { entity: "student", .. }));

    let err = registration
        .enroll(&uid("CSE001"), &choices(&["A", "Z"], "fac_01"), None)
        .await
        .expect_err("unknown course should fail");
    assert!(matches!(err, RegistrarError::NotFound { entity: "course", .. }));
}

#[tokio::test]
async fn test_cannot_enroll_twice_in_the_same_course() {
    let fixture = Fixture::new().await;
    let registration = service(&fixture);
    let selection = choices(&["A", "B", "C", "D", "E", "F"], "fac_01");

    registration
        .enroll(&uid("CSE001"), &selection, None)
        .await
        .expect("first enrollment should succeed");
    let err = registration
        .enroll(&uid("CSE001"), &selection, None)
        .await
        .expect_err("second enrollment should be rejected");

    assert!(matches!(err, RegistrarError::Validation(_)));
    assert_eq!(enrollment_count(&fixture).await, 6);
}

#[tokio::test]
async fn test_full_course_rejects_the_whole_submission() {
    let fixture = Fixture::new().await;
    let registration = service(&fixture);
    let selection = choices(&["A", "B", "C", "D", "H"], "fac_01");

    registration
        .enroll(&uid("CSE001"), &selection, None)
        .await
        .expect("first student takes the only seat");
    let err = registration
        .enroll(&uid("CSE002"), &selection, None)
        .await
        .expect_err("course H is full");

    assert!(matches!(err, RegistrarError::Validation(ref msg) if msg.contains("full")));
    let rows = fixture
        .store
        .enrollments
        .list_by_student(&uid("CSE002"))
        .await
        .expect("list should succeed");
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_capacity_is_ignored_when_not_enforced() {
    let fixture = Fixture::new().await;
    let registration = RegistrationService::new(fixture.db.clone(), CreditPolicy::default(), false);
    let selection = choices(&["A", "B", "C", "D", "H"], "fac_01");

    for student in ["CSE001", "CSE002"] {
        registration
            .enroll(&uid(student), &selection, None)
            .await
            .expect("capacity is not enforced");
    }

    assert_eq!(enrollment_count(&fixture).await, 10);
}

#[tokio::test]
async fn test_maximum_credits_when_configured() {
    let fixture = Fixture::new().await;
    let registration =
        RegistrationService::new(fixture.db.clone(), CreditPolicy::new(20, Some(20)), true);

    let err = registration
        .enroll(
            &uid("CSE001"),
            &choices(&["A", "B", "C", "D", "E", "H"], "fac_01"),
            None,
        )
        .await
        .expect_err("23 credits exceed the maximum");

    assert!(matches!(
        err,
        RegistrarError::Domain(DomainError::CreditsAboveMaximum { total: 23, maximum: 20 })
    ));
}
