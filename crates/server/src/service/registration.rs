use std::collections::{HashMap, HashSet};

use registrar_core::domain::{
    CourseId, CreditPolicy, EnrollmentStatus, GradeRecord, Role, Semester, UserId,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::{info, warn};

use crate::entity::{course, enrollment, faculty_course, user};
use crate::error::{RegistrarError, Result};
use crate::repository::enrollment_repository::count_per_course;
use crate::repository::{CourseRecord, NewEnrollment, SeaOrmCourseRepository, SeaOrmUserRepository};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseChoice {
    pub course_id: CourseId,
    pub faculty_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentReceipt {
    pub student_id: UserId,
    pub sem: Semester,
    pub total_credits: u32,
    pub enrollment_ids: Vec<i32>,
}

/// Applies the credit-load rule and records a student's selections.
#[derive(Clone)]
pub struct RegistrationService {
    db: DatabaseConnection,
    policy: CreditPolicy,
    enforce_capacity: bool,
}

impl RegistrationService {
    pub fn new(db: DatabaseConnection, policy: CreditPolicy, enforce_capacity: bool) -> Self {
        Self {
            db,
            policy,
            enforce_capacity,
        }
    }

    pub fn policy(&self) -> CreditPolicy {
        self.policy
    }

    /// Every check and insert runs in one transaction; a rejected submission
    /// leaves no rows behind. `sem` defaults to the student's current semester.
    pub async fn enroll(
        &self,
        student_id: &UserId,
        choices: &[CourseChoice],
        sem: Option<Semester>,
    ) -> Result<EnrollmentReceipt> {
        let txn = self.db.begin().await?;

        let student = user::Entity::find_by_id(student_id.as_str())
            .one(&txn)
            .await?
            .map(SeaOrmUserRepository::map_model)
            .transpose()?
            .filter(|record| record.role == Role::Student)
            .ok_or_else(|| RegistrarError::not_found("student", student_id))?;

        if choices.is_empty() {
            return Err(RegistrarError::Validation("no courses selected".to_string()));
        }

        let mut seen = HashSet::new();
        for choice in choices {
            if !seen.insert(&choice.course_id) {
                return Err(RegistrarError::Validation(format!(
                    "course {} selected more than once",
                    choice.course_id
                )));
            }
        }

        let course_ids: Vec<CourseId> = choices.iter().map(|c| c.course_id.clone()).collect();
        let courses: HashMap<CourseId, CourseRecord> = course::Entity::find()
            .filter(course::Column::Id.is_in(course_ids.iter().map(CourseId::as_str)))
            .all(&txn)
            .await?
            .into_iter()
            .map(|model| SeaOrmCourseRepository::map_model(model).map(|c| (c.id.clone(), c)))
            .collect::<Result<_>>()?;

        if let Some(missing) = course_ids.iter().find(|id| !courses.contains_key(*id)) {
            return Err(RegistrarError::not_found("course", missing));
        }

        let allocated: HashSet<(String, String)> = faculty_course::Entity::find()
            .filter(faculty_course::Column::CourseId.is_in(course_ids.iter().map(CourseId::as_str)))
            .all(&txn)
            .await?
            .into_iter()
            .map(|model| (model.faculty_id, model.course_id))
            .collect();

        for choice in choices {
            let pair = (choice.faculty_id.to_string(), choice.course_id.to_string());
            if !allocated.contains(&pair) {
                return Err(RegistrarError::Validation(format!(
                    "faculty {} is not allocated to course {}",
                    choice.faculty_id, choice.course_id
                )));
            }
        }

        let total_credits = self
            .policy
            .evaluate(courses.values().map(|course| course.credits).sum())?;

        let already_enrolled = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id.as_str()))
            .filter(enrollment::Column::CourseId.is_in(course_ids.iter().map(CourseId::as_str)))
            .filter(enrollment::Column::Status.eq(EnrollmentStatus::Enrolled.as_str()))
            .one(&txn)
            .await?;
        if let Some(existing) = already_enrolled {
            return Err(RegistrarError::Validation(format!(
                "{student_id} is already enrolled in {}",
                existing.course_id
            )));
        }

        if self.enforce_capacity {
            let counts = count_per_course(&txn, &course_ids, EnrollmentStatus::Enrolled).await?;
            for course_id in &course_ids {
                let course = &courses[course_id];
                let taken = counts.get(course_id).copied().unwrap_or(0);
                if taken >= u64::from(course.capacity) {
                    warn!(course = %course_id, taken, capacity = course.capacity, "course is full");
                    return Err(RegistrarError::Validation(format!(
                        "course {course_id} is full ({taken}/{})",
                        course.capacity
                    )));
                }
            }
        }

        let Some(sem) = sem.or_else(|| student.standing.map(|s| s.current_semester())) else {
            return Err(RegistrarError::Validation(format!(
                "{student_id} has no academic year on record, a semester is required"
            )));
        };

        let mut enrollment_ids = Vec::with_capacity(choices.len());
        for choice in choices {
            let new_enrollment = NewEnrollment {
                student_id: student_id.clone(),
                course_id: choice.course_id.clone(),
                faculty_id: choice.faculty_id.clone(),
                sem,
                record: GradeRecord::enrolled(),
            };
            let model = new_enrollment.into_active_model().insert(&txn).await?;
            enrollment_ids.push(model.id);
        }

        txn.commit().await?;

        info!(
            student = %student_id,
            sem = sem.value(),
            total_credits,
            courses = enrollment_ids.len(),
            "enrollment committed"
        );

        Ok(EnrollmentReceipt {
            student_id: student_id.clone(),
            sem,
            total_credits,
            enrollment_ids,
        })
    }
}
