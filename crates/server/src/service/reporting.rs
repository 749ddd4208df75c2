//! Read-only views over the store. Related rows are loaded in batches and
//! joined in memory.

use std::collections::HashMap;

use registrar_api_types::{
    AdminStats, BacklogEntry, CourseSummary, DegreeHistory, DegreeSummary, EnrollableCourse,
    EnrolledCourse, FacultySummary, TaughtCourse, UserProfile,
};
use registrar_core::domain::{
    CourseId, DegreeId, DegreeType, EnrollmentStatus, Role, UserId, mean_grade,
    occupancy_percentage,
};
use tracing::debug;

use crate::error::{RegistrarError, Result};
use crate::repository::{CourseRecord, Store, UserRecord};

const UNKNOWN: &str = "Unknown";

#[derive(Clone)]
pub struct ReportingService {
    store: Store,
    default_capacity: u32,
}

impl ReportingService {
    pub fn new(store: Store, default_capacity: u32) -> Self {
        Self {
            store,
            default_capacity,
        }
    }

    async fn user_with_role(&self, user_id: &UserId, role: Role) -> Result<UserRecord> {
        self.store
            .users
            .find_by_id(user_id)
            .await?
            .filter(|user| user.role == role)
            .ok_or_else(|| RegistrarError::not_found(role.as_str(), user_id))
    }

    async fn names_by_id(&self, user_ids: Vec<UserId>) -> Result<HashMap<UserId, String>> {
        let mut user_ids = user_ids;
        user_ids.sort();
        user_ids.dedup();

        Ok(self
            .store
            .users
            .list_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user.name))
            .collect())
    }

    async fn courses_by_id(&self, course_ids: Vec<CourseId>) -> Result<HashMap<CourseId, CourseRecord>> {
        let mut course_ids = course_ids;
        course_ids.sort();
        course_ids.dedup();

        Ok(self
            .store
            .courses
            .list_by_ids(&course_ids)
            .await?
            .into_iter()
            .map(|course| (course.id.clone(), course))
            .collect())
    }

    pub async fn student_profile(&self, student_id: &UserId) -> Result<UserProfile> {
        Ok(self.user_with_role(student_id, Role::Student).await?.into())
    }

    pub async fn faculty_profile(&self, faculty_id: &UserId) -> Result<UserProfile> {
        Ok(self.user_with_role(faculty_id, Role::Faculty).await?.into())
    }

    /// Every enrollment of the student, history included.
    pub async fn enrolled_courses(&self, student_id: &UserId) -> Result<Vec<EnrolledCourse>> {
        self.user_with_role(student_id, Role::Student).await?;

        let enrollments = self.store.enrollments.list_by_student(student_id).await?;
        let courses = self
            .courses_by_id(enrollments.iter().map(|e| e.course_id.clone()).collect())
            .await?;
        let faculty = self
            .names_by_id(enrollments.iter().map(|e| e.faculty_id.clone()).collect())
            .await?;

        Ok(enrollments
            .into_iter()
            .map(|e| {
                let course = courses.get(&e.course_id);
                EnrolledCourse {
                    enrollment_id: e.id,
                    course_id: e.course_id.to_string(),
                    course_name: course.map_or_else(|| UNKNOWN.to_string(), |c| c.name.clone()),
                    credits: course.map_or(0, |c| c.credits),
                    faculty_name: faculty
                        .get(&e.faculty_id)
                        .cloned()
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                    status: e.status().as_str().to_string(),
                    grade: e.grade(),
                    sem: e.sem.value(),
                }
            })
            .collect())
    }

    /// Courses of the student's degree in the student's current semester.
    pub async fn enrollable_courses(&self, student_id: &UserId) -> Result<Vec<EnrollableCourse>> {
        let student = self.user_with_role(student_id, Role::Student).await?;

        let (Some(degree_id), Some(standing)) = (student.degree_id, student.standing) else {
            debug!(student = %student_id, "student has no degree or year, nothing enrollable");
            return Ok(Vec::new());
        };

        let courses = self
            .store
            .courses
            .list_by_degree_and_semester(&degree_id, standing.current_semester())
            .await?;
        let course_ids: Vec<CourseId> = courses.iter().map(|c| c.id.clone()).collect();

        let counts = self
            .store
            .enrollments
            .count_by_courses_and_status(&course_ids, EnrollmentStatus::Enrolled)
            .await?;
        let allocations = self.store.allocations.list_by_courses(&course_ids).await?;
        let faculty_names = self
            .names_by_id(allocations.iter().map(|a| a.faculty_id.clone()).collect())
            .await?;

        let mut faculty_by_course: HashMap<CourseId, Vec<FacultySummary>> = HashMap::new();
        for allocation in allocations {
            let name = faculty_names
                .get(&allocation.faculty_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN.to_string());
            faculty_by_course
                .entry(allocation.course_id)
                .or_default()
                .push(FacultySummary {
                    id: allocation.faculty_id.into_inner(),
                    name,
                });
        }

        Ok(courses
            .into_iter()
            .map(|course| EnrollableCourse {
                enrolled_count: counts.get(&course.id).copied().unwrap_or(0),
                faculties: faculty_by_course.remove(&course.id).unwrap_or_default(),
                id: course.id.into_inner(),
                name: course.name,
                credits: course.credits,
                max_enroll: course.capacity,
            })
            .collect())
    }

    pub async fn taught_courses(&self, faculty_id: &UserId) -> Result<Vec<TaughtCourse>> {
        self.user_with_role(faculty_id, Role::Faculty).await?;

        let courses = self.store.courses.list_by_faculty(faculty_id).await?;
        let course_ids: Vec<CourseId> = courses.iter().map(|c| c.id.clone()).collect();
        let counts = self
            .store
            .enrollments
            .count_by_courses_and_status(&course_ids, EnrollmentStatus::Enrolled)
            .await?;

        Ok(courses
            .into_iter()
            .map(|course| TaughtCourse {
                enrolled_count: counts.get(&course.id).copied().unwrap_or(0),
                id: course.id.into_inner(),
                name: course.name,
                sem: course.sem.value(),
                max_enroll: course.capacity,
            })
            .collect())
    }

    /// Students holding an `enrolled` row for the course.
    pub async fn course_students(&self, course_id: &CourseId) -> Result<Vec<UserProfile>> {
        if self.store.courses.find_by_id(course_id).await?.is_none() {
            return Err(RegistrarError::not_found("course", course_id));
        }

        let enrollments = self
            .store
            .enrollments
            .list_by_course_and_status(course_id, EnrollmentStatus::Enrolled)
            .await?;
        let mut student_ids: Vec<UserId> = enrollments.into_iter().map(|e| e.student_id).collect();
        student_ids.sort();
        student_ids.dedup();

        let students = self.store.users.list_by_ids(&student_ids).await?;
        Ok(students.into_iter().map(UserProfile::from).collect())
    }

    /// Backlogs recorded against the faculty snapshot, not the current allocation.
    pub async fn faculty_backlogs(&self, faculty_id: &UserId) -> Result<Vec<BacklogEntry>> {
        self.user_with_role(faculty_id, Role::Faculty).await?;

        let backlogs = self
            .store
            .enrollments
            .list_by_faculty_and_status(faculty_id, EnrollmentStatus::Backlog)
            .await?;
        let students = self
            .names_by_id(backlogs.iter().map(|e| e.student_id.clone()).collect())
            .await?;
        let courses = self
            .courses_by_id(backlogs.iter().map(|e| e.course_id.clone()).collect())
            .await?;

        Ok(backlogs
            .into_iter()
            .map(|e| BacklogEntry {
                student_name: students
                    .get(&e.student_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                course_name: courses
                    .get(&e.course_id)
                    .map_or_else(|| UNKNOWN.to_string(), |c| c.name.clone()),
                student_id: e.student_id.into_inner(),
                grade: "F".to_string(),
            })
            .collect())
    }

    pub async fn degrees(&self, degree_type: Option<DegreeType>) -> Result<Vec<DegreeSummary>> {
        let degrees = self.store.degrees.list(degree_type).await?;
        Ok(degrees.into_iter().map(DegreeSummary::from).collect())
    }

    async fn existing_degree(&self, degree_id: &DegreeId) -> Result<()> {
        match self.store.degrees.find_by_id(degree_id).await? {
            Some(_) => Ok(()),
            None => Err(RegistrarError::not_found("degree", degree_id)),
        }
    }

    pub async fn degree_courses(&self, degree_id: &DegreeId) -> Result<Vec<CourseSummary>> {
        self.existing_degree(degree_id).await?;

        let courses = self.store.courses.list_by_degree(degree_id).await?;
        Ok(courses.into_iter().map(CourseSummary::from).collect())
    }

    /// Completion count and mean grade over the degree's completed enrollments.
    pub async fn degree_history(&self, degree_id: &DegreeId) -> Result<DegreeHistory> {
        self.existing_degree(degree_id).await?;

        let courses = self.store.courses.list_by_degree(degree_id).await?;
        let course_ids: Vec<CourseId> = courses.iter().map(|c| c.id.clone()).collect();
        let completions = self
            .store
            .enrollments
            .list_by_courses_and_status(&course_ids, EnrollmentStatus::Completed)
            .await?;

        Ok(DegreeHistory {
            total_completions: completions.len() as u64,
            avg_gpa: mean_grade(completions.iter().filter_map(|e| e.grade())),
            course_breakdown: courses.iter().map(CourseRecord::to_ref).collect(),
        })
    }

    pub async fn all_faculty(&self) -> Result<Vec<UserProfile>> {
        let faculty = self.store.users.list_by_role(Role::Faculty).await?;
        Ok(faculty.into_iter().map(UserProfile::from).collect())
    }

    pub async fn all_courses(&self) -> Result<Vec<CourseSummary>> {
        let courses = self.store.courses.list_all().await?;
        Ok(courses.into_iter().map(CourseSummary::from).collect())
    }

    /// Occupancy assumes the configured default capacity for every course.
    pub async fn stats(&self) -> Result<AdminStats> {
        let total_students = self.store.users.count_by_role(Role::Student).await?;
        let total_faculty = self.store.users.count_by_role(Role::Faculty).await?;
        let total_courses = self.store.courses.count().await?;
        let enrolled = self
            .store
            .enrollments
            .count_by_status(EnrollmentStatus::Enrolled)
            .await?;

        Ok(AdminStats {
            total_students,
            total_faculty,
            total_courses,
            capacity_percentage: occupancy_percentage(
                enrolled,
                total_courses,
                self.default_capacity,
            ),
        })
    }
}
