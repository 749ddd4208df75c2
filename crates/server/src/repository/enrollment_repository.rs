use crate::entity::enrollment;
use crate::error::{RegistrarError, Result};
use anyhow::anyhow;
use async_trait::async_trait;
use registrar_core::domain::{CourseId, EnrollmentStatus, Grade, GradeRecord, Semester, UserId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentRecord {
    pub id: i32,
    pub student_id: UserId,
    pub course_id: CourseId,
    pub faculty_id: UserId,
    pub sem: Semester,
    pub record: GradeRecord,
}

impl EnrollmentRecord {
    pub fn status(&self) -> EnrollmentStatus {
        self.record.status()
    }

    pub fn grade(&self) -> Option<f64> {
        self.record.grade().map(Grade::value)
    }
}

#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub student_id: UserId,
    pub course_id: CourseId,
    pub faculty_id: UserId,
    pub sem: Semester,
    pub record: GradeRecord,
}

impl NewEnrollment {
    pub fn into_active_model(self) -> enrollment::ActiveModel {
        enrollment::ActiveModel {
            student_id: Set(self.student_id.into_inner()),
            course_id: Set(self.course_id.into_inner()),
            faculty_id: Set(self.faculty_id.into_inner()),
            sem: Set(i32::from(self.sem)),
            status: Set(self.record.status().as_str().to_string()),
            grade: Set(self.record.grade().map(Grade::value)),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn create(&self, new_enrollment: NewEnrollment) -> Result<EnrollmentRecord>;
    async fn list_by_student(&self, student_id: &UserId) -> Result<Vec<EnrollmentRecord>>;
    async fn list_by_course_and_status(
        &self,
        course_id: &CourseId,
        status: EnrollmentStatus,
    ) -> Result<Vec<EnrollmentRecord>>;
    /// Matches on the faculty snapshot stored with each enrollment.
    async fn list_by_faculty_and_status(
        &self,
        faculty_id: &UserId,
        status: EnrollmentStatus,
    ) -> Result<Vec<EnrollmentRecord>>;
    async fn list_by_courses_and_status(
        &self,
        course_ids: &[CourseId],
        status: EnrollmentStatus,
    ) -> Result<Vec<EnrollmentRecord>>;
    /// Per-course row counts; courses without rows are absent from the map.
    async fn count_by_courses_and_status(
        &self,
        course_ids: &[CourseId],
        status: EnrollmentStatus,
    ) -> Result<HashMap<CourseId, u64>>;
    async fn count_by_status(&self, status: EnrollmentStatus) -> Result<u64>;
    async fn count(&self) -> Result<u64>;
}

/// Grouped count usable on a connection or inside a transaction.
pub(crate) async fn count_per_course<C>(
    conn: &C,
    course_ids: &[CourseId],
    status: EnrollmentStatus,
) -> Result<HashMap<CourseId, u64>>
where
    C: ConnectionTrait,
{
    if course_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, i64)> = enrollment::Entity::find()
        .select_only()
        .column(enrollment::Column::CourseId)
        .column_as(Expr::col(enrollment::Column::Id).count(), "count")
        .filter(enrollment::Column::CourseId.is_in(course_ids.iter().map(CourseId::as_str)))
        .filter(enrollment::Column::Status.eq(status.as_str()))
        .group_by(enrollment::Column::CourseId)
        .into_tuple()
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|(course_id, count)| -> Result<(CourseId, u64)> {
            let course_id = CourseId::from_str(&course_id)?;
            let count = u64::try_from(count)
                .map_err(|_| anyhow!("negative enrollment count for '{course_id}'"))?;
            Ok((course_id, count))
        })
        .collect()
}

#[derive(Clone)]
pub struct SeaOrmEnrollmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmEnrollmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) fn map_model(model: enrollment::Model) -> Result<EnrollmentRecord> {
        let student_id = UserId::from_str(&model.student_id).map_err(|e| {
            anyhow!(
                "invalid enrollment.student_id '{}' from database: {e}",
                model.student_id
            )
        })?;
        let course_id = CourseId::from_str(&model.course_id).map_err(|e| {
            anyhow!(
                "invalid enrollment.course_id '{}' from database: {e}",
                model.course_id
            )
        })?;
        let faculty_id = UserId::from_str(&model.faculty_id).map_err(|e| {
            anyhow!(
                "invalid enrollment.faculty_id '{}' from database: {e}",
                model.faculty_id
            )
        })?;
        let status = EnrollmentStatus::from_str(&model.status).map_err(|e| {
            anyhow!("invalid enrollment.status for {} from database: {e}", model.id)
        })?;
        let grade = model.grade.map(Grade::new).transpose().map_err(|e| {
            anyhow!("invalid enrollment.grade for {} from database: {e}", model.id)
        })?;
        let record = GradeRecord::validate(status, grade)
            .map_err(|e| anyhow!("inconsistent enrollment {} in database: {e}", model.id))?;

        Ok(EnrollmentRecord {
            id: model.id,
            student_id,
            course_id,
            faculty_id,
            sem: Semester::new(i64::from(model.sem))?,
            record,
        })
    }

    fn map_models(models: Vec<enrollment::Model>) -> Result<Vec<EnrollmentRecord>> {
        models.into_iter().map(Self::map_model).collect()
    }
}

#[async_trait]
impl EnrollmentRepository for SeaOrmEnrollmentRepository {
    async fn create(&self, new_enrollment: NewEnrollment) -> Result<EnrollmentRecord> {
        let model = new_enrollment.into_active_model().insert(&self.db).await?;
        Self::map_model(model)
    }

    async fn list_by_student(&self, student_id: &UserId) -> Result<Vec<EnrollmentRecord>> {
        let models = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(student_id.as_str()))
            .order_by_asc(enrollment::Column::Sem)
            .order_by_asc(enrollment::Column::Id)
            .all(&self.db)
            .await?;

        Self::map_models(models)
    }

    async fn list_by_course_and_status(
        &self,
        course_id: &CourseId,
        status: EnrollmentStatus,
    ) -> Result<Vec<EnrollmentRecord>> {
        let models = enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.eq(course_id.as_str()))
            .filter(enrollment::Column::Status.eq(status.as_str()))
            .order_by_asc(enrollment::Column::StudentId)
            .all(&self.db)
            .await?;

        Self::map_models(models)
    }

    async fn list_by_faculty_and_status(
        &self,
        faculty_id: &UserId,
        status: EnrollmentStatus,
    ) -> Result<Vec<EnrollmentRecord>> {
        let models = enrollment::Entity::find()
            .filter(enrollment::Column::FacultyId.eq(faculty_id.as_str()))
            .filter(enrollment::Column::Status.eq(status.as_str()))
            .order_by_asc(enrollment::Column::StudentId)
            .order_by_asc(enrollment::Column::CourseId)
            .all(&self.db)
            .await?;

        Self::map_models(models)
    }

    async fn list_by_courses_and_status(
        &self,
        course_ids: &[CourseId],
        status: EnrollmentStatus,
    ) -> Result<Vec<EnrollmentRecord>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = enrollment::Entity::find()
            .filter(enrollment::Column::CourseId.is_in(course_ids.iter().map(CourseId::as_str)))
            .filter(enrollment::Column::Status.eq(status.as_str()))
            .order_by_asc(enrollment::Column::Id)
            .all(&self.db)
            .await?;

        Self::map_models(models)
    }

    async fn count_by_courses_and_status(
        &self,
        course_ids: &[CourseId],
        status: EnrollmentStatus,
    ) -> Result<HashMap<CourseId, u64>> {
        count_per_course(&self.db, course_ids, status).await
    }

    async fn count_by_status(&self, status: EnrollmentStatus) -> Result<u64> {
        enrollment::Entity::find()
            .filter(enrollment::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await
            .map_err(RegistrarError::from)
    }

    async fn count(&self) -> Result<u64> {
        enrollment::Entity::find()
            .count(&self.db)
            .await
            .map_err(RegistrarError::from)
    }
}
