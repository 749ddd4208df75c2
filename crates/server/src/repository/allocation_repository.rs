use crate::entity::{course, faculty_course, user};
use crate::error::{RegistrarError, Result};
use anyhow::anyhow;
use async_trait::async_trait;
use registrar_core::domain::{CourseId, Role, UserId};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TryInsertResult, sea_query::OnConflict,
};
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub faculty_id: UserId,
    pub course_id: CourseId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationOutcome {
    Created,
    AlreadyExists,
}

#[async_trait]
pub trait AllocationRepository: Send + Sync {
    /// Idempotent: allocating an existing pair changes nothing.
    async fn allocate(&self, faculty_id: &UserId, course_id: &CourseId)
    -> Result<AllocationOutcome>;
    async fn remove(&self, faculty_id: &UserId, course_id: &CourseId) -> Result<()>;
    async fn exists(&self, faculty_id: &UserId, course_id: &CourseId) -> Result<bool>;
    async fn list_by_courses(&self, course_ids: &[CourseId]) -> Result<Vec<Allocation>>;
    async fn count(&self) -> Result<u64>;
}

#[derive(Clone)]
pub struct SeaOrmAllocationRepository {
    db: DatabaseConnection,
}

impl SeaOrmAllocationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) fn map_model(model: faculty_course::Model) -> Result<Allocation> {
        let faculty_id = UserId::from_str(&model.faculty_id).map_err(|e| {
            anyhow!(
                "invalid faculty_course.faculty_id '{}' from database: {e}",
                model.faculty_id
            )
        })?;
        let course_id = CourseId::from_str(&model.course_id).map_err(|e| {
            anyhow!(
                "invalid faculty_course.course_id '{}' from database: {e}",
                model.course_id
            )
        })?;

        Ok(Allocation {
            faculty_id,
            course_id,
        })
    }

    fn pair_filter(
        faculty_id: &UserId,
        course_id: &CourseId,
    ) -> sea_orm::Select<faculty_course::Entity> {
        faculty_course::Entity::find()
            .filter(faculty_course::Column::FacultyId.eq(faculty_id.as_str()))
            .filter(faculty_course::Column::CourseId.eq(course_id.as_str()))
    }
}

#[async_trait]
impl AllocationRepository for SeaOrmAllocationRepository {
    async fn allocate(
        &self,
        faculty_id: &UserId,
        course_id: &CourseId,
    ) -> Result<AllocationOutcome> {
        let faculty = user::Entity::find_by_id(faculty_id.as_str())
            .one(&self.db)
            .await?;
        if !faculty.is_some_and(|model| model.role == Role::Faculty.as_str()) {
            return Err(RegistrarError::not_found("faculty", faculty_id));
        }

        if course::Entity::find_by_id(course_id.as_str())
            .one(&self.db)
            .await?
            .is_none()
        {
            return Err(RegistrarError::not_found("course", course_id));
        }

        let active_model = faculty_course::ActiveModel {
            faculty_id: Set(faculty_id.to_string()),
            course_id: Set(course_id.to_string()),
        };

        let result = faculty_course::Entity::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    faculty_course::Column::FacultyId,
                    faculty_course::Column::CourseId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .do_nothing()
            .exec_without_returning(&self.db)
            .await?;

        let outcome = match result {
            TryInsertResult::Inserted(rows) if rows > 0 => AllocationOutcome::Created,
            _ => AllocationOutcome::AlreadyExists,
        };

        info!(faculty = %faculty_id, course = %course_id, ?outcome, "allocation requested");
        Ok(outcome)
    }

    async fn remove(&self, faculty_id: &UserId, course_id: &CourseId) -> Result<()> {
        let result = faculty_course::Entity::delete_many()
            .filter(faculty_course::Column::FacultyId.eq(faculty_id.as_str()))
            .filter(faculty_course::Column::CourseId.eq(course_id.as_str()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(RegistrarError::not_found(
                "allocation",
                format!("{faculty_id}/{course_id}"),
            ));
        }

        info!(faculty = %faculty_id, course = %course_id, "allocation removed");
        Ok(())
    }

    async fn exists(&self, faculty_id: &UserId, course_id: &CourseId) -> Result<bool> {
        let found = Self::pair_filter(faculty_id, course_id)
            .one(&self.db)
            .await?;

        Ok(found.is_some())
    }

    async fn list_by_courses(&self, course_ids: &[CourseId]) -> Result<Vec<Allocation>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = faculty_course::Entity::find()
            .filter(faculty_course::Column::CourseId.is_in(course_ids.iter().map(CourseId::as_str)))
            .order_by_asc(faculty_course::Column::CourseId)
            .order_by_asc(faculty_course::Column::FacultyId)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn count(&self) -> Result<u64> {
        faculty_course::Entity::find()
            .count(&self.db)
            .await
            .map_err(RegistrarError::from)
    }
}
