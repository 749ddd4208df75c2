use crate::entity::{course, faculty_course};
use crate::error::{RegistrarError, Result};
use anyhow::anyhow;
use async_trait::async_trait;
use registrar_api_types::{CourseRef, CourseSummary};
use registrar_core::domain::{CourseId, DegreeId, DomainError, Semester, UserId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub id: CourseId,
    pub degree_id: DegreeId,
    pub code: String,
    pub name: String,
    pub credits: u32,
    pub capacity: u32,
    pub year: u8,
    pub sem: Semester,
}

impl CourseRecord {
    pub fn to_ref(&self) -> CourseRef {
        CourseRef {
            id: self.id.to_string(),
            name: self.name.clone(),
        }
    }
}

impl From<CourseRecord> for CourseSummary {
    fn from(record: CourseRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            degree_id: record.degree_id.into_inner(),
            code: record.code,
            name: record.name,
            credits: record.credits,
            max_enroll: record.capacity,
            year: record.year,
            sem: record.sem.value(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub code: String,
    pub degree_id: DegreeId,
    pub degree_code: String,
    pub name: String,
    pub credits: u32,
    pub capacity: u32,
    pub sem: Semester,
}

impl NewCourse {
    pub fn course_id(&self) -> Result<CourseId> {
        Ok(CourseId::scoped(&self.code, &self.degree_code)?)
    }

    pub fn into_active_model(self) -> Result<course::ActiveModel> {
        if self.credits == 0 {
            return Err(DomainError::InvalidCredits(0).into());
        }

        let id = self.course_id()?;
        let sem = self.sem.value();

        Ok(course::ActiveModel {
            id: Set(id.into_inner()),
            degree_id: Set(self.degree_id.into_inner()),
            code: Set(self.code),
            name: Set(self.name),
            credits: Set(to_db_int(self.credits, "credits")?),
            capacity: Set(to_db_int(self.capacity, "capacity")?),
            year: Set(i32::from(sem.div_ceil(2))),
            sem: Set(i32::from(sem)),
        })
    }
}

fn to_db_int(value: u32, field: &str) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| RegistrarError::Validation(format!("course {field} out of range: {value}")))
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, new_course: NewCourse) -> Result<CourseRecord>;
    async fn find_by_id(&self, course_id: &CourseId) -> Result<Option<CourseRecord>>;
    async fn list_all(&self) -> Result<Vec<CourseRecord>>;
    async fn list_by_ids(&self, course_ids: &[CourseId]) -> Result<Vec<CourseRecord>>;
    async fn list_by_degree(&self, degree_id: &DegreeId) -> Result<Vec<CourseRecord>>;
    async fn list_by_degree_and_semester(
        &self,
        degree_id: &DegreeId,
        sem: Semester,
    ) -> Result<Vec<CourseRecord>>;
    /// Courses the faculty member is currently allocated to.
    async fn list_by_faculty(&self, faculty_id: &UserId) -> Result<Vec<CourseRecord>>;
    async fn count(&self) -> Result<u64>;
}

#[derive(Clone)]
pub struct SeaOrmCourseRepository {
    db: DatabaseConnection,
}

impl SeaOrmCourseRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) fn map_model(model: course::Model) -> Result<CourseRecord> {
        let id = CourseId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid course.id '{}' from database: {e}", model.id))?;
        let degree_id = DegreeId::from_str(&model.degree_id).map_err(|e| {
            anyhow!(
                "invalid course.degree_id '{}' from database: {e}",
                model.degree_id
            )
        })?;
        let credits = u32::try_from(model.credits)
            .map_err(|_| anyhow!("invalid course.credits for '{}': {}", model.id, model.credits))?;
        let capacity = u32::try_from(model.capacity).map_err(|_| {
            anyhow!(
                "invalid course.capacity for '{}': {}",
                model.id,
                model.capacity
            )
        })?;
        let year = u8::try_from(model.year)
            .map_err(|_| anyhow!("invalid course.year for '{}': {}", model.id, model.year))?;

        Ok(CourseRecord {
            id,
            degree_id,
            code: model.code,
            name: model.name,
            credits,
            capacity,
            year,
            sem: Semester::new(i64::from(model.sem))?,
        })
    }
}

#[async_trait]
impl CourseRepository for SeaOrmCourseRepository {
    async fn create(&self, new_course: NewCourse) -> Result<CourseRecord> {
        let model = new_course.into_active_model()?.insert(&self.db).await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, course_id: &CourseId) -> Result<Option<CourseRecord>> {
        let model = course::Entity::find_by_id(course_id.as_str())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn list_all(&self) -> Result<Vec<CourseRecord>> {
        let models = course::Entity::find()
            .order_by_asc(course::Column::DegreeId)
            .order_by_asc(course::Column::Sem)
            .order_by_asc(course::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list_by_ids(&self, course_ids: &[CourseId]) -> Result<Vec<CourseRecord>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = course::Entity::find()
            .filter(course::Column::Id.is_in(course_ids.iter().map(CourseId::as_str)))
            .order_by_asc(course::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list_by_degree(&self, degree_id: &DegreeId) -> Result<Vec<CourseRecord>> {
        let models = course::Entity::find()
            .filter(course::Column::DegreeId.eq(degree_id.as_str()))
            .order_by_asc(course::Column::Sem)
            .order_by_asc(course::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list_by_degree_and_semester(
        &self,
        degree_id: &DegreeId,
        sem: Semester,
    ) -> Result<Vec<CourseRecord>> {
        let models = course::Entity::find()
            .filter(course::Column::DegreeId.eq(degree_id.as_str()))
            .filter(course::Column::Sem.eq(i32::from(sem)))
            .order_by_asc(course::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list_by_faculty(&self, faculty_id: &UserId) -> Result<Vec<CourseRecord>> {
        let models = course::Entity::find()
            .join(JoinType::InnerJoin, course::Relation::FacultyCourse.def())
            .filter(faculty_course::Column::FacultyId.eq(faculty_id.as_str()))
            .order_by_asc(course::Column::Sem)
            .order_by_asc(course::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn count(&self) -> Result<u64> {
        course::Entity::find()
            .count(&self.db)
            .await
            .map_err(RegistrarError::from)
    }
}
