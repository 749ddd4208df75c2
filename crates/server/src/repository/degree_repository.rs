use crate::entity::degree;
use crate::error::Result;
use anyhow::anyhow;
use async_trait::async_trait;
use registrar_api_types::DegreeSummary;
use registrar_core::domain::{DegreeId, DegreeType};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeRecord {
    pub id: DegreeId,
    pub code: String,
    pub degree_type: DegreeType,
    pub name: String,
}

impl From<DegreeRecord> for DegreeSummary {
    fn from(record: DegreeRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            code: record.code,
            degree_type: record.degree_type.as_str().to_string(),
            name: record.name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewDegree {
    pub id: DegreeId,
    pub code: String,
    pub degree_type: DegreeType,
    pub name: String,
}

impl NewDegree {
    pub fn into_active_model(self) -> degree::ActiveModel {
        degree::ActiveModel {
            id: Set(self.id.into_inner()),
            code: Set(self.code),
            degree_type: Set(self.degree_type.as_str().to_string()),
            name: Set(self.name),
        }
    }
}

#[async_trait]
pub trait DegreeRepository: Send + Sync {
    async fn create(&self, new_degree: NewDegree) -> Result<DegreeRecord>;
    async fn find_by_id(&self, degree_id: &DegreeId) -> Result<Option<DegreeRecord>>;
    /// All degrees, or only those of `degree_type` when given.
    async fn list(&self, degree_type: Option<DegreeType>) -> Result<Vec<DegreeRecord>>;
}

#[derive(Clone)]
pub struct SeaOrmDegreeRepository {
    db: DatabaseConnection,
}

impl SeaOrmDegreeRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_model(model: degree::Model) -> Result<DegreeRecord> {
        let id = DegreeId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid degree.id '{}' from database: {e}", model.id))?;
        let degree_type = DegreeType::from_str(&model.degree_type).map_err(|e| {
            anyhow!(
                "invalid degree.degree_type for '{}' from database: {e}",
                model.id
            )
        })?;

        Ok(DegreeRecord {
            id,
            code: model.code,
            degree_type,
            name: model.name,
        })
    }
}

#[async_trait]
impl DegreeRepository for SeaOrmDegreeRepository {
    async fn create(&self, new_degree: NewDegree) -> Result<DegreeRecord> {
        let model = new_degree.into_active_model().insert(&self.db).await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, degree_id: &DegreeId) -> Result<Option<DegreeRecord>> {
        let model = degree::Entity::find_by_id(degree_id.as_str())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn list(&self, degree_type: Option<DegreeType>) -> Result<Vec<DegreeRecord>> {
        let mut query = degree::Entity::find().order_by_asc(degree::Column::Id);
        if let Some(degree_type) = degree_type {
            query = query.filter(degree::Column::DegreeType.eq(degree_type.as_str()));
        }

        let models = query.all(&self.db).await?;
        models.into_iter().map(Self::map_model).collect()
    }
}
