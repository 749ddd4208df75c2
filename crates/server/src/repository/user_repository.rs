use crate::entity::user;
use crate::error::{RegistrarError, Result};
use anyhow::anyhow;
use async_trait::async_trait;
use registrar_api_types::UserProfile;
use registrar_core::domain::{AcademicStanding, DegreeId, Role, UserId};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub department: String,
    pub standing: Option<AcademicStanding>,
    pub designation: Option<String>,
    pub photo_url: Option<String>,
    pub degree_id: Option<DegreeId>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id.into_inner(),
            role: record.role.as_str().to_string(),
            name: record.name,
            email: record.email,
            department: record.department,
            year: record.standing.map(|s| s.to_string()),
            designation: record.designation,
            photo_url: record.photo_url,
            degree_id: record.degree_id.map(DegreeId::into_inner),
        }
    }
}

/// A user together with the stored password hash. Only the login path sees this.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: UserRecord,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub department: String,
    pub standing: Option<AcademicStanding>,
    pub designation: Option<String>,
    pub photo_url: Option<String>,
    pub degree_id: Option<DegreeId>,
}

impl NewUser {
    pub fn into_active_model(self) -> user::ActiveModel {
        user::ActiveModel {
            id: Set(self.id.into_inner()),
            role: Set(self.role.as_str().to_string()),
            name: Set(self.name),
            email: Set(self.email),
            password_hash: Set(self.password_hash),
            department: Set(self.department),
            year: Set(self.standing.map(|s| s.to_string())),
            designation: Set(self.designation),
            photo_url: Set(self.photo_url),
            degree_id: Set(self.degree_id.map(DegreeId::into_inner)),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new_user: NewUser) -> Result<UserRecord>;
    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<UserRecord>>;
    async fn find_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>>;
    async fn list_by_role(&self, role: Role) -> Result<Vec<UserRecord>>;
    async fn list_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserRecord>>;
    async fn count_by_role(&self, role: Role) -> Result<u64>;
    async fn count(&self) -> Result<u64>;
}

#[derive(Clone)]
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub(crate) fn map_model(model: user::Model) -> Result<UserRecord> {
        let id = UserId::from_str(&model.id)
            .map_err(|e| anyhow!("invalid user.id '{}' from database: {e}", model.id))?;
        let role = Role::from_str(&model.role)
            .map_err(|e| anyhow!("invalid user.role for '{}' from database: {e}", model.id))?;
        let standing = model
            .year
            .as_deref()
            .map(AcademicStanding::from_str)
            .transpose()
            .map_err(|e| anyhow!("invalid user.year for '{}' from database: {e}", model.id))?;
        let degree_id = model
            .degree_id
            .as_deref()
            .map(DegreeId::from_str)
            .transpose()
            .map_err(|e| anyhow!("invalid user.degree_id for '{}' from database: {e}", model.id))?;

        Ok(UserRecord {
            id,
            role,
            name: model.name,
            email: model.email,
            department: model.department,
            standing,
            designation: model.designation,
            photo_url: model.photo_url,
            degree_id,
        })
    }

    fn map_credentials(model: user::Model) -> Result<UserCredentials> {
        let password_hash = model.password_hash.clone();
        Ok(UserCredentials {
            user: Self::map_model(model)?,
            password_hash,
        })
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<UserRecord> {
        let model = new_user.into_active_model().insert(&self.db).await?;
        Self::map_model(model)
    }

    async fn find_by_id(&self, user_id: &UserId) -> Result<Option<UserRecord>> {
        let model = user::Entity::find_by_id(user_id.as_str())
            .one(&self.db)
            .await?;

        model.map(Self::map_model).transpose()
    }

    async fn find_credentials_by_email(&self, email: &str) -> Result<Option<UserCredentials>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        model.map(Self::map_credentials).transpose()
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<UserRecord>> {
        let models = user::Entity::find()
            .filter(user::Column::Role.eq(role.as_str()))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn list_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserRecord>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids.iter().map(UserId::as_str)))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;

        models.into_iter().map(Self::map_model).collect()
    }

    async fn count_by_role(&self, role: Role) -> Result<u64> {
        user::Entity::find()
            .filter(user::Column::Role.eq(role.as_str()))
            .count(&self.db)
            .await
            .map_err(RegistrarError::from)
    }

    async fn count(&self) -> Result<u64> {
        user::Entity::find()
            .count(&self.db)
            .await
            .map_err(RegistrarError::from)
    }
}
