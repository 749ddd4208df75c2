use registrar_core::domain::DomainError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{0}")]
    Validation(String),

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("missing or invalid access token")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RegistrarError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) | Self::Domain(_) => ErrorKind::Validation,
            Self::InvalidCredentials | Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Constraint(_) => ErrorKind::Conflict,
            Self::Database(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Primary/unique key collisions and dangling foreign keys are reported as
/// constraint violations; everything else stays a database error.
impl From<DbErr> for RegistrarError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                Self::Constraint(format!("duplicate key: {detail}"))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                Self::Constraint(format!("missing reference: {detail}"))
            }
            _ => Self::Database(err),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Unauthenticated,
    Forbidden,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistrarError>;
