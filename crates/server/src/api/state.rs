use sea_orm::DatabaseConnection;

use crate::auth::{AuthService, CredentialHasher, TokenIssuer};
use crate::config::RegistrarConfig;
use crate::error::Result;
use crate::repository::Store;
use crate::service::{RegistrationService, ReportingService};

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub auth: AuthService,
    pub registration: RegistrationService,
    pub reporting: ReportingService,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &RegistrarConfig) -> Result<Self> {
        let hasher = CredentialHasher::from_config(&config.auth)?;
        Self::with_hasher(db, config, hasher)
    }

    /// Like [`AppState::new`] with an explicit hasher, so tests can use a cheap one.
    pub fn with_hasher(
        db: DatabaseConnection,
        config: &RegistrarConfig,
        hasher: CredentialHasher,
    ) -> Result<Self> {
        let store = Store::sea_orm(db.clone());
        let tokens = TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_ttl_minutes);
        let registration = &config.registration;

        Ok(Self {
            auth: AuthService::new(store.users.clone(), hasher, tokens),
            registration: RegistrationService::new(
                db,
                registration.credit_policy(),
                registration.enforce_capacity,
            ),
            reporting: ReportingService::new(store.clone(), registration.default_capacity),
            store,
        })
    }
}
