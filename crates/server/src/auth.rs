//! Password hashing, token issuance and login.

use std::sync::Arc;

use anyhow::anyhow;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use registrar_api_types::LoginResponse;
use registrar_core::domain::{Role, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::{RegistrarError, Result};
use crate::repository::{UserRecord, UserRepository};

/// Argon2id hasher producing PHC strings with an embedded random salt.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Self::with_cost(config.hash_memory_kib, config.hash_iterations)
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("failed to hash password: {e}"))?;

        Ok(hash.to_string())
    }

    /// Malformed stored hashes verify as false.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        PasswordHash::new(stored_hash).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(RegistrarError::Forbidden("admin role required".to_string()))
        }
    }

    /// Admins may act for anyone; everyone else only for themselves.
    pub fn require_self_or_admin(&self, subject: &UserId) -> Result<()> {
        if self.is_admin() || &self.user_id == subject {
            Ok(())
        } else {
            Err(RegistrarError::Forbidden(format!(
                "{} may not act on behalf of {subject}",
                self.user_id
            )))
        }
    }

    pub fn require_any_role(&self, roles: &[Role]) -> Result<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(RegistrarError::Forbidden(format!(
                "role {} is not permitted here",
                self.role
            )))
        }
    }
}

/// Longest token lifetime accepted, thirty days.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 30;

/// HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        let ttl_minutes = ttl_minutes.clamp(-MAX_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn issue(&self, user_id: &UserId, role: Role) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| anyhow!("failed to sign access token: {e}").into())
    }

    pub fn verify(&self, token: &str) -> Result<Principal> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default()).map_err(|e| {
            warn!(error = %e, "rejected access token");
            RegistrarError::Unauthenticated
        })?;

        let user_id =
            UserId::from_str(&data.claims.sub).map_err(|_| RegistrarError::Unauthenticated)?;
        let role = Role::from_str(&data.claims.role).map_err(|_| RegistrarError::Unauthenticated)?;

        Ok(Principal { user_id, role })
    }
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: CredentialHasher, tokens: TokenIssuer) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let Some(credentials) = self.users.find_credentials_by_email(email.trim()).await? else {
            info!("login rejected: unknown email");
            return Err(RegistrarError::InvalidCredentials);
        };

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let stored_hash = credentials.password_hash;
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| anyhow!("password verification task failed: {e}"))?;

        if !verified {
            info!(user = %credentials.user.id, "login rejected: wrong password");
            return Err(RegistrarError::InvalidCredentials);
        }

        let UserRecord { id, role, name, .. } = credentials.user;
        let access_token = self.tokens.issue(&id, role)?;
        info!(user = %id, role = %role, "login succeeded");

        Ok(LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            role: role.as_str().to_string(),
            user_id: id.into_inner(),
            name,
        })
    }

    pub fn authenticate(&self, token: &str) -> Result<Principal> {
        self.tokens.verify(token)
    }
}
