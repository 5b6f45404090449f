//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::domain::User;
use blog_core::error::RepoError;
use blog_core::ports::{AuthError, PasswordService, PostRepository, TokenService, UserRepository};
#[cfg(test)]
use blog_infra::JwtConfig;
use blog_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, JwtTokenService,
};

#[cfg(feature = "postgres")]
use blog_infra::{PostgresPostRepository, PostgresUserRepository, database};

use crate::config::{AdminBootstrap, AppConfig};

type Repositories = (Arc<dyn PostRepository>, Arc<dyn UserRepository>);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub session_cookie_secure: bool,
}

/// Failures that abort startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("admin bootstrap failed: {0}")]
    Repo(#[from] RepoError),

    #[error("admin bootstrap failed: {0}")]
    Auth(#[from] AuthError),

    #[cfg(feature = "postgres")]
    #[error("database unavailable: {0}")]
    Database(#[from] database::DbErr),
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// A configured database that cannot be reached is fatal; only a missing
    /// `DATABASE_URL` selects the in-memory store.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let (posts, users) = Self::repositories(config).await?;

        tracing::info!("Application state initialized");

        Ok(Self {
            posts,
            users,
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            session_cookie_secure: config.session_cookie_secure,
        })
    }

    /// State backed entirely by in-memory repositories.
    #[cfg(test)]
    pub fn in_memory(jwt: JwtConfig) -> Self {
        let (posts, users) = Self::memory_repositories();
        Self {
            posts,
            users,
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
            session_cookie_secure: false,
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> Result<Repositories, StartupError> {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Ok(Self::memory_repositories());
        };

        let conn = database::connect(db_config).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to connect to database");
        })?;

        Ok((
            Arc::new(PostgresPostRepository::new(conn.clone())),
            Arc::new(PostgresUserRepository::new(conn)),
        ))
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> Result<Repositories, StartupError> {
        tracing::info!("Running without postgres feature - using in-memory repositories");
        Ok(Self::memory_repositories())
    }

    fn memory_repositories() -> Repositories {
        (
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }

    /// Make sure the configured admin account exists and carries the admin flag.
    ///
    /// An existing account keeps its password.
    pub async fn ensure_admin(&self, admin: &AdminBootstrap) -> Result<User, StartupError> {
        match self.users.find_by_email(&admin.email).await? {
            Some(user) if user.is_admin => {
                tracing::debug!(user_id = %user.id, "Admin account present");
                Ok(user)
            }
            Some(mut user) => {
                user.is_admin = true;
                user.updated_at = chrono::Utc::now();
                let user = self.users.update(user).await?;
                tracing::info!(user_id = %user.id, "Promoted existing account to admin");
                Ok(user)
            }
            None => {
                let hash = self.passwords.hash(&admin.password)?;
                let user = self
                    .users
                    .create(User::new(admin.email.clone(), hash, true))
                    .await?;
                tracing::info!(user_id = %user.id, "Created admin account");
                Ok(user)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bootstrap() -> AdminBootstrap {
        AdminBootstrap {
            email: "admin@example.com".to_string(),
            password: "s3cret-pass".to_string(),
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            #[cfg(feature = "postgres")]
            database: None,
            jwt: JwtConfig::default(),
            session_cookie_secure: false,
            admin: None,
        }
    }

    #[tokio::test]
    async fn test_without_database_url_uses_memory_store() {
        let state = AppState::new(&config()).await.unwrap();
        assert!(state.posts.list_newest_first().await.unwrap().is_empty());
    }

    #[cfg(feature = "postgres")]
    #[tokio::test]
    async fn test_unreachable_database_aborts_startup() {
        let mut config = config();
        config.database = Some(blog_infra::DatabaseConfig {
            url: "not-a-database-url".to_string(),
            max_connections: 1,
            min_connections: 0,
        });

        let result = AppState::new(&config).await;

        assert!(matches!(result, Err(StartupError::Database(_))));
    }

    #[tokio::test]
    async fn test_ensure_admin_creates_account_once() {
        let state = AppState::in_memory(JwtConfig::default());

        let first = state.ensure_admin(&bootstrap()).await.unwrap();
        let second = state.ensure_admin(&bootstrap()).await.unwrap();

        assert!(first.is_admin);
        assert_eq!(first.id, second.id);
        assert!(state.passwords.verify("s3cret-pass", &first.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_ensure_admin_promotes_existing_user() {
        let state = AppState::in_memory(JwtConfig::default());
        let hash = state.passwords.hash("original").unwrap();
        let existing = state
            .users
            .create(User::new("admin@example.com".into(), hash, false))
            .await
            .unwrap();

        let admin = state.ensure_admin(&bootstrap()).await.unwrap();

        assert_eq!(admin.id, existing.id);
        assert!(admin.is_admin);
        assert!(state.passwords.verify("original", &admin.password_hash).unwrap());
    }
}
