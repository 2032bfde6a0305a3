use std::sync::Arc;

use crate::adapters::users_sea::UserRepoSea;
use crate::auth::{PasswordHasher, TokenIssuer};
use crate::config::db::SQLITE_MEMORY_URL;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::mail::{Mailer, RecordingMailer};
use crate::services::identity::IdentitySettings;
use crate::services::{IdentityService, UserService};
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;
use crate::store::{EphemeralStore, MemoryStore};

/// Builder for creating AppState instances (used in both tests and main).
///
/// Unset parts fall back to in-process stand-ins: an in-memory SQLite
/// database, [`MemoryStore`], [`RecordingMailer`] and random secrets.
pub struct StateBuilder {
    db_url: Option<String>,
    security: Option<SecurityConfig>,
    store: Option<Arc<dyn EphemeralStore>>,
    mailer: Option<Arc<dyn Mailer>>,
    hasher: PasswordHasher,
    identity: IdentitySettings,
    cookie_secure: bool,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            db_url: None,
            security: None,
            store: None,
            mailer: None,
            hasher: PasswordHasher::default(),
            identity: IdentitySettings {
                app_name: "Identity".to_string(),
                frontend_url: "http://localhost:3000".to_string(),
            },
            cookie_secure: false,
        }
    }

    pub fn with_db_url(mut self, url: impl Into<String>) -> Self {
        self.db_url = Some(url.into());
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = Some(security);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn EphemeralStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn with_identity_settings(mut self, settings: IdentitySettings) -> Self {
        self.identity = settings;
        self
    }

    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        // single entrypoint: connect + migrate
        let url = self.db_url.as_deref().unwrap_or(SQLITE_MEMORY_URL);
        let db = bootstrap_db(url).await?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let mailer = self
            .mailer
            .unwrap_or_else(|| Arc::new(RecordingMailer::new()));
        let security = self.security.unwrap_or_else(SecurityConfig::for_tests);

        let repo = Arc::new(UserRepoSea::new(db.clone()));
        let tokens = TokenIssuer::new(security, store.clone());
        let identity = IdentityService::new(
            repo.clone(),
            store,
            tokens,
            self.hasher,
            mailer,
            self.identity,
        );
        let users = UserService::new(repo);

        Ok(AppState::new(db, identity, users, self.cookie_secure))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
