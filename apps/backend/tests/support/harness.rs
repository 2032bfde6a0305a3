use std::sync::Arc;

use async_trait::async_trait;
use identity::adapters::users_sea::UserRepoSea;
use identity::auth::PasswordHasher;
use identity::infra::state::build_state;
use identity::mail::RecordingMailer;
use identity::repos::users::{User, UserRepo};
use identity::services::identity::{IdentitySettings, Registration};
use identity::state::app_state::AppState;
use identity::store::{forgot_password_key, EphemeralStore, MemoryStore, StoreError};

pub const FRONTEND_URL: &str = "https://app.example.test";
pub const APP_NAME: &str = "Acme";

/// App state over a fresh in-memory SQLite database, with the store and
/// mailer kept reachable so tests can read what the flows wrote and sent.
pub struct TestHarness {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
}

pub async fn test_harness() -> TestHarness {
    harness_with_mailer(Arc::new(RecordingMailer::new())).await
}

pub async fn harness_with_mailer(mailer: Arc<RecordingMailer>) -> TestHarness {
    let store = Arc::new(MemoryStore::new());
    let state = state_with(store.clone(), mailer.clone()).await;

    TestHarness {
        state,
        store,
        mailer,
    }
}

async fn state_with(store: Arc<dyn EphemeralStore>, mailer: Arc<RecordingMailer>) -> AppState {
    build_state()
        .with_store(store)
        .with_mailer(mailer)
        .with_hasher(PasswordHasher::fast_for_tests())
        .with_identity_settings(IdentitySettings {
            app_name: APP_NAME.to_string(),
            frontend_url: FRONTEND_URL.to_string(),
        })
        .build()
        .await
        .expect("build test state")
}

/// Store whose every operation fails, as an unreachable redis would.
pub struct FailingStore;

#[async_trait]
impl EphemeralStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<String, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
}

/// State wired to [`FailingStore`]. Registration and email confirmation
/// never touch the store, so accounts can still be set up through it.
pub struct FailingStoreHarness {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

pub async fn failing_store_harness() -> FailingStoreHarness {
    let mailer = Arc::new(RecordingMailer::new());
    let state = state_with(Arc::new(FailingStore), mailer.clone()).await;
    FailingStoreHarness { state, mailer }
}

impl FailingStoreHarness {
    pub async fn register_confirmed(&self, email: &str, password: &str) -> User {
        register_confirmed(&self.state, &self.mailer, email, password).await
    }
}

fn confirmation_token(mailer: &RecordingMailer, email: &str) -> String {
    let mail = mailer.last_to(email).expect("confirmation mail sent");
    let marker = "verify-account?token=";
    let start = mail.html.find(marker).expect("confirmation link in mail") + marker.len();
    mail.html[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

async fn register_confirmed(
    state: &AppState,
    mailer: &RecordingMailer,
    email: &str,
    password: &str,
) -> User {
    state
        .identity
        .register(registration(email, password))
        .await
        .expect("register");
    let token = confirmation_token(mailer, email);
    state
        .identity
        .verify_email(&token)
        .await
        .expect("verify email");
    UserRepoSea::new(state.db.clone())
        .find_by_email(email)
        .await
        .expect("lookup user")
        .expect("user exists")
}

pub fn registration(email: &str, password: &str) -> Registration {
    Registration {
        email: email.to_string(),
        password: password.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    }
}

impl TestHarness {
    pub fn repo(&self) -> UserRepoSea {
        UserRepoSea::new(self.state.db.clone())
    }

    pub async fn user(&self, email: &str) -> User {
        self.repo()
            .find_by_email(email)
            .await
            .expect("lookup user")
            .expect("user exists")
    }

    /// Verification token from the most recent confirmation mail to `email`.
    pub fn confirmation_token(&self, email: &str) -> String {
        confirmation_token(&self.mailer, email)
    }

    /// Register, then confirm through the mailed token.
    pub async fn register_confirmed(&self, email: &str, password: &str) -> User {
        register_confirmed(&self.state, &self.mailer, email, password).await
    }

    /// Reset code currently stored for the account; empty when none.
    pub async fn stored_otp(&self, email: &str) -> String {
        let user = self.user(email).await;
        self.store
            .get(&forgot_password_key(user.id))
            .await
            .expect("store read")
    }
}
