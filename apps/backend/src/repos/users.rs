//! User repository: the typed persistence gateway for the `users` table.
//!
//! Lookups return `Option`; absence is never an error and never a
//! zero-valued record. Failures come back as [`DomainError`].

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::domain::DomainError;

/// User domain model
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub avatar: Option<String>,
    pub date_of_birth: Option<OffsetDateTime>,
    pub time_zone_id: Option<i16>,
    pub two_factor_enabled: bool,
    pub lockout_enabled: bool,
    pub lockout_end: Option<OffsetDateTime>,
    pub access_failed_count: i16,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

// Hand-written so the password hash never lands in a log line.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email_confirmed", &self.email_confirmed)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Fields required to create an account. New accounts start unconfirmed.
#[derive(Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub user_name: Option<String>,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            first_name: String::new(),
            last_name: String::new(),
            user_name: None,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }
}

/// Explicit optional-field filter. `None` means "do not constrain"; a set
/// field matches by equality. An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub email: Option<String>,
    pub email_confirmed: Option<bool>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserFilter {
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn confirmed(mut self, confirmed: bool) -> Self {
        self.email_confirmed = Some(confirmed);
        self
    }

    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    /// Unique-email violations surface as `ConflictKind::UniqueEmail`.
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;
    async fn update(&self, user: &User) -> Result<User, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    async fn list(&self) -> Result<Vec<User>, DomainError>;
    /// Ordered by creation time; `skip` rows are dropped, at most `take` returned.
    async fn page(&self, skip: u64, take: u64) -> Result<Vec<User>, DomainError>;
    async fn count_where(&self, filter: &UserFilter) -> Result<u64, DomainError>;
    async fn find_where(&self, filter: &UserFilter) -> Result<Vec<User>, DomainError>;
    async fn first(&self, filter: &UserFilter) -> Result<Option<User>, DomainError>;
}

// Conversions between SeaORM models and domain models

impl From<crate::entities::users::Model> for User {
    fn from(model: crate::entities::users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            user_name: model.user_name,
            first_name: model.first_name,
            last_name: model.last_name,
            password_hash: model.password_hash,
            email_confirmed: model.email_confirmed,
            avatar: model.avatar,
            date_of_birth: model.date_of_birth,
            time_zone_id: model.time_zone_id,
            two_factor_enabled: model.two_factor_enabled,
            lockout_enabled: model.lockout_enabled,
            lockout_end: model.lockout_end,
            access_failed_count: model.access_failed_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
