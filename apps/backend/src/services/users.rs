use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

use crate::error::AppError;
use crate::repos::users::{User, UserRepo};

/// Public profile returned by `/api/users/me`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub date_of_birth: Option<OffsetDateTime>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name(),
            email: user.email,
            avatar: user.avatar.filter(|a| !a.is_empty()),
            date_of_birth: user.date_of_birth,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepo>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepo>) -> Self {
        Self { users }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(|e| {
                error!(%user_id, error = %e, "Profile lookup failed");
                AppError::DatabaseError
            })?
            .ok_or(AppError::UserNotFound)?;

        Ok(user.into())
    }
}
