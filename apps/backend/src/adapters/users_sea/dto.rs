//! DTOs for users_sea adapter.

use time::OffsetDateTime;
use uuid::Uuid;

use crate::repos::users::{NewUser, User};

/// DTO for inserting a new user row.
#[derive(Clone)]
pub struct UserCreate {
    pub email: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

impl From<NewUser> for UserCreate {
    fn from(new_user: NewUser) -> Self {
        let user_name = new_user
            .user_name
            .unwrap_or_else(|| new_user.email.clone());
        Self {
            email: new_user.email,
            user_name,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            password_hash: new_user.password_hash,
        }
    }
}

/// DTO for overwriting the mutable columns of an existing row.
#[derive(Clone)]
pub struct UserUpdate {
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
}

impl From<&User> for UserUpdate {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            user_name: user.user_name.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            password_hash: user.password_hash.clone(),
            email_confirmed: user.email_confirmed,
            avatar: user.avatar.clone(),
            date_of_birth: user.date_of_birth,
            time_zone_id: user.time_zone_id,
            two_factor_enabled: user.two_factor_enabled,
            lockout_enabled: user.lockout_enabled,
            lockout_end: user.lockout_end,
            access_failed_count: user.access_failed_count,
        }
    }
}
