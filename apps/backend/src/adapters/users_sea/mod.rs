//! SeaORM adapter for user repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use crate::entities::users;
use crate::errors::domain::DomainError;
use crate::infra::db_errors::map_db_err;
use crate::repos::users::{NewUser, User, UserFilter, UserRepo};

pub mod dto;

pub use dto::{UserCreate, UserUpdate};

// Adapter functions return DbErr; UserRepoSea maps to DomainError.

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: Uuid,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find_by_id(id).one(conn).await
}

pub async fn find_by_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(conn)
        .await
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: UserCreate,
) -> Result<users::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let user_active = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(dto.email),
        user_name: Set(dto.user_name),
        first_name: Set(dto.first_name),
        last_name: Set(dto.last_name),
        password_hash: Set(dto.password_hash),
        email_confirmed: Set(false),
        avatar: Set(None),
        date_of_birth: Set(None),
        time_zone_id: Set(None),
        two_factor_enabled: Set(false),
        lockout_enabled: Set(false),
        lockout_end: Set(None),
        access_failed_count: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };

    user_active.insert(conn).await
}

pub async fn update_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: UserUpdate,
) -> Result<users::Model, sea_orm::DbErr> {
    let user_active = users::ActiveModel {
        id: Set(dto.id),
        email: Set(dto.email),
        user_name: Set(dto.user_name),
        first_name: Set(dto.first_name),
        last_name: Set(dto.last_name),
        password_hash: Set(dto.password_hash),
        email_confirmed: Set(dto.email_confirmed),
        avatar: Set(dto.avatar),
        date_of_birth: Set(dto.date_of_birth),
        time_zone_id: Set(dto.time_zone_id),
        two_factor_enabled: Set(dto.two_factor_enabled),
        lockout_enabled: Set(dto.lockout_enabled),
        lockout_end: Set(dto.lockout_end),
        access_failed_count: Set(dto.access_failed_count),
        created_at: NotSet,
        updated_at: Set(time::OffsetDateTime::now_utc()),
    };
    user_active.update(conn).await
}

pub async fn delete_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: Uuid,
) -> Result<(), sea_orm::DbErr> {
    users::Entity::delete_by_id(id).exec(conn).await?;
    Ok(())
}

/// Stable ordering for list/page: creation time, then id.
fn ordered(select: Select<users::Entity>) -> Select<users::Entity> {
    select
        .order_by_asc(users::Column::CreatedAt)
        .order_by_asc(users::Column::Id)
}

/// Build a `SELECT` constrained by every field the filter sets.
pub fn filtered(filter: &UserFilter) -> Select<users::Entity> {
    let condition = Condition::all()
        .add_option(filter.email.as_deref().map(|e| users::Column::Email.eq(e)))
        .add_option(
            filter
                .email_confirmed
                .map(|c| users::Column::EmailConfirmed.eq(c)),
        )
        .add_option(
            filter
                .first_name
                .as_deref()
                .map(|n| users::Column::FirstName.eq(n)),
        )
        .add_option(
            filter
                .last_name
                .as_deref()
                .map(|n| users::Column::LastName.eq(n)),
        );
    ordered(users::Entity::find().filter(condition))
}

pub async fn list_users<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<users::Model>, sea_orm::DbErr> {
    ordered(users::Entity::find()).all(conn).await
}

pub async fn page_users<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    skip: u64,
    take: u64,
) -> Result<Vec<users::Model>, sea_orm::DbErr> {
    ordered(users::Entity::find())
        .offset(skip)
        .limit(take)
        .all(conn)
        .await
}

/// SeaORM implementation of UserRepo.
#[derive(Clone)]
pub struct UserRepoSea {
    db: DatabaseConnection,
}

impl UserRepoSea {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for UserRepoSea {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let user = find_by_id(&self.db, id).await.map_err(map_db_err)?;
        Ok(user.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let user = find_by_email(&self.db, email).await.map_err(map_db_err)?;
        Ok(user.map(User::from))
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let model = create_user(&self.db, UserCreate::from(user))
            .await
            .map_err(map_db_err)?;
        Ok(User::from(model))
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let model = update_user(&self.db, UserUpdate::from(user))
            .await
            .map_err(map_db_err)?;
        Ok(User::from(model))
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        delete_user(&self.db, id).await.map_err(map_db_err)
    }

    async fn list(&self) -> Result<Vec<User>, DomainError> {
        let users = list_users(&self.db).await.map_err(map_db_err)?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn page(&self, skip: u64, take: u64) -> Result<Vec<User>, DomainError> {
        let users = page_users(&self.db, skip, take)
            .await
            .map_err(map_db_err)?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn count_where(&self, filter: &UserFilter) -> Result<u64, DomainError> {
        filtered(filter).count(&self.db).await.map_err(map_db_err)
    }

    async fn find_where(&self, filter: &UserFilter) -> Result<Vec<User>, DomainError> {
        let users = filtered(filter).all(&self.db).await.map_err(map_db_err)?;
        Ok(users.into_iter().map(User::from).collect())
    }

    async fn first(&self, filter: &UserFilter) -> Result<Option<User>, DomainError> {
        let user = filtered(filter).one(&self.db).await.map_err(map_db_err)?;
        Ok(user.map(User::from))
    }
}
