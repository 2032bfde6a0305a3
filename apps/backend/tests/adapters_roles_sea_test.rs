mod common;

use backend_test_support::unique_helpers::{unique_email, unique_str};
use identity::adapters::users_sea::UserRepoSea;
use identity::config::db::SQLITE_MEMORY_URL;
use identity::entities::{roles, user_roles, Roles, UserRoles, Users};
use identity::infra::db::bootstrap_db;
use identity::repos::users::{NewUser, UserRepo};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait, Set};
use time::OffsetDateTime;
use uuid::Uuid;

async fn db() -> DatabaseConnection {
    bootstrap_db(SQLITE_MEMORY_URL)
        .await
        .expect("bootstrap in-memory database")
}

async fn insert_role(
    db: &DatabaseConnection,
    name: &str,
    code: &str,
) -> Result<roles::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    roles::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        code: Set(code.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
}

async fn grant(
    db: &DatabaseConnection,
    user_id: Uuid,
    role_id: Uuid,
) -> Result<user_roles::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    user_roles::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        role_id: Set(role_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
}

#[tokio::test]
async fn granted_roles_are_reachable_from_the_user() {
    let db = db().await;
    let repo = UserRepoSea::new(db.clone());
    let user = repo
        .create(NewUser::new(unique_email("roles"), "$2b$04$placeholder"))
        .await
        .unwrap();
    let admin = insert_role(&db, "Administrator", &unique_str("admin")).await.unwrap();

    grant(&db, user.id, admin.id).await.unwrap();

    let model = Users::find_by_id(user.id).one(&db).await.unwrap().unwrap();
    let roles = model.find_related(Roles).all(&db).await.unwrap();
    assert_eq!(roles, vec![admin.clone()]);

    let holders = admin.find_related(Users).all(&db).await.unwrap();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].id, user.id);

    // Same pair twice
    assert!(grant(&db, user.id, admin.id).await.is_err());
}

#[tokio::test]
async fn role_codes_are_unique() {
    let db = db().await;
    let code = unique_str("editor");

    insert_role(&db, "Editor", &code).await.unwrap();
    assert!(insert_role(&db, "Another editor", &code).await.is_err());
}

#[tokio::test]
async fn deleting_a_user_removes_their_grants_but_not_the_role() {
    let db = db().await;
    let repo = UserRepoSea::new(db.clone());
    let user = repo
        .create(NewUser::new(unique_email("roles-delete"), "$2b$04$placeholder"))
        .await
        .unwrap();
    let role = insert_role(&db, "Member", &unique_str("member")).await.unwrap();
    grant(&db, user.id, role.id).await.unwrap();

    repo.delete(user.id).await.unwrap();

    assert_eq!(UserRoles::find().count(&db).await.unwrap(), 0);
    assert!(Roles::find_by_id(role.id).one(&db).await.unwrap().is_some());
}
