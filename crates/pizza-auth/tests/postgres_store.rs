//! Postgres store tests. They need a reachable server:
//! `DATABASE_URL=postgres://... cargo test -p pizza-auth -- --ignored`

use pizza_auth::{
    AuthError, NewUser, PgAuthStore, RoleRepository, RoleType, UserRepository, UserStatus,
    UserUpdate,
};
use sqlx::PgPool;

fn new_user(email: &str) -> NewUser {
    NewUser {
        role_id: 1,
        first_name: "Ana".to_string(),
        last_name: "Gomez".to_string(),
        email: email.to_string(),
        password_hash: "$2b$04$hash".to_string(),
        phone: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_roles_are_seeded(pool: PgPool) {
    let store = PgAuthStore::new(pool);

    let roles = store.find_all().await.unwrap();
    let names: Vec<RoleType> = roles.iter().map(|r| r.name).collect();
    assert_eq!(names, vec![RoleType::Customer, RoleType::Admin, RoleType::Staff]);

    let admin = store.find_by_name(RoleType::Admin).await.unwrap().unwrap();
    assert_eq!(RoleRepository::find_by_id(&store, admin.id).await.unwrap(), Some(admin));
    assert!(RoleRepository::find_by_id(&store, 99).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_find_user(pool: PgPool) {
    let store = PgAuthStore::new(pool);

    let created = store.create(new_user("ana@test.com")).await.unwrap();
    assert_eq!(created.status, UserStatus::Active);
    assert!(created.deleted_at.is_none());
    assert_eq!(created.role_type(), RoleType::Customer);

    let by_email = store.find_by_email("ana@test.com").await.unwrap().unwrap();
    assert_eq!(by_email, created);
    let by_id = UserRepository::find_by_id(&store, created.id).await.unwrap();
    assert_eq!(by_id, Some(created));
    assert!(store.find_by_email("nobody@test.com").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_email_and_unknown_role(pool: PgPool) {
    let store = PgAuthStore::new(pool);
    store.create(new_user("ana@test.com")).await.unwrap();

    let err = store.create(new_user("ana@test.com")).await.unwrap_err();
    assert_eq!(err, AuthError::EmailTaken);

    let mut orphan = new_user("bob@test.com");
    orphan.role_id = 99;
    let err = store.create(orphan).await.unwrap_err();
    assert!(matches!(err, AuthError::RoleNotFound { .. }));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_update_keeps_absent_fields(pool: PgPool) {
    let store = PgAuthStore::new(pool);
    let user = store.create(new_user("ana@test.com")).await.unwrap();

    let updated = store
        .update(
            user.id,
            UserUpdate {
                phone: Some("+1234567890".to_string()),
                status: Some(UserStatus::Suspended),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name, "Ana");
    assert_eq!(updated.email, "ana@test.com");
    assert_eq!(updated.phone.as_deref(), Some("+1234567890"));
    assert_eq!(updated.status, UserStatus::Suspended);
    assert!(!updated.is_active());

    let err = store.update(9999, UserUpdate::default()).await.unwrap_err();
    assert_eq!(err, AuthError::UserNotFound);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_is_soft(pool: PgPool) {
    let store = PgAuthStore::new(pool);
    let user = store.create(new_user("ana@test.com")).await.unwrap();

    store.delete(user.id).await.unwrap();

    let deleted = UserRepository::find_by_id(&store, user.id).await.unwrap().unwrap();
    assert!(deleted.deleted_at.is_some());
    assert!(!deleted.is_active());

    assert_eq!(store.delete(9999).await.unwrap_err(), AuthError::UserNotFound);
}
