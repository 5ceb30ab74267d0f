//! Integration tests for routerdesk-db
//!
//! Tests database operations with real SQLite in-memory database

use chrono::Utc;
use routerdesk_db::{
    connect,
    entities::{current_connection, router_connection, user},
    migrate,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// Helper to create a test database
async fn setup_test_db() -> sea_orm::DatabaseConnection {
    let db = connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    migrate(&db).await.expect("Failed to run migrations");

    db
}

async fn insert_user(db: &sea_orm::DatabaseConnection, email: &str) -> user::Model {
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("$argon2id$placeholder".to_string()),
        full_name: Set(None),
        role: Set(user::UserRole::User),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("Failed to insert user")
}

fn office_connection(owner: Uuid, name: &str) -> router_connection::ActiveModel {
    router_connection::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner),
        name: Set(name.to_string()),
        router_ip: Set("10.0.0.1".to_string()),
        api_port: Set(router_connection::DEFAULT_API_PORT),
        api_username: Set("admin".to_string()),
        api_password: Set(String::new()),
        api_ssl: Set(false),
        is_active: Set(false),
        last_connected: Set(None),
        created_at: Set(Utc::now()),
    }
}

#[tokio::test]
async fn test_database_connection() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let backend = db.get_database_backend();
    assert!(matches!(backend, sea_orm::DatabaseBackend::Sqlite));
}

#[tokio::test]
async fn test_migrations_run_successfully() {
    let db = connect("sqlite::memory:").await.expect("Failed to connect");

    let result = migrate(&db).await;
    assert!(result.is_ok());

    // Running them again is a no-op
    assert!(migrate(&db).await.is_ok());
}

#[tokio::test]
async fn test_create_router_connection() {
    let db = setup_test_db().await;
    let owner = insert_user(&db, "ops@example.com").await;

    let inserted = office_connection(owner.id, "Office")
        .insert(&db)
        .await
        .expect("Failed to insert");

    assert_eq!(inserted.name, "Office");
    assert_eq!(inserted.router_ip, "10.0.0.1");
    assert_eq!(inserted.api_port, 8728);
    assert!(!inserted.is_active);
    assert!(inserted.last_connected.is_none());
}

#[tokio::test]
async fn test_update_router_connection_after_contact() {
    let db = setup_test_db().await;
    let owner = insert_user(&db, "ops@example.com").await;
    let inserted = office_connection(owner.id, "Office")
        .insert(&db)
        .await
        .expect("Failed to insert");

    let contacted_at = Utc::now();
    let mut active: router_connection::ActiveModel = inserted.into();
    active.is_active = Set(true);
    active.last_connected = Set(Some(contacted_at));
    let updated = active.update(&db).await.expect("Failed to update");

    assert!(updated.is_active);
    assert_eq!(
        updated.last_connected.map(|t| t.timestamp_millis()),
        Some(contacted_at.timestamp_millis())
    );
}

#[tokio::test]
async fn test_password_is_not_serialized() {
    let db = setup_test_db().await;
    let owner = insert_user(&db, "ops@example.com").await;
    let mut model = office_connection(owner.id, "Office");
    model.api_password = Set("s3cret".to_string());
    let inserted = model.insert(&db).await.expect("Failed to insert");

    // Stored, but never rendered
    assert_eq!(inserted.api_password, "s3cret");
    let json = serde_json::to_string(&inserted).unwrap();
    assert!(!json.contains("s3cret"));
    assert!(!json.contains("api_password"));
}

#[tokio::test]
async fn test_list_connections_newest_first_per_owner() {
    let db = setup_test_db().await;
    let alice = insert_user(&db, "alice@example.com").await;
    let bob = insert_user(&db, "bob@example.com").await;

    let mut first = office_connection(alice.id, "First");
    first.created_at = Set(Utc::now() - chrono::Duration::minutes(5));
    first.insert(&db).await.expect("Failed to insert");
    office_connection(alice.id, "Second")
        .insert(&db)
        .await
        .expect("Failed to insert");
    office_connection(bob.id, "Bob's")
        .insert(&db)
        .await
        .expect("Failed to insert");

    let rows = router_connection::Entity::find()
        .filter(router_connection::Column::UserId.eq(alice.id))
        .order_by_desc(router_connection::Column::CreatedAt)
        .all(&db)
        .await
        .expect("Failed to query");

    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_delete_connection() {
    let db = setup_test_db().await;
    let owner = insert_user(&db, "ops@example.com").await;
    let inserted = office_connection(owner.id, "Office")
        .insert(&db)
        .await
        .expect("Failed to insert");

    let result = inserted.delete(&db).await.expect("Failed to delete");
    assert_eq!(result.rows_affected, 1);

    let count = router_connection::Entity::find()
        .count(&db)
        .await
        .expect("Failed to count");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_current_connection_selection_follows_connection_delete() {
    let db = setup_test_db().await;
    let owner = insert_user(&db, "ops@example.com").await;
    let conn = office_connection(owner.id, "Office")
        .insert(&db)
        .await
        .expect("Failed to insert");

    current_connection::ActiveModel {
        user_id: Set(owner.id),
        connection_id: Set(conn.id),
        selected_at: Set(Utc::now()),
    }
    .insert(&db)
    .await
    .expect("Failed to select connection");

    let selected = current_connection::Entity::find_by_id(owner.id)
        .one(&db)
        .await
        .expect("Failed to query")
        .expect("Selection not found");
    assert_eq!(selected.connection_id, conn.id);

    router_connection::Entity::delete_by_id(conn.id)
        .exec(&db)
        .await
        .expect("Failed to delete");

    let selected = current_connection::Entity::find_by_id(owner.id)
        .one(&db)
        .await
        .expect("Failed to query");
    assert!(selected.is_none());
}

#[tokio::test]
async fn test_user_email_is_unique() {
    let db = setup_test_db().await;
    insert_user(&db, "dup@example.com").await;

    let duplicate = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set("dup@example.com".to_string()),
        password_hash: Set("hash".to_string()),
        full_name: Set(None),
        role: Set(user::UserRole::Admin),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
    }
    .insert(&db)
    .await;

    assert!(duplicate.is_err());
}
