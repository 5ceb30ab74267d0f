//! Console operator accounts: sign-up, sign-in and the bootstrap admin

use chrono::Utc;
use routerdesk_auth::password::check_password_policy;
use routerdesk_auth::{hash_password, verify_password, PasswordError};
use routerdesk_db::entities::user::{self, UserRole};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("{0}")]
    WeakPassword(PasswordError),

    #[error("Email address already registered")]
    EmailExists,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Password processing failed: {0}")]
    Password(PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Trim and lowercase an address, rejecting anything without `local@domain.tld`
pub fn normalize_email(email: &str) -> Result<String, AccountError> {
    let email = email.trim().to_lowercase();

    let (local, domain) = email.split_once('@').ok_or(AccountError::InvalidEmail)?;
    let valid = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace);

    if valid {
        Ok(email)
    } else {
        Err(AccountError::InvalidEmail)
    }
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<user::Model>, AccountError> {
    let email = normalize_email(email)?;
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find_by_id(id).one(db).await
}

/// A concurrent sign-up can pass the lookup and still lose on the unique email index
fn insert_error(e: DbErr) -> AccountError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AccountError::EmailExists,
        _ => AccountError::Database(e),
    }
}

/// Create an operator account
pub async fn register_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    full_name: Option<String>,
    role: UserRole,
) -> Result<user::Model, AccountError> {
    let email = normalize_email(email)?;
    check_password_policy(password).map_err(AccountError::WeakPassword)?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AccountError::EmailExists);
    }

    let password_hash = hash_password(password).map_err(AccountError::Password)?;
    let now = Utc::now();

    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(password_hash),
        full_name: Set(full_name.filter(|n| !n.trim().is_empty())),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(insert_error)?;

    info!(user_id = %created.id, role = created.role.as_str(), "User registered");
    Ok(created)
}

/// Check a sign-in attempt; unknown, disabled and wrong-password all look the same
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model, AccountError> {
    let account = match find_by_email(db, email).await {
        Ok(Some(account)) => account,
        Ok(None) | Err(AccountError::InvalidEmail) => {
            return Err(AccountError::InvalidCredentials)
        }
        Err(e) => return Err(e),
    };

    if !account.is_active {
        debug!(user_id = %account.id, "Sign-in refused for disabled account");
        return Err(AccountError::InvalidCredentials);
    }

    let matches =
        verify_password(password, &account.password_hash).map_err(AccountError::Password)?;
    if !matches {
        return Err(AccountError::InvalidCredentials);
    }

    Ok(account)
}

/// Make sure an administrator with this email exists
///
/// An existing account is promoted to admin; its password is left alone.
pub async fn ensure_admin(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<user::Model, AccountError> {
    match find_by_email(db, email).await? {
        Some(existing) if existing.role == UserRole::Admin => Ok(existing),
        Some(existing) => {
            let mut active: user::ActiveModel = existing.into();
            active.role = Set(UserRole::Admin);
            active.updated_at = Set(Utc::now());
            let promoted = active.update(db).await?;
            info!(user_id = %promoted.id, "User promoted to admin");
            Ok(promoted)
        }
        None => register_user(db, email, password, None, UserRole::Admin).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> DatabaseConnection {
        let db = routerdesk_db::connect("sqlite::memory:").await.unwrap();
        routerdesk_db::migrate(&db).await.unwrap();
        db
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Ops@Example.COM ").unwrap(),
            "ops@example.com"
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ops@localhost").is_err());
        assert!(normalize_email("ops@.com").is_err());
        assert!(normalize_email("o ps@example.com").is_err());
        assert!(normalize_email("a@b@example.com").is_err());
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let db = test_db().await;

        let created = register_user(&db, "ops@example.com", "RouterAdmin#1", None, UserRole::User)
            .await
            .unwrap();
        assert_eq!(created.role, UserRole::User);

        let signed_in = authenticate(&db, "OPS@example.com", "RouterAdmin#1")
            .await
            .unwrap();
        assert_eq!(signed_in.id, created.id);

        let wrong = authenticate(&db, "ops@example.com", "nope-nope-nope").await;
        assert!(matches!(wrong, Err(AccountError::InvalidCredentials)));

        let unknown = authenticate(&db, "nobody@example.com", "RouterAdmin#1").await;
        assert!(matches!(unknown, Err(AccountError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_weak_passwords() {
        let db = test_db().await;

        register_user(&db, "ops@example.com", "RouterAdmin#1", None, UserRole::User)
            .await
            .unwrap();

        let duplicate =
            register_user(&db, "Ops@Example.com", "RouterAdmin#2", None, UserRole::User).await;
        assert!(matches!(duplicate, Err(AccountError::EmailExists)));

        let weak = register_user(&db, "new@example.com", "short", None, UserRole::User).await;
        assert!(matches!(weak, Err(AccountError::WeakPassword(_))));
    }

    #[tokio::test]
    async fn test_unique_violation_maps_to_email_exists() {
        let db = test_db().await;

        let existing = register_user(&db, "ops@example.com", "RouterAdmin#1", None, UserRole::User)
            .await
            .unwrap();

        let now = Utc::now();
        let err = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(existing.email.clone()),
            password_hash: Set(existing.password_hash.clone()),
            full_name: Set(None),
            role: Set(UserRole::User),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&db)
        .await
        .unwrap_err();

        assert!(matches!(insert_error(err), AccountError::EmailExists));
        assert!(matches!(
            insert_error(DbErr::Custom("disk full".to_string())),
            AccountError::Database(_)
        ));
    }

    #[tokio::test]
    async fn test_concurrent_signups_for_one_email() {
        let db = test_db().await;

        let (first, second) = tokio::join!(
            register_user(&db, "ops@example.com", "RouterAdmin#1", None, UserRole::User),
            register_user(&db, "ops@example.com", "RouterAdmin#2", None, UserRole::User),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(outcomes
            .iter()
            .any(|r| matches!(r, Err(AccountError::EmailExists))));
    }

    #[tokio::test]
    async fn test_ensure_admin_creates_then_promotes() {
        let db = test_db().await;

        let admin = ensure_admin(&db, "root@example.com", "RouterAdmin#1")
            .await
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);

        let again = ensure_admin(&db, "root@example.com", "ignored-password")
            .await
            .unwrap();
        assert_eq!(again.id, admin.id);

        let plain = register_user(&db, "ops@example.com", "RouterAdmin#1", None, UserRole::User)
            .await
            .unwrap();
        let promoted = ensure_admin(&db, "ops@example.com", "ignored-password")
            .await
            .unwrap();
        assert_eq!(promoted.id, plain.id);
        assert_eq!(promoted.role, UserRole::Admin);
    }
}
