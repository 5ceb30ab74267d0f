//! Authenticated caller identity

use routerdesk_db::entities::user::UserRole;
use uuid::Uuid;

/// The user on whose behalf a store or tester call runs
///
/// Every connection query is scoped to `user_id`; rows owned by someone else
/// behave as if they did not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Principal {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Build a principal from the `user_id`/`user_role` claims of a session
    pub fn from_claims(user_id: &str, role: Option<&str>) -> Option<Self> {
        let user_id = Uuid::parse_str(user_id).ok()?;
        let role = match role {
            Some("admin") => UserRole::Admin,
            _ => UserRole::User,
        };
        Some(Self { user_id, role })
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claims() {
        let id = Uuid::new_v4();

        let admin = Principal::from_claims(&id.to_string(), Some("admin")).unwrap();
        assert_eq!(admin.user_id, id);
        assert!(admin.is_admin());

        let user = Principal::from_claims(&id.to_string(), None).unwrap();
        assert!(!user.is_admin());

        assert!(Principal::from_claims("not-a-uuid", Some("admin")).is_none());
    }
}
