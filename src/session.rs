use crate::error::{CatalogError, CatalogResult};
use crate::models::UserId;

/// The signed-in user acting on the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub id: UserId,
    pub display_name: String,
    pub is_admin: bool,
}

/// Credentials and identity handed to us by the authentication layer.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<ActingUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(token: impl Into<String>, user: ActingUser) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    /// Engagement operations must not be attempted without a known user.
    pub fn require_user(&self) -> CatalogResult<&ActingUser> {
        self.user.as_ref().ok_or(CatalogError::Unauthenticated)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Author-or-admin capability check used to gate removal affordances.
/// Advisory only: the catalog API makes the real decision.
pub fn can_moderate(user: &ActingUser, author_id: &UserId) -> bool {
    &user.id == author_id || user.is_admin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, is_admin: bool) -> ActingUser {
        ActingUser {
            id: UserId::new(id),
            display_name: id.to_string(),
            is_admin,
        }
    }

    #[test]
    fn author_can_moderate_own_node() {
        assert!(can_moderate(&user("alice", false), &UserId::new("alice")));
    }

    #[test]
    fn admin_can_moderate_anyone() {
        assert!(can_moderate(&user("root", true), &UserId::new("alice")));
    }

    #[test]
    fn stranger_cannot_moderate() {
        assert!(!can_moderate(&user("bob", false), &UserId::new("alice")));
    }

    #[test]
    fn anonymous_session_has_no_user() {
        let session = Session::anonymous();
        assert!(matches!(
            session.require_user(),
            Err(CatalogError::Unauthenticated)
        ));
        assert!(session.token().is_none());
    }

    #[test]
    fn signed_in_session_exposes_user_and_token() {
        let session = Session::signed_in("tok", user("alice", false));
        assert_eq!(session.require_user().unwrap().id, UserId::new("alice"));
        assert_eq!(session.token(), Some("tok"));
    }
}
