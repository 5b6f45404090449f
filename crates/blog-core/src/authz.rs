//! Authorization guard for gated actions.

use uuid::Uuid;

use crate::error::DomainError;

/// Role carried by site admins.
pub const ADMIN_ROLE: &str = "admin";

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requester {
    Anonymous,
    User { user_id: Uuid, roles: Vec<String> },
}

impl Requester {
    pub fn has_role(&self, role: &str) -> bool {
        match self {
            Requester::Anonymous => false,
            Requester::User { roles, .. } => roles.iter().any(|r| r == role),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Requester::User { .. })
    }

    pub fn is_elevated(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

/// A predicate over requesters.
pub trait Policy: Send + Sync {
    fn permits(&self, requester: &Requester) -> bool;
}

/// Admits only requesters carrying the admin role.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElevatedOnly;

impl Policy for ElevatedOnly {
    fn permits(&self, requester: &Requester) -> bool {
        requester.is_elevated()
    }
}

/// Check `requester` against `policy` before any gated operation runs.
pub fn authorize(policy: &dyn Policy, requester: &Requester) -> Result<(), DomainError> {
    if policy.permits(requester) {
        Ok(())
    } else {
        Err(DomainError::AccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> Requester {
        Requester::User {
            user_id: Uuid::new_v4(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_anonymous_is_denied() {
        let result = authorize(&ElevatedOnly, &Requester::Anonymous);
        assert!(matches!(result, Err(DomainError::AccessDenied)));
    }

    #[test]
    fn test_regular_user_is_denied() {
        let result = authorize(&ElevatedOnly, &user(&["user"]));
        assert!(matches!(result, Err(DomainError::AccessDenied)));
    }

    #[test]
    fn test_admin_is_permitted() {
        assert!(authorize(&ElevatedOnly, &user(&["user", ADMIN_ROLE])).is_ok());
    }

    #[test]
    fn test_is_authenticated() {
        assert!(!Requester::Anonymous.is_authenticated());
        assert!(user(&[]).is_authenticated());
    }
}
