/// Ownership and self-protection decisions.
///
/// Every mutating handler funnels its authorization question through this
/// module instead of re-implementing the checks inline, so posts and
/// comments cannot drift apart.
use crate::error::{AppError, Result};
use crate::models::Role;
use uuid::Uuid;

/// Author-only mutation rule, used identically for posts and comments.
///
/// Role is deliberately not consulted: admins do not get author-style
/// edit rights here. Admin mutation of posts and users goes through the
/// separate `/api/admin` handlers, which skip this check entirely.
pub fn can_mutate(actor_id: Uuid, owner_id: Uuid) -> bool {
    actor_id == owner_id
}

/// Enforce [`can_mutate`], with a caller-supplied denial message.
pub fn ensure_owner(actor_id: Uuid, owner_id: Uuid, denial: &str) -> Result<()> {
    if can_mutate(actor_id, owner_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(denial.to_string()))
    }
}

/// Reject a role update that would strip the acting admin's own role.
///
/// Demoting a *different* admin is allowed; the rule only protects the
/// actor from locking themselves out.
pub fn ensure_not_self_demotion(
    actor_id: Uuid,
    target_id: Uuid,
    target_role: Role,
    new_role: Role,
) -> Result<()> {
    if actor_id == target_id && target_role == Role::Admin && new_role == Role::User {
        return Err(AppError::Forbidden(
            "You cannot remove your own admin role".to_string(),
        ));
    }
    Ok(())
}

/// Reject an admin delete targeting the acting admin's own account.
pub fn ensure_not_self_delete(actor_id: Uuid, target_id: Uuid) -> Result<()> {
    if actor_id == target_id {
        return Err(AppError::Forbidden(
            "You cannot delete your own account".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_can_mutate() {
        let id = Uuid::new_v4();
        assert!(can_mutate(id, id));
        assert!(ensure_owner(id, id, "denied").is_ok());
    }

    #[test]
    fn test_non_owner_cannot_mutate() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(!can_mutate(other, owner));
        assert!(matches!(
            ensure_owner(other, owner, "denied"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_self_demotion_blocked() {
        let admin = Uuid::new_v4();
        assert!(matches!(
            ensure_not_self_demotion(admin, admin, Role::Admin, Role::User),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_demoting_another_admin_allowed() {
        let actor = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(ensure_not_self_demotion(actor, other, Role::Admin, Role::User).is_ok());
    }

    #[test]
    fn test_self_role_reassertion_allowed() {
        // Setting your own role to admin again is a no-op, not a demotion
        let admin = Uuid::new_v4();
        assert!(ensure_not_self_demotion(admin, admin, Role::Admin, Role::Admin).is_ok());
    }

    #[test]
    fn test_self_delete_blocked() {
        let admin = Uuid::new_v4();
        assert!(matches!(
            ensure_not_self_delete(admin, admin),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_deleting_another_user_allowed() {
        assert!(ensure_not_self_delete(Uuid::new_v4(), Uuid::new_v4()).is_ok());
    }
}
