use super::domain::{ActorId, ReviewerRole};

/// Role lookups are owned by the surrounding application; the workflow only
/// asks yes/no questions about the acting user.
pub trait RoleProvider: Send + Sync {
    fn actor_has_role(&self, actor: &ActorId, role: ReviewerRole) -> bool;
}
