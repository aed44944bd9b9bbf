use crate::models::{Identity, Role};

/// The resolved identity of the current request.
///
/// Built fresh by [`AuthMiddleware`](super::AuthMiddleware) and stored in the
/// request's extensions, so it is dropped together with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityContext {
    pub user_id: i64,
    pub subject: String,
    pub role: Role,
}

impl SecurityContext {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&Identity> for SecurityContext {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.id,
            subject: identity.username.clone(),
            role: identity.role,
        }
    }
}
