//! Role guard for schema fields.
//!
//! A guarded field names the single role it requires and calls [`admit`]
//! before doing any work. The guard reads the principal carried by the
//! request scope and compares roles by exact equality. There is no role
//! hierarchy.
//!
//! A denial is recorded as an error on that field alone and the field
//! resolves to null. Sibling fields, including later mutations in the same
//! request, still run.

use async_graphql::{Context, ErrorExtensions, Guard};
use thiserror::Error;

use crate::auth::Principal;
use crate::middleware::RequestScope;
use crate::types::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden: requires {required}, got {actual}")]
    Forbidden { required: Role, actual: Role },
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::Forbidden { .. } => "FORBIDDEN",
        }
    }
}

impl ErrorExtensions for AuthError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}

/// Decide whether `principal` may run an operation that requires `required`
pub fn authorize(required: Role, principal: Option<&Principal>) -> Result<(), AuthError> {
    let actual = principal.and_then(|p| p.role).ok_or(AuthError::Unauthenticated)?;

    if actual != required {
        return Err(AuthError::Forbidden { required, actual });
    }

    Ok(())
}

pub struct RoleGuard {
    role: Role,
}

impl RoleGuard {
    pub fn new(role: Role) -> Self {
        Self { role }
    }
}

impl Guard for RoleGuard {
    async fn check(&self, ctx: &Context<'_>) -> async_graphql::Result<()> {
        let principal = ctx.data_opt::<RequestScope>().and_then(RequestScope::principal);

        authorize(self.role, principal).map_err(|e| {
            tracing::debug!("Denied {} field: {}", self.role, e);
            e.extend()
        })
    }
}

/// Check `role` for the field being resolved. On denial the error is added
/// to the response with this field's path and `false` is returned; the
/// resolver should then return `Ok(None)`.
pub async fn admit(ctx: &Context<'_>, role: Role) -> bool {
    match RoleGuard::new(role).check(ctx).await {
        Ok(()) => true,
        Err(err) => {
            ctx.add_error(ctx.set_error_path(err.into_server_error(ctx.item.pos)));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Option<Role>) -> Principal {
        Principal::new("123", role)
    }

    #[test]
    fn absent_principal_is_unauthenticated() {
        assert_eq!(authorize(Role::Manager, None), Err(AuthError::Unauthenticated));
    }

    #[test]
    fn roleless_principal_is_unauthenticated() {
        assert_eq!(authorize(Role::Admin, Some(&principal(None))), Err(AuthError::Unauthenticated));
    }

    #[test]
    fn matching_role_is_allowed() {
        assert_eq!(authorize(Role::Admin, Some(&principal(Some(Role::Admin)))), Ok(()));
    }

    #[test]
    fn mismatched_role_is_forbidden() {
        assert_eq!(
            authorize(Role::Admin, Some(&principal(Some(Role::Employee)))),
            Err(AuthError::Forbidden { required: Role::Admin, actual: Role::Employee })
        );
    }

    #[test]
    fn admin_does_not_satisfy_other_roles() {
        for required in [Role::Employee, Role::TeamLead, Role::Manager] {
            assert!(matches!(
                authorize(required, Some(&principal(Some(Role::Admin)))),
                Err(AuthError::Forbidden { .. })
            ));
        }
    }

    #[test]
    fn every_pair_decides_by_equality_and_is_stable() {
        for &required in Role::ALL {
            for &held in Role::ALL {
                let p = principal(Some(held));
                let first = authorize(required, Some(&p));
                let second = authorize(required, Some(&p));
                assert_eq!(first, second);
                assert_eq!(first.is_ok(), required == held);
            }
        }
    }

    #[test]
    fn forbidden_message_names_both_roles() {
        let err = authorize(Role::Admin, Some(&principal(Some(Role::Employee)))).unwrap_err();
        assert_eq!(err.to_string(), "forbidden: requires ADMIN, got EMPLOYEE");
        assert_eq!(err.code(), "FORBIDDEN");
    }

    #[test]
    fn extension_carries_error_code() {
        let err = AuthError::Unauthenticated.extend();
        assert_eq!(err.message, "unauthenticated");
        let code = err.extensions.as_ref().and_then(|ext| ext.get("code")).cloned();
        assert_eq!(code, Some(async_graphql::Value::from("UNAUTHENTICATED")));
    }
}
