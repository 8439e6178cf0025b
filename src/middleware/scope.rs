use std::sync::Arc;
use uuid::Uuid;

use crate::auth::Principal;

/// Per-request container carrying the caller's principal to later stages.
///
/// Scopes are values: attaching a principal returns a new scope and leaves
/// the original untouched, so a parent scope can be reused by any number of
/// requests without them seeing each other's principal.
#[derive(Clone, Debug)]
pub struct RequestScope {
    request_id: Uuid,
    principal: Option<Arc<Principal>>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            principal: None,
        }
    }

    /// Derive a scope carrying `principal`. Shadows any principal already attached.
    pub fn with_principal(&self, principal: Principal) -> Self {
        Self {
            request_id: self.request_id,
            principal: Some(Arc::new(principal)),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_deref()
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}
