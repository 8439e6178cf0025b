use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use super::scope::RequestScope;
use crate::auth::{validate_jwt, Principal};
use crate::config::{IdentitySource, SecurityConfig};
use crate::types::Role;

/// Builds the request principal from inbound headers.
///
/// Extraction never fails: a missing, malformed or unrecognized credential
/// yields a principal without a role, and the authorization gate decides
/// what that principal may do.
#[derive(Clone, Debug)]
pub struct IdentityExtractor {
    source: IdentitySource,
    role_header: String,
    user_id_header: String,
    anonymous_id: String,
    jwt_secret: String,
}

impl IdentityExtractor {
    pub fn from_config(security: &SecurityConfig) -> Self {
        Self {
            source: security.identity_source,
            role_header: security.role_header.clone(),
            user_id_header: security.user_id_header.clone(),
            anonymous_id: security.anonymous_principal_id.clone(),
            jwt_secret: security.jwt_secret.clone(),
        }
    }

    pub fn extract(&self, headers: &HeaderMap) -> Principal {
        match self.source {
            IdentitySource::Header => self.from_role_header(headers),
            IdentitySource::Bearer => self.from_bearer_token(headers),
        }
    }

    fn from_role_header(&self, headers: &HeaderMap) -> Principal {
        let role = header_str(headers, &self.role_header).and_then(|raw| match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::debug!("Ignoring role header: {}", e);
                None
            }
        });

        let id = header_str(headers, &self.user_id_header)
            .filter(|id| !id.is_empty())
            .unwrap_or(self.anonymous_id.as_str());

        Principal::new(id, role)
    }

    fn from_bearer_token(&self, headers: &HeaderMap) -> Principal {
        let Some(token) = header_str(headers, "authorization").and_then(bearer_token) else {
            return Principal::anonymous(&self.anonymous_id);
        };

        match validate_jwt(token.trim(), &self.jwt_secret) {
            Ok(claims) => Principal::from(claims),
            Err(e) => {
                tracing::warn!("Rejected bearer token: {}", e);
                Principal::anonymous(&self.anonymous_id)
            }
        }
    }
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Token part of an `Authorization` value. The scheme name is case-insensitive.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

/// Attach a fresh `RequestScope` carrying the caller's principal to the request
pub async fn identity_middleware(
    State(identity): State<Arc<IdentityExtractor>>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = identity.extract(request.headers());
    let scope = RequestScope::new().with_principal(principal);

    let span = tracing::info_span!("request", request_id = %scope.request_id());
    {
        let _enter = span.enter();
        let principal = scope.principal();
        tracing::debug!(
            "Resolved principal {:?} with role {:?}",
            principal.map(|p| p.id.as_str()),
            principal.and_then(|p| p.role)
        );
    }

    request.extensions_mut().insert(scope);
    next.run(request).instrument(span).await
}
