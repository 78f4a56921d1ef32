//! # Authentication
//!
//! Resolves the caller's identity and tenant from the bearer token and exposes
//! them to handlers as [`CurrentUser`]. Every repository call takes the
//! resulting [`TenantId`]; there is no unscoped path.

use std::fmt;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, unauthorized};
use crate::server::AppState;
use crate::token_verification::{AuthError, Claims};

/// Tenant identifier taken from the token's `tid` claim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Authenticated caller, inserted into request extensions by [`auth_middleware`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub tenant_id: TenantId,
    pub email: Option<String>,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub is_active: bool,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .oid
            .or(claims.sub)
            .filter(|id| !id.is_empty())
            .ok_or(AuthError::MissingClaim("oid"))?;
        let tenant_id = claims
            .tid
            .filter(|tid| !tid.is_empty())
            .map(TenantId)
            .ok_or(AuthError::MissingClaim("tid"))?;

        Ok(Self {
            id,
            tenant_id,
            email: claims.preferred_username.or(claims.email),
            name: claims.name,
            roles: claims.roles,
            is_active: true,
        })
    }
}

/// Verifies the bearer token and attaches the resulting [`CurrentUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await.map_err(|err| {
        tracing::info!(reason = %err, "Rejected bearer credential");
        match err {
            AuthError::MissingCredentials => unauthorized(Some("Not authenticated")),
            _ => unauthorized(None),
        }
    })?;

    tracing::debug!(user_id = %user.id, tenant_id = %user.tenant_id, "Authenticated request");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<CurrentUser, AuthError> {
    let token = extract_bearer_token(headers)?;
    let claims = state.verifier.verify(token).await?;
    let user = CurrentUser::try_from(claims)?;

    if !user.is_active {
        return Err(AuthError::Inactive);
    }

    Ok(user)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidScheme)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| unauthorized(Some("Not authenticated")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn claims() -> Claims {
        Claims {
            oid: Some("user-1".into()),
            tid: Some("tenant-1".into()),
            preferred_username: Some("ada@example.com".into()),
            email: Some("ignored@example.com".into()),
            name: Some("Ada".into()),
            roles: vec!["reader".into()],
            ..Default::default()
        }
    }

    #[test]
    fn user_from_claims_prefers_oid_and_preferred_username() {
        let user = CurrentUser::try_from(claims()).unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.tenant_id, TenantId::from("tenant-1"));
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert!(user.is_active);
    }

    #[test]
    fn user_falls_back_to_sub_and_email() {
        let user = CurrentUser::try_from(Claims {
            oid: None,
            sub: Some("subject-9".into()),
            preferred_username: None,
            ..claims()
        })
        .unwrap();
        assert_eq!(user.id, "subject-9");
        assert_eq!(user.email.as_deref(), Some("ignored@example.com"));
    }

    #[test]
    fn missing_subject_or_tenant_is_rejected() {
        let no_subject = Claims {
            oid: None,
            ..claims()
        };
        assert_eq!(
            CurrentUser::try_from(no_subject).unwrap_err(),
            AuthError::MissingClaim("oid")
        );

        let no_tenant = Claims {
            tid: Some(String::new()),
            ..claims()
        };
        assert_eq!(
            CurrentUser::try_from(no_tenant).unwrap_err(),
            AuthError::MissingClaim("tid")
        );
    }

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            extract_bearer_token(&headers).unwrap_err(),
            AuthError::MissingCredentials
        );

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dGVzdDoxMjM="));
        assert_eq!(
            extract_bearer_token(&headers).unwrap_err(),
            AuthError::InvalidScheme
        );

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }
}
