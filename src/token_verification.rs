//! # Bearer Token Verification
//!
//! Strategies for turning a bearer token into [`Claims`]. The access boundary
//! only depends on [`TokenVerifier`]; which strategy runs is chosen by
//! `CATALOG_TOKEN_VERIFICATION`.
//!
//! - [`DecodeOnlyVerifier`] reads the claims without checking the signature or
//!   expiry, then applies the optional issuer/audience checks. It reproduces the
//!   behaviour existing clients depend on and must not be used where tokens
//!   cross a trust boundary.
//! - [`JwksVerifier`] validates RS256 signatures against the issuer's published
//!   key set, plus `exp` and the configured `iss`/`aud`.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use lru::LruCache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::AppConfig;

const JWKS_CACHE_CAPACITY: usize = 32;
const CLOCK_SKEW_LEEWAY_SECS: u64 = 60;

/// Reasons a credential is rejected. All of them surface as 401.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredentials,
    #[error("authorization header must use the Bearer scheme")]
    InvalidScheme,
    #[error("token could not be decoded: {0}")]
    Malformed(String),
    #[error("token is missing the '{0}' claim")]
    MissingClaim(&'static str),
    #[error("token issuer does not match")]
    IssuerMismatch,
    #[error("token audience does not match")]
    AudienceMismatch,
    #[error("token signature or validity check failed: {0}")]
    Invalid(String),
    #[error("signing key lookup failed: {0}")]
    KeyLookup(String),
    #[error("user is inactive")]
    Inactive,
}

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == expected,
            Audience::Many(auds) => auds.iter().any(|aud| aud == expected),
        }
    }
}

/// Identity claims carried by access tokens issued by the directory service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Directory object id of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Directory tenant id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// Builds the verifier selected by configuration.
pub fn build_verifier(config: &AppConfig) -> Result<Arc<dyn TokenVerifier>, AuthError> {
    match config.token_verification.as_str() {
        "jwks" => {
            let jwks_url = config
                .jwks_url
                .clone()
                .ok_or_else(|| AuthError::KeyLookup("JWKS url not configured".to_string()))?;
            Ok(Arc::new(JwksVerifier::new(
                Client::new(),
                jwks_url,
                config.jwt_issuer.clone(),
                config.jwt_audience.clone(),
            )))
        }
        _ => {
            warn!("Bearer token signatures are not verified (token_verification=decode_only)");
            Ok(Arc::new(DecodeOnlyVerifier::new(
                config.jwt_issuer.clone(),
                config.jwt_audience.clone(),
            )))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecodeOnlyVerifier {
    issuer: Option<String>,
    audience: Option<String>,
}

impl DecodeOnlyVerifier {
    pub fn new(issuer: Option<String>, audience: Option<String>) -> Self {
        Self { issuer, audience }
    }

    fn check_issuer_and_audience(&self, claims: &Claims) -> Result<(), AuthError> {
        if let Some(expected) = self.issuer.as_deref()
            && claims.iss.as_deref() != Some(expected)
        {
            return Err(AuthError::IssuerMismatch);
        }

        if let Some(expected) = self.audience.as_deref()
            && !claims
                .aud
                .as_ref()
                .is_some_and(|aud| aud.contains(expected))
        {
            return Err(AuthError::AudienceMismatch);
        }

        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for DecodeOnlyVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| AuthError::Malformed(e.to_string()))?;

        self.check_issuer_and_audience(&data.claims)?;
        Ok(data.claims)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct JwksDocument {
    keys: Vec<JsonWebKey>,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonWebKey {
    kty: String,
    kid: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

/// Verifies RS256 tokens against a JWKS endpoint, caching keys by `kid`.
pub struct JwksVerifier {
    http_client: Client,
    jwks_url: String,
    issuer: Option<String>,
    audience: Option<String>,
    key_cache: RwLock<LruCache<String, JsonWebKey>>,
}

impl JwksVerifier {
    pub fn new(
        http_client: Client,
        jwks_url: String,
        issuer: Option<String>,
        audience: Option<String>,
    ) -> Self {
        let capacity = NonZeroUsize::new(JWKS_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            http_client,
            jwks_url,
            issuer,
            audience,
            key_cache: RwLock::new(LruCache::new(capacity)),
        }
    }

    async fn key_for(&self, kid: &str) -> Result<JsonWebKey, AuthError> {
        {
            let mut cache = self.key_cache.write().await;
            if let Some(jwk) = cache.get(kid) {
                return Ok(jwk.clone());
            }
        }

        debug!(kid, "Signing key not cached; fetching key set");
        let document = self.fetch_jwks().await?;

        let mut cache = self.key_cache.write().await;
        let mut found = None;
        for key in document.keys {
            if let Some(key_id) = key.kid.clone() {
                if key_id == kid {
                    found = Some(key.clone());
                }
                cache.put(key_id, key);
            }
        }

        found.ok_or_else(|| AuthError::KeyLookup(format!("no key with kid '{}'", kid)))
    }

    async fn fetch_jwks(&self) -> Result<JwksDocument, AuthError> {
        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| AuthError::KeyLookup(format!("failed to fetch key set: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::KeyLookup(format!(
                "key set request returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::KeyLookup(format!("failed to parse key set: {}", e)))
    }

    fn decoding_key(jwk: &JsonWebKey) -> Result<DecodingKey, AuthError> {
        if jwk.kty != "RSA" {
            return Err(AuthError::KeyLookup(format!(
                "unsupported key type '{}'",
                jwk.kty
            )));
        }
        let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
            return Err(AuthError::KeyLookup("RSA key is missing n or e".to_string()));
        };
        DecodingKey::from_rsa_components(n, e)
            .map_err(|e| AuthError::KeyLookup(format!("invalid RSA key: {}", e)))
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let kid = header.kid.ok_or(AuthError::MissingClaim("kid"))?;

        let jwk = self.key_for(&kid).await?;
        let key = Self::decoding_key(&jwk)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.leeway = CLOCK_SKEW_LEEWAY_SECS;
        match self.audience.as_deref() {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        if let Some(issuer) = self.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
        }

        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
                jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
                _ => AuthError::Invalid(e.to_string()),
            })
    }
}
