//! Authentication Module
//!
//! Two credentials guard the Mirror API:
//! 1. HTTP routes carry a caller identity token (`Authorization: Bearer <jwt>`,
//!    HS256, `sub` = user id).
//! 2. The WebSocket gateway expects the shared `WSS_SECRET` verbatim in the
//!    `Authorization` header of the upgrade request.

use crate::error::{ApiError, ApiResult};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mirror_core::{ConfigError, MirrorError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Placeholder secret used when `MIRROR_JWT_SECRET` is unset.
pub const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

/// Minimum JWT secret length accepted in production.
pub const MIN_SECRET_LEN: usize = 32;

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock abstraction for JWT time validation.
///
/// Token expiry is checked against this clock instead of inside
/// `jsonwebtoken`, so tests can pin time.
pub trait JwtClock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

// ============================================================================
// SECRETS (TYPE-SAFE)
// ============================================================================

/// Type-safe JWT secret that prevents accidental logging.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// Create a new JWT secret.
    ///
    /// # Errors
    /// Returns error if the secret is empty.
    pub fn new(secret: String) -> Result<Self, MirrorError> {
        if secret.trim().is_empty() {
            return Err(MirrorError::Config(ConfigError::MissingRequired {
                field: "MIRROR_JWT_SECRET".to_string(),
            }));
        }
        Ok(Self(SecretString::new(secret.into())))
    }

    /// Expose the secret value (only for cryptographic operations).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

fn build_jwt_secret(raw: Option<String>) -> JwtSecret {
    raw.and_then(|s| JwtSecret::new(s).ok())
        .unwrap_or_else(|| JwtSecret(SecretString::new(INSECURE_DEFAULT_SECRET.into())))
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Authentication configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing and verification
    pub jwt_secret: JwtSecret,

    /// JWT algorithm (default: HS256)
    pub jwt_algorithm: Algorithm,

    /// Expected `iss` claim, if any
    pub jwt_issuer: Option<String>,

    /// JWT token expiration in seconds (default: 1 hour)
    pub jwt_expiration_secs: i64,

    /// JWT clock skew tolerance in seconds (default: 60)
    pub jwt_clock_skew_secs: i64,

    /// Shared secret for WebSocket upgrades
    pub ws_secret: Option<SecretString>,

    /// Clock for JWT time validation (injected for testing)
    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .field("ws_secret", &self.ws_secret.as_ref().map(|_| "[REDACTED]"))
            .field("clock", &"<JwtClock>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: build_jwt_secret(None),
            jwt_algorithm: Algorithm::HS256,
            jwt_issuer: None,
            jwt_expiration_secs: 3600,
            jwt_clock_skew_secs: 60,
            ws_secret: None,
            clock: Arc::new(SystemClock),
        }
    }
}

impl AuthConfig {
    /// Create authentication configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `MIRROR_JWT_SECRET`: JWT signing secret
    /// - `MIRROR_JWT_ISSUER`: Expected `iss` claim (optional)
    /// - `MIRROR_JWT_EXPIRATION_SECS`: JWT token expiration (default: 3600)
    /// - `MIRROR_JWT_CLOCK_SKEW_SECS`: JWT clock skew tolerance (default: 60)
    /// - `WSS_SECRET`: Shared secret for WebSocket upgrades
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jwt_secret: build_jwt_secret(std::env::var("MIRROR_JWT_SECRET").ok()),
            jwt_issuer: std::env::var("MIRROR_JWT_ISSUER")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            jwt_expiration_secs: std::env::var("MIRROR_JWT_EXPIRATION_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jwt_expiration_secs),
            jwt_clock_skew_secs: std::env::var("MIRROR_JWT_CLOCK_SKEW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.jwt_clock_skew_secs),
            ws_secret: std::env::var("WSS_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| SecretString::new(s.into())),
            ..defaults
        }
    }

    /// Builder-style override of the WebSocket secret.
    pub fn with_ws_secret(mut self, secret: impl Into<String>) -> Self {
        self.ws_secret = Some(SecretString::new(secret.into().into()));
        self
    }

    /// Validate the authentication configuration for production use.
    ///
    /// Call at server startup. In development, weak settings are logged as
    /// warnings and the server continues.
    pub fn validate_for_production(&self, is_production: bool) -> ApiResult<()> {
        if self.jwt_secret.is_insecure_default() {
            if is_production {
                return Err(ApiError::internal_error(
                    "Cannot start in production with the default JWT secret. \
                     Set MIRROR_JWT_SECRET to a secure value.",
                ));
            }
            tracing::warn!(
                "Using insecure default JWT secret. Set MIRROR_JWT_SECRET before deploying."
            );
        } else if self.jwt_secret.len() < MIN_SECRET_LEN {
            if is_production {
                return Err(ApiError::internal_error(format!(
                    "JWT secret is too short for production use ({} chars, need {}).",
                    self.jwt_secret.len(),
                    MIN_SECRET_LEN
                )));
            }
            tracing::warn!(
                secret_len = self.jwt_secret.len(),
                "JWT secret is short; use at least {} characters in production",
                MIN_SECRET_LEN
            );
        }

        if self.ws_secret.is_none() {
            if is_production {
                return Err(ApiError::internal_error(
                    "Cannot start in production without WSS_SECRET.",
                ));
            }
            tracing::warn!("WSS_SECRET is unset; WebSocket upgrades will be refused");
        }

        Ok(())
    }
}

// ============================================================================
// JWT CLAIMS
// ============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    pub fn new(user_id: String, expiration_secs: i64, clock: &dyn JwtClock) -> Self {
        let now = clock.now_epoch_secs();
        Self {
            sub: user_id,
            iat: now,
            exp: now + expiration_secs,
            iss: None,
        }
    }

    pub fn is_expired(&self, clock: &dyn JwtClock) -> bool {
        self.exp < clock.now_epoch_secs()
    }
}

// ============================================================================
// AUTHENTICATION CONTEXT
// ============================================================================

/// Authenticated caller, injected into request extensions by the middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// User ID from the `sub` claim
    pub user_id: String,
}

impl AuthContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

// ============================================================================
// AUTHENTICATION FUNCTIONS
// ============================================================================

/// Check `exp` against the configured clock with skew tolerance.
fn validate_claim_times(now: i64, exp: i64, leeway_secs: i64) -> ApiResult<()> {
    if exp < now - leeway_secs {
        return Err(ApiError::token_expired());
    }
    Ok(())
}

/// Validate a JWT token and extract claims.
///
/// `jsonwebtoken` checks the signature and issuer; expiry is checked against
/// the injected clock.
pub fn validate_jwt_token(config: &AuthConfig, token: &str) -> ApiResult<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = std::collections::HashSet::from(["exp".to_string()]);
    if let Some(issuer) = &config.jwt_issuer {
        validation.set_issuer(&[issuer]);
    }

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                ApiError::invalid_token("Token signature is invalid")
            }
            jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                ApiError::invalid_token("Token issuer is not accepted")
            }
            _ => ApiError::invalid_token(format!("Token validation failed: {}", e)),
        })?;

    let claims = token_data.claims;
    let now = config.clock.now_epoch_secs();
    if now < 0 {
        tracing::error!(
            timestamp = now,
            "System clock returned pre-epoch time - server time is broken"
        );
        return Err(ApiError::internal_error("Server time configuration error"));
    }

    validate_claim_times(now, claims.exp, config.jwt_clock_skew_secs)?;
    Ok(claims)
}

/// Generate a JWT token for a user.
pub fn generate_jwt_token(config: &AuthConfig, user_id: impl Into<String>) -> ApiResult<String> {
    let mut claims = Claims::new(user_id.into(), config.jwt_expiration_secs, &*config.clock);
    claims.iss = config.jwt_issuer.clone();

    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

/// Authenticate a request from its `Authorization` header value.
pub fn authenticate(config: &AuthConfig, auth_header: Option<&str>) -> ApiResult<AuthContext> {
    let auth_value = auth_header.ok_or_else(|| {
        ApiError::unauthorized("Authentication required: provide an Authorization header")
    })?;
    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::invalid_token("Authorization header must use Bearer scheme"))?;

    let claims = validate_jwt_token(config, token.trim())?;
    if claims.sub.trim().is_empty() {
        return Err(ApiError::invalid_token("Token has an empty subject"));
    }
    Ok(AuthContext::new(claims.sub))
}

/// Check the shared WebSocket secret carried by an upgrade request.
pub fn verify_ws_secret(config: &AuthConfig, auth_header: Option<&str>) -> ApiResult<()> {
    let expected = config
        .ws_secret
        .as_ref()
        .ok_or_else(|| ApiError::unauthorized("WebSocket access is not configured"))?;
    match auth_header {
        Some(presented)
            if bool::from(presented.as_bytes().ct_eq(expected.expose_secret().as_bytes())) =>
        {
            Ok(())
        }
        Some(_) => Err(ApiError::unauthorized("Invalid WebSocket secret")),
        None => Err(ApiError::unauthorized(
            "Authentication required: provide an Authorization header",
        )),
    }
}

// ============================================================================
// TESTS
// ============================================================================
