/// Bearer token issuance and verification
///
/// Tokens are HS256-signed JWTs carrying only the subject (user ID), the
/// issue time and a fixed 30-day expiry. The server keeps no token state:
/// a token is valid until it expires or its signature stops matching.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::jwt::TokenService;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes-long");
/// let user_id = Uuid::new_v4();
///
/// let token = tokens.issue(user_id)?;
/// assert_eq!(tokens.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifetime of every issued token
pub const TOKEN_TTL_DAYS: i64 = 30;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature does not match the server secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Signature is valid but the token has expired
    #[error("Token has expired")]
    Expired,

    /// Not a decodable token
    #[error("Malformed token: {0}")]
    Malformed(String),
}

/// JWT claims
///
/// - `sub`: Subject (user ID)
/// - `iat`: Issued at (Unix timestamp)
/// - `exp`: Expiration (Unix timestamp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for `subject` that expire `expires_in` from now
    pub fn new(subject: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject,
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        }
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and verifies signed bearer tokens
///
/// Built once at startup from the configured secret and shared through
/// application state.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl_days", &self.ttl.num_days())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service signing with `secret` and the standard 30-day lifetime
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::days(TOKEN_TTL_DAYS))
    }

    /// Creates a token service with a custom lifetime
    ///
    /// A negative lifetime produces tokens that are already expired, which is
    /// handy in tests.
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a signed token for `subject`
    ///
    /// # Errors
    ///
    /// Returns `TokenError::CreateError` if encoding fails
    pub fn issue(&self, subject: Uuid) -> Result<String, TokenError> {
        let claims = Claims::new(subject, self.ttl);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns its subject
    ///
    /// The signature is checked before any claim, so an expired token with a
    /// forged signature reports `InvalidSignature`, never `Expired`.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` if the signature does not match
    /// - `Expired` if the signature matches but `exp` has passed
    /// - `Malformed` for anything that is not a decodable HS256 token
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.decode_claims(token).map(|claims| claims.sub)
    }

    /// Verifies a token and returns the full claims
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(e.to_string()),
        })?;

        Ok(token_data.claims)
    }
}
