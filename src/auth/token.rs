use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::JwtSettings;
use crate::models::User;

/// Why a token was refused, or could not be minted.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is empty")]
    EmptyInput,

    /// Not a well-formed JWT, or a required claim is missing.
    #[error("token is malformed")]
    Malformed,

    #[error("signature does not verify")]
    InvalidSignature,

    #[error("issuer or audience does not match")]
    InvalidIssuerOrAudience,

    #[error("token has expired")]
    Expired,

    #[error("subject is not a valid identifier")]
    MalformedSubject,

    #[error("failed to sign token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("token lifetime of {0} hours is out of range")]
    LifetimeOutOfRange(i64),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                TokenError::InvalidIssuerOrAudience
            }
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Claims carried by every identity token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Identity id, hyphenated UUID text.
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

impl Claims {
    /// Parses the subject back into an identity id.
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::MalformedSubject)
    }
}

/// Issues and validates HS256 identity tokens.
///
/// Holds only key material and settings; safe to share across workers.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    lifetime_hours: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime_hours", &self.lifetime_hours)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(settings: &JwtSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked after decoding so that `now == exp` is already expired.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            lifetime_hours: settings.expiration_hours,
        }
    }

    /// Mints a token for `user`, valid from now for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = Duration::try_hours(self.lifetime_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(TokenError::LifetimeOutOfRange(self.lifetime_hours))?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encoding)?;
        debug!("issued token for user {}", user.id);
        Ok(token)
    }

    /// Verifies `token` and returns its claims.
    ///
    /// Checks run in order: empty input, structure, signature, issuer and
    /// audience, expiry with zero skew, then the subject's format.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::EmptyInput);
        }

        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;

        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        claims.user_id()?;
        Ok(claims)
    }

    /// Verifies `token` and returns the identity id it was issued for.
    pub fn validate(&self, token: &str) -> Result<Uuid, TokenError> {
        self.decode(token)?.user_id()
    }
}
