/// Session token issuance and verification.
///
/// Tokens are signed with HS256 using a single server-held secret. The
/// embedded claims are a snapshot taken at issuance: role or ban changes
/// after issuance are not reflected until the token is reissued, which is
/// an accepted staleness window. Only `GET /api/auth/me` reconciles claims
/// with the current database state.
///
/// Keys are loaded once at startup and immutable thereafter; OnceCell
/// ensures thread-safe initialization without runtime locks.
use crate::error::AppError;
use crate::models::Role;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;
const MIN_SECRET_LEN: usize = 32;

static JWT_ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static JWT_DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

/// Identity claims embedded in every session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Username at issuance
    pub username: String,
    /// Email at issuance
    pub email: String,
    /// Role at issuance
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Why a token failed verification
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    #[error("Token is invalid or malformed")]
    Malformed,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("JWT keys not initialized")]
    NotInitialized,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired { expired_at } => AppError::TokenExpired { expired_at },
            TokenError::Malformed => {
                AppError::Unauthorized("Token is invalid or malformed".to_string())
            }
            TokenError::InvalidSignature => {
                AppError::Unauthorized("Token signature is invalid".to_string())
            }
            TokenError::NotInitialized => {
                AppError::Internal("JWT keys not initialized".to_string())
            }
        }
    }
}

/// Initialize signing keys from the configured secret.
///
/// Must be called during startup before any token operation; can only be
/// called once.
pub fn initialize_keys(secret: &str) -> anyhow::Result<()> {
    if secret.len() < MIN_SECRET_LEN {
        anyhow::bail!("JWT secret too short - minimum {MIN_SECRET_LEN} bytes required");
    }

    JWT_ENCODING_KEY
        .set(EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|_| anyhow::anyhow!("JWT encoding key already initialized"))?;

    JWT_DECODING_KEY
        .set(DecodingKey::from_secret(secret.as_bytes()))
        .map_err(|_| anyhow::anyhow!("JWT decoding key already initialized"))?;

    Ok(())
}

/// Issue a signed session token for a user.
pub fn issue_token(
    user_id: Uuid,
    username: &str,
    email: &str,
    role: Role,
    expiry_days: i64,
) -> Result<String, TokenError> {
    let now = Utc::now();
    let exp = now + Duration::days(expiry_days);
    issue_token_at(user_id, username, email, role, now.timestamp(), exp.timestamp())
}

fn issue_token_at(
    user_id: Uuid,
    username: &str,
    email: &str,
    role: Role,
    iat: i64,
    exp: i64,
) -> Result<String, TokenError> {
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        role,
        iat,
        exp,
    };

    let encoding_key = JWT_ENCODING_KEY.get().ok_or(TokenError::NotInitialized)?;
    encode(&Header::new(JWT_ALGORITHM), &claims, encoding_key)
        .map_err(|_| TokenError::Malformed)
}

/// Verify a token's signature and expiry, returning the embedded claims.
///
/// Failure kinds are distinguished so the HTTP layer can tell clients
/// whether to re-authenticate (expired) or fix the request (malformed,
/// bad signature). An expired token's original expiry is recovered from
/// the payload, which is safe because expiry is only reported after the
/// signature has validated.
pub fn verify_token(token: &str) -> Result<Claims, TokenError> {
    let decoding_key = JWT_DECODING_KEY.get().ok_or(TokenError::NotInitialized)?;

    let validation = Validation::new(JWT_ALGORITHM);

    match decode::<Claims>(token, decoding_key, &validation) {
        Ok(token_data) => Ok(token_data.claims),
        Err(err) => match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                let mut lenient = Validation::new(JWT_ALGORITHM);
                lenient.validate_exp = false;

                let expired_at = decode::<Claims>(token, decoding_key, &lenient)
                    .ok()
                    .and_then(|data| Utc.timestamp_opt(data.claims.exp, 0).single())
                    .ok_or(TokenError::Malformed)?;

                Err(TokenError::Expired { expired_at })
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => Err(TokenError::InvalidSignature),
            _ => Err(TokenError::Malformed),
        },
    }
}

#[cfg(test)]
pub fn initialize_test_keys() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        initialize_keys("test-only-jwt-secret-0123456789abcdef")
            .expect("failed to initialize test keys");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        initialize_test_keys();

        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, "alice", "alice@example.com", Role::User, 7)
            .expect("should issue token");

        let claims = verify_token(&token).expect("should verify");
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Role::User);
        assert!(!claims.is_admin());
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_admin_claims() {
        initialize_test_keys();

        let token = issue_token(Uuid::new_v4(), "root", "root@example.com", Role::Admin, 7)
            .expect("should issue token");

        let claims = verify_token(&token).expect("should verify");
        assert!(claims.is_admin());
    }

    #[test]
    fn test_expired_token_reports_original_expiry() {
        initialize_test_keys();

        let now = Utc::now();
        let exp = now - Duration::hours(2);
        let token = issue_token_at(
            Uuid::new_v4(),
            "alice",
            "alice@example.com",
            Role::User,
            (now - Duration::days(7)).timestamp(),
            exp.timestamp(),
        )
        .expect("should issue token");

        match verify_token(&token) {
            Err(TokenError::Expired { expired_at }) => {
                assert_eq!(expired_at.timestamp(), exp.timestamp());
            }
            other => panic!("expected expired error, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        initialize_test_keys();

        assert_eq!(verify_token("not.a.token"), Err(TokenError::Malformed));
        assert_eq!(verify_token(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_tampered_payload_fails_signature() {
        initialize_test_keys();

        let token = issue_token(Uuid::new_v4(), "alice", "alice@example.com", Role::User, 7)
            .expect("should issue token");

        // Swap a character inside the payload segment
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let payload = parts[1].clone();
        let flipped = if payload.starts_with('a') {
            format!("b{}", &payload[1..])
        } else {
            format!("a{}", &payload[1..])
        };
        parts[1] = flipped;
        let tampered = parts.join(".");

        match verify_token(&tampered) {
            Err(TokenError::InvalidSignature) | Err(TokenError::Malformed) => {}
            other => panic!("expected verification failure, got {:?}", other),
        }
    }
}
