use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::OffsetDateTime;
use tracing::debug;

use super::claims::{Claims, Subject, TokenError};
use crate::{config::JwtConfig, state::AppState};

/// Signing and verification keys, built once from configuration.
/// Rotating the secret invalidates every outstanding token.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::new(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            ttl: Duration::from_secs(cfg.ttl_seconds.max(0) as u64),
        }
    }

    pub fn issue(&self, user_id: i64) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            iat: now as usize,
            exp: (now + self.ttl.as_secs() as i64) as usize,
            data: Subject { id: user_id },
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    /// Verify signature and expiry, returning the subject id.
    /// Expiry is compared exactly against server time, no leeway.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })?;
        debug!(user_id = data.claims.data.id, "jwt verified");
        Ok(data.claims.data.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, ttl_seconds: i64) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            ttl_seconds,
        })
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", 3600);
        let token = keys.issue(42).expect("issue token");
        assert_eq!(keys.verify(&token), Ok(42));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let keys = make_keys("secret-a", 3600);
        let other = make_keys("secret-b", 3600);
        let token = keys.issue(42).expect("issue token");
        assert_eq!(other.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret", 3600);
        assert_eq!(keys.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(keys.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret", 3600);
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            iat: (now - 7200) as usize,
            exp: (now - 3600) as usize,
            data: Subject { id: 7 },
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn verify_rejects_token_without_subject() {
        let keys = make_keys("dev-secret", 3600);
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let bare = serde_json::json!({ "iat": now, "exp": now + 3600 });
        let token = encode(&Header::default(), &bare, &keys.encoding).expect("encode");
        assert_eq!(keys.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn claims_wire_shape_is_preserved() {
        let claims = Claims {
            iat: 1,
            exp: 2,
            data: Subject { id: 7 },
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"iat": 1, "exp": 2, "data": {"id": 7}})
        );
    }
}
