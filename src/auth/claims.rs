use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claim set carried by every bearer token. The wire shape
/// `{iat, exp, data: {id}}` is what the existing frontend decodes,
/// so it must not change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iat: usize,
    pub exp: usize,
    pub data: Subject,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
}

/// Why a token failed verification. Callers branch on this instead of
/// catching exceptions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("bad signature")]
    BadSignature,
}
