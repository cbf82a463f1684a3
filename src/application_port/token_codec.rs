use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token uses an unexpected algorithm")]
    UnexpectedAlgorithm,
    #[error("token expired")]
    Expired,
    #[error("token subject is not a valid user id")]
    MalformedSubject,
    #[error("token is malformed")]
    Malformed,
    #[error("signing error: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

pub trait TokenCodec: Send + Sync {
    fn issue_access_token(&self, subject: UserId) -> Result<IssuedAccessToken, TokenError>;
    fn verify_access_token(&self, token: &str) -> Result<UserId, TokenError>;
}
