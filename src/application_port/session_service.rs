use crate::application_port::AccessToken;
use crate::domain_model::{RefreshTokenValue, User, UserId, UserIdentity};
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};
use warp::http::HeaderMap;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Missing, unknown, expired or revoked credential.
    #[error("unauthorized")]
    Unauthorized,
    #[error("token_issuance_failed: {0}")]
    TokenIssuanceFailed(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: User,
    pub access_token: AccessToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: RefreshTokenValue,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    /// Caller must have verified the password already.
    async fn login(&self, identity: &UserIdentity) -> Result<LoginResult, SessionError>;
    /// Mint a new access token from the refresh token in the bearer header.
    async fn refresh(&self, headers: &HeaderMap) -> Result<AccessToken, SessionError>;
    /// Best effort; never fails from the caller's point of view.
    async fn revoke(&self, headers: &HeaderMap);
    /// Resolve the subject of the bearer access token.
    fn authenticate(&self, headers: &HeaderMap) -> Result<UserId, SessionError>;
}
