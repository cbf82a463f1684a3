use crate::application_port::CredentialError;
use crate::domain_model::{User, UserId, UserIdentity};
use crate::domain_port::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Validation(String),
    #[error("user with this email already exists")]
    EmailTaken,
    #[error("user not found")]
    NotFound,
    #[error("credential error: {0}")]
    Credential(CredentialError),
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for UserError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound => UserError::NotFound,
            StoreError::Duplicate => UserError::EmailTaken,
            other => UserError::Store(other),
        }
    }
}

impl From<CredentialError> for UserError {
    fn from(error: CredentialError) -> Self {
        match error {
            CredentialError::Mismatch => UserError::InvalidCredentials,
            other => UserError::Credential(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub email: String,
    pub nickname: String,
    pub password: String,
}

/// Empty strings mean "keep the stored value".
#[derive(Debug, Clone, Default)]
pub struct UpdateInput {
    pub email: String,
    pub nickname: String,
    pub password: String,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn register(&self, request: RegisterInput) -> Result<User, UserError>;
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, UserError>;
    async fn update(&self, user_id: UserId, request: UpdateInput) -> Result<User, UserError>;
    async fn find_by_id(&self, user_id: UserId) -> Result<User, UserError>;
}
