use crate::domain_model::*;
use crate::domain_port::StoreError;
use chrono::Duration;

/// Persistence of opaque refresh tokens. Every method may suspend on I/O;
/// dropping the returned future abandons the call.
#[async_trait::async_trait]
pub trait RefreshTokenRepo: Send + Sync {
    /// Generate and persist a new token for `user_id`, valid for `ttl`.
    /// A value collision surfaces as `StoreError::Duplicate` and is not retried.
    async fn create(
        &self,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<RefreshTokenRecord, StoreError>;

    /// `StoreError::NotFound` when no record carries `token`.
    async fn find(&self, token: &str) -> Result<RefreshTokenRecord, StoreError>;

    /// Soft revoke. Unknown or already revoked tokens are a no-op success.
    async fn revoke(&self, token: &str) -> Result<(), StoreError>;
}
