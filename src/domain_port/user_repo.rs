use crate::domain_model::*;
use crate::domain_port::StoreError;

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// `StoreError::Duplicate` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<UserIdentity, StoreError>;

    async fn find_by_id(&self, user_id: UserId) -> Result<UserIdentity, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<UserIdentity, StoreError>;

    async fn update(
        &self,
        user_id: UserId,
        changes: UserChanges,
    ) -> Result<UserIdentity, StoreError>;

    /// Round trip to the backing store.
    async fn ping(&self) -> Result<(), StoreError>;
}
