use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Default)]
pub struct MemoryRefreshTokenRepo {
    tokens: DashMap<String, RefreshTokenRecord>,
}

impl MemoryRefreshTokenRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RefreshTokenRepo for MemoryRefreshTokenRepo {
    async fn create(
        &self,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<RefreshTokenRecord, StoreError> {
        let record = RefreshTokenRecord::issue(user_id, Utc::now(), ttl);
        match self.tokens.entry(record.token.0.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find(&self, token: &str) -> Result<RefreshTokenRecord, StoreError> {
        self.tokens
            .get(token)
            .map(|record| record.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn revoke(&self, token: &str) -> Result<(), StoreError> {
        if let Some(mut record) = self.tokens.get_mut(token) {
            if record.revoked_at.is_none() {
                let now = Utc::now();
                record.revoked_at = Some(now);
                record.updated_at = now;
            }
        }
        Ok(())
    }
}
