use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<UserId, UserIdentity>,
    email_index: DashMap<String, UserId>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, user: NewUser) -> Result<UserIdentity, StoreError> {
        match self.email_index.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(StoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }

        let now = Utc::now();
        let identity = UserIdentity {
            user: User {
                id: user.id,
                email: user.email,
                nickname: user.nickname,
                created_at: now,
                updated_at: now,
            },
            hashed_password: user.hashed_password,
        };
        self.users.insert(user.id, identity.clone());
        Ok(identity)
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<UserIdentity, StoreError> {
        self.users
            .get(&user_id)
            .map(|identity| identity.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<UserIdentity, StoreError> {
        let user_id = *self.email_index.get(email).ok_or(StoreError::NotFound)?;
        self.find_by_id(user_id).await
    }

    async fn update(
        &self,
        user_id: UserId,
        changes: UserChanges,
    ) -> Result<UserIdentity, StoreError> {
        let current = self.find_by_id(user_id).await?;

        if changes.email != current.user.email {
            match self.email_index.entry(changes.email.clone()) {
                Entry::Occupied(_) => return Err(StoreError::Duplicate),
                Entry::Vacant(slot) => {
                    slot.insert(user_id);
                }
            }
            self.email_index.remove(&current.user.email);
        }

        let mut entry = self.users.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        entry.user.email = changes.email;
        entry.user.nickname = changes.nickname;
        entry.user.updated_at = Utc::now();
        entry.hashed_password = changes.hashed_password;
        Ok(entry.value().clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            id: UserId::new_v4(),
            email: email.to_string(),
            nickname: "nick".to_string(),
            hashed_password: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn email_is_unique() {
        let repo = MemoryUserRepo::new();
        repo.create(new_user("a@example.com")).await.unwrap();
        let result = repo.create(new_user("a@example.com")).await;
        assert!(matches!(result, Err(StoreError::Duplicate)));
    }

    #[tokio::test]
    async fn update_moves_email_index() {
        let repo = MemoryUserRepo::new();
        let created = repo.create(new_user("a@example.com")).await.unwrap();

        repo.update(
            created.id(),
            UserChanges {
                email: "b@example.com".to_string(),
                nickname: "nick".to_string(),
                hashed_password: "hash".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(matches!(
            repo.find_by_email("a@example.com").await,
            Err(StoreError::NotFound)
        ));
        let found = repo.find_by_email("b@example.com").await.unwrap();
        assert_eq!(found.id(), created.id());
    }
}
