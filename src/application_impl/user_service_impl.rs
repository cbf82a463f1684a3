use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

pub struct RealUserService {
    user_repo: Arc<dyn UserRepo>,
    credential_hasher: Arc<dyn CredentialHasher>,
}

impl RealUserService {
    pub fn new(
        user_repo: Arc<dyn UserRepo>,
        credential_hasher: Arc<dyn CredentialHasher>,
    ) -> RealUserService {
        RealUserService {
            user_repo,
            credential_hasher,
        }
    }

    fn validate_register(request: &RegisterInput) -> Result<(), UserError> {
        if request.email.is_empty() || request.nickname.is_empty() || request.password.is_empty()
        {
            return Err(UserError::Validation(
                "email, password and nickname are mandatory fields".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn register(&self, request: RegisterInput) -> Result<User, UserError> {
        Self::validate_register(&request)?;

        match self.user_repo.find_by_email(&request.email).await {
            Ok(_) => return Err(UserError::EmailTaken),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(UserError::Store(e)),
        }

        let hashed_password = self
            .credential_hasher
            .hash_password(&request.password)
            .await?;

        let identity = self
            .user_repo
            .create(NewUser {
                id: UserId::new_v4(),
                email: request.email,
                nickname: request.nickname,
                hashed_password,
            })
            .await?;

        info!(user_id = %identity.id(), "user registered");
        Ok(identity.user)
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserIdentity, UserError> {
        let identity = match self.user_repo.find_by_email(email).await {
            Ok(identity) => identity,
            Err(StoreError::NotFound) => return Err(UserError::InvalidCredentials),
            Err(e) => return Err(UserError::Store(e)),
        };

        self.credential_hasher
            .verify_password(&identity.hashed_password, password)
            .await?;

        Ok(identity)
    }

    async fn update(&self, user_id: UserId, request: UpdateInput) -> Result<User, UserError> {
        let current = self.user_repo.find_by_id(user_id).await?;

        let hashed_password = if request.password.is_empty() {
            current.hashed_password
        } else {
            self.credential_hasher
                .hash_password(&request.password)
                .await?
        };

        let changes = UserChanges {
            email: if request.email.is_empty() {
                current.user.email
            } else {
                request.email
            },
            nickname: if request.nickname.is_empty() {
                current.user.nickname
            } else {
                request.nickname
            },
            hashed_password,
        };

        let updated = self.user_repo.update(user_id, changes).await?;
        Ok(updated.user)
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<User, UserError> {
        let identity = self.user_repo.find_by_id(user_id).await?;
        Ok(identity.user)
    }
}
