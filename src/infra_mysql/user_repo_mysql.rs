use super::util::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    fn row_to_identity(row: MySqlRow) -> Result<UserIdentity, StoreError> {
        let corrupt = |e: sqlx::Error| StoreError::Corrupt(e.to_string());

        let user_id_bytes: Vec<u8> = row.try_get("user_id").map_err(corrupt)?;
        let email: String = row.try_get("email").map_err(corrupt)?;
        let nickname: String = row.try_get("nickname").map_err(corrupt)?;
        let hashed_password: String = row.try_get("hashed_password").map_err(corrupt)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(corrupt)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(corrupt)?;

        Ok(UserIdentity {
            user: User {
                id: uid_from_bytes(&user_id_bytes)?,
                email,
                nickname,
                created_at,
                updated_at,
            },
            hashed_password,
        })
    }

    fn found(row_opt: Option<MySqlRow>) -> Result<UserIdentity, StoreError> {
        row_opt
            .map(Self::row_to_identity)
            .unwrap_or(Err(StoreError::NotFound))
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create(&self, user: NewUser) -> Result<UserIdentity, StoreError> {
        let now = Utc::now();

        sqlx::query(
            r#"
INSERT INTO user (user_id, email, nickname, hashed_password, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(uid_as_bytes(&user.id))
        .bind(&user.email)
        .bind(&user.nickname)
        .bind(&user.hashed_password)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(UserIdentity {
            user: User {
                id: user.id,
                email: user.email,
                nickname: user.nickname,
                created_at: now,
                updated_at: now,
            },
            hashed_password: user.hashed_password,
        })
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<UserIdentity, StoreError> {
        let row_opt = sqlx::query(
            r#"
SELECT user_id, email, nickname, hashed_password, created_at, updated_at
FROM user
WHERE user_id = ?
"#,
        )
        .bind(uid_as_bytes(&user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Self::found(row_opt)
    }

    async fn find_by_email(&self, email: &str) -> Result<UserIdentity, StoreError> {
        let row_opt = sqlx::query(
            r#"
SELECT user_id, email, nickname, hashed_password, created_at, updated_at
FROM user
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        Self::found(row_opt)
    }

    async fn update(
        &self,
        user_id: UserId,
        changes: UserChanges,
    ) -> Result<UserIdentity, StoreError> {
        let result = sqlx::query(
            r#"
UPDATE user
SET email = ?, nickname = ?, hashed_password = ?, updated_at = ?
WHERE user_id = ?
"#,
        )
        .bind(&changes.email)
        .bind(&changes.nickname)
        .bind(&changes.hashed_password)
        .bind(Utc::now())
        .bind(uid_as_bytes(&user_id))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        self.find_by_id(user_id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let _: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }
}
