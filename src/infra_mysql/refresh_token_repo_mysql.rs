use super::util::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Duration, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlRefreshTokenRepo {
    pool: MySqlPool,
}

impl MySqlRefreshTokenRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRefreshTokenRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<RefreshTokenRecord, StoreError> {
        let corrupt = |e: sqlx::Error| StoreError::Corrupt(e.to_string());

        let token: String = row.try_get("token").map_err(corrupt)?;
        let user_id_bytes: Vec<u8> = row.try_get("user_id").map_err(corrupt)?;
        let created_at: DateTime<Utc> = row.try_get("created_at").map_err(corrupt)?;
        let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(corrupt)?;
        let expires_at: DateTime<Utc> = row.try_get("expires_at").map_err(corrupt)?;
        let revoked_at: Option<DateTime<Utc>> = row.try_get("revoked_at").map_err(corrupt)?;

        Ok(RefreshTokenRecord {
            token: RefreshTokenValue(token),
            user_id: uid_from_bytes(&user_id_bytes)?,
            created_at,
            updated_at,
            expires_at,
            revoked_at,
        })
    }
}

#[async_trait::async_trait]
impl RefreshTokenRepo for MySqlRefreshTokenRepo {
    async fn create(
        &self,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<RefreshTokenRecord, StoreError> {
        let record = RefreshTokenRecord::issue(user_id, Utc::now(), ttl);

        sqlx::query(
            r#"
INSERT INTO refresh_token (token, user_id, created_at, updated_at, expires_at, revoked_at)
VALUES (?, ?, ?, ?, ?, NULL)
"#,
        )
        .bind(record.token.as_str())
        .bind(uid_as_bytes(&record.user_id))
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(record)
    }

    async fn find(&self, token: &str) -> Result<RefreshTokenRecord, StoreError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT token, user_id, created_at, updated_at, expires_at, revoked_at
FROM refresh_token
WHERE token = ?
"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row_opt
            .map(Self::row_to_record)
            .unwrap_or(Err(StoreError::NotFound))
    }

    async fn revoke(&self, token: &str) -> Result<(), StoreError> {
        let now = Utc::now();

        // First revocation wins; repeats match no rows.
        sqlx::query(
            r#"
UPDATE refresh_token
SET revoked_at = ?, updated_at = ?
WHERE token = ? AND revoked_at IS NULL
"#,
        )
        .bind(now)
        .bind(now)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }
}
