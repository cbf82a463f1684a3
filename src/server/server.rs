use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::settings::Settings;
use chrono::Duration;
use secrecy::{ExposeSecret, SecretSlice};
use sqlx::MySqlPool;
use std::sync::Arc;

/// Long-lived service graph shared by every request. Holds no per-request state.
pub struct Server {
    pub user_service: Arc<dyn UserService>,
    pub session_service: Arc<dyn SessionService>,
    user_repo: Arc<dyn UserRepo>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let (user_repo, refresh_token_repo, pool): (
            Arc<dyn UserRepo>,
            Arc<dyn RefreshTokenRepo>,
            Option<MySqlPool>,
        ) = match settings.store.backend.as_str() {
            "memory" => {
                warn!("using in-memory store; all accounts and sessions are lost on exit");
                let user_repo: Arc<dyn UserRepo> = Arc::new(MemoryUserRepo::new());
                let refresh_token_repo: Arc<dyn RefreshTokenRepo> =
                    Arc::new(MemoryRefreshTokenRepo::new());
                (user_repo, refresh_token_repo, None)
            }
            "mysql" => {
                let dsn = settings
                    .store
                    .dsn
                    .as_ref()
                    .map(|dsn| dsn.expose_secret())
                    .ok_or_else(|| anyhow::anyhow!("store.dsn is required for mysql"))?;
                let pool = MySqlPool::connect(dsn).await?;
                let user_repo: Arc<dyn UserRepo> = Arc::new(MySqlUserRepo::new(pool.clone()));
                let refresh_token_repo: Arc<dyn RefreshTokenRepo> =
                    Arc::new(MySqlRefreshTokenRepo::new(pool.clone()));
                (user_repo, refresh_token_repo, Some(pool))
            }
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let signing_key: SecretSlice<u8> = settings
            .auth
            .signing_secret
            .expose_secret()
            .as_bytes()
            .to_vec()
            .into();
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(
            signing_key,
            Duration::seconds(settings.auth.access_ttl_secs),
        ));
        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);

        let session_service: Arc<dyn SessionService> = Arc::new(RealSessionService::new(
            token_codec,
            refresh_token_repo,
            Duration::days(settings.auth.refresh_ttl_days),
        ));
        let user_service: Arc<dyn UserService> =
            Arc::new(RealUserService::new(user_repo.clone(), credential_hasher));

        info!(backend = %settings.store.backend, "server started");

        Ok(Self {
            user_service,
            session_service,
            user_repo,
            pool,
        })
    }

    pub async fn health(&self) -> Result<(), StoreError> {
        self.user_repo.ping().await
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
            info!("database pool closed");
        }
    }
}
