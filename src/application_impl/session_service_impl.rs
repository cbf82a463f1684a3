use crate::application_port::*;
use crate::auth::extract_bearer;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::{Duration, Utc};
use std::sync::Arc;
use warp::http::HeaderMap;

pub const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 60;

pub struct RealSessionService {
    token_codec: Arc<dyn TokenCodec>,
    refresh_token_repo: Arc<dyn RefreshTokenRepo>,
    refresh_ttl: Duration,
}

impl RealSessionService {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        refresh_token_repo: Arc<dyn RefreshTokenRepo>,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            token_codec,
            refresh_token_repo,
            refresh_ttl,
        }
    }

    fn issue_access(&self, user_id: UserId) -> Result<IssuedAccessToken, SessionError> {
        self.token_codec.issue_access_token(user_id).map_err(|e| {
            error!(%user_id, "issuing access token: {}", e);
            SessionError::TokenIssuanceFailed(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    async fn login(&self, identity: &UserIdentity) -> Result<LoginResult, SessionError> {
        let user_id = identity.id();

        let access = self.issue_access(user_id)?;

        let refresh = self
            .refresh_token_repo
            .create(user_id, self.refresh_ttl)
            .await
            .map_err(|e| {
                error!(%user_id, "creating refresh token: {}", e);
                SessionError::TokenIssuanceFailed(e.to_string())
            })?;

        info!(%user_id, "session opened");

        Ok(LoginResult {
            user: identity.user.clone(),
            access_token: access.token,
            access_token_expires_at: access.expires_at,
            refresh_token: refresh.token,
            refresh_token_expires_at: refresh.expires_at,
        })
    }

    async fn refresh(&self, headers: &HeaderMap) -> Result<AccessToken, SessionError> {
        let token = extract_bearer(headers).map_err(|e| {
            debug!("refresh rejected: {}", e);
            SessionError::Unauthorized
        })?;

        let record = match self.refresh_token_repo.find(token).await {
            Ok(record) => record,
            Err(StoreError::NotFound) => {
                debug!("refresh rejected: unknown token");
                return Err(SessionError::Unauthorized);
            }
            Err(e) => {
                warn!("looking up refresh token: {}", e);
                return Err(SessionError::Store(e));
            }
        };

        // Expired and revoked look the same to the caller.
        if !record.is_usable_at(Utc::now()) {
            debug!(
                user_id = %record.user_id,
                revoked = record.is_revoked(),
                "refresh rejected: token no longer usable"
            );
            return Err(SessionError::Unauthorized);
        }

        let access = self.issue_access(record.user_id)?;
        Ok(access.token)
    }

    async fn revoke(&self, headers: &HeaderMap) {
        let token = match extract_bearer(headers) {
            Ok(token) => token,
            Err(e) => {
                debug!("revoke ignored: {}", e);
                return;
            }
        };

        if let Err(e) = self.refresh_token_repo.revoke(token).await {
            warn!("revoking refresh token (ignored): {}", e);
        }
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<UserId, SessionError> {
        let token = extract_bearer(headers).map_err(|e| {
            debug!("authentication rejected: {}", e);
            SessionError::Unauthorized
        })?;

        self.token_codec.verify_access_token(token).map_err(|e| {
            debug!("authentication rejected: {}", e);
            SessionError::Unauthorized
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::JwtHs256Codec;
    use crate::infra_memory::MemoryRefreshTokenRepo;
    use futures_util::future::join_all;
    use warp::http::HeaderValue;
    use warp::http::header::AUTHORIZATION;

    const SECRET: &[u8] = b"session-test-secret";

    fn identity() -> UserIdentity {
        let now = Utc::now();
        UserIdentity {
            user: User {
                id: UserId::new_v4(),
                email: "ika@example.com".to_string(),
                nickname: "ika".to_string(),
                created_at: now,
                updated_at: now,
            },
            hashed_password: "unused".to_string(),
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    fn codec() -> Arc<JwtHs256Codec> {
        Arc::new(JwtHs256Codec::new(
            SECRET.to_vec().into(),
            Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
        ))
    }

    fn new_service_with(refresh_ttl: Duration) -> (RealSessionService, Arc<MemoryRefreshTokenRepo>) {
        let repo = Arc::new(MemoryRefreshTokenRepo::new());
        let service = RealSessionService::new(codec(), repo.clone(), refresh_ttl);
        (service, repo)
    }

    fn new_service() -> (RealSessionService, Arc<MemoryRefreshTokenRepo>) {
        new_service_with(Duration::days(DEFAULT_REFRESH_TTL_DAYS))
    }

    struct FailingRepo;

    #[async_trait::async_trait]
    impl RefreshTokenRepo for FailingRepo {
        async fn create(
            &self,
            _user_id: UserId,
            _ttl: Duration,
        ) -> Result<RefreshTokenRecord, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }

        async fn find(&self, _token: &str) -> Result<RefreshTokenRecord, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }

        async fn revoke(&self, _token: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    #[tokio::test]
    async fn login_issues_access_and_refresh_pair() {
        let (service, repo) = new_service();
        let identity = identity();

        let result = service.login(&identity).await.unwrap();

        assert_eq!(result.user, identity.user);
        assert_eq!(result.refresh_token.as_str().len(), 64);
        let stored = repo.find(result.refresh_token.as_str()).await.unwrap();
        assert_eq!(stored.user_id, identity.id());
        assert!(result.refresh_token_expires_at > Utc::now() + Duration::days(59));

        let headers = bearer(result.access_token.as_str());
        assert_eq!(service.authenticate(&headers).unwrap(), identity.id());
    }

    #[tokio::test]
    async fn login_store_failure_is_issuance_failure() {
        let service = RealSessionService::new(codec(), Arc::new(FailingRepo), Duration::days(60));
        let result = service.login(&identity()).await;
        assert!(matches!(result, Err(SessionError::TokenIssuanceFailed(_))));
    }

    #[tokio::test]
    async fn refresh_mints_token_for_same_subject() {
        let (service, _repo) = new_service();
        let identity = identity();
        let login = service.login(&identity).await.unwrap();

        let access = service
            .refresh(&bearer(login.refresh_token.as_str()))
            .await
            .unwrap();

        assert_ne!(access, login.access_token);
        assert_eq!(
            service.authenticate(&bearer(access.as_str())).unwrap(),
            identity.id()
        );
    }

    #[tokio::test]
    async fn refresh_does_not_rotate_refresh_token() {
        let (service, _repo) = new_service();
        let login = service.login(&identity()).await.unwrap();
        let headers = bearer(login.refresh_token.as_str());

        service.refresh(&headers).await.unwrap();
        service.refresh(&headers).await.unwrap();
    }

    #[tokio::test]
    async fn refresh_after_revoke_is_unauthorized() {
        let (service, _repo) = new_service();
        let login = service.login(&identity()).await.unwrap();
        let headers = bearer(login.refresh_token.as_str());

        service.revoke(&headers).await;

        let result = service.refresh(&headers).await;
        assert!(matches!(result, Err(SessionError::Unauthorized)));
        // access tokens already issued stay valid until they expire
        assert!(
            service
                .authenticate(&bearer(login.access_token.as_str()))
                .is_ok()
        );
    }

    #[tokio::test]
    async fn refresh_after_expiry_is_unauthorized() {
        let (service, _repo) = new_service_with(Duration::minutes(-1));
        let login = service.login(&identity()).await.unwrap();

        let result = service.refresh(&bearer(login.refresh_token.as_str())).await;
        assert!(matches!(result, Err(SessionError::Unauthorized)));
    }

    #[tokio::test]
    async fn refresh_rejects_unknown_and_missing_tokens() {
        let (service, _repo) = new_service();

        let unknown = service.refresh(&bearer(&"0".repeat(64))).await;
        assert!(matches!(unknown, Err(SessionError::Unauthorized)));

        let missing = service.refresh(&HeaderMap::new()).await;
        assert!(matches!(missing, Err(SessionError::Unauthorized)));
    }

    #[tokio::test]
    async fn refresh_store_failure_is_store_error() {
        let service = RealSessionService::new(codec(), Arc::new(FailingRepo), Duration::days(60));
        let result = service.refresh(&bearer("abc")).await;
        assert!(matches!(result, Err(SessionError::Store(_))));
    }

    #[tokio::test]
    async fn revoke_swallows_failures() {
        let service = RealSessionService::new(codec(), Arc::new(FailingRepo), Duration::days(60));
        service.revoke(&bearer("abc")).await;
        service.revoke(&HeaderMap::new()).await;

        let (service, _repo) = new_service();
        service.revoke(&bearer("never-issued")).await;
    }

    #[tokio::test]
    async fn concurrent_refresh_yields_distinct_valid_tokens() {
        let (service, _repo) = new_service();
        let service = Arc::new(service);
        let identity = identity();
        let login = service.login(&identity).await.unwrap();
        let headers = bearer(login.refresh_token.as_str());

        let handles = (0..8).map(|_| {
            let service = service.clone();
            let headers = headers.clone();
            tokio::spawn(async move { service.refresh(&headers).await })
        });
        let tokens: Vec<AccessToken> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap().unwrap())
            .collect();

        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(
                service.authenticate(&bearer(token.as_str())).unwrap(),
                identity.id()
            );
            assert!(tokens[i + 1..].iter().all(|other| other != token));
        }
    }

    #[tokio::test]
    async fn authenticate_rejects_refresh_token_and_foreign_signature() {
        let (service, _repo) = new_service();
        let login = service.login(&identity()).await.unwrap();

        let refresh_as_access = service.authenticate(&bearer(login.refresh_token.as_str()));
        assert!(matches!(refresh_as_access, Err(SessionError::Unauthorized)));

        let foreign = crate::application_impl::issue_token(
            UserId::new_v4(),
            b"another-secret",
            Duration::hours(1),
        )
        .unwrap();
        let result = service.authenticate(&bearer(foreign.token.as_str()));
        assert!(matches!(result, Err(SessionError::Unauthorized)));
    }
}
