use super::error::*;
use crate::application_port::*;
use crate::domain_model::{User, UserId};
use crate::server::Server;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::{HeaderMap, StatusCode};
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub nickname: String,
    pub password: String,
}

pub async fn register(
    body: RegisterRequest,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let register_input = RegisterInput {
        email: body.email,
        nickname: body.nickname,
        password: body.password,
    };
    let user = user_service
        .register(register_input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(user)),
        StatusCode::CREATED,
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub email: String,
    pub nickname: String,
    pub password: String,
}

pub async fn update_user(
    target: UserId,
    caller: UserId,
    body: UpdateUserRequest,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if target != caller {
        return Err(reject::custom(ApiErrorCode::Unauthorized));
    }

    let update_input = UpdateInput {
        email: body.email,
        nickname: body.nickname,
        password: body.password,
    };
    let user = user_service
        .update(caller, update_input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

pub async fn me(
    caller: UserId,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = user_service
        .find_by_id(caller)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: AccessToken,
    pub token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
}

pub async fn login(
    body: LoginRequest,
    user_service: Arc<dyn UserService>,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let identity = user_service
        .verify_credentials(&body.email, &body.password)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let login_result = session_service
        .login(&identity)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let login_response = LoginResponse {
        user: login_result.user,
        token: login_result.access_token,
        token_expires_at: login_result.access_token_expires_at,
        refresh_token: login_result.refresh_token.0,
        refresh_token_expires_at: login_result.refresh_token_expires_at,
    };

    Ok(warp::reply::json(&ApiResponse::ok(login_response)))
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: AccessToken,
}

pub async fn refresh(
    headers: HeaderMap,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let token = session_service
        .refresh(&headers)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(RefreshResponse { token })))
}

pub async fn revoke(
    headers: HeaderMap,
    session_service: Arc<dyn SessionService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    session_service.revoke(&headers).await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health(server: Arc<Server>) -> Result<impl warp::Reply, warp::Rejection> {
    server
        .health()
        .await
        .map_err(ApiErrorCode::internal)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(HealthResponse {
        status: "up",
    })))
}
