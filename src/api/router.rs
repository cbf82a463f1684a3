use super::error::*;
use super::handler;
use crate::application_port::SessionService;
use crate::domain_model::UserId;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::HeaderMap;
use warp::{Filter, reject};

const CORS_METHODS: [&str; 6] = ["GET", "POST", "PUT", "DELETE", "OPTIONS", "PATCH"];
const CORS_HEADERS: [&str; 4] = ["Accept", "Authorization", "Content-Type", "X-CSRF-Token"];

/// Full application: `/api` routes, error recovery and CORS.
pub fn app(
    server: Arc<Server>,
    cors_origins: Vec<String>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("api")
        .and(routes(server))
        .recover(recover_error)
        .with(cors(&cors_origins))
}

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let register = warp::path("users")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and_then(handler::register);

    let update_user = warp::path("users")
        .and(warp::path::param::<UserId>())
        .and(warp::path::end())
        .and(warp::put())
        .and(with_verification(server.session_service.clone()))
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and_then(handler::update_user);

    let me = warp::path("me")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_verification(server.session_service.clone()))
        .and(with(server.user_service.clone()))
        .and_then(handler::me);

    let login = warp::path("login")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and(with(server.session_service.clone()))
        .and_then(handler::login);

    let refresh = warp::path("refresh")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::headers_cloned())
        .and(with(server.session_service.clone()))
        .and_then(handler::refresh);

    let revoke = warp::path("revoke")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::headers_cloned())
        .and(with(server.session_service.clone()))
        .and_then(handler::revoke);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with(server))
        .and_then(handler::health);

    register
        .or(update_user)
        .or(me)
        .or(login)
        .or(refresh)
        .or(revoke)
        .or(health)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Resolves the caller for this request only; the id travels as a filter value.
fn with_verification(
    session_service: Arc<dyn SessionService>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: HeaderMap| {
        let session_service = session_service.clone();
        async move {
            session_service
                .authenticate(&headers)
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}

fn cors(origins: &[String]) -> warp::filters::cors::Builder {
    let builder = warp::cors()
        .allow_methods(CORS_METHODS)
        .allow_headers(CORS_HEADERS);

    if origins.iter().any(|origin| origin == "*") {
        builder.allow_any_origin()
    } else {
        builder.allow_origins(origins.iter().map(String::as_str))
    }
}
