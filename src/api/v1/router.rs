use super::error::*;
use super::handler::{self, ClientInfo, UserFlag};
use crate::application_port::*;
use crate::domain_model::RequestContext;
use crate::server::*;
use nanoid::nanoid;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::filters::path::FullPath;
use warp::http::Method;
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let authenticated = with_context(
        server.identity_resolver.clone(),
        server.refresh_cookie.clone(),
    );

    // region auth
    let login = warp::post()
        .and(warp::path!("auth" / "login"))
        .and(warp::body::json())
        .and(client_info())
        .and(with(server.login_limiter.clone()))
        .and(with(server.auth_service.clone()))
        .and(with_value(server.refresh_cookie.clone()))
        .and_then(handler::login);

    let new_token = warp::post()
        .and(warp::path!("auth" / "token" / "new"))
        .and(authenticated.clone())
        .and(with(server.auth_service.clone()))
        .and(with_value(server.refresh_cookie.clone()))
        .and_then(handler::new_token);

    let logout = warp::post()
        .and(warp::path!("auth" / "logout"))
        .and(authenticated.clone())
        .and(with(server.auth_service.clone()))
        .and(with_value(server.refresh_cookie.clone()))
        .and_then(handler::logout);
    // endregion

    // region users
    let me = warp::get()
        .and(warp::path!("sys" / "users" / "me"))
        .and(authenticated.clone())
        .and_then(handler::me);

    let add_user = warp::post()
        .and(warp::path!("sys" / "users" / "add"))
        .and(warp::body::json())
        .and(authenticated.clone())
        .and(with(server.user_service.clone()))
        .and_then(handler::add_user);

    let reset_password = warp::post()
        .and(warp::path!("sys" / "users" / "password" / "reset"))
        .and(warp::body::json())
        .and(authenticated.clone())
        .and(with(server.user_service.clone()))
        .and_then(handler::reset_password);

    let get_user = warp::get()
        .and(warp::path!("sys" / "users" / String))
        .and(authenticated.clone())
        .and(with(server.user_service.clone()))
        .and_then(handler::get_user);

    let update_user = warp::put()
        .and(warp::path!("sys" / "users" / String))
        .and(warp::body::json())
        .and(authenticated.clone())
        .and(with(server.user_service.clone()))
        .and_then(handler::update_user);

    let update_avatar = warp::put()
        .and(warp::path!("sys" / "users" / String / "avatar"))
        .and(warp::body::json())
        .and(authenticated.clone())
        .and(with(server.user_service.clone()))
        .and_then(handler::update_avatar);

    let toggle_super = toggle(
        "super",
        UserFlag::Superuser,
        authenticated.clone(),
        server.user_service.clone(),
    );
    let toggle_status = toggle(
        "status",
        UserFlag::Status,
        authenticated.clone(),
        server.user_service.clone(),
    );
    let toggle_multi = toggle(
        "multi",
        UserFlag::MultiLogin,
        authenticated.clone(),
        server.user_service.clone(),
    );

    let delete_user = warp::delete()
        .and(warp::path!("sys" / "users" / String))
        .and(authenticated.clone())
        .and(with(server.user_service.clone()))
        .and_then(handler::delete_user);
    // endregion

    let hints = warp::post()
        .and(warp::path!("hunt" / "hints"))
        .and(warp::body::json())
        .and(authenticated)
        .and(with(server.hint_service.clone()))
        .and_then(handler::hints);

    demo_guard(server.demo_guard.clone()).and(
        login
            .or(new_token)
            .or(logout)
            .or(me)
            .or(add_user)
            .or(reset_password)
            .or(get_user)
            .or(update_user)
            .or(update_avatar)
            .or(toggle_super)
            .or(toggle_status)
            .or(toggle_multi)
            .or(delete_user)
            .or(hints),
    )
}

fn toggle<T>(
    segment: &'static str,
    flag: UserFlag,
    authenticated: T,
    user_service: Arc<dyn UserService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone + use<T>
where
    T: Filter<Extract = (RequestContext,), Error = warp::Rejection> + Clone + Send + Sync + 'static,
{
    warp::put()
        .and(warp::path("sys"))
        .and(warp::path("users"))
        .and(warp::path::param::<i64>())
        .and(warp::path(segment))
        .and(warp::path::end())
        .and(with_value(flag))
        .and(authenticated)
        .and(with(user_service))
        .and_then(handler::toggle_flag)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_value<T>(value: T) -> impl Filter<Extract = (T,), Error = Infallible> + Clone
where
    T: Clone + Send + Sync + 'static,
{
    warp::any().map(move || value.clone())
}

/// Bearer header to a resolved [`RequestContext`]. Every failure surfaces as the
/// same `Unauthenticated` code.
fn with_context(
    identity_resolver: Arc<dyn IdentityResolver>,
    refresh_cookie: RefreshCookie,
) -> impl Filter<Extract = (RequestContext,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::header::optional::<String>("cookie"))
        .and_then(move |authorization: Option<String>, cookies: Option<String>| {
            let identity_resolver = identity_resolver.clone();
            let refresh_cookie = refresh_cookie.clone();
            async move {
                let token = authorization
                    .as_deref()
                    .and_then(|value| value.strip_prefix("Bearer "))
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .ok_or_else(|| reject::custom(ApiErrorCode::Unauthenticated))?;
                let user = identity_resolver
                    .resolve(token)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                Ok::<_, warp::Rejection>(RequestContext {
                    request_id: nanoid!(12),
                    user,
                    access_token: token.to_string(),
                    refresh_token: cookies.as_deref().and_then(|c| refresh_cookie.read(c)),
                })
            }
        })
}

/// First `X-Forwarded-For` hop, else the peer address, else `unknown`.
fn client_info() -> impl Filter<Extract = (ClientInfo,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("x-forwarded-for")
        .and(warp::addr::remote())
        .and(warp::header::optional::<String>("user-agent"))
        .map(
            |forwarded: Option<String>, remote: Option<SocketAddr>, user_agent: Option<String>| {
                let ip = forwarded
                    .as_deref()
                    .and_then(|value| value.split(',').next())
                    .map(str::trim)
                    .filter(|hop| !hop.is_empty())
                    .map(str::to_string)
                    .or_else(|| remote.map(|addr| addr.ip().to_string()))
                    .unwrap_or_else(|| "unknown".to_string());
                ClientInfo {
                    ip,
                    user_agent: user_agent.unwrap_or_default(),
                }
            },
        )
}

fn demo_guard(guard: DemoGuard) -> impl Filter<Extract = (), Error = warp::Rejection> + Clone {
    warp::method()
        .and(warp::path::full())
        .and_then(move |method: Method, path: FullPath| {
            let allowed = guard.allows(method.as_str(), path.as_str());
            async move {
                if allowed {
                    Ok(())
                } else {
                    Err(reject::custom(ApiErrorCode::DemoMode))
                }
            }
        })
        .untuple_one()
}
