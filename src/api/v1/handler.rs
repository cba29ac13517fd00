use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::server::RefreshCookie;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{self, reject};

const SET_COOKIE: &str = "set-cookie";

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

/// Mutations report affected rows; zero means the target vanished in between.
fn affected(count: u64) -> Result<impl warp::Reply, warp::Rejection> {
    if count == 0 {
        return Err(reject::custom(ApiErrorCode::NotFound));
    }
    Ok(warp::reply::json(&ApiResponse::ok(CountResponse { count })))
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

// region auth

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub access_token_type: &'static str,
    pub access_token_expire_time: DateTime<Utc>,
}

impl From<IssuedToken> for AccessTokenResponse {
    fn from(token: IssuedToken) -> Self {
        AccessTokenResponse {
            access_token: token.token,
            access_token_type: "Bearer",
            access_token_expire_time: token.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: AccessTokenResponse,
    pub user: CurrentUser,
}

/// Caller address and agent as seen by the login route.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
}

pub async fn login(
    body: LoginRequest,
    client: ClientInfo,
    login_limiter: Arc<dyn RateLimiter>,
    auth_service: Arc<dyn AuthService>,
    cookie: RefreshCookie,
) -> Result<impl warp::Reply, warp::Rejection> {
    login_limiter
        .hit(&client.ip)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let login_input = LoginInput {
        username: body.username,
        password: body.password,
        ip: client.ip,
        user_agent: client.user_agent,
    };
    let login_result = auth_service
        .login(login_input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let set_cookie = cookie.set(&login_result.refresh.token);
    let login_response = LoginResponse {
        token: login_result.access.into(),
        user: login_result.user,
    };
    let reply = warp::reply::json(&ApiResponse::ok(login_response));
    Ok(warp::reply::with_header(reply, SET_COOKIE, set_cookie))
}

pub async fn new_token(
    context: RequestContext,
    auth_service: Arc<dyn AuthService>,
    cookie: RefreshCookie,
) -> Result<impl warp::Reply, warp::Rejection> {
    let pair = auth_service
        .refresh(&context, context.refresh_token.as_deref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let set_cookie = cookie.set(&pair.refresh.token);
    let response = AccessTokenResponse::from(pair.access);
    let reply = warp::reply::json(&ApiResponse::ok(response));
    Ok(warp::reply::with_header(reply, SET_COOKIE, set_cookie))
}

pub async fn logout(
    context: RequestContext,
    auth_service: Arc<dyn AuthService>,
    cookie: RefreshCookie,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_service
        .logout(&context)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let reply = warp::reply::json(&ApiResponse::ok(()));
    Ok(warp::reply::with_header(reply, SET_COOKIE, cookie.clear()))
}

// endregion

// region users

pub async fn me(context: RequestContext) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&ApiResponse::ok(context.user)))
}

#[derive(Debug, Deserialize)]
pub struct AddUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub is_multi_login: bool,
}

pub async fn add_user(
    body: AddUserRequest,
    context: RequestContext,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = AddUserInput {
        username: body.username,
        password: body.password,
        email: body.email,
        is_superuser: body.is_superuser,
        is_multi_login: body.is_multi_login,
    };
    let user = user_service
        .add(Actor::User(&context.user), input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

pub async fn reset_password(
    body: ResetPasswordRequest,
    context: RequestContext,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = ResetPasswordInput {
        old_password: body.old_password,
        new_password: body.new_password,
        confirm_password: body.confirm_password,
    };
    let count = user_service
        .reset_password(&context, input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    affected(count)
}

pub async fn get_user(
    username: String,
    _context: RequestContext,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user = user_service
        .get_userinfo(&username)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(user)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    pub email: String,
}

pub async fn update_user(
    username: String,
    body: UpdateUserRequest,
    context: RequestContext,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = ProfileInput {
        username: body.username,
        email: body.email,
    };
    let count = user_service
        .update_profile(&context, &username, input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    affected(count)
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub url: String,
}

pub async fn update_avatar(
    username: String,
    body: AvatarRequest,
    context: RequestContext,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let count = user_service
        .update_avatar(&context, &username, &body.url)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    affected(count)
}

/// Which per-user flag a `PUT /sys/users/{pk}/...` call flips.
#[derive(Debug, Clone, Copy)]
pub enum UserFlag {
    Superuser,
    Status,
    MultiLogin,
}

pub async fn toggle_flag(
    pk: i64,
    flag: UserFlag,
    context: RequestContext,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let target = UserId(pk);
    let count = match flag {
        UserFlag::Superuser => user_service.toggle_superuser(&context, target).await,
        UserFlag::Status => user_service.toggle_status(&context, target).await,
        UserFlag::MultiLogin => user_service.toggle_multi_login(&context, target).await,
    }
    .map_err(ApiErrorCode::from)
    .map_err(reject::custom)?;
    affected(count)
}

pub async fn delete_user(
    username: String,
    context: RequestContext,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let count = user_service
        .delete(&context, &username)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    affected(count)
}

// endregion

// region hunt

#[derive(Debug, Deserialize)]
pub struct HintRequest {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

pub async fn hints(
    body: HintRequest,
    _context: RequestContext,
    hint_service: Arc<dyn HintService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let hints = hint_service
        .hints(body.x, body.y, body.direction)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&ApiResponse::ok(hints)))
}

// endregion
