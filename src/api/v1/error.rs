use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::logger::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::InvalidQuery>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        ApiErrorCode::BadRequest
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::NotFound
    } else {
        ApiErrorCode::internal(format!("{:?}", err))
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Permission denied")]
    Forbidden,
    #[error("Not found")]
    NotFound,
    #[error("Already exists")]
    Conflict,
    #[error("Bad request")]
    BadRequest,
    #[error("Disabled in demo mode")]
    DemoMode,
    #[error("Too many requests, try again later")]
    TooManyRequests,
    #[error("Service temporarily unavailable")]
    ServiceUnavailable,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCredentials | ApiErrorCode::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            ApiErrorCode::Forbidden | ApiErrorCode::DemoMode => StatusCode::FORBIDDEN,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            e if e.is_unauthenticated() => {
                debug!(kind = e.kind(), "request not authenticated");
                ApiErrorCode::Unauthenticated
            }
            AuthError::StoreUnavailable(e) => {
                warn!("Store unavailable: {}", e);
                ApiErrorCode::ServiceUnavailable
            }
            e => ApiErrorCode::internal(e),
        }
    }
}

impl From<UserError> for ApiErrorCode {
    fn from(error: UserError) -> Self {
        match error {
            UserError::NotFound => ApiErrorCode::NotFound,
            UserError::UsernameTaken | UserError::EmailTaken => ApiErrorCode::Conflict,
            UserError::EmptyPassword | UserError::PasswordMismatch => ApiErrorCode::BadRequest,
            UserError::IncorrectPassword
            | UserError::Forbidden(_)
            | UserError::InvalidOperation => ApiErrorCode::Forbidden,
            UserError::Auth(e) => e.into(),
            UserError::Store(e) => {
                warn!("Store unavailable: {}", e);
                ApiErrorCode::ServiceUnavailable
            }
        }
    }
}

impl From<HintError> for ApiErrorCode {
    fn from(error: HintError) -> Self {
        match error {
            HintError::Store(e) => {
                warn!("Store unavailable: {}", e);
                ApiErrorCode::ServiceUnavailable
            }
            HintError::Fixture(_) => ApiErrorCode::BadRequest,
        }
    }
}

impl From<RateLimitError> for ApiErrorCode {
    fn from(error: RateLimitError) -> Self {
        match error {
            RateLimitError::Exceeded { .. } => ApiErrorCode::TooManyRequests,
            RateLimitError::Store(e) => {
                warn!("Store unavailable: {}", e);
                ApiErrorCode::ServiceUnavailable
            }
        }
    }
}
