use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message) = if let Some(rejection) = err.find::<ApiRejection>() {
        (rejection.code, rejection.message.clone())
    } else if err.find::<reject::MissingHeader>().is_some() {
        (ApiErrorCode::InvalidToken, ApiErrorCode::InvalidToken.to_string())
    } else if err.is_not_found() {
        (ApiErrorCode::NotFound, ApiErrorCode::NotFound.to_string())
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (ApiErrorCode::NotFound, ApiErrorCode::NotFound.to_string())
    } else {
        (
            ApiErrorCode::InternalError,
            format!("Unhandled error: {:?}", err),
        )
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code, message));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Cannot send a friend request to yourself")]
    SelfRequest,
    #[error("Already friends")]
    AlreadyFriends,
    #[error("Friend request already exists")]
    DuplicateRequest,
    #[error("Friend request not found")]
    RequestNotFound,
    #[error("Friend not found")]
    FriendNotFound,
    #[error("User not found")]
    UnknownUser,
    #[error("Cursor is not valid")]
    InvalidCursor,
    #[error("Path is not valid UTF-8")]
    InvalidPath,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Operation timed out")]
    Timeout,
    #[error("Not found")]
    NotFound,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::SelfRequest
            | ApiErrorCode::InvalidCursor
            | ApiErrorCode::InvalidPath => StatusCode::BAD_REQUEST,
            ApiErrorCode::AlreadyFriends | ApiErrorCode::DuplicateRequest => StatusCode::CONFLICT,
            ApiErrorCode::RequestNotFound
            | ApiErrorCode::FriendNotFound
            | ApiErrorCode::UnknownUser
            | ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&FriendError> for ApiErrorCode {
    fn from(error: &FriendError) -> Self {
        match error {
            FriendError::SelfRequest { .. } => ApiErrorCode::SelfRequest,
            FriendError::AlreadyFriends { .. } => ApiErrorCode::AlreadyFriends,
            FriendError::DuplicateRequest { .. } => ApiErrorCode::DuplicateRequest,
            FriendError::RequestNotFound { .. } => ApiErrorCode::RequestNotFound,
            FriendError::FriendNotFound { .. } => ApiErrorCode::FriendNotFound,
            FriendError::UnknownUser(_) => ApiErrorCode::UnknownUser,
            FriendError::StorageUnavailable(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<SessionError> for ApiErrorCode {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::TokenInvalid => ApiErrorCode::InvalidToken,
            SessionError::Identity(e) => ApiErrorCode::internal(e),
        }
    }
}

/// Rejection carrying an already rendered message.
#[derive(Debug)]
pub struct ApiRejection {
    pub code: ApiErrorCode,
    pub message: String,
}

impl reject::Reject for ApiRejection {}

impl From<ApiErrorCode> for ApiRejection {
    fn from(code: ApiErrorCode) -> Self {
        ApiRejection {
            code,
            message: code.to_string(),
        }
    }
}

pub fn rejection(code: ApiErrorCode) -> Rejection {
    reject::custom(ApiRejection::from(code))
}
