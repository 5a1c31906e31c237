use super::error::*;
use crate::application_impl::Presenter;
use crate::application_port::*;
use crate::domain_model::{FriendCursor, PageSize, UserId};
use crate::logger::*;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
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

#[derive(Debug, Serialize)]
struct Message {
    msg: &'static str,
}

/// Runs an engine call on its own task and waits at most `limit`. A timed
/// out call still finishes in the background, so the caller never leaves a
/// mutation half done.
async fn run_engine<T, F>(limit: Duration, presenter: &Presenter, op: F) -> Result<T, warp::Rejection>
where
    F: Future<Output = Result<T, FriendError>> + Send + 'static,
    T: Send + 'static,
{
    let handle = tokio::spawn(op);
    let result = match tokio::time::timeout(limit, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => return Err(rejection(ApiErrorCode::internal(join_error))),
        Err(_) => {
            warn!(?limit, "friending operation timed out");
            return Err(rejection(ApiErrorCode::Timeout));
        }
    };

    match result {
        Ok(value) => Ok(value),
        Err(error) => Err(reject_friend_error(presenter, error).await),
    }
}

async fn reject_friend_error(presenter: &Presenter, error: FriendError) -> warp::Rejection {
    debug!(%error, "friending operation refused");
    let code = ApiErrorCode::from(&error);
    let message = presenter.describe(&error).await;
    reject::custom(ApiRejection { code, message })
}

/// Path segments arrive still percent-encoded.
fn decode_segment(segment: &str) -> Result<String, warp::Rejection> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|name| name.into_owned())
        .map_err(|e| {
            debug!("undecodable path segment {segment:?}: {e}");
            rejection(ApiErrorCode::InvalidPath)
        })
}

async fn resolve_user(
    identity: &Arc<dyn IdentityResolver>,
    presenter: &Presenter,
    segment: &str,
) -> Result<UserId, warp::Rejection> {
    let username = decode_segment(segment)?;
    match identity.resolve(&username).await {
        Ok(user_id) => Ok(user_id),
        Err(e) => Err(reject_friend_error(presenter, e.into()).await),
    }
}

fn internal<E: std::fmt::Display>(error: E) -> warp::Rejection {
    rejection(ApiErrorCode::internal(error))
}

pub async fn get_friends(
    user_id: UserId,
    friending_service: Arc<dyn FriendingService>,
    presenter: Arc<Presenter>,
    limit: Duration,
) -> Result<impl warp::Reply, warp::Rejection> {
    let friends = run_engine(limit, &presenter, async move {
        friending_service.get_friends(user_id).await
    })
    .await?;

    let usernames = presenter.friends(&friends).await.map_err(internal)?;
    Ok(warp::reply::json(&ApiResponse::ok(usernames)))
}

#[derive(Debug, Deserialize)]
pub struct FriendPageQuery {
    pub page_size: Option<u16>,
    pub after: Option<String>,
}

pub async fn get_friend_page(
    query: FriendPageQuery,
    user_id: UserId,
    friending_service: Arc<dyn FriendingService>,
    presenter: Arc<Presenter>,
    limit: Duration,
) -> Result<impl warp::Reply, warp::Rejection> {
    let page_size = query.page_size.map(PageSize).unwrap_or_default();
    let after = query
        .after
        .map(|s| s.parse::<FriendCursor>())
        .transpose()
        .map_err(|e| {
            debug!("bad friend cursor: {e}");
            rejection(ApiErrorCode::InvalidCursor)
        })?;

    let page = run_engine(limit, &presenter, async move {
        friending_service.list_friends(user_id, page_size, after).await
    })
    .await?;

    let shown = presenter.friend_page(page).await.map_err(internal)?;
    Ok(warp::reply::json(&ApiResponse::ok(shown)))
}

pub async fn remove_friend(
    friend: String,
    user_id: UserId,
    identity: Arc<dyn IdentityResolver>,
    friending_service: Arc<dyn FriendingService>,
    presenter: Arc<Presenter>,
    limit: Duration,
) -> Result<impl warp::Reply, warp::Rejection> {
    let friend_id = resolve_user(&identity, &presenter, &friend).await?;

    run_engine(limit, &presenter, async move {
        friending_service.remove_friend(user_id, friend_id).await
    })
    .await?;

    Ok(warp::reply::json(&ApiResponse::ok(Message {
        msg: "Unfriended!",
    })))
}

pub async fn get_requests(
    user_id: UserId,
    friending_service: Arc<dyn FriendingService>,
    presenter: Arc<Presenter>,
    limit: Duration,
) -> Result<impl warp::Reply, warp::Rejection> {
    let requests = run_engine(limit, &presenter, async move {
        friending_service.get_requests(user_id).await
    })
    .await?;

    let shown = presenter
        .friend_requests(&requests, user_id)
        .await
        .map_err(internal)?;
    Ok(warp::reply::json(&ApiResponse::ok(shown)))
}

pub async fn send_request(
    to: String,
    user_id: UserId,
    identity: Arc<dyn IdentityResolver>,
    friending_service: Arc<dyn FriendingService>,
    presenter: Arc<Presenter>,
    limit: Duration,
) -> Result<impl warp::Reply, warp::Rejection> {
    let to_id = resolve_user(&identity, &presenter, &to).await?;

    let request = run_engine(limit, &presenter, async move {
        friending_service.send_request(user_id, to_id).await
    })
    .await?;

    let shown = presenter
        .friend_request(&request, user_id)
        .await
        .map_err(internal)?;
    Ok(warp::reply::json(&ApiResponse::ok(shown)))
}

pub async fn remove_request(
    to: String,
    user_id: UserId,
    identity: Arc<dyn IdentityResolver>,
    friending_service: Arc<dyn FriendingService>,
    presenter: Arc<Presenter>,
    limit: Duration,
) -> Result<impl warp::Reply, warp::Rejection> {
    let to_id = resolve_user(&identity, &presenter, &to).await?;

    run_engine(limit, &presenter, async move {
        friending_service.remove_request(user_id, to_id).await
    })
    .await?;

    Ok(warp::reply::json(&ApiResponse::ok(Message {
        msg: "Removed friend request!",
    })))
}

pub async fn accept_request(
    from: String,
    user_id: UserId,
    identity: Arc<dyn IdentityResolver>,
    friending_service: Arc<dyn FriendingService>,
    presenter: Arc<Presenter>,
    limit: Duration,
) -> Result<impl warp::Reply, warp::Rejection> {
    let from_id = resolve_user(&identity, &presenter, &from).await?;

    let outcome = run_engine(limit, &presenter, async move {
        friending_service.accept_request(from_id, user_id).await
    })
    .await?;

    Ok(warp::reply::json(&ApiResponse::ok(outcome)))
}

pub async fn reject_request(
    from: String,
    user_id: UserId,
    identity: Arc<dyn IdentityResolver>,
    friending_service: Arc<dyn FriendingService>,
    presenter: Arc<Presenter>,
    limit: Duration,
) -> Result<impl warp::Reply, warp::Rejection> {
    let from_id = resolve_user(&identity, &presenter, &from).await?;

    let outcome = run_engine(limit, &presenter, async move {
        friending_service.reject_request(from_id, user_id).await
    })
    .await?;

    Ok(warp::reply::json(&ApiResponse::ok(outcome)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bob", "bob")]
    #[case("bob%20smith", "bob smith")]
    #[case("caf%C3%A9", "café")]
    fn segments_are_percent_decoded(#[case] segment: &str, #[case] expected: &str) {
        assert_eq!(decode_segment(segment).unwrap(), expected);
    }

    #[test]
    fn invalid_utf8_segment_is_rejected() {
        let rejection = decode_segment("%FF%FE").unwrap_err();

        let found = rejection.find::<ApiRejection>().unwrap();
        assert_eq!(found.code, ApiErrorCode::InvalidPath);
    }
}
