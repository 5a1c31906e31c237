use super::error::*;
use super::handler;
use super::handler::FriendPageQuery;
use crate::application_port::SessionVerifier;
use crate::domain_model::UserId;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use warp::{Filter, http};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let verified = with_verification(server.session_verifier.clone());
    let limit = server.op_timeout;

    let friends = warp::get()
        .and(warp::path("friends"))
        .and(warp::path::end())
        .and(verified.clone())
        .and(with(server.friending_service.clone()))
        .and(with(server.presenter.clone()))
        .and(with_limit(limit))
        .and_then(handler::get_friends);

    let friend_page = warp::get()
        .and(warp::path!("friends" / "page"))
        .and(warp::query::<FriendPageQuery>())
        .and(verified.clone())
        .and(with(server.friending_service.clone()))
        .and(with(server.presenter.clone()))
        .and(with_limit(limit))
        .and_then(handler::get_friend_page);

    let remove_friend = warp::delete()
        .and(warp::path!("friends" / String))
        .and(verified.clone())
        .and(with(server.identity.clone()))
        .and(with(server.friending_service.clone()))
        .and(with(server.presenter.clone()))
        .and(with_limit(limit))
        .and_then(handler::remove_friend);

    let requests = warp::get()
        .and(warp::path!("friend" / "requests"))
        .and(verified.clone())
        .and(with(server.friending_service.clone()))
        .and(with(server.presenter.clone()))
        .and(with_limit(limit))
        .and_then(handler::get_requests);

    let send_request = warp::post()
        .and(warp::path!("friend" / "requests" / String))
        .and(verified.clone())
        .and(with(server.identity.clone()))
        .and(with(server.friending_service.clone()))
        .and(with(server.presenter.clone()))
        .and(with_limit(limit))
        .and_then(handler::send_request);

    let remove_request = warp::delete()
        .and(warp::path!("friend" / "requests" / String))
        .and(verified.clone())
        .and(with(server.identity.clone()))
        .and(with(server.friending_service.clone()))
        .and(with(server.presenter.clone()))
        .and(with_limit(limit))
        .and_then(handler::remove_request);

    let accept = warp::put()
        .and(warp::path!("friend" / "accept" / String))
        .and(verified.clone())
        .and(with(server.identity.clone()))
        .and(with(server.friending_service.clone()))
        .and(with(server.presenter.clone()))
        .and(with_limit(limit))
        .and_then(handler::accept_request);

    let reject_request = warp::put()
        .and(warp::path!("friend" / "reject" / String))
        .and(verified)
        .and(with(server.identity.clone()))
        .and(with(server.friending_service.clone()))
        .and(with(server.presenter.clone()))
        .and(with_limit(limit))
        .and_then(handler::reject_request);

    friends
        .or(friend_page)
        .or(remove_friend)
        .or(requests)
        .or(send_request)
        .or(remove_request)
        .or(accept)
        .or(reject_request)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_limit(limit: Duration) -> impl Filter<Extract = (Duration,), Error = Infallible> + Clone {
    warp::any().map(move || limit)
}

fn with_verification(
    session_verifier: Arc<dyn SessionVerifier>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(move |token: String| {
        let session_verifier = session_verifier.clone();
        async move {
            if let Some(token) = token.strip_prefix("Bearer ") {
                let user_id = session_verifier
                    .verify_token(token)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(rejection)?;
                Ok::<_, warp::Rejection>(user_id)
            } else {
                Err(rejection(ApiErrorCode::InvalidToken))
            }
        }
    })
}
