use rapport::api;
use rapport::application_impl::FakeSessionVerifier;
use rapport::application_port::*;
use rapport::domain_model::*;
use rapport::server::Server;
use rapport::settings::*;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use warp::Filter;
use warp::http::StatusCode;

fn settings() -> Settings {
    Settings {
        http: Http {
            address: "127.0.0.1:0".into(),
            cert_path: None,
            key_path: None,
        },
        log: Log {
            filter: "info".into(),
            json: false,
        },
        storage: Storage {
            backend: "memory".into(),
            mysql_dsn: None,
            max_connections: 1,
        },
        identity: Identity {
            seed_users: vec![
                "alice".into(),
                "bob".into(),
                "carol".into(),
                "bob smith".into(),
            ],
        },
        friending: Friending { op_timeout_ms: 2_000 },
    }
}

async fn api_v1() -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone
{
    serve(Server::try_new(&settings()).await.unwrap())
}

fn serve(
    server: Server,
) -> impl Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone {
    warp::path("api")
        .and(warp::path("v1"))
        .and(api::v1::routes(Arc::new(server)))
        .recover(api::v1::recover_error)
}

/// Delegates to the real engine, but only after sleeping on `send_request`.
struct SlowSend {
    inner: Arc<dyn FriendingService>,
    delay: Duration,
}

#[async_trait::async_trait]
impl FriendingService for SlowSend {
    async fn send_request(&self, from: UserId, to: UserId) -> Result<FriendRequest, FriendError> {
        tokio::time::sleep(self.delay).await;
        self.inner.send_request(from, to).await
    }

    async fn accept_request(&self, from: UserId, to: UserId) -> Result<RequestOutcome, FriendError> {
        self.inner.accept_request(from, to).await
    }

    async fn reject_request(&self, from: UserId, to: UserId) -> Result<RequestOutcome, FriendError> {
        self.inner.reject_request(from, to).await
    }

    async fn remove_request(&self, requester: UserId, to: UserId) -> Result<(), FriendError> {
        self.inner.remove_request(requester, to).await
    }

    async fn remove_friend(&self, user_a: UserId, user_b: UserId) -> Result<(), FriendError> {
        self.inner.remove_friend(user_a, user_b).await
    }

    async fn get_friends(&self, user: UserId) -> Result<Vec<UserId>, FriendError> {
        self.inner.get_friends(user).await
    }

    async fn list_friends(
        &self,
        user: UserId,
        page_size: PageSize,
        after: Option<FriendCursor>,
    ) -> Result<Vec<FriendSummary>, FriendError> {
        self.inner.list_friends(user, page_size, after).await
    }

    async fn get_requests(&self, user: UserId) -> Result<Vec<FriendRequest>, FriendError> {
        self.inner.get_requests(user).await
    }
}

async fn call<F>(filter: &F, method: &str, path: &str, user: Option<&str>) -> (StatusCode, Value)
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let mut request = warp::test::request().method(method).path(path);
    if let Some(user) = user {
        request = request.header(
            "authorization",
            format!("Bearer {}", FakeSessionVerifier::token_for(user)),
        );
    }
    let response = request.reply(filter).await;
    let body = serde_json::from_slice(response.body()).unwrap();
    (response.status(), body)
}

#[tokio::test]
async fn request_accept_and_list_friends() {
    let filter = api_v1().await;

    let (status, body) = call(&filter, "POST", "/api/v1/friend/requests/bob", Some("alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["from"], "alice");
    assert_eq!(body["data"]["to"], "bob");
    assert_eq!(body["data"]["status"], "Pending");
    assert_eq!(body["data"]["direction"], "outgoing");

    let (_, body) = call(&filter, "GET", "/api/v1/friend/requests", Some("bob")).await;
    assert_eq!(body["data"][0]["from"], "alice");
    assert_eq!(body["data"][0]["direction"], "incoming");

    let (status, body) = call(&filter, "PUT", "/api/v1/friend/accept/alice", Some("bob")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Accepted");

    let (_, body) = call(&filter, "GET", "/api/v1/friends", Some("alice")).await;
    assert_eq!(body["data"], serde_json::json!(["bob"]));

    let (_, body) = call(&filter, "GET", "/api/v1/friends/page?page_size=10", Some("bob")).await;
    assert_eq!(body["data"][0]["username"], "alice");
}

#[tokio::test]
async fn errors_are_rendered_with_usernames() {
    let filter = api_v1().await;

    call(&filter, "POST", "/api/v1/friend/requests/bob", Some("alice")).await;
    call(&filter, "PUT", "/api/v1/friend/accept/alice", Some("bob")).await;

    let (status, body) = call(&filter, "POST", "/api/v1/friend/requests/alice", Some("bob")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "AlreadyFriends");
    assert_eq!(body["error"]["message"], "bob and alice are already friends!");

    let (status, body) = call(&filter, "PUT", "/api/v1/friend/accept/alice", Some("bob")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RequestNotFound");
    assert_eq!(
        body["error"]["message"],
        "Friend request from alice to bob does not exist!"
    );
}

#[tokio::test]
async fn reject_withdraw_and_unfriend() {
    let filter = api_v1().await;

    call(&filter, "POST", "/api/v1/friend/requests/carol", Some("alice")).await;
    let (status, body) = call(&filter, "PUT", "/api/v1/friend/reject/alice", Some("carol")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Rejected");

    call(&filter, "POST", "/api/v1/friend/requests/carol", Some("alice")).await;
    let (status, body) = call(&filter, "DELETE", "/api/v1/friend/requests/carol", Some("alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["msg"], "Removed friend request!");

    let (status, body) = call(&filter, "DELETE", "/api/v1/friends/carol", Some("alice")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"]["message"],
        "Friendship between alice and carol does not exist!"
    );
}

#[tokio::test]
async fn self_request_is_a_bad_request() {
    let filter = api_v1().await;

    let (status, body) = call(&filter, "POST", "/api/v1/friend/requests/alice", Some("alice")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "SelfRequest");
}

#[tokio::test]
async fn unknown_target_is_not_found() {
    let filter = api_v1().await;

    let (status, body) = call(&filter, "POST", "/api/v1/friend/requests/ghost", Some("alice")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "UnknownUser");
    assert_eq!(body["error"]["message"], "User ghost does not exist!");
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let filter = api_v1().await;

    let (status, body) = call(&filter, "GET", "/api/v1/friends", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "InvalidToken");

    let (status, _) = call(&filter, "GET", "/api/v1/friends", Some("mallory")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_cursor_is_rejected() {
    let filter = api_v1().await;

    let (status, body) = call(&filter, "GET", "/api/v1/friends/page?after=nonsense", Some("alice")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "InvalidCursor");
}

#[tokio::test]
async fn encoded_usernames_are_decoded() {
    let filter = api_v1().await;

    let (status, body) = call(&filter, "POST", "/api/v1/friend/requests/bob%20smith", Some("alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["to"], "bob smith");

    let (status, body) = call(&filter, "PUT", "/api/v1/friend/accept/alice", Some("bob smith")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Accepted");

    let (status, _) = call(&filter, "DELETE", "/api/v1/friends/bob%20smith", Some("alice")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn undecodable_username_is_a_bad_request() {
    let filter = api_v1().await;

    let (status, body) = call(&filter, "POST", "/api/v1/friend/requests/%FF%FE", Some("alice")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "InvalidPath");
}

#[tokio::test]
async fn timed_out_call_still_completes() {
    let mut settings = settings();
    settings.friending.op_timeout_ms = 20;
    let mut server = Server::try_new(&settings).await.unwrap();
    server.friending_service = Arc::new(SlowSend {
        inner: server.friending_service.clone(),
        delay: Duration::from_millis(200),
    });
    let filter = serve(server);

    let (status, body) = call(&filter, "POST", "/api/v1/friend/requests/bob", Some("alice")).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], "Timeout");

    tokio::time::sleep(Duration::from_millis(500)).await;

    let (status, body) = call(&filter, "GET", "/api/v1/friend/requests", Some("bob")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["from"], "alice");
    assert_eq!(body["data"][0]["direction"], "incoming");
}
