use futures_util::future::join_all;
use rapport::application_impl::*;
use rapport::application_port::*;
use rapport::domain_model::*;
use rapport::infra_memory::*;
use rstest::{fixture, rstest};
use std::sync::Arc;

struct Harness {
    engine: Arc<RealFriendingService>,
    requests: Arc<MemoryFriendRequestRepo>,
    friendships: Arc<MemoryFriendshipRepo>,
    directory: Arc<DirectoryIdentityResolver>,
}

impl Harness {
    async fn user(&self, username: &str) -> UserId {
        self.directory.register(username).await.unwrap()
    }
}

#[fixture]
fn harness() -> Harness {
    let requests = Arc::new(MemoryFriendRequestRepo::new());
    let friendships = Arc::new(MemoryFriendshipRepo::new());
    let directory = Arc::new(DirectoryIdentityResolver::new(Arc::new(MemoryUserRepo::new())));
    let engine = Arc::new(RealFriendingService::new(
        requests.clone(),
        friendships.clone(),
        directory.clone(),
    ));
    Harness {
        engine,
        requests,
        friendships,
        directory,
    }
}

#[rstest]
#[tokio::test]
async fn accepted_friendship_is_symmetric(harness: Harness) {
    let a = harness.user("alice").await;
    let b = harness.user("bob").await;

    harness.engine.send_request(a, b).await.unwrap();
    harness.engine.accept_request(a, b).await.unwrap();

    assert_eq!(harness.engine.get_friends(a).await.unwrap(), vec![b]);
    assert_eq!(harness.engine.get_friends(b).await.unwrap(), vec![a]);
}

#[rstest]
#[case("alice")]
#[case("bob")]
#[case("a user with spaces")]
#[tokio::test]
async fn self_request_always_fails(harness: Harness, #[case] username: &str) {
    let a = harness.user(username).await;

    let error = harness.engine.send_request(a, a).await.unwrap_err();

    assert_eq!(error, FriendError::SelfRequest { user: a });
    assert!(harness.requests.history(a, a).is_empty());
}

#[rstest]
#[tokio::test]
async fn rejected_request_can_be_sent_again(harness: Harness) {
    let a = harness.user("alice").await;
    let b = harness.user("bob").await;

    let first = harness.engine.send_request(a, b).await.unwrap();
    let outcome = harness.engine.reject_request(a, b).await.unwrap();
    assert_eq!(outcome.status, RequestStatus::Rejected);

    let second = harness.engine.send_request(a, b).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(second.status, RequestStatus::Pending);
    let statuses: Vec<_> = harness
        .requests
        .history(a, b)
        .into_iter()
        .map(|r| r.status)
        .collect();
    assert_eq!(
        statuses,
        vec![RequestStatus::Rejected, RequestStatus::Pending]
    );
}

#[rstest]
#[case::same_direction(false)]
#[case::reverse_direction(true)]
#[tokio::test]
async fn pending_request_blocks_another(harness: Harness, #[case] reversed: bool) {
    let a = harness.user("alice").await;
    let b = harness.user("bob").await;
    harness.engine.send_request(a, b).await.unwrap();

    let (from, to) = if reversed { (b, a) } else { (a, b) };
    let error = harness.engine.send_request(from, to).await.unwrap_err();

    assert_eq!(error, FriendError::DuplicateRequest { from, to });
    assert_eq!(harness.engine.get_requests(a).await.unwrap().len(), 1);
}

#[rstest]
#[case::same_order(false)]
#[case::reversed_order(true)]
#[tokio::test]
async fn remove_friend_ignores_argument_order(harness: Harness, #[case] reversed: bool) {
    let a = harness.user("alice").await;
    let b = harness.user("bob").await;
    harness.engine.send_request(a, b).await.unwrap();
    harness.engine.accept_request(a, b).await.unwrap();

    let (x, y) = if reversed { (b, a) } else { (a, b) };
    harness.engine.remove_friend(x, y).await.unwrap();

    assert!(harness.engine.get_friends(a).await.unwrap().is_empty());
    assert!(harness.engine.get_friends(b).await.unwrap().is_empty());
    assert_eq!(
        harness.engine.remove_friend(y, x).await.unwrap_err(),
        FriendError::FriendNotFound { user1: y, user2: x }
    );
}

#[rstest]
#[case(2)]
#[case(8)]
#[case(32)]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_accepts_commit_exactly_once(harness: Harness, #[case] callers: usize) {
    let a = harness.user("alice").await;
    let b = harness.user("bob").await;
    harness.engine.send_request(a, b).await.unwrap();

    let attempts = (0..callers).map(|_| {
        let engine = harness.engine.clone();
        tokio::spawn(async move { engine.accept_request(a, b).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1);
    for result in results.iter().filter(|r| r.is_err()) {
        assert_eq!(
            result.as_ref().unwrap_err(),
            &FriendError::RequestNotFound { from: a, to: b }
        );
    }
    assert_eq!(harness.friendships.edge_count(), 1);
    let history = harness.requests.history(a, b);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RequestStatus::Accepted);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn accept_racing_withdrawal_leaves_consistent_state(harness: Harness) {
    let a = harness.user("alice").await;
    let b = harness.user("bob").await;
    harness.engine.send_request(a, b).await.unwrap();

    let accept = {
        let engine = harness.engine.clone();
        tokio::spawn(async move { engine.accept_request(a, b).await })
    };
    let withdraw = {
        let engine = harness.engine.clone();
        tokio::spawn(async move { engine.remove_request(a, b).await })
    };
    let accepted = accept.await.unwrap().is_ok();
    let withdrawn = withdraw.await.unwrap().is_ok();

    assert!(accepted ^ withdrawn);
    assert_eq!(harness.friendships.edge_count(), usize::from(accepted));
    assert!(harness.engine.get_requests(a).await.unwrap().is_empty());
}

#[rstest]
#[tokio::test]
async fn friendship_lifecycle_scenario(harness: Harness) {
    let a = harness.user("alice").await;
    let b = harness.user("bob").await;

    let sent = harness.engine.send_request(a, b).await.unwrap();
    assert_eq!(sent.status, RequestStatus::Pending);

    let outcome = harness.engine.accept_request(a, b).await.unwrap();
    assert_eq!(outcome.status, RequestStatus::Accepted);
    assert_eq!(harness.friendships.edge_count(), 1);

    harness.engine.remove_friend(a, b).await.unwrap();
    assert_eq!(harness.friendships.edge_count(), 0);

    let again = harness.engine.send_request(a, b).await.unwrap();
    assert_eq!(again.status, RequestStatus::Pending);
    assert_ne!(again.id, sent.id);
}

#[rstest]
#[tokio::test]
async fn crossing_requests_scenario(harness: Harness) {
    let a = harness.user("alice").await;
    let b = harness.user("bob").await;

    harness.engine.send_request(a, b).await.unwrap();
    let error = harness.engine.send_request(b, a).await.unwrap_err();

    assert_eq!(error, FriendError::DuplicateRequest { from: b, to: a });
}

#[rstest]
#[tokio::test]
async fn requests_are_visible_from_both_ends(harness: Harness) {
    let a = harness.user("alice").await;
    let b = harness.user("bob").await;
    let c = harness.user("carol").await;
    harness.engine.send_request(a, b).await.unwrap();
    harness.engine.send_request(c, a).await.unwrap();

    let requests = harness.engine.get_requests(a).await.unwrap();
    let mut directions: Vec<_> = requests
        .iter()
        .map(|r| (r.direction_for(a), r.pair().other(a)))
        .collect();
    directions.sort_by_key(|(d, _)| matches!(d, Some(RequestDirection::Outgoing)));

    assert_eq!(
        directions,
        vec![
            (Some(RequestDirection::Incoming), Some(c)),
            (Some(RequestDirection::Outgoing), Some(b)),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn friend_pages_walk_the_whole_list(harness: Harness) {
    let me = harness.user("alice").await;
    let mut expected = Vec::new();
    for i in 0..7 {
        let friend = harness.user(&format!("friend-{i}")).await;
        harness.engine.send_request(friend, me).await.unwrap();
        harness.engine.accept_request(friend, me).await.unwrap();
        expected.push(friend);
    }

    let mut seen = Vec::new();
    let mut after = None;
    loop {
        let page = harness
            .engine
            .list_friends(me, PageSize(3), after)
            .await
            .unwrap();
        if page.is_empty() {
            break;
        }
        assert!(page.len() <= 3);
        after = page.last().map(FriendCursor::after);
        seen.extend(page.into_iter().map(|s| s.user_id));
    }

    seen.sort();
    expected.sort();
    assert_eq!(seen, expected);
}

#[rstest]
#[tokio::test]
async fn unknown_recipient_is_rejected(harness: Harness) {
    let a = harness.user("alice").await;
    let ghost = UserId::for_username("ghost");

    let error = harness.engine.send_request(a, ghost).await.unwrap_err();

    assert!(matches!(error, FriendError::UnknownUser(_)));
}
