use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct FriendRequestDisplay {
    pub from: String,
    pub to: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub direction: Option<RequestDirection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FriendSummaryDisplay {
    pub user_id: UserId,
    pub username: String,
    pub since: DateTime<Utc>,
}

/// Swaps identifiers for usernames on the way out. Never feeds anything back
/// into the engine.
pub struct Presenter {
    identity: Arc<dyn IdentityResolver>,
}

impl Presenter {
    pub fn new(identity: Arc<dyn IdentityResolver>) -> Self {
        Self { identity }
    }

    pub async fn friends(&self, ids: &[UserId]) -> Result<Vec<String>, IdentityError> {
        self.identity.usernames(ids).await
    }

    pub async fn friend_page(
        &self,
        page: Vec<FriendSummary>,
    ) -> Result<Vec<FriendSummaryDisplay>, IdentityError> {
        let ids: Vec<UserId> = page.iter().map(|s| s.user_id).collect();
        let names = self.identity.usernames(&ids).await?;
        Ok(page
            .into_iter()
            .zip(names)
            .map(|(summary, username)| FriendSummaryDisplay {
                user_id: summary.user_id,
                username,
                since: summary.since,
            })
            .collect())
    }

    pub async fn friend_request(
        &self,
        request: &FriendRequest,
        viewer: UserId,
    ) -> Result<FriendRequestDisplay, IdentityError> {
        let mut out = self
            .friend_requests(std::slice::from_ref(request), viewer)
            .await?;
        out.pop()
            .ok_or_else(|| IdentityError::UnknownUser(request.from.to_string()))
    }

    pub async fn friend_requests(
        &self,
        requests: &[FriendRequest],
        viewer: UserId,
    ) -> Result<Vec<FriendRequestDisplay>, IdentityError> {
        let from: Vec<UserId> = requests.iter().map(|r| r.from).collect();
        let to: Vec<UserId> = requests.iter().map(|r| r.to).collect();
        let from_names = self.identity.usernames(&from).await?;
        let to_names = self.identity.usernames(&to).await?;

        Ok(requests
            .iter()
            .zip(from_names.into_iter().zip(to_names))
            .map(|(request, (from, to))| FriendRequestDisplay {
                from,
                to,
                status: request.status,
                created_at: request.created_at,
                direction: request.direction_for(viewer),
            })
            .collect())
    }

    /// Human-readable message for an engine error. Identifiers that can no
    /// longer be resolved are shown as-is.
    pub async fn describe(&self, error: &FriendError) -> String {
        match error {
            FriendError::SelfRequest { .. } => "You cannot send a friend request to yourself!".into(),
            FriendError::AlreadyFriends { user1, user2 } => {
                let (a, b) = self.names(*user1, *user2).await;
                format!("{a} and {b} are already friends!")
            }
            FriendError::DuplicateRequest { from, to } => {
                let (a, b) = self.names(*from, *to).await;
                format!("Friend request between {a} and {b} already exists!")
            }
            FriendError::RequestNotFound { from, to } => {
                let (a, b) = self.names(*from, *to).await;
                format!("Friend request from {a} to {b} does not exist!")
            }
            FriendError::FriendNotFound { user1, user2 } => {
                let (a, b) = self.names(*user1, *user2).await;
                format!("Friendship between {a} and {b} does not exist!")
            }
            FriendError::UnknownUser(name) => format!("User {name} does not exist!"),
            FriendError::StorageUnavailable(_) => "Storage is unavailable, try again later.".into(),
        }
    }

    async fn names(&self, a: UserId, b: UserId) -> (String, String) {
        (self.name_or_id(a).await, self.name_or_id(b).await)
    }

    async fn name_or_id(&self, user: UserId) -> String {
        self.identity
            .username_of(user)
            .await
            .unwrap_or_else(|_| user.to_string())
    }
}
