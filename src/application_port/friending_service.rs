use crate::application_port::IdentityError;
use crate::domain_model::*;
use crate::domain_port::StoreError;
use serde::Serialize;

/// Precondition failures carry the identifiers involved and nothing else;
/// turning them into display text is the presenter's job.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FriendError {
    #[error("{user} cannot send a friend request to themselves")]
    SelfRequest { user: UserId },
    #[error("{user1} and {user2} are already friends")]
    AlreadyFriends { user1: UserId, user2: UserId },
    #[error("friend request between {from} and {to} already exists")]
    DuplicateRequest { from: UserId, to: UserId },
    #[error("friend request from {from} to {to} does not exist")]
    RequestNotFound { from: UserId, to: UserId },
    #[error("friendship between {user1} and {user2} does not exist")]
    FriendNotFound { user1: UserId, user2: UserId },
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

impl From<IdentityError> for FriendError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::UnknownUser(name) => FriendError::UnknownUser(name),
            IdentityError::StorageUnavailable(e) => FriendError::StorageUnavailable(e),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestOutcome {
    pub status: RequestStatus,
}

#[async_trait::async_trait]
pub trait FriendingService: Send + Sync {
    async fn send_request(&self, from: UserId, to: UserId) -> Result<FriendRequest, FriendError>;

    /// `to` is the recipient doing the accepting.
    async fn accept_request(&self, from: UserId, to: UserId)
    -> Result<RequestOutcome, FriendError>;

    async fn reject_request(&self, from: UserId, to: UserId)
    -> Result<RequestOutcome, FriendError>;

    /// Withdraws the pending request `requester -> to` without a trace.
    async fn remove_request(&self, requester: UserId, to: UserId) -> Result<(), FriendError>;

    async fn remove_friend(&self, user_a: UserId, user_b: UserId) -> Result<(), FriendError>;

    async fn get_friends(&self, user: UserId) -> Result<Vec<UserId>, FriendError>;

    async fn list_friends(
        &self,
        user: UserId,
        page_size: PageSize,
        after: Option<FriendCursor>,
    ) -> Result<Vec<FriendSummary>, FriendError>;

    /// Pending requests in both directions; use
    /// [`FriendRequest::direction_for`] to tell them apart.
    async fn get_requests(&self, user: UserId) -> Result<Vec<FriendRequest>, FriendError>;
}
