use crate::application_impl::PairLocks;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The friending engine. Sole writer of the request and relationship stores;
/// every check-then-write sequence runs inside the pair's critical section.
pub struct RealFriendingService {
    request_repo: Arc<dyn FriendRequestRepo>,
    friendship_repo: Arc<dyn FriendshipRepo>,
    identity: Arc<dyn IdentityResolver>,
    locks: PairLocks,
}

impl RealFriendingService {
    pub fn new(
        request_repo: Arc<dyn FriendRequestRepo>,
        friendship_repo: Arc<dyn FriendshipRepo>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            request_repo,
            friendship_repo,
            identity,
            locks: PairLocks::new(),
        }
    }

    async fn ensure_exists(&self, user: UserId) -> Result<(), FriendError> {
        if self.identity.exists(user).await? {
            Ok(())
        } else {
            Err(FriendError::UnknownUser(user.to_string()))
        }
    }

    async fn pending_between(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Option<FriendRequest>, FriendError> {
        if let Some(request) = self.request_repo.find_pending(a, b).await? {
            return Ok(Some(request));
        }
        Ok(self.request_repo.find_pending(b, a).await?)
    }

    /// Edge first, then the status flip. If the flip fails the edge this call
    /// created is taken back out.
    async fn accept_locked(&self, from: UserId, to: UserId) -> Result<(), FriendError> {
        if self.request_repo.find_pending(from, to).await?.is_none() {
            return Err(FriendError::RequestNotFound { from, to });
        }

        let edge = FriendshipEdge::new(from, to, Utc::now());
        let created = match self.friendship_repo.insert_if_absent(&edge).await {
            Ok(EdgeInsert::Created) => true,
            Ok(EdgeInsert::Existing) => false,
            Err(StoreError::Conflict(_)) => false,
            Err(e) => return Err(e.into()),
        };

        match self
            .request_repo
            .resolve_pending(from, to, RequestStatus::Accepted)
            .await
        {
            Ok(true) => Ok(()),
            Ok(false) => {
                self.undo_edge(created, edge.pair).await;
                Err(FriendError::RequestNotFound { from, to })
            }
            Err(e) => {
                self.undo_edge(created, edge.pair).await;
                Err(e.into())
            }
        }
    }

    async fn undo_edge(&self, created: bool, pair: UserPair) {
        if !created {
            return;
        }
        match self.friendship_repo.delete(pair).await {
            Ok(_) => warn!(%pair, "accept failed after edge insert; edge removed"),
            Err(e) => warn!(%pair, "accept failed and edge could not be removed: {e}"),
        }
    }
}

#[async_trait::async_trait]
impl FriendingService for RealFriendingService {
    async fn send_request(&self, from: UserId, to: UserId) -> Result<FriendRequest, FriendError> {
        if from == to {
            debug!(%from, "self friend request refused");
            return Err(FriendError::SelfRequest { user: from });
        }
        self.ensure_exists(from).await?;
        self.ensure_exists(to).await?;

        let pair = UserPair::new(from, to);
        let _guard = self.locks.acquire(pair).await;

        if self.friendship_repo.exists(pair).await? {
            debug!(%from, %to, "request refused, already friends");
            return Err(FriendError::AlreadyFriends {
                user1: from,
                user2: to,
            });
        }
        if let Some(existing) = self.pending_between(from, to).await? {
            debug!(from = %existing.from, to = %existing.to, "request refused, one is pending");
            return Err(FriendError::DuplicateRequest { from, to });
        }

        let request = FriendRequest::pending(from, to);
        match self.request_repo.insert(&request).await {
            Ok(()) => {}
            // another process sharing the store won the unique index
            Err(StoreError::Conflict(_)) => return Err(FriendError::DuplicateRequest { from, to }),
            Err(e) => return Err(e.into()),
        }

        info!(%from, %to, request_id = %request.id.0, "friend request sent");
        Ok(request)
    }

    async fn accept_request(
        &self,
        from: UserId,
        to: UserId,
    ) -> Result<RequestOutcome, FriendError> {
        let _guard = self.locks.acquire(UserPair::new(from, to)).await;

        self.accept_locked(from, to).await?;

        info!(%from, %to, "friend request accepted");
        Ok(RequestOutcome {
            status: RequestStatus::Accepted,
        })
    }

    async fn reject_request(
        &self,
        from: UserId,
        to: UserId,
    ) -> Result<RequestOutcome, FriendError> {
        let _guard = self.locks.acquire(UserPair::new(from, to)).await;

        if !self
            .request_repo
            .resolve_pending(from, to, RequestStatus::Rejected)
            .await?
        {
            return Err(FriendError::RequestNotFound { from, to });
        }

        info!(%from, %to, "friend request rejected");
        Ok(RequestOutcome {
            status: RequestStatus::Rejected,
        })
    }

    async fn remove_request(&self, requester: UserId, to: UserId) -> Result<(), FriendError> {
        let _guard = self.locks.acquire(UserPair::new(requester, to)).await;

        if !self.request_repo.delete_pending(requester, to).await? {
            return Err(FriendError::RequestNotFound {
                from: requester,
                to,
            });
        }

        info!(from = %requester, %to, "friend request withdrawn");
        Ok(())
    }

    async fn remove_friend(&self, user_a: UserId, user_b: UserId) -> Result<(), FriendError> {
        let not_found = FriendError::FriendNotFound {
            user1: user_a,
            user2: user_b,
        };
        if user_a == user_b {
            return Err(not_found);
        }

        let pair = UserPair::new(user_a, user_b);
        let _guard = self.locks.acquire(pair).await;

        if !self.friendship_repo.delete(pair).await? {
            return Err(not_found);
        }

        info!(user1 = %user_a, user2 = %user_b, "friendship removed");
        Ok(())
    }

    async fn get_friends(&self, user: UserId) -> Result<Vec<UserId>, FriendError> {
        Ok(self.friendship_repo.list_friend_ids(user).await?)
    }

    async fn list_friends(
        &self,
        user: UserId,
        page_size: PageSize,
        after: Option<FriendCursor>,
    ) -> Result<Vec<FriendSummary>, FriendError> {
        Ok(self
            .friendship_repo
            .list_friends(user, page_size.clamped(), after)
            .await?)
    }

    async fn get_requests(&self, user: UserId) -> Result<Vec<FriendRequest>, FriendError> {
        Ok(self.request_repo.list_pending_for(user).await?)
    }
}
