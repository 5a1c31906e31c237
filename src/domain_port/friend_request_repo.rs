use crate::domain_model::*;
use crate::domain_port::StoreError;

/// The Request Store. Rows are looked up by their directional `(from, to)`
/// pair; only pending rows are ever mutated.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FriendRequestRepo: Send + Sync {
    async fn insert(&self, request: &FriendRequest) -> Result<(), StoreError>;

    async fn find_pending(
        &self,
        from: UserId,
        to: UserId,
    ) -> Result<Option<FriendRequest>, StoreError>;

    /// Moves the pending `(from, to)` row to `status`. Returns false when no
    /// pending row matched.
    async fn resolve_pending(
        &self,
        from: UserId,
        to: UserId,
        status: RequestStatus,
    ) -> Result<bool, StoreError>;

    /// Deletes the pending `(from, to)` row. Returns false when none matched.
    async fn delete_pending(&self, from: UserId, to: UserId) -> Result<bool, StoreError>;

    /// Pending rows where `user` is either sender or recipient, newest first.
    async fn list_pending_for(&self, user: UserId) -> Result<Vec<FriendRequest>, StoreError>;
}
