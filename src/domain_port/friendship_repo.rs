use crate::domain_model::*;
use crate::domain_port::StoreError;

pub enum EdgeInsert {
    Created,
    Existing,
}

/// The Relationship Store. One row per unordered pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FriendshipRepo: Send + Sync {
    async fn insert_if_absent(&self, edge: &FriendshipEdge) -> Result<EdgeInsert, StoreError>;

    async fn exists(&self, pair: UserPair) -> Result<bool, StoreError>;

    /// Returns false when there was no edge to delete.
    async fn delete(&self, pair: UserPair) -> Result<bool, StoreError>;

    async fn list_friend_ids(&self, user: UserId) -> Result<Vec<UserId>, StoreError>;

    async fn list_friends(
        &self,
        user: UserId,
        page_size: PageSize,
        after: Option<FriendCursor>,
    ) -> Result<Vec<FriendSummary>, StoreError>;
}
