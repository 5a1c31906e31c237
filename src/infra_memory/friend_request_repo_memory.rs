use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

/// Request history per unordered pair. Resolved rows stay in the history;
/// cancelled rows are removed.
#[derive(Default)]
pub struct MemoryFriendRequestRepo {
    requests: DashMap<UserPair, Vec<FriendRequest>>,
}

impl MemoryFriendRequestRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row ever stored for the pair, oldest first.
    pub fn history(&self, a: UserId, b: UserId) -> Vec<FriendRequest> {
        self.requests
            .get(&UserPair::new(a, b))
            .map(|rows| rows.value().clone())
            .unwrap_or_default()
    }

    /// Number of pairs with stored history.
    pub fn pair_count(&self) -> usize {
        self.requests.len()
    }
}

#[async_trait::async_trait]
impl FriendRequestRepo for MemoryFriendRequestRepo {
    async fn insert(&self, request: &FriendRequest) -> Result<(), StoreError> {
        let mut rows = self.requests.entry(request.pair()).or_default();
        if request.is_pending() && rows.iter().any(FriendRequest::is_pending) {
            return Err(StoreError::Conflict(format!(
                "pending request already stored for {}",
                request.pair()
            )));
        }
        rows.push(request.clone());
        Ok(())
    }

    async fn find_pending(
        &self,
        from: UserId,
        to: UserId,
    ) -> Result<Option<FriendRequest>, StoreError> {
        Ok(self.requests.get(&UserPair::new(from, to)).and_then(|rows| {
            rows.iter()
                .find(|r| r.is_pending() && r.matches(from, to))
                .cloned()
        }))
    }

    async fn resolve_pending(
        &self,
        from: UserId,
        to: UserId,
        status: RequestStatus,
    ) -> Result<bool, StoreError> {
        let Some(mut rows) = self.requests.get_mut(&UserPair::new(from, to)) else {
            return Ok(false);
        };
        match rows
            .iter_mut()
            .find(|r| r.is_pending() && r.matches(from, to))
        {
            Some(row) => {
                row.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_pending(&self, from: UserId, to: UserId) -> Result<bool, StoreError> {
        let pair = UserPair::new(from, to);
        let removed = {
            let Some(mut rows) = self.requests.get_mut(&pair) else {
                return Ok(false);
            };
            let before = rows.len();
            rows.retain(|r| !(r.is_pending() && r.matches(from, to)));
            rows.len() != before
        };
        self.requests.remove_if(&pair, |_, rows| rows.is_empty());
        Ok(removed)
    }

    async fn list_pending_for(&self, user: UserId) -> Result<Vec<FriendRequest>, StoreError> {
        let mut out: Vec<FriendRequest> = self
            .requests
            .iter()
            .filter(|entry| entry.key().contains(user))
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|r| r.is_pending())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }
}
