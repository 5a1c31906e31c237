use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryFriendshipRepo {
    edges: DashMap<UserPair, DateTime<Utc>>,
}

impl MemoryFriendshipRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn summaries(&self, user: UserId) -> Vec<FriendSummary> {
        self.edges
            .iter()
            .filter_map(|entry| {
                entry.key().other(user).map(|other| FriendSummary {
                    user_id: other,
                    since: *entry.value(),
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl FriendshipRepo for MemoryFriendshipRepo {
    async fn insert_if_absent(&self, edge: &FriendshipEdge) -> Result<EdgeInsert, StoreError> {
        let mut created = false;
        self.edges.entry(edge.pair).or_insert_with(|| {
            created = true;
            edge.since
        });
        Ok(if created {
            EdgeInsert::Created
        } else {
            EdgeInsert::Existing
        })
    }

    async fn exists(&self, pair: UserPair) -> Result<bool, StoreError> {
        Ok(self.edges.contains_key(&pair))
    }

    async fn delete(&self, pair: UserPair) -> Result<bool, StoreError> {
        Ok(self.edges.remove(&pair).is_some())
    }

    async fn list_friend_ids(&self, user: UserId) -> Result<Vec<UserId>, StoreError> {
        Ok(self
            .edges
            .iter()
            .filter_map(|entry| entry.key().other(user))
            .collect())
    }

    async fn list_friends(
        &self,
        user: UserId,
        page_size: PageSize,
        after: Option<FriendCursor>,
    ) -> Result<Vec<FriendSummary>, StoreError> {
        let mut rows = self.summaries(user);
        if let Some(cursor) = after {
            rows.retain(|r| cursor.precedes(r.since, r.user_id));
        }
        sort_friend_page(&mut rows);
        rows.truncate(page_size.0 as usize);
        Ok(rows)
    }
}
