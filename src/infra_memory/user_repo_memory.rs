use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryUserRepo {
    names: DashMap<UserId, String>,
    ids: DashMap<String, UserId>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, user_id: UserId, username: &str) -> Result<(), StoreError> {
        let owner = *self.ids.entry(username.to_owned()).or_insert(user_id);
        if owner != user_id {
            return Err(StoreError::Conflict(format!(
                "username {username} already taken by {owner}"
            )));
        }
        self.names.insert(user_id, username.to_owned());
        Ok(())
    }

    async fn get_id_by_username(&self, username: &str) -> Result<Option<UserId>, StoreError> {
        Ok(self.ids.get(username).map(|id| *id.value()))
    }

    async fn get_username(&self, user_id: UserId) -> Result<Option<String>, StoreError> {
        Ok(self.names.get(&user_id).map(|name| name.value().clone()))
    }

    async fn id_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        Ok(self.names.contains_key(&user_id))
    }
}
