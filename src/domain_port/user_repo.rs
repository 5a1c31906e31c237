use crate::domain_model::*;
use crate::domain_port::StoreError;

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Registers `username` under `user_id`. Registering the same pair twice
    /// is a no-op.
    async fn create(&self, user_id: UserId, username: &str) -> Result<(), StoreError>;

    async fn get_id_by_username(&self, username: &str) -> Result<Option<UserId>, StoreError>;

    async fn get_username(&self, user_id: UserId) -> Result<Option<String>, StoreError>;

    async fn id_exists(&self, user_id: UserId) -> Result<bool, StoreError>;
}
