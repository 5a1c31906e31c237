use crate::domain_model::UserId;
use crate::domain_port::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, username: &str) -> Result<UserId, IdentityError>;

    async fn exists(&self, user_id: UserId) -> Result<bool, IdentityError>;

    async fn username_of(&self, user_id: UserId) -> Result<String, IdentityError>;

    /// Same order as `ids`.
    async fn usernames(&self, ids: &[UserId]) -> Result<Vec<String>, IdentityError> {
        let mut names = Vec::with_capacity(ids.len());
        for id in ids {
            names.push(self.username_of(*id).await?);
        }
        Ok(names)
    }
}
