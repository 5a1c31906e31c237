use crate::application_port::{IdentityError, IdentityResolver};
use crate::domain_model::UserId;
use crate::domain_port::UserRepo;
use std::sync::Arc;

pub struct DirectoryIdentityResolver {
    user_repo: Arc<dyn UserRepo>,
}

impl DirectoryIdentityResolver {
    pub fn new(user_repo: Arc<dyn UserRepo>) -> Self {
        DirectoryIdentityResolver { user_repo }
    }

    /// Adds `username` to the directory. Ids are derived from the name, so
    /// registering twice yields the same id.
    pub async fn register(&self, username: &str) -> Result<UserId, IdentityError> {
        let user_id = UserId::for_username(username);
        self.user_repo.create(user_id, username).await?;
        tracing::debug!(%user_id, %username, "user registered");
        Ok(user_id)
    }
}

#[async_trait::async_trait]
impl IdentityResolver for DirectoryIdentityResolver {
    async fn resolve(&self, username: &str) -> Result<UserId, IdentityError> {
        self.user_repo
            .get_id_by_username(username)
            .await?
            .ok_or_else(|| IdentityError::UnknownUser(username.to_owned()))
    }

    async fn exists(&self, user_id: UserId) -> Result<bool, IdentityError> {
        Ok(self.user_repo.id_exists(user_id).await?)
    }

    async fn username_of(&self, user_id: UserId) -> Result<String, IdentityError> {
        self.user_repo
            .get_username(user_id)
            .await?
            .ok_or_else(|| IdentityError::UnknownUser(user_id.to_string()))
    }
}
