use crate::application_port::IdentityError;
use crate::domain_model::UserId;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("token invalid")]
    TokenInvalid,
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

#[async_trait::async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<UserId, SessionError>;
}
