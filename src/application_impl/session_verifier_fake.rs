use crate::application_port::*;
use crate::domain_model::UserId;
use std::sync::Arc;

const TOKEN_PREFIX: &str = "fake-access-token:";

/// Stand-in for a real session layer: the token is the username behind a
/// fixed prefix.
pub struct FakeSessionVerifier {
    identity: Arc<dyn IdentityResolver>,
}

impl FakeSessionVerifier {
    pub fn new(identity: Arc<dyn IdentityResolver>) -> Self {
        Self { identity }
    }

    pub fn token_for(username: &str) -> String {
        format!("{TOKEN_PREFIX}{username}")
    }
}

#[async_trait::async_trait]
impl SessionVerifier for FakeSessionVerifier {
    async fn verify_token(&self, token: &str) -> Result<UserId, SessionError> {
        let Some(username) = token.strip_prefix(TOKEN_PREFIX) else {
            return Err(SessionError::TokenInvalid);
        };
        match self.identity.resolve(username).await {
            Ok(user_id) => Ok(user_id),
            Err(IdentityError::UnknownUser(_)) => Err(SessionError::TokenInvalid),
            Err(e) => Err(e.into()),
        }
    }
}
