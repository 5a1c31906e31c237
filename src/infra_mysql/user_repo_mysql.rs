use super::util::{is_dup_key, store_error};
use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::{MySqlPool, Row};

pub struct MySqlUserRepo {
    pool: MySqlPool,
}
impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create(&self, user_id: UserId, username: &str) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
INSERT INTO user (user_id, username, is_active)
VALUES (?, ?, ?)
"#,
        )
        .bind(user_id)
        .bind(username)
        .bind(true)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(e) if is_dup_key(&e) => match self.get_id_by_username(username).await? {
                Some(owner) if owner == user_id => Ok(()),
                _ => Err(StoreError::Conflict(format!(
                    "username {username} already taken"
                ))),
            },
            Err(e) => Err(store_error("insert user", e)),
        }
    }

    async fn get_id_by_username(&self, username: &str) -> Result<Option<UserId>, StoreError> {
        let row = sqlx::query("SELECT user_id FROM user WHERE username = ? AND is_active = 1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("query user_id", e))?;

        Ok(row.map(|row| row.get::<UserId, _>("user_id")))
    }

    async fn get_username(&self, user_id: UserId) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT username FROM user WHERE user_id = ? AND is_active = 1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("query username", e))?;

        Ok(row.map(|row| row.get::<String, _>("username")))
    }

    async fn id_exists(&self, user_id: UserId) -> Result<bool, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM user WHERE user_id = ? AND is_active = 1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| store_error("count user", e))?;

        Ok(count > 0)
    }
}
