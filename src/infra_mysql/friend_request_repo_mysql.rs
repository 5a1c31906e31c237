use super::util::{decode_error, store_error};
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

const SELECT_COLUMNS: &str = "request_id, from_user, to_user, status, created_at";

pub struct MySqlFriendRequestRepo {
    pool: MySqlPool,
}

impl MySqlFriendRequestRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn decode_request(row: &MySqlRow) -> Result<FriendRequest, StoreError> {
    let status = row
        .try_get::<String, _>("status")
        .map_err(|e| decode_error("status", e))?
        .parse::<RequestStatus>()
        .map_err(|e| decode_error("status", e))?;

    Ok(FriendRequest {
        id: row
            .try_get::<RequestId, _>("request_id")
            .map_err(|e| decode_error("request_id", e))?,
        from: row
            .try_get::<UserId, _>("from_user")
            .map_err(|e| decode_error("from_user", e))?,
        to: row
            .try_get::<UserId, _>("to_user")
            .map_err(|e| decode_error("to_user", e))?,
        status,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| decode_error("created_at", e))?,
    })
}

#[async_trait::async_trait]
impl FriendRequestRepo for MySqlFriendRequestRepo {
    async fn insert(&self, request: &FriendRequest) -> Result<(), StoreError> {
        let pair = request.pair();

        // `pending_pair` is generated from (user_min, user_max, status) and
        // unique, so a second pending row for the pair is a dup key
        sqlx::query(
            r#"
INSERT INTO friend_request (request_id, from_user, to_user, user_min, user_max, status, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(request.id)
        .bind(request.from)
        .bind(request.to)
        .bind(pair.low())
        .bind(pair.high())
        .bind(request.status.as_str())
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("insert friend request", e))?;

        Ok(())
    }

    async fn find_pending(
        &self,
        from: UserId,
        to: UserId,
    ) -> Result<Option<FriendRequest>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM friend_request \
             WHERE from_user = ? AND to_user = ? AND status = 'pending' LIMIT 1"
        ))
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("select pending request", e))?;

        row.as_ref().map(decode_request).transpose()
    }

    async fn resolve_pending(
        &self,
        from: UserId,
        to: UserId,
        status: RequestStatus,
    ) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
UPDATE friend_request SET status = ?, resolved_at = ?
WHERE from_user = ? AND to_user = ? AND status = 'pending'
"#,
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("resolve friend request", e))?;

        Ok(res.rows_affected() > 0)
    }

    async fn delete_pending(&self, from: UserId, to: UserId) -> Result<bool, StoreError> {
        let res = sqlx::query(
            "DELETE FROM friend_request WHERE from_user = ? AND to_user = ? AND status = 'pending'",
        )
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("delete friend request", e))?;

        Ok(res.rows_affected() > 0)
    }

    async fn list_pending_for(&self, user: UserId) -> Result<Vec<FriendRequest>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM friend_request \
             WHERE status = 'pending' AND (from_user = ? OR to_user = ?) \
             ORDER BY created_at DESC"
        ))
        .bind(user)
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("list pending requests", e))?;

        rows.iter().map(decode_request).collect()
    }
}
