use super::util::{decode_error, store_error};
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

pub struct MySqlFriendshipRepo {
    pool: MySqlPool,
}

impl MySqlFriendshipRepo {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn decode_summary(row: &MySqlRow) -> Result<FriendSummary, StoreError> {
    Ok(FriendSummary {
        user_id: row
            .try_get::<UserId, _>("other_user")
            .map_err(|e| decode_error("other_user", e))?,
        since: row
            .try_get::<DateTime<Utc>, _>("since")
            .map_err(|e| decode_error("since", e))?,
    })
}

#[async_trait::async_trait]
impl FriendshipRepo for MySqlFriendshipRepo {
    async fn insert_if_absent(&self, edge: &FriendshipEdge) -> Result<EdgeInsert, StoreError> {
        let res = sqlx::query(
            r#"
INSERT INTO friendship (user_min, user_max, created_at)
VALUES (?, ?, ?)
"#,
        )
        .bind(edge.pair.low())
        .bind(edge.pair.high())
        .bind(edge.since)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(EdgeInsert::Created),
            Err(e) => match store_error("insert friendship", e) {
                StoreError::Conflict(_) => Ok(EdgeInsert::Existing),
                other => Err(other),
            },
        }
    }

    async fn exists(&self, pair: UserPair) -> Result<bool, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM friendship WHERE user_min = ? AND user_max = ?")
                .bind(pair.low())
                .bind(pair.high())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| store_error("count friendship", e))?;

        Ok(count > 0)
    }

    async fn delete(&self, pair: UserPair) -> Result<bool, StoreError> {
        let res = sqlx::query("DELETE FROM friendship WHERE user_min = ? AND user_max = ?")
            .bind(pair.low())
            .bind(pair.high())
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("delete friendship", e))?;

        Ok(res.rows_affected() > 0)
    }

    async fn list_friend_ids(&self, user: UserId) -> Result<Vec<UserId>, StoreError> {
        let rows = sqlx::query(
            r#"
SELECT IF(? = f.user_min, f.user_max, f.user_min) AS other_user
FROM friendship f
WHERE ? = f.user_min OR ? = f.user_max
"#,
        )
        .bind(user)
        .bind(user)
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("list friend ids", e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<UserId, _>("other_user")
                    .map_err(|e| decode_error("other_user", e))
            })
            .collect()
    }

    async fn list_friends(
        &self,
        user: UserId,
        page_size: PageSize,
        after: Option<FriendCursor>,
    ) -> Result<Vec<FriendSummary>, StoreError> {
        // Without cursor
        let Some(cur) = after else {
            let rows = sqlx::query(
                r#"
SELECT
    IF(? = f.user_min, f.user_max, f.user_min) AS other_user,
    f.created_at                               AS since
FROM friendship f
WHERE ? = f.user_min OR ? = f.user_max
ORDER BY since DESC, other_user DESC
LIMIT ?
"#,
            )
            .bind(user)
            .bind(user)
            .bind(user)
            .bind(page_size.0 as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("list friends (no cursor)", e))?;

            return rows.iter().map(decode_summary).collect();
        };

        // With cursor
        let rows = sqlx::query(
            r#"
SELECT * FROM (
    SELECT
        IF(? = f.user_min, f.user_max, f.user_min) AS other_user,
        f.created_at                               AS since
    FROM friendship f
    WHERE ? = f.user_min OR ? = f.user_max
) page
WHERE page.since < ?
   OR (page.since = ? AND page.other_user < ?)
ORDER BY page.since DESC, page.other_user DESC
LIMIT ?
"#,
        )
        .bind(user)
        .bind(user)
        .bind(user)
        .bind(cur.since)
        .bind(cur.since)
        .bind(cur.other_user)
        .bind(page_size.0 as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("list friends (with cursor)", e))?;

        rows.iter().map(decode_summary).collect()
    }
}
