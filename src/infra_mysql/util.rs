use crate::domain_port::StoreError;
use sqlx::mysql::MySqlDatabaseError;

pub fn is_dup_key(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db) = err {
        if let Some(mysql_err) = db.try_downcast_ref::<MySqlDatabaseError>() {
            return mysql_err.number() == 1062; // ER_DUP_ENTRY
        }
    }

    false
}

/// Duplicate keys become `Conflict`, everything else `Unavailable`.
pub fn store_error(context: &str, err: sqlx::Error) -> StoreError {
    if is_dup_key(&err) {
        StoreError::Conflict(format!("{context}: {err}"))
    } else {
        StoreError::Unavailable(format!("{context}: {err}"))
    }
}

pub fn decode_error(context: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("{context}: {err}"))
}
