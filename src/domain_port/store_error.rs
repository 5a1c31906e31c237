#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or the statement failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A unique constraint rejected the write.
    #[error("store conflict: {0}")]
    Conflict(String),
    /// A stored row could not be decoded.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}
