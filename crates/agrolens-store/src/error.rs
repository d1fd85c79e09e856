use thiserror::Error;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite operation failed
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Creating the database directory failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The write would push the store past its size quota
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// A previous holder of the store lock panicked
    #[error("storage lock poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_message() {
        let err = StorageError::QuotaExceeded {
            needed: 2048,
            quota: 1024,
        };
        assert_eq!(
            err.to_string(),
            "storage quota exceeded: 2048 bytes needed, 1024 allowed"
        );
    }
}
