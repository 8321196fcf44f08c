/// Error type shared by the path resolver and the order maintainer
///
/// Every operation in this crate returns `CoreResult<T>`. Domain rejections are
/// typed variants so the handler layer can map them to status codes; anything
/// else coming out of the store is wrapped in `Database`.
///
/// A returned error always means the surrounding transaction was rolled back,
/// so callers never observe a half-applied reorder.

use uuid::Uuid;

/// Result alias used across the crate
pub type CoreResult<T> = Result<T, CoreError>;

/// Postgres SQLSTATE for `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

/// Errors surfaced by core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Node, board or task is absent or owned by another user
    #[error("{0} not found")]
    NotFound(String),

    /// Duplicate path, reserved path, or a uniqueness race lost in the store
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Operation is never allowed on this target (e.g. deleting the root)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Reorder outside the container's live range
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Any other store failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl CoreError {
    pub fn node_not_found(id: Uuid) -> Self {
        CoreError::NotFound(format!("Node {}", id))
    }

    pub fn path_not_found(path: &str) -> Self {
        CoreError::NotFound(format!("Path {}", path))
    }

    pub fn board_not_found(id: Uuid) -> Self {
        CoreError::NotFound(format!("Board {}", id))
    }

    pub fn task_not_found(id: Uuid) -> Self {
        CoreError::NotFound(format!("Task {}", id))
    }

    /// Short machine-readable code, used in logs and response bodies
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "not_found",
            CoreError::Conflict(_) => "conflict",
            CoreError::Forbidden(_) => "forbidden",
            CoreError::InvalidOperation(_) => "invalid_operation",
            CoreError::Database(_) => "database_error",
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unique constraint");
                return CoreError::Conflict(format!("Constraint violation: {}", constraint));
            }
        }
        CoreError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let id = Uuid::nil();
        assert_eq!(
            CoreError::node_not_found(id).to_string(),
            format!("Node {} not found", id)
        );
        assert_eq!(
            CoreError::path_not_found("/a/b").to_string(),
            "Path /a/b not found"
        );
        assert_eq!(
            CoreError::Conflict("Path /settings is reserved".to_string()).to_string(),
            "Conflict: Path /settings is reserved"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CoreError::NotFound("x".into()).code(), "not_found");
        assert_eq!(CoreError::Conflict("x".into()).code(), "conflict");
        assert_eq!(CoreError::Forbidden("x".into()).code(), "forbidden");
        assert_eq!(CoreError::InvalidOperation("x".into()).code(), "invalid_operation");
        assert_eq!(CoreError::Database(sqlx::Error::PoolClosed).code(), "database_error");
    }

    #[test]
    fn test_non_constraint_sqlx_error_is_database() {
        let err: CoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, CoreError::Database(sqlx::Error::RowNotFound)));
    }
}
