use sqlx::Error as SqlxError;

use crate::application::repos::RepoError;

/// Collapse driver errors into the repository error taxonomy. Pool
/// exhaustion is surfaced separately so callers can answer 503 instead
/// of a generic failure.
pub fn map_sqlx_error(err: SqlxError) -> RepoError {
    match err {
        SqlxError::RowNotFound => RepoError::NotFound,
        SqlxError::PoolTimedOut => RepoError::Timeout,
        other => RepoError::from_persistence(other),
    }
}
