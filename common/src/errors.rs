//! Error taxonomy for the stats source.
//!
//! Every failure mode of a poll cycle maps onto one of these variants. None
//! of them cross the snapshot-builder boundary: the collector converts them
//! into a well-formed DOWN sample so the API always has a body to serve.

use std::time::Duration;

use thiserror::Error;

/// Result alias for stats-source operations.
pub type StatsResult<T> = Result<T, StatsError>;

/// Failures raised while reading runtime statistics from the server.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The server could not be reached. The next scheduled poll retries
    /// naturally; no synchronous retry is attempted.
    #[error("database unreachable: {0}")]
    Connectivity(String),

    /// The monitoring account lacks a privilege required to read a counter.
    /// This will not self-heal, so it carries its own reason string.
    #[error("insufficient privileges: {0}")]
    Permission(String),

    /// A stats query exceeded its deadline. Treated as a failed poll rather
    /// than left to block the cycle.
    #[error("stats query timed out after {0:?}")]
    Timeout(Duration),
}

impl StatsError {
    /// Maps a sqlx error onto the taxonomy.
    ///
    /// MySQL privilege errors (access denied, command denied) become
    /// [`StatsError::Permission`]; everything else is a connectivity
    /// problem from the monitor's point of view.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if let Some(mysql_err) = db_err.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
                // 1044/1045 access denied, 1142 command denied, 1227 privilege required
                if matches!(mysql_err.number(), 1044 | 1045 | 1142 | 1227) {
                    return StatsError::Permission(mysql_err.message().to_string());
                }
            }
        }
        StatsError::Connectivity(err.to_string())
    }

    /// Whether this failure can clear on its own by simply polling again.
    pub fn is_transient(&self) -> bool {
        !matches!(self, StatsError::Permission(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_is_not_transient() {
        let err = StatsError::Permission("SELECT command denied".into());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_connectivity_and_timeout_are_transient() {
        assert!(StatsError::Connectivity("connection refused".into()).is_transient());
        assert!(StatsError::Timeout(Duration::from_secs(10)).is_transient());
    }

    #[test]
    fn test_display_messages() {
        let err = StatsError::Connectivity("connection refused".into());
        assert_eq!(err.to_string(), "database unreachable: connection refused");
        let err = StatsError::Permission("missing PROCESS".into());
        assert_eq!(err.to_string(), "insufficient privileges: missing PROCESS");
    }
}
