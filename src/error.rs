use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Numeric code of a failure to open or position a log file.
pub const OPEN_ERROR_CODE: u32 = 1103;
/// Numeric code of a failure to query metadata of an opened log file.
pub const STAT_ERROR_CODE: u32 = 1117;

/// Possible errors that could happen while acquiring a handle in `FileQueue::open`
///
/// Running out of records is not an error: `FileQueue::next` returns `None` for it.
#[derive(Error, Debug)]
pub enum QueueError {
    #[error(
        "({}): Could not open file '{}' due to [({})-({})].",
        OPEN_ERROR_CODE,
        .path.display(),
        os_errno(.source),
        .source
    )]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "({}): Could not retrieve informations of file '{}' due to [({})-({})].",
        STAT_ERROR_CODE,
        .path.display(),
        os_errno(.source),
        .source
    )]
    StatFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl QueueError {
    pub fn code(&self) -> u32 {
        match self {
            QueueError::OpenFailed { .. } => OPEN_ERROR_CODE,
            QueueError::StatFailed { .. } => STAT_ERROR_CODE,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            QueueError::OpenFailed { path, .. } | QueueError::StatFailed { path, .. } => path,
        }
    }

    /// OS error number of the underlying failure, 0 if it did not come from the OS
    pub fn errno(&self) -> i32 {
        match self {
            QueueError::OpenFailed { source, .. } | QueueError::StatFailed { source, .. } => {
                os_errno(source)
            }
        }
    }
}

fn os_errno(error: &io::Error) -> i32 {
    error.raw_os_error().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::QueueError;

    #[test]
    fn open_failure_message_carries_code_path_and_cause() {
        let error = QueueError::OpenFailed {
            path: "/var/ossec/logs/alerts/alerts.json".into(),
            source: io::Error::other("boom"),
        };
        assert_eq!(
            error.to_string(),
            "(1103): Could not open file '/var/ossec/logs/alerts/alerts.json' due to [(0)-(boom)]."
        );
        assert_eq!(error.code(), 1103);
    }

    #[test]
    fn stat_failure_has_its_own_code() {
        let error = QueueError::StatFailed {
            path: "/tmp/a.json".into(),
            source: io::Error::from_raw_os_error(2),
        };
        assert_eq!(error.code(), 1117);
        assert_eq!(error.errno(), 2);
        assert!(error
            .to_string()
            .starts_with("(1117): Could not retrieve informations of file '/tmp/a.json' due to [(2)-("));
    }
}
