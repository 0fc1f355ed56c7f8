use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process {pid}: {message}")]
    ProcessOpenFailed { pid: u32, message: String },

    #[error("Access denied reading {length} bytes at {address:#x}")]
    AccessDenied { address: u64, length: usize },

    #[error("Partial read at {address:#x}: wanted {expected} bytes, got {actual}")]
    PartialRead {
        address: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Pattern not found after scanning {regions} regions ({bytes} bytes)")]
    PatternNotFound { regions: usize, bytes: u64 },

    #[error("Gear fields disagree after scan: current={current}, last={last}")]
    InconsistentState { current: i32, last: i32 },

    #[error("Failed to write {length} bytes at {address:#x}: {message}")]
    WriteFailed {
        address: u64,
        length: usize,
        message: String,
    },

    #[error("No visible window found for PID {0}")]
    WindowNotFound(u32),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Read failures the scanner skips past; everything else propagates.
    pub fn is_skippable_read(&self) -> bool {
        matches!(
            self,
            Error::AccessDenied { .. } | Error::PartialRead { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skippable_read_classification() {
        let denied = Error::AccessDenied {
            address: 0x1000,
            length: 4,
        };
        assert!(denied.is_skippable_read());

        let partial = Error::PartialRead {
            address: 0x1000,
            expected: 8,
            actual: 3,
        };
        assert!(partial.is_skippable_read());

        let exhausted = Error::PatternNotFound {
            regions: 12,
            bytes: 0x100000,
        };
        assert!(!exhausted.is_skippable_read());
    }

    #[test]
    fn test_inconsistent_state_message() {
        let err = Error::InconsistentState {
            current: 3,
            last: 5,
        };
        assert!(err.to_string().contains("current=3"));
        assert!(err.to_string().contains("last=5"));
    }
}
