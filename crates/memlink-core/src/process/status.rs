use serde::Serialize;
use strum::Display;

/// Coarse outcome of the most recent open attempt.
///
/// The base address and memory accessor are valid only while the handle is
/// `FoundReady`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    /// No matching process is currently running.
    #[default]
    NotFound,

    /// Process open, module located, memory accessor valid.
    FoundReady,

    /// Process located but some attach step failed: connector, OS layer,
    /// module lookup, or accessor creation.
    FoundNoAccess,
}

impl ProcessStatus {
    pub fn is_ready(self) -> bool {
        self == ProcessStatus::FoundReady
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_found() {
        assert_eq!(ProcessStatus::default(), ProcessStatus::NotFound);
    }

    #[test]
    fn test_display() {
        assert_eq!(ProcessStatus::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ProcessStatus::FoundReady.to_string(), "FOUND_READY");
        assert_eq!(ProcessStatus::FoundNoAccess.to_string(), "FOUND_NO_ACCESS");
    }

    #[test]
    fn test_is_ready() {
        assert!(ProcessStatus::FoundReady.is_ready());
        assert!(!ProcessStatus::NotFound.is_ready());
        assert!(!ProcessStatus::FoundNoAccess.is_ready());
    }
}
