// Non-fatal outcomes of store operations that left state unchanged

use crate::models::TaskId;
use thiserror::Error;

/// Why an operation was skipped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    #[error("task description cannot be empty")]
    EmptyDescription,

    #[error("status cannot be empty")]
    EmptyStatus,

    #[error("no task with id {0}")]
    NotFound(TaskId),

    /// `update` called with no task under edit
    #[error("no task is being edited")]
    NotEditing,

    #[error("status '{0}' already exists")]
    DuplicateStatus(String),

    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    /// Status label still held by tasks
    #[error("status '{label}' is still used by {count} task(s)")]
    StatusInUse { label: String, count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_display() {
        assert_eq!(Notice::EmptyDescription.to_string(), "task description cannot be empty");
        assert_eq!(Notice::NotFound(42).to_string(), "no task with id 42");
        assert_eq!(
            Notice::StatusInUse {
                label: "Finished".to_string(),
                count: 2
            }
            .to_string(),
            "status 'Finished' is still used by 2 task(s)"
        );
    }

    #[test]
    fn test_notice_converts_to_eyre() {
        let report: eyre::Report = Notice::NotEditing.into();
        assert_eq!(report.to_string(), "no task is being edited");
    }
}
