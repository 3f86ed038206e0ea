// Data models for the task list

use serde::{Deserialize, Serialize};

/// Task identifier (milliseconds since epoch at creation time)
pub type TaskId = i64;

/// Default status labels, in display order
pub const DEFAULT_STATUSES: [&str; 3] = ["Not Started", "In Progress", "Finished"];

/// A unit of work tracked by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub status: String,
}

/// Ordered set of valid status labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSet {
    labels: Vec<String>,
}

impl StatusSet {
    /// Build a status set, trimming labels and dropping empty or repeated ones
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self { labels: Vec::new() };
        for label in labels {
            set.insert(label.as_ref());
        }
        set
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn first(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Append a label. Returns false if it was empty or already present.
    pub(crate) fn insert(&mut self, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.contains(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    /// Remove a label. Returns false if it was not present.
    pub(crate) fn remove(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l != label);
        self.labels.len() != before
    }
}

impl Default for StatusSet {
    fn default() -> Self {
        Self::new(DEFAULT_STATUSES)
    }
}

/// Helper function to get current timestamp in milliseconds
///
/// A clock set before the Unix epoch reads as 0; new task ids then come
/// from the previous id plus one.
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        assert!(ts > 0);
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_task_serialization_shape() {
        let task = Task {
            id: 1,
            description: "Buy milk".to_string(),
            status: "Not Started".to_string(),
        };

        let json = serde_json::to_string(&task).unwrap();
        assert_eq!(json, r#"{"id":1,"description":"Buy milk","status":"Not Started"}"#);
    }

    #[test]
    fn test_status_set_default() {
        let set = StatusSet::default();
        assert_eq!(set.labels(), ["Not Started", "In Progress", "Finished"]);
        assert_eq!(set.first(), Some("Not Started"));
    }

    #[test]
    fn test_status_set_serializes_as_array() {
        let set = StatusSet::new(["Todo", "Done"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["Todo","Done"]"#);

        let parsed: StatusSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_status_set_new_drops_empty_and_duplicates() {
        let set = StatusSet::new(["Todo", "  ", "Done", " Todo "]);
        assert_eq!(set.labels(), ["Todo", "Done"]);
    }

    #[test]
    fn test_status_set_insert_and_remove() {
        let mut set = StatusSet::default();
        assert!(set.insert("Blocked"));
        assert!(!set.insert("Blocked"));
        assert!(!set.insert(""));
        assert_eq!(set.len(), 4);

        assert!(set.remove("Blocked"));
        assert!(!set.remove("Blocked"));
        assert_eq!(set.len(), 3);
    }
}
