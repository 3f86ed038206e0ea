// View selection: status filtering and description ordering

use crate::models::Task;
use std::cmp::Ordering;

/// Label used for the pass-through filter
pub const ALL: &str = "All";

/// Filter selector for the derived view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Status(String),
}

impl StatusFilter {
    /// Parse a selector label; `All` (any case) selects everything
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case(ALL) {
            StatusFilter::All
        } else {
            StatusFilter::Status(label.to_string())
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Status(status) => task.status == *status,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "{}", ALL),
            StatusFilter::Status(s) => write!(f, "{}", s),
        }
    }
}

/// Direction applied by the next sort toggle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Order two tasks by description in this direction
    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        let ord = collate(&a.description, &b.description);
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ascending"),
            SortDirection::Descending => write!(f, "descending"),
        }
    }
}

/// Collation order for descriptions: case-insensitive first, exact as tie-break
pub fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, description: &str, status: &str) -> Task {
        Task {
            id,
            description: description.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!(StatusFilter::parse("All"), StatusFilter::All);
        assert_eq!(StatusFilter::parse("all"), StatusFilter::All);
        assert_eq!(
            StatusFilter::parse(" Finished "),
            StatusFilter::Status("Finished".to_string())
        );
    }

    #[test]
    fn test_filter_matches() {
        let done = task(1, "Pay rent", "Finished");
        let todo = task(2, "Buy milk", "Not Started");

        assert!(StatusFilter::All.matches(&done));
        assert!(StatusFilter::All.matches(&todo));

        let finished = StatusFilter::Status("Finished".to_string());
        assert!(finished.matches(&done));
        assert!(!finished.matches(&todo));
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(StatusFilter::All.to_string(), "All");
        assert_eq!(StatusFilter::Status("In Progress".to_string()).to_string(), "In Progress");
    }

    #[test]
    fn test_collate_ignores_case_first() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Banana", "apple"), Ordering::Greater);
        assert_eq!(collate("same", "same"), Ordering::Equal);
        // Case only breaks ties
        assert_ne!(collate("Call", "call"), Ordering::Equal);
    }

    #[test]
    fn test_sort_direction_compare_and_flip() {
        let a = task(1, "alpha", "Finished");
        let b = task(2, "Beta", "Finished");

        assert_eq!(SortDirection::Ascending.compare(&a, &b), Ordering::Less);
        assert_eq!(SortDirection::Descending.compare(&a, &b), Ordering::Greater);
        assert_eq!(SortDirection::Ascending.flip(), SortDirection::Descending);
        assert_eq!(SortDirection::Descending.flip(), SortDirection::Ascending);
        assert_eq!(SortDirection::default(), SortDirection::Ascending);
    }
}
