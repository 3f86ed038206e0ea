// Terminal rendering of the derived view

use crate::models::{Task, TaskId};
use crate::store::View;
use chrono::{DateTime, Local};
use colored::{Color, Colorize};

/// Badge color for a status label
pub fn status_color(status: &str) -> Color {
    match status {
        "Not Started" => Color::Red,
        "In Progress" => Color::Yellow,
        "Finished" => Color::Green,
        _ => Color::White,
    }
}

/// Creation time encoded in a task id, when it is a valid timestamp
pub fn created_at(id: TaskId) -> Option<String> {
    DateTime::from_timestamp_millis(id)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
}

/// One line per task: id, status badge, description, creation time
pub fn render_task(task: &Task, editing: bool) -> String {
    let badge = format!(" {} ", task.status).on_color(status_color(&task.status)).black();
    let marker = if editing { "*" } else { " " };
    let created = created_at(task.id).unwrap_or_default();
    format!("{}{:>14}  {}  {}  {}", marker, task.id, badge, task.description, created.dimmed())
}

/// The page of tasks plus a footer with page, filter and sort state
pub fn render_view(view: &View<'_>) -> String {
    let mut lines: Vec<String> = view
        .tasks
        .iter()
        .map(|task| render_task(task, view.editing == Some(task.id)))
        .collect();
    if lines.is_empty() {
        lines.push("No tasks".dimmed().to_string());
    }

    lines.push(format!(
        "Page {} of {} ({} task(s), filter: {}, next sort: {})",
        view.page,
        view.total_pages.max(1),
        view.filtered_count,
        view.filter,
        view.next_sort
    ));
    lines.join("\n") + "\n"
}

/// Status labels with their badge colors
pub fn render_statuses(labels: &[String]) -> String {
    labels
        .iter()
        .map(|label| format!("{}\n", label.color(status_color(label))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TaskStore;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_status_colors() {
        assert_eq!(status_color("Not Started"), Color::Red);
        assert_eq!(status_color("In Progress"), Color::Yellow);
        assert_eq!(status_color("Finished"), Color::Green);
        assert_eq!(status_color("Blocked"), Color::White);
    }

    #[test]
    fn test_created_at_from_id() {
        assert!(created_at(1_700_000_000_000).unwrap().starts_with("2023-11-1"));
        assert_eq!(created_at(i64::MAX), None);
    }

    #[test]
    fn test_render_view_lists_page() {
        let mut store = TaskStore::open(MemoryStorage::new());
        store.add("Buy milk", "Not Started").unwrap();
        store.add("Pay rent", "Finished").unwrap();

        let out = render_view(&store.view());
        assert!(out.contains("Buy milk"));
        assert!(out.contains("Pay rent"));
        assert!(out.contains("Page 1 of 1 (2 task(s), filter: All, next sort: ascending)"));
    }

    #[test]
    fn test_render_view_one_line_per_task_plus_footer() {
        let mut store = TaskStore::open(MemoryStorage::new());
        for i in 0..3 {
            store.add(&format!("Task {}", i), "Finished").unwrap();
        }

        let out = render_view(&store.view());
        assert!(out.ends_with('\n'));
        assert_eq!(out.lines().count(), 4);
        assert!(out.lines().last().unwrap().starts_with("Page 1 of 1"));
    }

    #[test]
    fn test_render_empty_view() {
        let store = TaskStore::open(MemoryStorage::new());
        let out = render_view(&store.view());
        assert!(out.contains("No tasks"));
        assert!(out.contains("Page 1 of 1 (0 task(s)"));
    }

    #[test]
    fn test_render_marks_task_under_edit() {
        let task = Task {
            id: 7,
            description: "Call mom".to_string(),
            status: "In Progress".to_string(),
        };
        assert!(render_task(&task, true).starts_with('*'));
        assert!(render_task(&task, false).starts_with(' '));
    }

    #[test]
    fn test_render_statuses() {
        let out = render_statuses(&["Todo".to_string(), "Done".to_string()]);
        assert!(out.contains("Todo"));
        assert!(out.contains("Done"));
    }
}
