// Text and JSON rendering of the task list

use crate::config::Config;
use crate::models::{Priority, Task, ViewFlags};
use crate::store::TaskListStore;
use chrono::{DateTime, Utc};
use colored::Colorize;
use eyre::{Context, Result};
use serde::Serialize;
use std::io::Write;

/// One rendered list row
#[derive(Debug, Clone, Serialize)]
pub struct Row<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    pub view: ViewFlags,
    pub days_remaining: i64,
    pub status: &'static str,
}

/// Rows for every task in current order
pub fn rows(store: &TaskListStore, now: DateTime<Utc>) -> Vec<Row<'_>> {
    rows_for(store, store.items().iter(), now)
}

/// Rows for a subset of the store's tasks
pub fn rows_for<'a>(
    store: &TaskListStore,
    tasks: impl IntoIterator<Item = &'a Task>,
    now: DateTime<Utc>,
) -> Vec<Row<'a>> {
    tasks
        .into_iter()
        .map(|task| Row {
            task,
            view: store.view(task.id).unwrap_or_default(),
            days_remaining: task.days_remaining(now),
            status: task.status_label(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Renderer {
    pub color: bool,
    pub date_format: String,
}

impl Renderer {
    pub fn new(config: &Config) -> Self {
        Self {
            color: config.color,
            date_format: config.date_format.clone(),
        }
    }

    /// `[x] Title  ·  High priority  ·  due 2026-10-20 (2 days left)`
    pub fn line(&self, row: &Row<'_>) -> String {
        let check = if row.task.completed { "[x]" } else { "[ ]" };
        let editing = if row.view.is_edit { " (editing)" } else { "" };
        format!(
            "{} {}{}  ·  {}  ·  due {} ({})",
            check,
            row.task.title,
            editing,
            self.priority_label(row.task.priority),
            row.task.due_date.format(&self.date_format),
            days_left(row.days_remaining),
        )
    }

    pub fn text(&self, rows: &[Row<'_>]) -> String {
        if rows.is_empty() {
            return "(no tasks)\n".to_string();
        }
        let mut out = String::new();
        for row in rows {
            out.push_str(&self.line(row));
            out.push('\n');
        }
        out
    }

    /// Write the text listing, surfacing write errors (e.g. a closed pipe)
    pub fn write_text<W: Write>(&self, out: &mut W, rows: &[Row<'_>]) -> Result<()> {
        out.write_all(self.text(rows).as_bytes()).context("Failed to write task list")
    }

    fn priority_label(&self, priority: Priority) -> String {
        let label = priority.label();
        if self.color {
            let (r, g, b) = priority.rgb();
            label.truecolor(r, g, b).to_string()
        } else {
            label.to_string()
        }
    }
}

pub fn json(rows: &[Row<'_>]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("Failed to serialize task list")
}

pub fn write_json<W: Write>(out: &mut W, rows: &[Row<'_>]) -> Result<()> {
    writeln!(out, "{}", json(rows)?).context("Failed to write task list")
}

fn days_left(days: i64) -> String {
    match days {
        0 => "due today".to_string(),
        1 => "1 day left".to_string(),
        -1 => "1 day overdue".to_string(),
        d if d < 0 => format!("{} days overdue", -d),
        d => format!("{} days left", d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewTask;
    use chrono::{Duration, TimeZone};

    fn plain() -> Renderer {
        Renderer {
            color: false,
            date_format: "%Y-%m-%d".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_days_left_wording() {
        assert_eq!(days_left(0), "due today");
        assert_eq!(days_left(1), "1 day left");
        assert_eq!(days_left(5), "5 days left");
        assert_eq!(days_left(-1), "1 day overdue");
        assert_eq!(days_left(-4), "4 days overdue");
    }

    #[test]
    fn test_line_rendering() {
        let mut store = TaskListStore::new();
        let id = store
            .add(NewTask::new("File taxes", Priority::High).due(now() + Duration::days(2)))
            .unwrap();

        let rows = rows(&store, now());
        assert_eq!(
            plain().line(&rows[0]),
            "[ ] File taxes  ·  High priority  ·  due 2026-10-20 (2 days left)"
        );

        store.toggle_complete(id);
        store.toggle_edit(id);
        let rows = super::rows(&store, now());
        assert!(plain().line(&rows[0]).starts_with("[x] File taxes (editing)"));
    }

    #[test]
    fn test_text_empty_list() {
        assert_eq!(plain().text(&[]), "(no tasks)\n");
    }

    #[test]
    fn test_text_follows_store_order() {
        let mut store = TaskListStore::new();
        store.add(NewTask::new("Buy milk", Priority::Low).due(now())).unwrap();
        store.add(NewTask::new("File taxes", Priority::High).due(now())).unwrap();

        let text = plain().text(&rows(&store, now()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("File taxes"));
        assert!(lines[1].contains("Buy milk"));
        assert!(lines[1].contains("Low priority"));
    }

    #[test]
    fn test_colored_label_keeps_text() {
        colored::control::set_override(true);
        let renderer = Renderer {
            color: true,
            ..plain()
        };
        let label = renderer.priority_label(Priority::Medium);
        assert!(label.contains("Medium priority"));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_errors_are_returned() {
        let mut store = TaskListStore::new();
        store.add(NewTask::new("Buy milk", Priority::Low).due(now())).unwrap();
        let rows = rows(&store, now());

        assert!(plain().write_text(&mut ClosedPipe, &rows).is_err());
        assert!(write_json(&mut ClosedPipe, &rows).is_err());

        let mut buf = Vec::new();
        plain().write_text(&mut buf, &rows).unwrap();
        write_json(&mut buf, &rows).unwrap();
        let written = String::from_utf8(buf).unwrap();
        assert!(written.starts_with("[ ] Buy milk"));
        assert!(written.ends_with("]\n"));
    }

    #[test]
    fn test_json_rows() {
        let mut store = TaskListStore::new();
        let id = store
            .add(NewTask::new("Buy milk", Priority::Low).due(now() - Duration::days(1)))
            .unwrap();
        store.toggle_priority_picker(id);

        let json = json(&rows(&store, now())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let row = &value[0];
        assert_eq!(row["title"], "Buy milk");
        assert_eq!(row["priority"], "low");
        assert_eq!(row["days_remaining"], -1);
        assert_eq!(row["status"], "Pending");
        assert_eq!(row["view"]["show_priority_picker"], true);
        assert_eq!(row["id"], id.to_string());
    }
}
