use std::{collections::HashMap, sync::Arc};

use tracing::debug;

use crate::{
    storage::entities::{Projects, TimesheetEntry, TodoId},
    utils::time::parse_duration,
};

#[derive(Debug, PartialEq)]
pub struct TodoUsage {
    pub todo: Option<TodoId>,
    /// Title of the project the TODO id refers to, if there is one.
    pub title: Option<Arc<str>>,
    /// Whole seconds. Stored durations may be negative or larger than any `chrono::Duration`.
    pub seconds: i128,
}

impl TodoUsage {
    fn new(todo: Option<TodoId>, projects: &Projects) -> Self {
        let title = todo
            .as_ref()
            .and_then(|v| v.resolve(projects))
            .map(|v| v.title.clone());
        Self {
            todo,
            title,
            seconds: 0,
        }
    }
}

/// Returns time spent per TODO id, longest first, together with the overall total. Entries with an
/// unreadable duration are left out of both.
pub fn summarize_by_todo(
    entries: &[TimesheetEntry],
    projects: &Projects,
) -> (Vec<TodoUsage>, i128) {
    let mut map = HashMap::<Option<TodoId>, TodoUsage>::new();

    let mut total = 0i128;

    for entry in entries {
        let Some(seconds) = parse_duration(&entry.duration) else {
            debug!("Skipping entry {} with duration {:?}", entry.id, entry.duration);
            continue;
        };
        total = total.saturating_add(seconds);
        let usage = map
            .entry(entry.todo.clone())
            .or_insert_with(|| TodoUsage::new(entry.todo.clone(), projects));
        usage.seconds = usage.seconds.saturating_add(seconds);
    }

    let mut usages = map.into_values().collect::<Vec<_>>();
    usages.sort_by(|a, b| b.seconds.cmp(&a.seconds).then_with(|| a.todo.cmp(&b.todo)));
    (usages, total)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::summarize_by_todo;
    use crate::storage::entities::{ProjectEntity, ProjectInfo, Projects, TimesheetEntry, TodoId};

    fn entry(todo: Option<&str>, duration: &str) -> TimesheetEntry {
        TimesheetEntry {
            id: 0,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            todo: todo.and_then(TodoId::new_opt),
            title: "title".into(),
            description: String::new(),
            start_time: NaiveTime::MIN,
            end_time: NaiveTime::MIN,
            duration: duration.into(),
        }
    }

    #[test]
    fn test_summarize_groups_and_sorts() {
        let projects: Projects = [ProjectEntity {
            id: 1,
            todo_id: TodoId::new_opt("TODO-1").unwrap(),
            title: "Billing".into(),
        }]
        .into_iter()
        .map(<(TodoId, ProjectInfo)>::from)
        .collect();

        let entries = [
            entry(Some("TODO-1"), "01:00:00"),
            entry(Some("TODO-2"), "02:30:00"),
            entry(Some("TODO-1"), "00:15:00"),
            entry(None, "00:05:00"),
            entry(Some("TODO-3"), "broken"),
        ];

        let (usages, total) = summarize_by_todo(&entries, &projects);

        assert_eq!(total, 230 * 60);
        assert_eq!(usages.len(), 3);
        assert_eq!(usages[0].todo, TodoId::new_opt("TODO-2"));
        assert_eq!(usages[0].title, None);
        assert_eq!(usages[1].seconds, 75 * 60);
        assert_eq!(usages[1].title.as_deref(), Some("Billing"));
        assert_eq!(usages[2].todo, None);
    }

    #[test]
    fn test_summarize_huge_and_negative_durations() {
        let entries = [
            entry(Some("TODO-1"), "2562047788015:00:00"),
            entry(Some("TODO-1"), "2562047788015:00:00"),
            entry(Some("TODO-2"), "-01:00:00"),
        ];

        let (usages, total) = summarize_by_todo(&entries, &Projects::new());

        let huge = 2562047788015i128 * 3600 * 2;
        assert_eq!(usages[0].seconds, huge);
        assert_eq!(usages[1].seconds, -3600);
        assert_eq!(total, huge - 3600);
    }
}
