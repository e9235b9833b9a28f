//! Timeline view of a day. Projects become rows ("resources") and timesheet entries become events
//! placed on them.

use std::io::Write;

use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use crate::{
    storage::entities::{Projects, TimesheetEntry, TodoId},
    utils::time::format_date,
};

use super::NO_TODO;

const RESOURCE_GROUP: &str = "todos";
const DEFAULT_EVENT_TITLE: &str = "Timesheet Entry";
const SLOTS_PER_HOUR: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub id: TodoId,
    pub group: &'static str,
    pub title: String,
}

impl Resource {
    fn new(id: TodoId, title: String) -> Self {
        Self {
            id,
            group: RESOURCE_GROUP,
            title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub resource_id: Option<TodoId>,
}

#[derive(Debug, Serialize)]
pub struct CalendarData {
    pub resources: Vec<Resource>,
    pub events: Vec<CalendarEvent>,
}

/// Visible part of the day. Both ends are whole hours.
#[derive(Debug, Clone, Copy)]
pub struct CalendarOptions {
    pub slot_min: NaiveTime,
    pub slot_max: NaiveTime,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            slot_min: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_max: NaiveTime::from_hms_opt(19, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl CalendarOptions {
    /// Quarter hour cells of the visible window on `date`.
    fn slots(&self, date: NaiveDate) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        (self.slot_min.hour()..self.slot_max.hour())
            .flat_map(|hour| (0..SLOTS_PER_HOUR).map(move |quarter| (hour, quarter)))
            .filter_map(|(hour, quarter)| {
                NaiveTime::from_hms_opt(hour, quarter * 60 / SLOTS_PER_HOUR, 0)
            })
            .map(|time| {
                let start = date.and_time(time);
                (start, start + Duration::minutes(60 / SLOTS_PER_HOUR as i64))
            })
            .collect()
    }
}

/// One resource per project, followed by TODO ids that entries mention but no project defines.
pub fn build_resources(projects: &Projects, entries: &[TimesheetEntry]) -> Vec<Resource> {
    let mut resources = projects
        .iter()
        .map(|(todo, project)| {
            let title = if project.title.is_empty() {
                todo.to_string()
            } else {
                format!("{todo} - {}", project.title)
            };
            Resource::new(todo.clone(), title)
        })
        .collect::<Vec<_>>();

    for todo in entries.iter().filter_map(|v| v.todo.as_ref()) {
        if !resources.iter().any(|v| &v.id == todo) {
            resources.push(Resource::new(todo.clone(), todo.to_string()));
        }
    }
    resources
}

/// Places entries on the timeline. An end that isn't after the start is moved to the next day.
pub fn build_events(entries: &[TimesheetEntry]) -> Vec<CalendarEvent> {
    entries
        .iter()
        .map(|entry| {
            let start = entry.date.and_time(entry.start_time);
            let mut end = entry.date.and_time(entry.end_time);
            if end <= start {
                end += Duration::days(1);
            }
            let title = [&entry.title, &entry.description]
                .into_iter()
                .find(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| DEFAULT_EVENT_TITLE.to_string());

            CalendarEvent {
                title,
                start,
                end,
                resource_id: entry.todo.clone(),
            }
        })
        .collect()
}

/// Prints a row per resource with a bar marking occupied quarter hours, followed by the events of
/// that resource. Events without a TODO id get their own row at the bottom.
pub fn render_day(
    writer: &mut impl Write,
    date: NaiveDate,
    resources: &[Resource],
    events: &[CalendarEvent],
    options: &CalendarOptions,
) -> Result<()> {
    let slots = options.slots(date);
    let unassigned = events
        .iter()
        .filter(|v| v.resource_id.is_none())
        .collect::<Vec<_>>();

    let width = resources
        .iter()
        .map(|v| v.title.chars().count())
        .chain([NO_TODO.len(), 10])
        .max()
        .unwrap_or_default();

    let hour_width = SLOTS_PER_HOUR as usize;
    let hours = (options.slot_min.hour()..options.slot_max.hour())
        .map(|hour| format!("{:<hour_width$}", format!("{hour:02}")))
        .collect::<String>();
    writeln!(writer, "{:<width$} |{hours}|", format_date(date))?;

    for resource in resources {
        let own = events
            .iter()
            .filter(|v| v.resource_id.as_ref() == Some(&resource.id))
            .collect::<Vec<_>>();
        write_row(writer, &resource.title, width, &slots, &own)?;
    }
    if !unassigned.is_empty() {
        write_row(writer, NO_TODO, width, &slots, &unassigned)?;
    }
    Ok(())
}

fn write_row(
    writer: &mut impl Write,
    label: &str,
    width: usize,
    slots: &[(NaiveDateTime, NaiveDateTime)],
    events: &[&CalendarEvent],
) -> Result<()> {
    let bar = slots
        .iter()
        .map(|(slot_start, slot_end)| {
            let busy = events
                .iter()
                .any(|v| v.start < *slot_end && v.end > *slot_start);
            if busy { '#' } else { '.' }
        })
        .collect::<String>();
    writeln!(writer, "{label:<width$} |{bar}|")?;

    for event in events {
        writeln!(
            writer,
            "{:<width$}   {} - {}  {}",
            "",
            event.start.format("%H:%M"),
            event.end.format("%H:%M"),
            event.title
        )?;
    }
    Ok(())
}
