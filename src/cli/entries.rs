use std::io::Write;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::info;

use crate::{
    storage::{
        entities::{NewTimesheet, TodoId},
        record_storage::RecordStorage,
    },
    utils::{
        clock::Clock,
        time::{compute_duration, format_date, parse_date, sum_durations},
    },
};

use super::output::{summary::summarize_by_todo, write_entries, write_summary, write_total};

#[derive(Debug, Parser)]
pub struct AddCommand {
    #[arg(short, long, value_parser = parse_date, help = "Date of the entry as YYYY-MM-DD. Defaults to today")]
    date: Option<NaiveDate>,
    #[arg(short, long, help = "TODO id of the task, for example TODO-123")]
    todo: Option<String>,
    #[arg(
        long,
        help = "Task title. When omitted the title of the project with the given TODO id is used"
    )]
    title: Option<String>,
    #[arg(short = 'm', long, default_value = "", help = "Task description")]
    description: String,
    #[arg(short, long, default_value = "08:00", help = "Start time (HH:MM or HH:MM:SS)")]
    start: String,
    #[arg(short, long, default_value = "09:00", help = "End time (HH:MM or HH:MM:SS)")]
    end: String,
}

#[derive(Debug, Parser)]
pub struct ListCommand {
    #[arg(short, long, value_parser = parse_date, conflicts_with = "all", help = "Filter by date. Defaults to today")]
    date: Option<NaiveDate>,
    #[arg(short, long, help = "Show all dates")]
    all: bool,
    #[arg(long = "by-todo", help = "Also show how time splits between TODO ids")]
    by_todo: bool,
}

/// Command to process `add`. The title falls back to the project registered under the TODO id,
/// the same way picking a project fills the form.
pub async fn process_add_command(
    AddCommand {
        date,
        todo,
        title,
        description,
        start,
        end,
    }: AddCommand,
    storage: &impl RecordStorage,
    clock: &impl Clock,
    writer: &mut impl Write,
) -> Result<()> {
    let todo = todo.as_deref().and_then(TodoId::new_opt);
    let title = match title.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(title) => title.to_string(),
        None => project_title(storage, todo.as_ref()).await?,
    };
    if title.is_empty() {
        bail!("Please enter a task title.");
    }

    let start = start.trim().to_string();
    let end = end.trim().to_string();
    let duration = compute_duration(&start, &end).context("Failed to add entry")?;
    let date = date.unwrap_or_else(|| clock.today());

    let id = storage
        .add_entry(NewTimesheet {
            date,
            todo,
            title,
            description: description.trim().to_string(),
            start,
            end,
        })
        .await
        .context("Failed to add entry")?;
    info!("Added entry {id} on {date}");

    writeln!(writer, "Entry added: {} {duration}", format_date(date))?;
    Ok(())
}

async fn project_title(storage: &impl RecordStorage, todo: Option<&TodoId>) -> Result<String> {
    let Some(todo) = todo else {
        return Ok(String::new());
    };
    let projects = storage.get_projects().await?;
    Ok(todo
        .resolve(&projects)
        .map(|v| v.title.to_string())
        .unwrap_or_default())
}

/// Shows the live duration of a start and end time. Invalid input is reported, not failed on.
pub fn preview_duration(writer: &mut impl Write, start: &str, end: &str) -> Result<()> {
    match compute_duration(start, end) {
        Ok(duration) => writeln!(writer, "Duration: {duration}")?,
        Err(e) => writeln!(
            writer,
            "Duration: - (enter valid start and end times) ({e})"
        )?,
    }
    Ok(())
}

/// Command to process `list`. Prints the entries of a day, or of every day, with the total time.
pub async fn process_list_command(
    ListCommand { date, all, by_todo }: ListCommand,
    storage: &impl RecordStorage,
    clock: &impl Clock,
    writer: &mut impl Write,
) -> Result<()> {
    let filter = if all {
        None
    } else {
        Some(date.unwrap_or_else(|| clock.today()))
    };

    let entries = storage
        .get_entries(filter)
        .await
        .context("Failed to load entries")?;
    if entries.is_empty() {
        writeln!(writer, "No entries found for the selected date")?;
        return Ok(());
    }

    write_entries(writer, &entries)?;
    write_total(writer, &sum_durations(entries.iter().map(|v| &v.duration)))?;

    if by_todo {
        let projects = storage.get_projects().await?;
        let (usages, total) = summarize_by_todo(&entries, &projects);
        write_summary(writer, &usages, total)?;
    }
    Ok(())
}
