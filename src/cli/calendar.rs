use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use crate::{
    storage::record_storage::RecordStorage,
    utils::{clock::Clock, time::parse_date},
};

use super::output::calendar::{
    build_events, build_resources, render_day, CalendarData, CalendarOptions,
};

#[derive(Debug, Parser)]
pub struct CalendarCommand {
    #[arg(short, long, value_parser = parse_date, help = "Day to show as YYYY-MM-DD. Defaults to today")]
    date: Option<NaiveDate>,
    #[arg(
        long,
        help = "Print resources and events of every entry as JSON instead of a day timeline"
    )]
    json: bool,
}

/// Command to process `calendar`. Shows a timeline of a day between 06:00 and 19:00, one row per
/// project.
pub async fn process_calendar_command(
    CalendarCommand { date, json }: CalendarCommand,
    storage: &impl RecordStorage,
    clock: &impl Clock,
    writer: &mut impl Write,
) -> Result<()> {
    let projects = storage
        .get_projects()
        .await
        .context("Failed to load projects")?;

    if json {
        let entries = storage.get_entries(None).await?;
        let data = CalendarData {
            resources: build_resources(&projects, &entries),
            events: build_events(&entries),
        };
        serde_json::to_writer_pretty(&mut *writer, &data)?;
        writeln!(writer)?;
        return Ok(());
    }

    let date = date.unwrap_or_else(|| clock.today());
    let entries = storage.get_entries(Some(date)).await?;
    render_day(
        writer,
        date,
        &build_resources(&projects, &entries),
        &build_events(&entries),
        &CalendarOptions::default(),
    )
}
