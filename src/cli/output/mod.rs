pub mod calendar;
pub mod summary;

use std::io::Write;

use ansi_term::Style;
use anyhow::Result;

use crate::{
    storage::entities::TimesheetEntry,
    utils::time::{format_date, format_seconds},
};

use summary::TodoUsage;

/// Label of entries that have no TODO id.
pub const NO_TODO: &str = "(no TODO)";

/// Prints entries as tab separated rows, one entry per line.
pub fn write_entries(writer: &mut impl Write, entries: &[TimesheetEntry]) -> Result<()> {
    writeln!(
        writer,
        "{}",
        Style::new()
            .bold()
            .paint("id\tdate\ttodo\ttitle\tdescription\tstart\tend\tduration")
    )?;
    for entry in entries {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            entry.id,
            format_date(entry.date),
            entry.todo.as_ref().map_or(NO_TODO, |v| v.as_str()),
            entry.title,
            entry.description,
            entry.start_time.format("%H:%M:%S"),
            entry.end_time.format("%H:%M:%S"),
            entry.duration
        )?;
    }
    Ok(())
}

pub fn write_total(writer: &mut impl Write, total: &str) -> Result<()> {
    writeln!(writer, "{} {total}", Style::new().bold().paint("Total time:"))?;
    Ok(())
}

pub fn write_summary(writer: &mut impl Write, usages: &[TodoUsage], total: i128) -> Result<()> {
    writeln!(writer)?;
    for usage in usages {
        let todo = usage.todo.as_ref().map_or(NO_TODO, |v| v.as_str());
        let share = usage
            .seconds
            .checked_mul(100)
            .and_then(|v| v.checked_div(total))
            .unwrap_or_default();
        writeln!(
            writer,
            "{}\t{share}%\t{todo}\t{}",
            format_seconds(usage.seconds),
            usage.title.as_deref().unwrap_or_default()
        )?;
    }
    Ok(())
}
