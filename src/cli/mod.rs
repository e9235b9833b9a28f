pub mod calendar;
pub mod entries;
pub mod output;
pub mod projects;

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use calendar::{process_calendar_command, CalendarCommand};
use clap::{Parser, Subcommand};
use entries::{preview_duration, process_add_command, process_list_command, AddCommand, ListCommand};
use projects::{process_project_command, ProjectCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    storage::record_storage::{RecordStorage, SqliteRecordStorage},
    utils::{
        clock::{Clock, DefaultClock},
        dir::AppConfig,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "mytimes", version, long_about = None)]
#[command(about = "Daily timesheet kept in a local database", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Database file. By default ~/.mytimes/timesheets.db"
    )]
    db: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Add a timesheet entry")]
    Add {
        #[command(flatten)]
        command: AddCommand,
    },
    #[command(about = "Show the duration between a start and an end time")]
    Duration {
        #[arg(help = "Start time (HH:MM or HH:MM:SS)")]
        start: String,
        #[arg(help = "End time (HH:MM or HH:MM:SS)")]
        end: String,
    },
    #[command(about = "Show timesheet entries with their total time")]
    List {
        #[command(flatten)]
        command: ListCommand,
    },
    #[command(about = "Manage projects")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    #[command(about = "Display a timeline of a day")]
    Calendar {
        #[command(flatten)]
        command: CalendarCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::resolve(args.db)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &config.log_dir(), logging_level, args.log)?;

    let mut stdout = std::io::stdout();
    match args.commands {
        Commands::Duration { start, end } => preview_duration(&mut stdout, &start, &end),
        commands => {
            // The database is opened once and handed to whichever command runs.
            let storage = SqliteRecordStorage::open(&config.database_path)
                .await
                .with_context(|| format!("Failed to open database {:?}", config.database_path))?;
            let result = run_command(commands, &storage, &DefaultClock, &mut stdout).await;
            storage.close().await;
            result
        }
    }
}

async fn run_command(
    commands: Commands,
    storage: &impl RecordStorage,
    clock: &impl Clock,
    writer: &mut impl Write,
) -> Result<()> {
    match commands {
        Commands::Add { command } => process_add_command(command, storage, clock, writer).await,
        Commands::List { command } => process_list_command(command, storage, clock, writer).await,
        Commands::Project { command } => process_project_command(command, storage, writer).await,
        Commands::Calendar { command } => {
            process_calendar_command(command, storage, clock, writer).await
        }
        Commands::Duration { start, end } => preview_duration(writer, &start, &end),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use clap::Parser;

    use super::{run_command, Args, Commands};
    use crate::{
        storage::record_storage::{RecordStorage, SqliteRecordStorage},
        utils::clock::MockClock,
    };

    #[test]
    fn test_parse_global_options() {
        let args = Args::try_parse_from(["mytimes", "list", "--all", "--db", "/tmp/t.db"]).unwrap();
        assert!(!args.log);
        assert_eq!(args.db.unwrap().to_str(), Some("/tmp/t.db"));
        assert!(matches!(args.commands, Commands::List { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        assert!(Args::try_parse_from(["mytimes", "list", "--date", "yesterday"]).is_err());
        assert!(Args::try_parse_from(["mytimes", "list", "--date", "2024-01-01", "--all"]).is_err());
    }

    #[tokio::test]
    async fn test_commands_share_storage() -> Result<()> {
        let storage = SqliteRecordStorage::in_memory().await?;
        let mut clock = MockClock::new();
        clock
            .expect_today()
            .return_const(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        for line in [
            vec!["mytimes", "project", "add", "TODO-1", "Billing"],
            vec!["mytimes", "add", "--todo", "TODO-1", "-s", "23:00", "-e", "01:00"],
        ] {
            let args = Args::try_parse_from(line)?;
            run_command(args.commands, &storage, &clock, &mut std::io::sink()).await?;
        }

        let stored = storage.get_entries(None).await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Billing");
        assert_eq!(stored[0].duration, "02:00:00");
        Ok(())
    }
}
