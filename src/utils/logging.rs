use std::{io, path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{format::FmtSpan, Layer},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

pub const CLI_PREFIX: &str = "cli";

const MAX_LOG_FILES: usize = 7;

/// Appends one compact line per event to a daily file under `log_dir`. With `show_std` the same
/// events are also printed to stdout in a readable form, with timings of instrumented calls.
/// Without an explicit level `RUST_LOG` is used, falling back to `info`.
pub fn enable_logging(
    prefix: &str,
    log_dir: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = log_appender(prefix, log_dir)?;
    let level = log_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));
    let filter = EnvFilter::new(format!(
        "{}={level}",
        env!("CARGO_PKG_NAME").replace("-", "_"),
    ));

    let file = Layer::new()
        .with_writer(appender)
        .with_ansi(false)
        .with_target(false)
        .compact();
    let stdout = show_std.then(|| {
        Layer::new()
            .with_writer(io::stdout)
            .with_span_events(FmtSpan::CLOSE)
            .pretty()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file)
        .with(stdout)
        .try_init()?;
    Ok(())
}

/// Daily files named `<prefix>.<date>.log`, older ones beyond a week are removed.
fn log_appender(prefix: &str, log_dir: &Path) -> Result<RollingFileAppender> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)?)
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .compact()
        .init()
});

#[cfg(test)]
mod tests {
    use std::io::Write;

    use anyhow::Result;
    use tempfile::tempdir;

    use super::{log_appender, CLI_PREFIX};

    #[test]
    fn test_appender_writes_daily_file() -> Result<()> {
        let dir = tempdir()?;
        let logs = dir.path().join("logs");

        let mut appender = log_appender(CLI_PREFIX, &logs)?;
        writeln!(appender, "entry added")?;
        appender.flush()?;

        let names = std::fs::read_dir(&logs)?
            .map(|v| Ok(v?.file_name().to_string_lossy().into_owned()))
            .collect::<Result<Vec<_>>>()?;
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("cli."));
        assert!(names[0].ends_with(".log"));
        Ok(())
    }
}
