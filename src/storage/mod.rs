//! Storage is organized through [record_storage::SqliteRecordStorage].
//! The basic idea is:
//!   - Everything lives in a single SQLite file, by default `~/.mytimes/timesheets.db`.
//!   - Two tables: `timesheets` for logged work and `projects` for known TODO ids.
//!   - Rows are only ever inserted. Each operation is a single statement.

pub mod entities;
pub mod error;
pub mod record_storage;
