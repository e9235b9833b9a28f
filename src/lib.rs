//! Personal daily timesheet. Entries are logged with a start and end time of day, grouped under
//! TODO ids of projects, and kept in a local SQLite database.
//!

pub mod cli;
pub mod storage;
pub mod utils;
