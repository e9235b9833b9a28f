use std::{future::Future, path::Path, str::FromStr};

use chrono::NaiveDate;
use futures::TryStreamExt;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, info, instrument};

use crate::utils::time::{elapsed, format_duration, format_time, parse_time};

use super::{
    entities::{NewTimesheet, ProjectEntity, ProjectInfo, Projects, TimesheetEntry, TodoId},
    error::StorageError,
};

const CREATE_TIMESHEETS: &str = "
    CREATE TABLE IF NOT EXISTS timesheets (
        id INTEGER PRIMARY KEY,
        date TEXT,
        todo TEXT,
        title TEXT,
        description TEXT,
        start_time TEXT,
        end_time TEXT,
        duration TEXT
    )";

const CREATE_PROJECTS: &str = "
    CREATE TABLE IF NOT EXISTS projects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        todo_id TEXT UNIQUE,
        title TEXT
    )";

const SELECT_DAY: &str = "
    SELECT id, date, todo, title, description, start_time, end_time, duration
    FROM timesheets WHERE date = ? ORDER BY start_time";

const SELECT_ALL: &str = "
    SELECT id, date, todo, title, description, start_time, end_time, duration
    FROM timesheets ORDER BY date, start_time";

/// Interface for abstracting storage of timesheets and projects.
pub trait RecordStorage {
    /// Stores a new entry. The duration is computed here from the entry's start and end, so an
    /// entry with unreadable times is never written.
    fn add_entry(
        &self,
        entry: NewTimesheet,
    ) -> impl Future<Output = Result<i64, StorageError>>;

    /// Entries for a single day ordered by start time, or every entry ordered by date and start
    /// time.
    fn get_entries(
        &self,
        date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<TimesheetEntry>, StorageError>>;

    fn add_project(
        &self,
        todo_id: &TodoId,
        title: &str,
    ) -> impl Future<Output = Result<i64, StorageError>>;

    fn get_projects(&self) -> impl Future<Output = Result<Projects, StorageError>>;
}

/// The main realization of [RecordStorage].
pub struct SqliteRecordStorage {
    pool: SqlitePool,
}

impl SqliteRecordStorage {
    /// Opens the database file, creating it and its directory when missing.
    #[instrument]
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|v| !v.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        info!("Opened database at {path:?}");
        Self::with_pool(pool).await
    }

    /// Database that lives as long as the storage. Every connection to `:memory:` is a separate
    /// database, so the pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        sqlx::query(CREATE_TIMESHEETS).execute(&pool).await?;
        sqlx::query(CREATE_PROJECTS).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

impl RecordStorage for SqliteRecordStorage {
    async fn add_entry(&self, entry: NewTimesheet) -> Result<i64, StorageError> {
        let start = parse_time(&entry.start)?;
        let end = parse_time(&entry.end)?;
        let duration = format_duration(elapsed(start, end));

        let id = sqlx::query(
            "INSERT INTO timesheets (date, todo, title, description, start_time, end_time, duration)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.date)
        .bind(entry.todo)
        .bind(entry.title)
        .bind(entry.description)
        .bind(format_time(start))
        .bind(format_time(end))
        .bind(&duration)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        debug!("Inserted timesheet {id} lasting {duration}");
        Ok(id)
    }

    async fn get_entries(
        &self,
        date: Option<NaiveDate>,
    ) -> Result<Vec<TimesheetEntry>, StorageError> {
        let entries = match date {
            Some(date) => {
                sqlx::query_as::<_, TimesheetEntry>(SELECT_DAY)
                    .bind(date)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as::<_, TimesheetEntry>(SELECT_ALL)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        debug!("Loaded {} timesheets for {date:?}", entries.len());
        Ok(entries)
    }

    async fn add_project(&self, todo_id: &TodoId, title: &str) -> Result<i64, StorageError> {
        let id = sqlx::query("INSERT INTO projects (todo_id, title) VALUES (?, ?)")
            .bind(todo_id)
            .bind(title)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::from_insert(e, todo_id.as_str()))?
            .last_insert_rowid();

        debug!("Inserted project {todo_id} as {id}");
        Ok(id)
    }

    async fn get_projects(&self) -> Result<Projects, StorageError> {
        let projects = sqlx::query_as::<_, ProjectEntity>(
            "SELECT id, todo_id, title FROM projects ORDER BY todo_id",
        )
        .fetch(&self.pool)
        .map_ok(<(TodoId, ProjectInfo)>::from)
        .try_collect::<Projects>()
        .await?;
        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::tempdir;

    use crate::{
        storage::{
            entities::{NewTimesheet, TodoId},
            error::StorageError,
            record_storage::{RecordStorage, SqliteRecordStorage},
        },
        utils::{logging::TEST_LOGGING, time::TimeError},
    };

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    const OTHER_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    fn entry(date: NaiveDate, title: &str, start: &str, end: &str) -> NewTimesheet {
        NewTimesheet {
            date,
            todo: TodoId::new_opt("TODO-1"),
            title: title.into(),
            description: String::new(),
            start: start.into(),
            end: end.into(),
        }
    }

    fn todo(value: &str) -> TodoId {
        TodoId::new_opt(value).unwrap()
    }

    #[tokio::test]
    async fn test_add_entry_computes_duration() -> Result<()> {
        *TEST_LOGGING;
        let storage = SqliteRecordStorage::in_memory().await?;
        let id = storage
            .add_entry(entry(TEST_DATE, "overnight", " 23:00 ", "01:00"))
            .await?;

        let stored = storage.get_entries(Some(TEST_DATE)).await?;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert_eq!(stored[0].duration, "02:00:00");
        assert_eq!(stored[0].start_time, NaiveTime::from_hms_opt(23, 0, 0).unwrap());
        assert_eq!(stored[0].todo, Some(todo("TODO-1")));
        Ok(())
    }

    #[tokio::test]
    async fn test_add_entry_rejects_bad_time() -> Result<()> {
        let storage = SqliteRecordStorage::in_memory().await?;
        let result = storage
            .add_entry(entry(TEST_DATE, "broken", "9:5", "10:00"))
            .await;

        assert!(matches!(
            result,
            Err(StorageError::InvalidFormat(TimeError::InvalidFormat(_)))
        ));
        assert!(storage.get_entries(None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_entries_filters_and_orders() -> Result<()> {
        let storage = SqliteRecordStorage::in_memory().await?;
        storage.add_entry(entry(TEST_DATE, "late", "10:00", "11:00")).await?;
        storage.add_entry(entry(OTHER_DATE, "other day", "07:00", "08:00")).await?;
        storage.add_entry(entry(TEST_DATE, "early", "9:00", "09:30")).await?;

        let day = storage.get_entries(Some(TEST_DATE)).await?;
        let titles = day.iter().map(|v| v.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["early", "late"]);
        assert!(day.iter().all(|v| v.date == TEST_DATE));

        let all = storage.get_entries(None).await?;
        let titles = all.iter().map(|v| v.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["early", "late", "other day"]);

        let empty = storage
            .get_entries(NaiveDate::from_ymd_opt(2030, 1, 1))
            .await?;
        assert!(empty.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_entry_without_todo() -> Result<()> {
        let storage = SqliteRecordStorage::in_memory().await?;
        let mut new = entry(TEST_DATE, "loose", "08:00", "08:15");
        new.todo = None;
        storage.add_entry(new).await?;

        let stored = storage.get_entries(None).await?;
        assert_eq!(stored[0].todo, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_project() -> Result<()> {
        let storage = SqliteRecordStorage::in_memory().await?;
        storage.add_project(&todo("TODO-1"), "X").await?;
        let second = storage.add_project(&todo("TODO-1"), "Y").await;

        assert!(matches!(second, Err(StorageError::DuplicateKey(ref key)) if key == "TODO-1"));

        let projects = storage.get_projects().await?;
        assert_eq!(projects.len(), 1);
        assert_eq!(&*projects["TODO-1"].title, "X");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_projects_keyed_by_todo() -> Result<()> {
        let storage = SqliteRecordStorage::in_memory().await?;
        let b = storage.add_project(&todo("TODO-2"), "Second").await?;
        let a = storage.add_project(&todo("TODO-1"), "First").await?;

        let projects = storage.get_projects().await?;
        let keys = projects.keys().map(TodoId::as_str).collect::<Vec<_>>();
        assert_eq!(keys, ["TODO-1", "TODO-2"]);
        assert_eq!(projects["TODO-1"].id, a);
        assert_eq!(projects["TODO-2"].id, b);
        Ok(())
    }

    #[tokio::test]
    async fn test_open_creates_directory_and_persists() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("timesheets.db");

        let storage = SqliteRecordStorage::open(&path).await?;
        storage.add_entry(entry(TEST_DATE, "kept", "08:00", "09:00")).await?;
        storage.add_project(&todo("TODO-1"), "Kept").await?;
        storage.close().await;

        let storage = SqliteRecordStorage::open(&path).await?;
        assert_eq!(storage.get_entries(None).await?.len(), 1);
        assert_eq!(storage.get_projects().await?.len(), 1);
        storage.close().await;
        Ok(())
    }
}
