use std::{borrow::Borrow, collections::BTreeMap, fmt::Display, sync::Arc};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// External task or ticket identifier, for example `TODO-123`. Entries point to projects through it,
/// but nothing enforces that the project exists.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Returns `None` for blank input, so that an empty form field means "no TODO".
    pub fn new_opt(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Looks the referenced project up. A dangling reference is a normal outcome.
    pub fn resolve<'a>(&self, projects: &'a Projects) -> Option<&'a ProjectInfo> {
        projects.get(self)
    }
}

impl Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for TodoId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Single logged piece of work.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TimesheetEntry {
    pub id: i64,
    pub date: NaiveDate,
    pub todo: Option<TodoId>,
    pub title: String,
    pub description: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Always derived from `start_time` and `end_time` when the entry is written.
    pub duration: String,
}

/// Values of an entry before it's stored. Times are still raw user input.
#[derive(Debug, Clone)]
pub struct NewTimesheet {
    pub date: NaiveDate,
    pub todo: Option<TodoId>,
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
}

#[derive(PartialEq, Eq, Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProjectEntity {
    pub id: i64,
    pub todo_id: TodoId,
    pub title: String,
}

#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
pub struct ProjectInfo {
    pub id: i64,
    pub title: Arc<str>,
}

/// All projects keyed by their TODO id.
pub type Projects = BTreeMap<TodoId, ProjectInfo>;

impl From<ProjectEntity> for (TodoId, ProjectInfo) {
    fn from(ProjectEntity { id, todo_id, title }: ProjectEntity) -> Self {
        (
            todo_id,
            ProjectInfo {
                id,
                title: title.into(),
            },
        )
    }
}
