//! Database row types — these map directly to SQLite rows.
//! Distinct from tasklist-types API models to keep the DB layer independent.

use chrono::{DateTime, NaiveDateTime, Utc};
use tasklist_types::models::{List, Todo, User};
use tracing::warn;

#[derive(Debug)]
pub struct UserRow {
    pub id: i64,
    pub login: String,
    pub email: String,
    pub password: String,
    pub register_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub list_id: i64,
    pub user_id: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let register_date = parse_timestamp(&row.register_date).unwrap_or_else(|| {
            warn!("Corrupt register_date '{}' on user {}", row.register_date, row.id);
            DateTime::default()
        });

        User {
            id: row.id,
            login: row.login,
            email: row.email,
            password: row.password,
            register_date,
        }
    }
}

impl From<ListRow> for List {
    fn from(row: ListRow) -> Self {
        List {
            id: row.id,
            name: row.name,
            user_id: row.user_id,
        }
    }
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            title: row.title,
            description: row.description,
            list_id: row.list_id,
            user_id: row.user_id,
        }
    }
}

/// SQLite's `datetime('now')` yields "YYYY-MM-DD HH:MM:SS" without a zone;
/// it is UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
}
