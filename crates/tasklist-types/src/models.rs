use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. The stored credential never leaves the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub register_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

/// A list item. `user_id` duplicates the owner of the parent list so that
/// "my todos" is a single-table query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub list_id: i64,
    pub user_id: i64,
}

pub type ListsCollection = Vec<List>;
pub type TodoCollection = Vec<Todo>;
