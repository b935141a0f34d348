use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: i64 },

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("DB lock poisoned: {0}")]
    LockPoisoned(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    /// UNIQUE / FOREIGN KEY / NOT NULL rejections from SQLite.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Sqlite(e) => e.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation),
            _ => false,
        }
    }
}
