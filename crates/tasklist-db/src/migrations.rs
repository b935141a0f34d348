use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, lists, todos)");
        // No ON DELETE CASCADE: list and user deletion remove dependents
        // inside an explicit transaction in queries.rs.
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                login           TEXT NOT NULL UNIQUE,
                email           TEXT NOT NULL,
                password        TEXT NOT NULL,
                register_date   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE lists (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                name        TEXT NOT NULL,
                user_id     INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX idx_lists_user ON lists(user_id);

            CREATE TABLE todos (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                title       TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                list_id     INTEGER NOT NULL REFERENCES lists(id),
                user_id     INTEGER NOT NULL REFERENCES users(id)
            );

            CREATE INDEX idx_todos_list ON todos(list_id);
            CREATE INDEX idx_todos_user ON todos(user_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
