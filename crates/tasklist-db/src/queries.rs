use rusqlite::{Connection, Params, Row};
use tracing::debug;

use crate::models::{ListRow, TodoRow, UserRow};
use crate::{Database, DbError, Result};

const USER_COLUMNS: &str = "id, login, email, password, register_date";
const LIST_COLUMNS: &str = "id, name, user_id";
const TODO_COLUMNS: &str = "id, title, description, list_id, user_id";

impl Database {
    // -- Users --

    pub fn add_user(&self, login: &str, email: &str, password: &str) -> Result<UserRow> {
        self.with_conn(|conn| {
            let row = conn.query_row(
                &format!(
                    "INSERT INTO users (login, email, password) VALUES (?1, ?2, ?3) RETURNING {USER_COLUMNS}"
                ),
                (login, email, password),
                user_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_user_by_id(&self, id: i64) -> Result<UserRow> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                [id],
                user_from_row,
            )
            .or_not_found("user", id)
        })
    }

    pub fn get_user_by_login(&self, login: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE login = ?1"),
                [login],
                user_from_row,
            )
            .optional()
        })
    }

    /// Removes the user together with everything it owns: its todos, any
    /// todos filed in its lists, and its lists. All or nothing.
    pub fn delete_user_by_id(&self, id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let todos = tx.execute(
                "DELETE FROM todos
                 WHERE user_id = ?1
                    OR list_id IN (SELECT id FROM lists WHERE user_id = ?1)",
                [id],
            )?;
            let lists = tx.execute("DELETE FROM lists WHERE user_id = ?1", [id])?;
            let users = tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
            tx.commit()?;

            debug!("Deleted user {} ({} lists, {} todos)", id, lists, todos);
            Ok(users)
        })
    }

    // -- Lists --

    pub fn get_all_lists(&self) -> Result<Vec<ListRow>> {
        self.with_conn(|conn| {
            query_lists(conn, &format!("SELECT {LIST_COLUMNS} FROM lists ORDER BY id"), [])
        })
    }

    pub fn get_all_lists_for_user(&self, user_id: i64) -> Result<Vec<ListRow>> {
        self.with_conn(|conn| {
            query_lists(
                conn,
                &format!("SELECT {LIST_COLUMNS} FROM lists WHERE user_id = ?1 ORDER BY id"),
                [user_id],
            )
        })
    }

    pub fn get_list_by_id(&self, id: i64) -> Result<ListRow> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?1"),
                [id],
                list_from_row,
            )
            .or_not_found("list", id)
        })
    }

    pub fn add_list(&self, name: &str, user_id: i64) -> Result<ListRow> {
        self.with_conn(|conn| {
            let id = conn.query_row(
                "INSERT INTO lists (name, user_id) VALUES (?1, ?2) RETURNING id",
                (name, user_id),
                |row| row.get(0),
            )?;
            Ok(ListRow {
                id,
                name: name.to_string(),
                user_id,
            })
        })
    }

    /// Replaces name and owner of the list with `list.id`. Returns 0 when no
    /// such list exists.
    pub fn update_list(&self, list: &ListRow) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE lists SET name = ?2, user_id = ?3 WHERE id = ?1",
                (list.id, &list.name, list.user_id),
            )?;
            Ok(n)
        })
    }

    /// Deletes the list and every todo filed in it in one transaction.
    /// On any error the transaction is rolled back and nothing is removed.
    pub fn delete_list_by_id(&self, id: i64) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let todos = tx.execute("DELETE FROM todos WHERE list_id = ?1", [id])?;
            let lists = tx.execute("DELETE FROM lists WHERE id = ?1", [id])?;
            tx.commit()?;

            debug!("Deleted list {} ({} todos)", id, todos);
            Ok(lists)
        })
    }

    // -- Todos --

    pub fn get_all_todos(&self) -> Result<Vec<TodoRow>> {
        self.with_conn(|conn| {
            query_todos(conn, &format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY id"), [])
        })
    }

    pub fn get_all_todos_for_user(&self, user_id: i64) -> Result<Vec<TodoRow>> {
        self.with_conn(|conn| {
            query_todos(
                conn,
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ?1 ORDER BY id"),
                [user_id],
            )
        })
    }

    pub fn get_todos_for_list(&self, list_id: i64) -> Result<Vec<TodoRow>> {
        self.with_conn(|conn| {
            query_todos(
                conn,
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE list_id = ?1 ORDER BY id"),
                [list_id],
            )
        })
    }

    pub fn get_todo_by_id(&self, id: i64) -> Result<TodoRow> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1"),
                [id],
                todo_from_row,
            )
            .or_not_found("todo", id)
        })
    }

    pub fn add_todo(
        &self,
        title: &str,
        description: &str,
        list_id: i64,
        user_id: i64,
    ) -> Result<TodoRow> {
        self.with_conn(|conn| {
            let id = conn.query_row(
                "INSERT INTO todos (title, description, list_id, user_id) VALUES (?1, ?2, ?3, ?4) RETURNING id",
                (title, description, list_id, user_id),
                |row| row.get(0),
            )?;
            Ok(TodoRow {
                id,
                title: title.to_string(),
                description: description.to_string(),
                list_id,
                user_id,
            })
        })
    }

    pub fn update_todo(&self, todo: &TodoRow) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE todos SET title = ?2, description = ?3, list_id = ?4, user_id = ?5 WHERE id = ?1",
                (todo.id, &todo.title, &todo.description, todo.list_id, todo.user_id),
            )?;
            Ok(n)
        })
    }

    pub fn delete_todo_by_id(&self, id: i64) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM todos WHERE id = ?1", [id])?))
    }
}

fn query_lists<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<ListRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, list_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_todos<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<TodoRow>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, todo_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        login: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        register_date: row.get(4)?,
    })
}

fn list_from_row(row: &Row<'_>) -> rusqlite::Result<ListRow> {
    Ok(ListRow {
        id: row.get(0)?,
        name: row.get(1)?,
        user_id: row.get(2)?,
    })
}

fn todo_from_row(row: &Row<'_>) -> rusqlite::Result<TodoRow> {
    Ok(TodoRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        list_id: row.get(3)?,
        user_id: row.get(4)?,
    })
}

/// Extension trait for single-row query results
trait RowResultExt<T> {
    fn optional(self) -> Result<Option<T>>;
    fn or_not_found(self, resource: &'static str, id: i64) -> Result<T>;
}

impl<T> RowResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn or_not_found(self, resource: &'static str, id: i64) -> Result<T> {
        self.optional()?.ok_or(DbError::NotFound { resource, id })
    }
}
