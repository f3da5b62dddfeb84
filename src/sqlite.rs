use crate::config::SqliteConfig;
use crate::error::{Error, Result};
use crate::query::{self, Query, SqlQuery};
use crate::record::{Fields, Record};
use crate::schema::Schema;
use crate::value::{Row, Value};
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What happened to an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A row with the same primary key or unique value already exists; it was left untouched.
    Skipped,
}

/// CRUD operations against one SQLite connection.
///
/// Implemented by [`SqliteStore`] (each call commits on its own) and by
/// [`Transaction`] (calls commit together). Table and column names are
/// validated as plain identifiers; values are always bound as parameters.
pub trait TableAccess {
    fn connection(&self) -> &Connection;

    /// Create a table if it does not exist yet. Existing tables are left as they are.
    fn create_table(&self, table: &str, fields: &Fields) -> Result<()> {
        execute(self.connection(), &query::create_table(table, fields)?)?;
        Ok(())
    }

    /// Insert one row. A primary key or unique conflict is logged and skipped.
    fn insert(&self, table: &str, data: &Record) -> Result<InsertOutcome> {
        let sql = query::insert(table, data)?;
        match execute(self.connection(), &sql) {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(err) if err.is_unique_violation() => {
                warn!(
                    table,
                    values = %format_values(&sql.params),
                    error = %err,
                    "row already exists, ignoring insert"
                );
                Ok(InsertOutcome::Skipped)
            }
            Err(err) => Err(err),
        }
    }

    /// Select every row matching all conditions, or every row when `query` is `None` or empty.
    fn read(&self, table: &str, query: Option<&Query>) -> Result<Vec<Row>> {
        query_rows(self.connection(), &query::select(table, query)?)
    }

    /// Update rows matching `query`, which must hold at least one condition.
    /// Returns the number of rows changed.
    fn update(&self, table: &str, data: &Record, query: &Query) -> Result<usize> {
        execute(self.connection(), &query::update(table, data, query)?)
    }

    /// Update every row of the table.
    fn update_all(&self, table: &str, data: &Record) -> Result<usize> {
        execute(self.connection(), &query::update_all(table, data)?)
    }

    /// Delete rows matching `query`, which must hold at least one condition.
    /// Returns the number of rows removed.
    fn delete(&self, table: &str, query: &Query) -> Result<usize> {
        execute(self.connection(), &query::delete(table, query)?)
    }

    /// Delete every row of the table.
    fn delete_all(&self, table: &str) -> Result<usize> {
        execute(self.connection(), &query::delete_all(table)?)
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.connection().query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

/// Owns the single connection to a database file.
///
/// The connection is released by [`SqliteStore::close`] or on drop.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file and create the configured tables.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        info!(path = %config.db_path.display(), "opening sqlite store");
        let conn = Connection::open(&config.db_path)?;
        Self::init(conn, config)
    }

    /// Open (or create) a database file with no schema.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(&SqliteConfig::new(path.as_ref(), Schema::new()))
    }

    /// Open a private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, &SqliteConfig::new(":memory:", Schema::new()))
    }

    fn init(conn: Connection, config: &SqliteConfig) -> Result<Self> {
        let pragma = if config.foreign_keys { "ON" } else { "OFF" };
        conn.execute_batch(&format!("PRAGMA foreign_keys = {pragma};"))?;
        register_regexp(&conn)?;
        let store = Self { conn };
        for table in &config.schema.tables {
            store.create_table(&table.name, &table.fields()?)?;
        }
        Ok(store)
    }

    /// Run `f` inside one transaction: committed if it returns `Ok`,
    /// rolled back otherwise.
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let tx = Transaction {
            tx: self.conn.transaction()?,
        };
        let value = f(&tx)?;
        tx.tx.commit()?;
        debug!("transaction committed");
        Ok(value)
    }

    /// Release the connection.
    pub fn close(self) -> Result<()> {
        info!("closing sqlite store");
        self.conn.close().map_err(|(_, err)| Error::Close(err))
    }
}

impl TableAccess for SqliteStore {
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Operations scoped to an open transaction; see [`SqliteStore::transaction`].
pub struct Transaction<'conn> {
    tx: rusqlite::Transaction<'conn>,
}

impl TableAccess for Transaction<'_> {
    fn connection(&self) -> &Connection {
        &self.tx
    }
}

fn execute(conn: &Connection, sql: &SqlQuery) -> Result<usize> {
    debug!(statement = %sql.statement, params = sql.params.len(), "execute");
    Ok(conn.execute(&sql.statement, params_from_iter(&sql.params))?)
}

fn query_rows(conn: &Connection, sql: &SqlQuery) -> Result<Vec<Row>> {
    debug!(statement = %sql.statement, params = sql.params.len(), "query");
    let mut stmt = conn.prepare(&sql.statement)?;
    let columns: Arc<[String]> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let rows = stmt
        .query_map(params_from_iter(&sql.params), |row| {
            (0..width)
                .map(|idx| row.get::<_, Value>(idx))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .map(|values| values.map(|values| Row::new(Arc::clone(&columns), values)))
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

fn format_values(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Backs `x REGEXP pattern`, which SQLite evaluates as `regexp(pattern, x)`.
fn register_regexp(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let regex: Arc<Regex> = ctx.get_or_create_aux(0, |pattern| -> std::result::Result<_, BoxError> {
                Ok(Regex::new(pattern.as_str()?)?)
            })?;
            let is_match = match ctx.get_raw(1) {
                ValueRef::Null | ValueRef::Blob(_) => false,
                ValueRef::Integer(i) => regex.is_match(&i.to_string()),
                ValueRef::Real(f) => regex.is_match(&format!("{f:?}")),
                ValueRef::Text(t) => {
                    let text = std::str::from_utf8(t)
                        .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
                    regex.is_match(text)
                }
            };
            Ok(is_match)
        },
    )
}
