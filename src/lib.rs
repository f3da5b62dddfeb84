//! Typed CRUD façade over an embedded SQLite database.
//!
//! # Intention
//!
//! - Turn structured create/insert/read/update/delete requests into
//!   parameterized SQL and run them against one owned connection.
//! - Keep identifiers validated and values bound, never interpolated.
//!
//! # Architectural Boundaries
//!
//! - Only SQLite/database code belongs here.
//! - No query planning, migrations or connection pooling; SQLite does the work.

pub mod config;
pub mod error;
pub mod query;
pub mod record;
pub mod schema;
pub mod sqlite;
pub mod value;

pub use config::SqliteConfig;
pub use error::{Error, Result};
pub use query::{Query, QueryOperator, SqlQuery};
pub use record::{Fields, Record};
pub use schema::{
    ColumnConstraint, ColumnDefinition, DataType, DefaultValue, ForeignKey, ForeignKeyAction,
    Schema, TableDefinition,
};
pub use sqlite::{InsertOutcome, SqliteStore, TableAccess, Transaction};
pub use value::{Row, Value};
