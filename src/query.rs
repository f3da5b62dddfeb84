//! Condition expressions and SQL statement builders.
//!
//! Builders are pure: they validate identifiers, render statement text with
//! positional `?` placeholders and collect the values to bind, in order.
//! Values never appear in statement text.

use crate::error::{Error, Result};
use crate::record::{Fields, Record};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Query operators for building filter conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOperator {
    Equal(Value),
    NotEqual(Value),
    GreaterThan(Value),
    GreaterThanOrEqual(Value),
    LessThan(Value),
    LessThanOrEqual(Value),
    /// Substring match; `%` and `_` in the needle are literal.
    Contains(String),
    /// Set membership. An empty set matches no row.
    In(Vec<Value>),
    /// Regular expression match (Rust `regex` syntax, unanchored).
    Regex(String),
}

/// Conjunction of conditions, rendered in insertion order.
///
/// A column may appear more than once, e.g. a lower and an upper bound.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub conditions: Vec<(String, QueryOperator)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, field: &str, op: QueryOperator) -> Self {
        self.conditions.push((field.to_string(), op));
        self
    }

    /// Shorthand for an equality condition.
    pub fn with_equal(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_condition(field, QueryOperator::Equal(value.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }
}

impl From<Record> for Query {
    /// Every column of the record must equal its value.
    fn from(record: Record) -> Self {
        Self {
            conditions: record
                .values
                .into_iter()
                .map(|(column, value)| (column, QueryOperator::Equal(value)))
                .collect(),
        }
    }
}

/// SQL statement with its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: Vec<Value>,
}

impl SqlQuery {
    pub fn new(statement: &str) -> Self {
        Self {
            statement: statement.to_string(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }
}

/// Reject anything but `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(Error::InvalidIdentifier(name.to_string()))
    }
}

fn validate_declaration(column: &str, declaration: &str) -> Result<()> {
    if declaration.trim().is_empty() {
        return Err(Error::InvalidDeclaration {
            column: column.to_string(),
            declaration: declaration.to_string(),
        });
    }
    Ok(())
}

/// `CREATE TABLE IF NOT EXISTS t (c1 d1, c2 d2, ...)`
pub fn create_table(table: &str, fields: &Fields) -> Result<SqlQuery> {
    validate_identifier(table)?;
    if fields.is_empty() {
        return Err(Error::EmptyRecord {
            operation: "create_table",
            table: table.to_string(),
        });
    }
    let mut columns = Vec::with_capacity(fields.len());
    for (name, declaration) in &fields.columns {
        validate_identifier(name)?;
        validate_declaration(name, declaration)?;
        columns.push(format!("{name} {}", declaration.trim()));
    }
    Ok(SqlQuery::new(&format!(
        "CREATE TABLE IF NOT EXISTS {table} ({})",
        columns.join(", ")
    )))
}

/// `INSERT INTO t (c1, c2) VALUES (?, ?)`
pub fn insert(table: &str, data: &Record) -> Result<SqlQuery> {
    validate_identifier(table)?;
    if data.is_empty() {
        return Err(Error::EmptyRecord {
            operation: "insert",
            table: table.to_string(),
        });
    }
    let mut columns = Vec::with_capacity(data.len());
    let mut params = Vec::with_capacity(data.len());
    for (column, value) in &data.values {
        columns.push(validate_identifier(column)?);
        params.push(value.clone());
    }
    let placeholders = vec!["?"; columns.len()].join(", ");
    Ok(SqlQuery::new(&format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    ))
    .with_params(params))
}

/// `SELECT * FROM t [WHERE ...]`
pub fn select(table: &str, query: Option<&Query>) -> Result<SqlQuery> {
    validate_identifier(table)?;
    let mut statement = format!("SELECT * FROM {table}");
    let mut params = Vec::new();
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        statement.push_str(" WHERE ");
        statement.push_str(&where_clause(query, &mut params)?);
    }
    Ok(SqlQuery::new(&statement).with_params(params))
}

/// `UPDATE t SET c1 = ?, ... WHERE ...`; `query` must not be empty.
pub fn update(table: &str, data: &Record, query: &Query) -> Result<SqlQuery> {
    if query.is_empty() {
        return Err(Error::EmptyConditions {
            operation: "update",
            table: table.to_string(),
        });
    }
    let mut sql = update_all(table, data)?;
    sql.statement.push_str(" WHERE ");
    sql.statement.push_str(&where_clause(query, &mut sql.params)?);
    Ok(sql)
}

/// `UPDATE t SET c1 = ?, ...` against every row.
pub fn update_all(table: &str, data: &Record) -> Result<SqlQuery> {
    validate_identifier(table)?;
    if data.is_empty() {
        return Err(Error::EmptyRecord {
            operation: "update",
            table: table.to_string(),
        });
    }
    let mut assignments = Vec::with_capacity(data.len());
    let mut params = Vec::with_capacity(data.len());
    for (column, value) in &data.values {
        assignments.push(format!("{} = ?", validate_identifier(column)?));
        params.push(value.clone());
    }
    Ok(SqlQuery::new(&format!("UPDATE {table} SET {}", assignments.join(", "))).with_params(params))
}

/// `DELETE FROM t WHERE ...`; `query` must not be empty.
pub fn delete(table: &str, query: &Query) -> Result<SqlQuery> {
    if query.is_empty() {
        return Err(Error::EmptyConditions {
            operation: "delete",
            table: table.to_string(),
        });
    }
    let mut sql = delete_all(table)?;
    sql.statement.push_str(" WHERE ");
    sql.statement.push_str(&where_clause(query, &mut sql.params)?);
    Ok(sql)
}

/// `DELETE FROM t` against every row.
pub fn delete_all(table: &str) -> Result<SqlQuery> {
    validate_identifier(table)?;
    Ok(SqlQuery::new(&format!("DELETE FROM {table}")))
}

fn where_clause(query: &Query, params: &mut Vec<Value>) -> Result<String> {
    let mut terms = Vec::with_capacity(query.len());
    for (column, op) in &query.conditions {
        let column = validate_identifier(column)?;
        terms.push(render_condition(column, op, params));
    }
    Ok(terms.join(" AND "))
}

fn render_condition(column: &str, op: &QueryOperator, params: &mut Vec<Value>) -> String {
    let (sql_op, value) = match op {
        QueryOperator::Equal(v) => ("=", v),
        QueryOperator::NotEqual(v) => ("!=", v),
        QueryOperator::GreaterThan(v) => (">", v),
        QueryOperator::GreaterThanOrEqual(v) => (">=", v),
        QueryOperator::LessThan(v) => ("<", v),
        QueryOperator::LessThanOrEqual(v) => ("<=", v),
        QueryOperator::Contains(needle) => {
            params.push(Value::Text(escape_like(needle)));
            return format!("{column} LIKE '%' || ? || '%' ESCAPE '\\'");
        }
        QueryOperator::In(values) if values.is_empty() => return "0".to_string(),
        QueryOperator::In(values) => {
            params.extend(values.iter().cloned());
            return format!("{column} IN ({})", vec!["?"; values.len()].join(", "));
        }
        QueryOperator::Regex(pattern) => {
            params.push(Value::Text(pattern.clone()));
            return format!("{column} REGEXP ?");
        }
    };
    params.push(value.clone());
    format!("{column} {sql_op} ?")
}

fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
