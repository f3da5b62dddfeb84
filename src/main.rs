use anyhow::{Context, Result};
use clap::Parser;
use sqlite_crud::{
    ColumnConstraint, ColumnDefinition, DataType, Fields, Query, QueryOperator, Record, Row,
    Schema, SqliteConfig, SqliteStore, TableAccess, TableDefinition,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Runs a scripted create/insert/read/update/delete session against a SQLite file
#[derive(Parser, Debug)]
#[command(name = "sqlite-crud")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Database file, created if missing
    #[arg(long, default_value = "company.db", env = "SQLITE_CRUD_DB")]
    db: PathBuf,

    /// Print rows as JSON objects instead of tuples
    #[arg(long)]
    json: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("sqlite_crud={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = SqliteConfig::new(cli.db.clone(), Schema::new().add_table(departments_table()));
    let store = SqliteStore::open(&config)
        .with_context(|| format!("failed to open {}", cli.db.display()))?;

    run_employees(&store, cli.json)?;
    run_departments(&store, cli.json)?;

    store.close()?;
    Ok(())
}

fn departments_table() -> TableDefinition {
    TableDefinition::new("departments")
        .with_column(
            ColumnDefinition::new("id", DataType::Integer)
                .with_constraint(ColumnConstraint::PrimaryKey)
                .with_constraint(ColumnConstraint::AutoIncrement),
        )
        .with_column(
            ColumnDefinition::new("name", DataType::Text).with_constraint(ColumnConstraint::Unique),
        )
        .with_column(ColumnDefinition::new("location", DataType::Text))
}

fn employee(id: i64, first_name: &str, last_name: &str, email: &str, department: &str) -> Record {
    Record::new()
        .with_value("id", id)
        .with_value("first_name", first_name)
        .with_value("last_name", last_name)
        .with_value("email", email)
        .with_value("department", department)
}

fn department(id: i64, name: &str, location: &str) -> Record {
    Record::new()
        .with_value("id", id)
        .with_value("name", name)
        .with_value("location", location)
}

fn run_employees(store: &SqliteStore, json: bool) -> Result<()> {
    let fields = Fields::new()
        .with_column("id", "INTEGER PRIMARY KEY AUTOINCREMENT")
        .with_column("first_name", "TEXT")
        .with_column("last_name", "TEXT")
        .with_column("email", "TEXT")
        .with_column("department", "TEXT");
    store.create_table("employees", &fields)?;

    for row in [
        employee(1, "John", "Doe", "john.doe@example.com", "Engineering"),
        employee(2, "Jane", "Smith", "jane.smith@example.com", "Marketing"),
        employee(3, "Alice", "Johnson", "alice.johnson@example.com", "Engineering"),
    ] {
        store.insert("employees", &row)?;
    }

    let read = |label: &str, query: Option<Query>| -> Result<()> {
        print_rows(label, &store.read("employees", query.as_ref())?, json)
    };

    read(
        "Engineering Department",
        Some(Query::new().with_equal("department", "Engineering")),
    )?;
    read(
        "Employees with last name Smith",
        Some(Query::new().with_equal("last_name", "Smith")),
    )?;
    read(
        "Alice in Engineering",
        Some(
            Query::new()
                .with_equal("first_name", "Alice")
                .with_equal("department", "Engineering"),
        ),
    )?;
    read("All employees", None)?;

    let by_id = Query::new().with_equal("id", 1);
    store.update(
        "employees",
        &Record::new().with_value("email", "j.doe@example.com"),
        &by_id,
    )?;
    read("Updated employee with id 1", Some(by_id.clone()))?;
    read("All employees after update", None)?;

    store.delete("employees", &by_id)?;
    read("All employees after deletion", None)?;

    read(
        "Employees with id greater than 1",
        Some(Query::new().with_condition("id", QueryOperator::GreaterThan(1.into()))),
    )?;
    read(
        "Employees with first name containing 'Jane'",
        Some(Query::new().with_condition("first_name", QueryOperator::Contains("Jane".to_string()))),
    )?;
    read(
        "Employees with id less than or equal to 3",
        Some(Query::new().with_condition("id", QueryOperator::LessThanOrEqual(3.into()))),
    )?;
    read(
        "Employees with id not equal to 2",
        Some(Query::new().with_condition("id", QueryOperator::NotEqual(2.into()))),
    )?;
    read(
        "Employees with id in [1, 3]",
        Some(Query::new().with_condition("id", QueryOperator::In(vec![1.into(), 3.into()]))),
    )?;
    read(
        "Employees with email matching regex '.*@example.com'",
        Some(Query::new().with_condition("email", QueryOperator::Regex(".*@example.com".to_string()))),
    )
}

fn run_departments(store: &SqliteStore, json: bool) -> Result<()> {
    for row in [
        department(1, "Engineering", "Building A"),
        department(2, "Marketing", "Building B"),
        department(3, "HR", "Building C"),
    ] {
        store.insert("departments", &row)?;
    }
    print_rows("All departments", &store.read("departments", None)?, json)?;

    let by_id = Query::new().with_equal("id", 1);
    store.update(
        "departments",
        &Record::new().with_value("location", "Building D"),
        &by_id,
    )?;
    print_rows(
        "Updated department with id 1",
        &store.read("departments", Some(&by_id))?,
        json,
    )?;

    store.delete("departments", &by_id)?;
    print_rows(
        "All departments after deletion",
        &store.read("departments", None)?,
        json,
    )
}

fn print_rows(label: &str, rows: &[Row], json: bool) -> Result<()> {
    if json {
        println!("{label}: {}", serde_json::to_string(rows)?);
    } else {
        let rendered: Vec<String> = rows.iter().map(ToString::to_string).collect();
        println!("{label}: [{}]", rendered.join(", "));
    }
    Ok(())
}
