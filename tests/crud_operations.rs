use sqlite_crud::{
    Error, Fields, InsertOutcome, Query, Record, Row, SqliteStore, TableAccess, Value,
};
use tempfile::NamedTempFile;

fn employee_fields() -> Fields {
    Fields::new()
        .with_column("id", "INTEGER PRIMARY KEY")
        .with_column("first_name", "TEXT")
        .with_column("last_name", "TEXT")
        .with_column("email", "TEXT")
        .with_column("department", "TEXT")
}

fn john() -> Record {
    Record::new()
        .with_value("id", 1)
        .with_value("first_name", "John")
        .with_value("last_name", "Doe")
        .with_value("email", "john.doe@example.com")
        .with_value("department", "Engineering")
}

fn by_id(id: i64) -> Query {
    Query::new().with_equal("id", id)
}

fn values(rows: &[Row]) -> Vec<Vec<Value>> {
    rows.iter().map(|r| r.values().to_vec()).collect()
}

// Helper function to create an in-memory store with the employees table
fn create_test_store() -> sqlite_crud::Result<SqliteStore> {
    let store = SqliteStore::open_in_memory()?;
    store.create_table("employees", &employee_fields())?;
    Ok(store)
}

// Helper function to create a temporary file-based store
fn create_temp_store() -> sqlite_crud::Result<(SqliteStore, NamedTempFile)> {
    let temp_file = NamedTempFile::new().unwrap();
    let store = SqliteStore::open_path(temp_file.path())?;
    store.create_table("employees", &employee_fields())?;
    Ok((store, temp_file))
}

#[test]
fn test_insert_then_read_round_trip() -> sqlite_crud::Result<()> {
    let store = create_test_store()?;
    assert_eq!(store.insert("employees", &john())?, InsertOutcome::Inserted);

    let rows = store.read("employees", Some(&by_id(1)))?;
    assert_eq!(
        values(&rows),
        vec![vec![
            Value::Integer(1),
            Value::from("John"),
            Value::from("Doe"),
            Value::from("john.doe@example.com"),
            Value::from("Engineering"),
        ]]
    );
    assert_eq!(
        rows[0].columns(),
        &["id", "first_name", "last_name", "email", "department"]
    );
    Ok(())
}

#[test]
fn test_create_table_twice_keeps_rows() -> sqlite_crud::Result<()> {
    let store = create_test_store()?;
    store.insert("employees", &john())?;
    store.create_table("employees", &employee_fields())?;
    assert_eq!(store.read("employees", None)?.len(), 1);
    Ok(())
}

#[test]
fn test_duplicate_primary_key_is_skipped() -> sqlite_crud::Result<()> {
    let store = create_test_store()?;
    store.insert("employees", &john())?;
    let before = store.read("employees", Some(&by_id(1)))?;

    let impostor = john()
        .with_value("first_name", "Johnny")
        .with_value("email", "other@example.com");
    assert_eq!(store.insert("employees", &impostor)?, InsertOutcome::Skipped);

    assert_eq!(store.read("employees", Some(&by_id(1)))?, before);
    assert_eq!(store.read("employees", None)?.len(), 1);
    Ok(())
}

#[test]
fn test_update_changes_only_given_columns() -> sqlite_crud::Result<()> {
    let store = create_test_store()?;
    store.insert("employees", &john())?;

    let changed = store.update(
        "employees",
        &Record::new().with_value("email", "j.doe@example.com"),
        &by_id(1),
    )?;
    assert_eq!(changed, 1);

    let rows = store.read("employees", Some(&by_id(1)))?;
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get("email"), Some(&Value::from("j.doe@example.com")));
    assert_eq!(row.get("first_name"), Some(&Value::from("John")));
    assert_eq!(row.get("last_name"), Some(&Value::from("Doe")));
    assert_eq!(row.get("department"), Some(&Value::from("Engineering")));
    Ok(())
}

#[test]
fn test_delete_removes_row() -> sqlite_crud::Result<()> {
    let store = create_test_store()?;
    store.insert("employees", &john())?;
    store.insert("employees", &john().with_value("id", 2).with_value("first_name", "Jim"))?;

    assert_eq!(store.delete("employees", &by_id(1))?, 1);
    assert!(store.read("employees", Some(&by_id(1)))?.is_empty());

    let remaining = store.read("employees", None)?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].get("id"), Some(&Value::Integer(2)));
    Ok(())
}

#[test]
fn test_multiple_conditions_are_conjunctive() -> sqlite_crud::Result<()> {
    let store = create_test_store()?;
    let people = [
        (1, "Alice", "Engineering"),
        (2, "Alice", "Marketing"),
        (3, "Bob", "Engineering"),
    ];
    for (id, first, department) in people {
        store.insert(
            "employees",
            &Record::new()
                .with_value("id", id)
                .with_value("first_name", first)
                .with_value("department", department),
        )?;
    }

    let rows = store.read(
        "employees",
        Some(
            &Query::new()
                .with_equal("first_name", "Alice")
                .with_equal("department", "Engineering"),
        ),
    )?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("id"), Some(&Value::Integer(1)));
    Ok(())
}

#[test]
fn test_unconditional_read_in_storage_order() -> sqlite_crud::Result<()> {
    let store = create_test_store()?;
    for id in [3, 1, 2] {
        store.insert("employees", &john().with_value("id", id))?;
    }
    let ids: Vec<Value> = store
        .read("employees", None)?
        .iter()
        .map(|r| r.values()[0].clone())
        .collect();
    assert_eq!(ids, vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
    Ok(())
}

#[test]
fn test_null_values_round_trip() -> sqlite_crud::Result<()> {
    let store = create_test_store()?;
    store.insert(
        "employees",
        &Record::new()
            .with_value("id", 7)
            .with_value("email", None::<String>),
    )?;
    let rows = store.read("employees", Some(&by_id(7)))?;
    assert_eq!(rows[0].get("email"), Some(&Value::Null));
    assert_eq!(rows[0].to_string(), "(7, NULL, NULL, NULL, NULL)");
    Ok(())
}

#[test]
fn test_injection_through_identifiers_is_rejected() -> sqlite_crud::Result<()> {
    let store = create_test_store()?;
    store.insert("employees", &john())?;

    let result = store.read("employees; DROP TABLE employees", None);
    assert!(matches!(result, Err(Error::InvalidIdentifier(_))));

    let result = store.delete("employees", &Query::new().with_equal("1=1 OR id", 1));
    assert!(matches!(result, Err(Error::InvalidIdentifier(_))));

    // Hostile values are bound, not interpolated.
    let rows = store.read(
        "employees",
        Some(&Query::new().with_equal("first_name", "x' OR '1'='1")),
    )?;
    assert!(rows.is_empty());
    assert_eq!(store.read("employees", None)?.len(), 1);
    Ok(())
}

#[test]
fn test_unknown_table_propagates() {
    let store = create_test_store().unwrap();
    assert!(matches!(store.read("missing", None), Err(Error::Db(_))));
    assert!(matches!(
        store.delete("missing", &by_id(1)),
        Err(Error::Db(_))
    ));
}

#[test]
fn test_file_store_persists_across_reopen() -> sqlite_crud::Result<()> {
    let (store, temp_file) = create_temp_store()?;
    store.insert("employees", &john())?;
    store.close()?;

    let store = SqliteStore::open_path(temp_file.path())?;
    assert!(store.table_exists("employees")?);
    let rows = store.read("employees", Some(&by_id(1)))?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("first_name"), Some(&Value::from("John")));
    store.close()
}
