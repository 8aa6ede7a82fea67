use sqlx::{Pool, Postgres, Row, Sqlite};

/// Validates that a Postgres table schema matches what we expect
pub(crate) async fn validate_postgres_table_schema<E>(
    pool: &Pool<Postgres>,
    table_name: &str,
    expected_columns: &[(&str, &str)],
    error_mapper: impl Fn(String) -> E,
) -> Result<(), E> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
    )
    .bind(table_name)
    .fetch_one(pool)
    .await
    .map_err(|e| error_mapper(e.to_string()))?;

    if !table_exists {
        return Err(error_mapper(format!(
            "Schema validation failed: Table '{table_name}' does not exist"
        )));
    }

    let rows = sqlx::query(
        "SELECT column_name, data_type FROM information_schema.columns
         WHERE table_name = $1 ORDER BY column_name",
    )
    .bind(table_name)
    .fetch_all(pool)
    .await
    .map_err(|e| error_mapper(e.to_string()))?;

    let actual_columns: Vec<(String, String)> = rows
        .iter()
        .map(|row| {
            let name: String = row.get("column_name");
            let type_: String = row.get("data_type");
            (name, type_)
        })
        .collect();

    compare_columns(table_name, expected_columns, &actual_columns).map_err(error_mapper)
}

/// Validates that a SQLite table schema matches what we expect
pub(crate) async fn validate_sqlite_table_schema<E>(
    pool: &Pool<Sqlite>,
    table_name: &str,
    expected_columns: &[(&str, &str)],
    error_mapper: impl Fn(String) -> E,
) -> Result<(), E> {
    let table_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind(table_name)
    .fetch_one(pool)
    .await
    .map_err(|e| error_mapper(e.to_string()))?;

    if table_count == 0 {
        return Err(error_mapper(format!(
            "Schema validation failed: Table '{table_name}' does not exist"
        )));
    }

    // PRAGMA does not accept bound parameters; table names come from configuration only.
    let rows = sqlx::query(&format!("PRAGMA table_info({table_name})"))
        .fetch_all(pool)
        .await
        .map_err(|e| error_mapper(e.to_string()))?;

    let actual_columns: Vec<(String, String)> = rows
        .iter()
        .map(|row| {
            let name: String = row.get("name");
            let type_: String = row.get("type");
            (name, type_.to_uppercase())
        })
        .collect();

    compare_columns(table_name, expected_columns, &actual_columns).map_err(error_mapper)
}

fn compare_columns(
    table_name: &str,
    expected_columns: &[(&str, &str)],
    actual_columns: &[(String, String)],
) -> Result<(), String> {
    for (expected_name, expected_type) in expected_columns {
        let found = actual_columns
            .iter()
            .find(|(name, _)| name == expected_name);

        match found {
            Some((_, actual_type)) if actual_type.eq_ignore_ascii_case(expected_type) => {}
            Some((_, actual_type)) => {
                return Err(format!(
                    "Schema validation failed: Column '{expected_name}' has type '{actual_type}' but expected '{expected_type}'"
                ));
            }
            None => {
                return Err(format!(
                    "Schema validation failed: Missing column '{expected_name}'"
                ));
            }
        }
    }

    for (actual_name, _) in actual_columns {
        if !expected_columns
            .iter()
            .any(|(name, _)| *name == actual_name)
        {
            tracing::warn!(
                "Extra column '{}' found in table '{}'",
                actual_name,
                table_name
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DataStore;

    async fn sqlite_with_table() -> DataStore {
        let store = DataStore::connect("sqlite::memory:")
            .await
            .expect("connect");
        sqlx::query("CREATE TABLE widgets (id TEXT NOT NULL, created_at TIMESTAMP NOT NULL)")
            .execute(store.as_sqlite().expect("sqlite"))
            .await
            .expect("create");
        store
    }

    #[tokio::test]
    async fn test_sqlite_schema_matches() {
        let store = sqlite_with_table().await;
        let result = validate_sqlite_table_schema(
            store.as_sqlite().expect("sqlite"),
            "widgets",
            &[("id", "TEXT"), ("created_at", "TIMESTAMP")],
            |e| e,
        )
        .await;
        assert!(result.is_ok(), "{result:?}");
    }

    #[tokio::test]
    async fn test_sqlite_schema_wrong_type_and_missing_column() {
        let store = sqlite_with_table().await;
        let pool = store.as_sqlite().expect("sqlite");

        let wrong_type =
            validate_sqlite_table_schema(pool, "widgets", &[("id", "INTEGER")], |e| e).await;
        assert!(wrong_type.unwrap_err().contains("has type 'TEXT'"));

        let missing =
            validate_sqlite_table_schema(pool, "widgets", &[("owner", "TEXT")], |e| e).await;
        assert!(missing.unwrap_err().contains("Missing column 'owner'"));
    }

    #[tokio::test]
    async fn test_sqlite_schema_missing_table() {
        let store = sqlite_with_table().await;
        let result = validate_sqlite_table_schema(
            store.as_sqlite().expect("sqlite"),
            "nope",
            &[("id", "TEXT")],
            |e| e,
        )
        .await;
        assert!(result.unwrap_err().contains("does not exist"));
    }
}
