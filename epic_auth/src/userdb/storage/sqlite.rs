use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::storage::validate_sqlite_table_schema;
use crate::userdb::{
    errors::UserError,
    types::{User, UserSearchField},
};

use super::config::{DB_TABLE_PASSWORDS, DB_TABLE_USERS};

pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let users_table = DB_TABLE_USERS.as_str();
    let passwords_table = DB_TABLE_PASSWORDS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {users_table} (
            sequence_number INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL,
            updated_at TIMESTAMP NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {passwords_table} (
            user_id TEXT NOT NULL PRIMARY KEY REFERENCES {users_table}(id) ON DELETE CASCADE,
            hash TEXT NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

/// Validates that the users and passwords table schemas match what we expect
pub(super) async fn validate_user_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let users_columns = [
        ("sequence_number", "INTEGER"),
        ("id", "TEXT"),
        ("email", "TEXT"),
        ("username", "TEXT"),
        ("name", "TEXT"),
        ("created_at", "TIMESTAMP"),
        ("updated_at", "TIMESTAMP"),
    ];
    validate_sqlite_table_schema(pool, &DB_TABLE_USERS, &users_columns, UserError::Storage)
        .await?;

    let passwords_columns = [("user_id", "TEXT"), ("hash", "TEXT")];
    validate_sqlite_table_schema(
        pool,
        &DB_TABLE_PASSWORDS,
        &passwords_columns,
        UserError::Storage,
    )
    .await
}

pub(super) async fn get_user_by_field_sqlite(
    pool: &Pool<Sqlite>,
    field: &UserSearchField,
) -> Result<Option<User>, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let (column, value) = match field {
        UserSearchField::Id(id) => ("id", id.as_str()),
        UserSearchField::Email(email) => ("email", email.as_str()),
        UserSearchField::Username(username) => ("username", username.as_str()),
    };

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE {column} = ?
        "#
    ))
    .bind(value)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn insert_user_with_password_sqlite(
    pool: &Pool<Sqlite>,
    user: &User,
    password_hash: &str,
) -> Result<User, UserError> {
    let users_table = DB_TABLE_USERS.as_str();
    let passwords_table = DB_TABLE_PASSWORDS.as_str();

    let mut tx = pool.begin().await?;

    sqlx::query(&format!(
        r#"
        INSERT INTO {users_table} (id, email, username, name, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#
    ))
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.name)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query(&format!(
        r#"
        INSERT INTO {passwords_table} (user_id, hash) VALUES (?, ?)
        "#
    ))
    .bind(&user.id)
    .bind(password_hash)
    .execute(&mut *tx)
    .await?;

    let stored = sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {users_table} WHERE id = ?
        "#
    ))
    .bind(&user.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(stored)
}

pub(super) async fn get_password_hash_sqlite(
    pool: &Pool<Sqlite>,
    user_id: &str,
) -> Result<Option<String>, UserError> {
    let table_name = DB_TABLE_PASSWORDS.as_str();

    sqlx::query_scalar::<_, String>(&format!(
        r#"
        SELECT hash FROM {table_name} WHERE user_id = ?
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn update_user_sqlite(pool: &Pool<Sqlite>, user: &User) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET email = ?, username = ?, name = ?, updated_at = ?
        WHERE id = ?
        "#
    ))
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.name)
    .bind(Utc::now())
    .bind(&user.id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotFound);
    }

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(&user.id)
    .fetch_one(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn delete_user_sqlite(pool: &Pool<Sqlite>, id: &str) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE id = ?
        "#
    ))
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}
