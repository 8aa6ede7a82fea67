use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::storage::validate_postgres_table_schema;
use crate::userdb::{
    errors::UserError,
    types::{User, UserSearchField},
};

use super::config::{DB_TABLE_PASSWORDS, DB_TABLE_USERS};

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let users_table = DB_TABLE_USERS.as_str();
    let passwords_table = DB_TABLE_PASSWORDS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {users_table} (
            sequence_number BIGSERIAL PRIMARY KEY,
            id TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
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
pub(super) async fn validate_user_tables_postgres(pool: &Pool<Postgres>) -> Result<(), UserError> {
    let users_columns = [
        ("sequence_number", "bigint"),
        ("id", "text"),
        ("email", "text"),
        ("username", "text"),
        ("name", "text"),
        ("created_at", "timestamp with time zone"),
        ("updated_at", "timestamp with time zone"),
    ];
    validate_postgres_table_schema(pool, &DB_TABLE_USERS, &users_columns, UserError::Storage)
        .await?;

    let passwords_columns = [("user_id", "text"), ("hash", "text")];
    validate_postgres_table_schema(
        pool,
        &DB_TABLE_PASSWORDS,
        &passwords_columns,
        UserError::Storage,
    )
    .await
}

pub(super) async fn get_user_by_field_postgres(
    pool: &Pool<Postgres>,
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
        SELECT * FROM {table_name} WHERE {column} = $1
        "#
    ))
    .bind(value)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn insert_user_with_password_postgres(
    pool: &Pool<Postgres>,
    user: &User,
    password_hash: &str,
) -> Result<User, UserError> {
    let users_table = DB_TABLE_USERS.as_str();
    let passwords_table = DB_TABLE_PASSWORDS.as_str();

    let mut tx = pool.begin().await?;

    let stored = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO {users_table} (id, email, username, name, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#
    ))
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.name)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(&format!(
        r#"
        INSERT INTO {passwords_table} (user_id, hash) VALUES ($1, $2)
        "#
    ))
    .bind(&user.id)
    .bind(password_hash)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(stored)
}

pub(super) async fn get_password_hash_postgres(
    pool: &Pool<Postgres>,
    user_id: &str,
) -> Result<Option<String>, UserError> {
    let table_name = DB_TABLE_PASSWORDS.as_str();

    sqlx::query_scalar::<_, String>(&format!(
        r#"
        SELECT hash FROM {table_name} WHERE user_id = $1
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn update_user_postgres(
    pool: &Pool<Postgres>,
    user: &User,
) -> Result<User, UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE {table_name} SET email = $1, username = $2, name = $3, updated_at = $4
        WHERE id = $5
        RETURNING *
        "#
    ))
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.name)
    .bind(Utc::now())
    .bind(&user.id)
    .fetch_optional(pool)
    .await?
    .ok_or(UserError::NotFound)
}

pub(super) async fn delete_user_postgres(pool: &Pool<Postgres>, id: &str) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE id = $1
        "#
    ))
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}
