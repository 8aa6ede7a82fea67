use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::session::{errors::SessionError, types::Session};
use crate::storage::validate_postgres_table_schema;
use crate::userdb::DB_TABLE_USERS;

use super::config::DB_TABLE_SESSIONS;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), SessionError> {
    let sessions_table = DB_TABLE_SESSIONS.as_str();
    let users_table = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {sessions_table} (
            id TEXT NOT NULL PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES {users_table}(id) ON DELETE CASCADE,
            expires_at TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_{sessions_table}_user_id ON {sessions_table}(user_id)
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn validate_session_tables_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), SessionError> {
    let expected_columns = [
        ("id", "text"),
        ("user_id", "text"),
        ("expires_at", "timestamp with time zone"),
        ("created_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
        pool,
        &DB_TABLE_SESSIONS,
        &expected_columns,
        SessionError::Storage,
    )
    .await
}

pub(super) async fn insert_session_postgres(
    pool: &Pool<Postgres>,
    session: &Session,
) -> Result<(), SessionError> {
    let table_name = DB_TABLE_SESSIONS.as_str();

    sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (id, user_id, expires_at, created_at) VALUES ($1, $2, $3, $4)
        "#
    ))
    .bind(&session.id)
    .bind(&session.user_id)
    .bind(session.expires_at)
    .bind(session.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn get_session_postgres(
    pool: &Pool<Postgres>,
    id: &str,
) -> Result<Option<Session>, SessionError> {
    let table_name = DB_TABLE_SESSIONS.as_str();

    let session = sqlx::query_as::<_, Session>(&format!(
        r#"
        SELECT id, user_id, expires_at, created_at FROM {table_name} WHERE id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

pub(super) async fn delete_session_postgres(
    pool: &Pool<Postgres>,
    id: &str,
) -> Result<bool, SessionError> {
    let table_name = DB_TABLE_SESSIONS.as_str();

    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE id = $1
        "#
    ))
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn delete_user_sessions_except_postgres(
    pool: &Pool<Postgres>,
    user_id: &str,
    keep_id: Option<&str>,
) -> Result<u64, SessionError> {
    let table_name = DB_TABLE_SESSIONS.as_str();

    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE user_id = $1 AND ($2::TEXT IS NULL OR id <> $3)
        "#
    ))
    .bind(user_id)
    .bind(keep_id)
    .bind(keep_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub(super) async fn delete_expired_sessions_postgres(
    pool: &Pool<Postgres>,
    now: DateTime<Utc>,
) -> Result<u64, SessionError> {
    let table_name = DB_TABLE_SESSIONS.as_str();

    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE expires_at <= $1
        "#
    ))
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub(super) async fn count_user_sessions_postgres(
    pool: &Pool<Postgres>,
    user_id: &str,
) -> Result<i64, SessionError> {
    let table_name = DB_TABLE_SESSIONS.as_str();

    let count: i64 = sqlx::query_scalar(&format!(
        r#"
        SELECT COUNT(*) FROM {table_name} WHERE user_id = $1
        "#
    ))
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

pub(super) async fn update_session_expiry_postgres(
    pool: &Pool<Postgres>,
    id: &str,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<bool, SessionError> {
    let table_name = DB_TABLE_SESSIONS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET expires_at = $1 WHERE id = $2 AND expires_at > $3
        "#
    ))
    .bind(expires_at)
    .bind(id)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
