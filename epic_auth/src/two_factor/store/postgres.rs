use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::storage::validate_postgres_table_schema;
use crate::two_factor::{errors::TwoFactorError, types::TwoFactorSecret};
use crate::userdb::DB_TABLE_USERS;

use super::config::DB_TABLE_TWO_FACTOR;

pub(super) async fn create_tables_postgres(pool: &Pool<Postgres>) -> Result<(), TwoFactorError> {
    let table_name = DB_TABLE_TWO_FACTOR.as_str();
    let users_table = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            user_id TEXT NOT NULL PRIMARY KEY REFERENCES {users_table}(id) ON DELETE CASCADE,
            secret TEXT NOT NULL,
            algorithm TEXT NOT NULL,
            digits BIGINT NOT NULL,
            period BIGINT NOT NULL,
            confirmed_at TIMESTAMPTZ,
            last_used_step BIGINT,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    Ok(())
}

pub(super) async fn validate_two_factor_tables_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), TwoFactorError> {
    let expected_columns = [
        ("user_id", "text"),
        ("secret", "text"),
        ("algorithm", "text"),
        ("digits", "bigint"),
        ("period", "bigint"),
        ("confirmed_at", "timestamp with time zone"),
        ("last_used_step", "bigint"),
        ("created_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
        pool,
        &DB_TABLE_TWO_FACTOR,
        &expected_columns,
        TwoFactorError::Storage,
    )
    .await
}

pub(super) async fn get_secret_postgres(
    pool: &Pool<Postgres>,
    user_id: &str,
) -> Result<Option<TwoFactorSecret>, TwoFactorError> {
    let table_name = DB_TABLE_TWO_FACTOR.as_str();

    let secret = sqlx::query_as::<_, TwoFactorSecret>(&format!(
        r#"
        SELECT user_id, secret, algorithm, digits, period, confirmed_at, last_used_step, created_at
        FROM {table_name} WHERE user_id = $1
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(secret)
}

pub(super) async fn upsert_pending_secret_postgres(
    pool: &Pool<Postgres>,
    secret: &TwoFactorSecret,
) -> Result<bool, TwoFactorError> {
    let table_name = DB_TABLE_TWO_FACTOR.as_str();

    let result = sqlx::query(&format!(
        r#"
        INSERT INTO {table_name}
            (user_id, secret, algorithm, digits, period, confirmed_at, last_used_step, created_at)
        VALUES ($1, $2, $3, $4, $5, NULL, NULL, $6)
        ON CONFLICT (user_id) DO UPDATE SET
            secret = excluded.secret,
            algorithm = excluded.algorithm,
            digits = excluded.digits,
            period = excluded.period,
            last_used_step = NULL,
            created_at = excluded.created_at
        WHERE {table_name}.confirmed_at IS NULL
        "#
    ))
    .bind(&secret.user_id)
    .bind(&secret.secret)
    .bind(&secret.algorithm)
    .bind(secret.digits)
    .bind(secret.period)
    .bind(secret.created_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn confirm_secret_postgres(
    pool: &Pool<Postgres>,
    user_id: &str,
    step: i64,
    now: DateTime<Utc>,
) -> Result<bool, TwoFactorError> {
    let table_name = DB_TABLE_TWO_FACTOR.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET confirmed_at = $1, last_used_step = $2
        WHERE user_id = $3 AND confirmed_at IS NULL
        "#
    ))
    .bind(now)
    .bind(step)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn record_used_step_postgres(
    pool: &Pool<Postgres>,
    user_id: &str,
    step: i64,
) -> Result<bool, TwoFactorError> {
    let table_name = DB_TABLE_TWO_FACTOR.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET last_used_step = $1
        WHERE user_id = $2 AND confirmed_at IS NOT NULL
          AND (last_used_step IS NULL OR last_used_step < $3)
        "#
    ))
    .bind(step)
    .bind(user_id)
    .bind(step)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub(super) async fn delete_secret_postgres(
    pool: &Pool<Postgres>,
    user_id: &str,
) -> Result<bool, TwoFactorError> {
    let table_name = DB_TABLE_TWO_FACTOR.as_str();

    let result = sqlx::query(&format!(
        r#"
        DELETE FROM {table_name} WHERE user_id = $1
        "#
    ))
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
