//! Database table configuration

use std::env;
use std::sync::LazyLock;

/// Table prefix from environment variable
pub static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "en_".to_string()));

/// Resolve a table name, honoring an explicit `DB_TABLE_<NAME>` override.
pub(crate) fn table_name(env_key: &str, suffix: &str) -> String {
    env::var(env_key).unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, suffix))
}
