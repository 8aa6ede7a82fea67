use std::sync::LazyLock;

use crate::storage::table_name;

/// Users table name
pub(crate) static DB_TABLE_USERS: LazyLock<String> =
    LazyLock::new(|| table_name("DB_TABLE_USERS", "users"));

/// Password hashes table name
pub(crate) static DB_TABLE_PASSWORDS: LazyLock<String> =
    LazyLock::new(|| table_name("DB_TABLE_PASSWORDS", "passwords"));
