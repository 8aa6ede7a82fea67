use std::sync::LazyLock;

use crate::storage::table_name;

/// Sessions table name
pub(crate) static DB_TABLE_SESSIONS: LazyLock<String> =
    LazyLock::new(|| table_name("DB_TABLE_SESSIONS", "sessions"));
