use std::sync::LazyLock;

use crate::storage::table_name;

/// Two-factor secrets table name
pub(crate) static DB_TABLE_TWO_FACTOR: LazyLock<String> =
    LazyLock::new(|| table_name("DB_TABLE_TWO_FACTOR", "two_factor"));
