mod config;
mod data_store;
mod errors;
mod schema_validation;


pub use config::DB_TABLE_PREFIX;
pub(crate) use config::table_name;
pub use data_store::DataStore;
pub use errors::StorageError;

pub(crate) use schema_validation::{validate_postgres_table_schema, validate_sqlite_table_schema};
