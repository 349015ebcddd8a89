mod client;

pub use client::*;
pub use quill_core::*;
pub use quill_mysql::MySqlDialect;
pub use quill_postgres::PostgresDialect;
pub use quill_sqlite::SqliteDialect;
