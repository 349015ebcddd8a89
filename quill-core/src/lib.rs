mod builder;
mod compiler;
mod config;
mod connection;
pub mod ddl;
mod dialect;
mod error;
mod executor;
mod formatter;
mod operator;
mod raw;
mod response;
mod runner;
mod unique_id;
mod util;
mod value;

pub use ::anyhow::Context as ErrorContext;
pub use builder::*;
pub use compiler::*;
pub use config::*;
pub use connection::*;
pub use dialect::*;
pub use error::*;
pub use executor::*;
pub use formatter::*;
pub use operator::*;
pub use raw::*;
pub use response::*;
pub use runner::*;
pub use unique_id::*;
pub use util::*;
pub use value::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
