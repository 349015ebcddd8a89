mod column;
mod filter;
mod query;
mod schema;
mod statement;
mod table;

pub use column::*;
pub use filter::*;
pub use query::*;
pub use schema::*;
pub use statement::*;
pub use table::*;
