mod ddl;
mod dialect;
mod table;

pub use ddl::*;
pub use dialect::*;
