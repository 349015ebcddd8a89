mod dialect;
mod table;

pub use dialect::*;
