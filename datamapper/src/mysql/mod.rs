//! MySQL implementation for datamapper

mod pool;
mod row;
mod types;

pub use pool::MySqlPool;
pub use row::MySqlRow;
