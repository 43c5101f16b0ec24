//! Core traits for datamapper

mod from_row;
mod from_value;
mod pool;

pub use from_row::{FromRow, Row, RowExt};
pub use from_value::FromValue;
pub use pool::{ExecuteResult, Pool};
