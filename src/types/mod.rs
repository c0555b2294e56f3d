//! Column, value and row types shared by cursors and the decoder.

pub mod codes;
mod column;
mod row;
mod sql_type;
mod value;

pub use column::{ColumnDescriptor, ColumnInfo};
pub use row::Row;
pub use sql_type::{SqlType, ValueKind};
pub use value::SqlValue;
