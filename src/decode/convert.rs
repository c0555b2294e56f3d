//! SQL type conversion table.
//!
//! Each supported type code has an extraction rule (which typed getter to
//! call) and a null rule. Drivers return a typed zero for NULL cells, so
//! every kind except BOOLEAN consults the cell's null predicate first.
//! BOOLEAN columns are always treated as present; a NULL reads as `false`.

use crate::cursor::CellAccess;
use crate::error::{Error, Result};
use crate::types::{ColumnDescriptor, SqlType, SqlValue, ValueKind};

/// Look up the value kind of a column, failing for unsupported type codes.
pub fn column_kind(column: &ColumnDescriptor) -> Result<ValueKind> {
    SqlType::from_code(column.type_code)
        .map(|t| t.value_kind())
        .ok_or_else(|| Error::UnsupportedColumnType {
            column: column.name.clone(),
            type_code: column.type_code,
            type_name: column.type_name.clone(),
        })
}

/// Convert the cell at `index` according to `kind`.
pub fn convert_cell<R: CellAccess + ?Sized>(
    row: &R,
    index: usize,
    kind: ValueKind,
) -> Result<SqlValue> {
    if kind != ValueKind::Bool && row.was_null(index)? {
        return Ok(SqlValue::Null);
    }
    let value = match kind {
        ValueKind::Bool => SqlValue::Bool(row.get_bool(index)?),
        ValueKind::SmallInt => SqlValue::SmallInt(row.get_i16(index)?),
        ValueKind::Int => SqlValue::Int(row.get_i32(index)?),
        ValueKind::BigInt => SqlValue::BigInt(row.get_i64(index)?),
        ValueKind::Text => SqlValue::Text(row.get_string(index)?),
        ValueKind::Float => SqlValue::Float(row.get_f32(index)?),
        ValueKind::Double => SqlValue::Double(row.get_f64(index)?),
        ValueKind::Time => SqlValue::Time(row.get_time(index)?),
        ValueKind::Timestamp => SqlValue::Timestamp(row.get_timestamp(index)?),
        ValueKind::Array => SqlValue::Array(row.get_array(index)?),
    };
    Ok(value)
}
