//! In-memory row of query results.

use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime};

use super::column::{ColumnDescriptor, ColumnInfo};
use super::value::SqlValue;
use crate::cursor::CellAccess;
use crate::error::{Error, Result};

/// A row of query results.
#[derive(Debug, Clone)]
pub struct Row {
    /// Column values.
    values: Vec<SqlValue>,
    /// Shared column information (reference counted).
    column_info: Arc<ColumnInfo>,
}

impl Row {
    /// Create a new row with values and shared column info.
    pub fn new(values: Vec<SqlValue>, column_info: Arc<ColumnInfo>) -> Self {
        Self {
            values,
            column_info,
        }
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get column information.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.column_info.columns
    }

    fn cell(&self, index: usize) -> Result<&SqlValue> {
        self.values.get(index).ok_or(Error::ColumnIndexOutOfBounds {
            index,
            count: self.values.len(),
        })
    }

    fn mismatch(&self, index: usize, value: &SqlValue, target: &str) -> Error {
        let column = self
            .column_info
            .get(index)
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        Error::type_conversion(format!(
            "cannot read {} value of column {} as {}",
            value.kind_name(),
            column,
            target
        ))
    }

    fn read_i64(&self, index: usize, target: &str) -> Result<Option<i64>> {
        let value = self.cell(index)?;
        match value {
            SqlValue::Null => Ok(None),
            SqlValue::Bool(b) => Ok(Some(i64::from(*b))),
            other => other
                .to_i64()
                .map(Some)
                .ok_or_else(|| self.mismatch(index, other, target)),
        }
    }

    fn read_f64(&self, index: usize, target: &str) -> Result<Option<f64>> {
        let value = self.cell(index)?;
        match value {
            SqlValue::Null => Ok(None),
            other => other
                .to_f64()
                .map(Some)
                .ok_or_else(|| self.mismatch(index, other, target)),
        }
    }

    fn narrow<T: TryFrom<i64>>(&self, index: usize, target: &str) -> Result<T> {
        match self.read_i64(index, target)? {
            None => T::try_from(0i64).map_err(|_| Error::type_conversion("zero out of range")),
            Some(v) => T::try_from(v).map_err(|_| {
                Error::type_conversion(format!("value {} out of range for {}", v, target))
            }),
        }
    }
}

impl CellAccess for Row {
    fn was_null(&self, index: usize) -> Result<bool> {
        Ok(self.cell(index)?.is_null())
    }

    fn get_value(&self, index: usize) -> Result<SqlValue> {
        self.cell(index).cloned()
    }

    fn get_bool(&self, index: usize) -> Result<bool> {
        let value = self.cell(index)?;
        match value {
            SqlValue::Null => Ok(false),
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Text(s) => match s.trim() {
                "t" | "true" | "TRUE" | "1" => Ok(true),
                "f" | "false" | "FALSE" | "0" => Ok(false),
                _ => Err(self.mismatch(index, value, "bool")),
            },
            other => other
                .to_i64()
                .map(|v| v != 0)
                .ok_or_else(|| self.mismatch(index, other, "bool")),
        }
    }

    fn get_i16(&self, index: usize) -> Result<i16> {
        self.narrow(index, "i16")
    }

    fn get_i32(&self, index: usize) -> Result<i32> {
        self.narrow(index, "i32")
    }

    fn get_i64(&self, index: usize) -> Result<i64> {
        Ok(self.read_i64(index, "i64")?.unwrap_or_default())
    }

    fn get_f32(&self, index: usize) -> Result<f32> {
        let wide = self.read_f64(index, "f32")?.unwrap_or_default();
        let narrow = wide as f32;
        if wide.is_finite() && !narrow.is_finite() {
            return Err(Error::type_conversion(format!(
                "value {} out of range for f32",
                wide
            )));
        }
        Ok(narrow)
    }

    fn get_f64(&self, index: usize) -> Result<f64> {
        Ok(self.read_f64(index, "f64")?.unwrap_or_default())
    }

    fn get_string(&self, index: usize) -> Result<String> {
        let value = self.cell(index)?;
        match value {
            SqlValue::Null => Ok(String::new()),
            SqlValue::Array(_) => Err(self.mismatch(index, value, "String")),
            other => Ok(other.to_string()),
        }
    }

    fn get_time(&self, index: usize) -> Result<NaiveTime> {
        let value = self.cell(index)?;
        match value {
            SqlValue::Null => Ok(NaiveTime::MIN),
            SqlValue::Time(t) => Ok(*t),
            SqlValue::Timestamp(ts) => Ok(ts.time()),
            other => Err(self.mismatch(index, other, "time")),
        }
    }

    fn get_timestamp(&self, index: usize) -> Result<NaiveDateTime> {
        let value = self.cell(index)?;
        match value {
            SqlValue::Null => Ok(NaiveDateTime::default()),
            SqlValue::Timestamp(ts) => Ok(*ts),
            SqlValue::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            other => Err(self.mismatch(index, other, "timestamp")),
        }
    }

    fn get_array(&self, index: usize) -> Result<Vec<SqlValue>> {
        let value = self.cell(index)?;
        match value {
            SqlValue::Null => Ok(Vec::new()),
            SqlValue::Array(items) => Ok(items.clone()),
            other => Err(self.mismatch(index, other, "array")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;
    use chrono::NaiveDate;

    fn make_test_column_info() -> Arc<ColumnInfo> {
        Arc::new(ColumnInfo::new(vec![
            ColumnDescriptor::of("NAME", SqlType::Varchar),
            ColumnDescriptor::of("VALUE", SqlType::Integer),
            ColumnDescriptor::of("BIG", SqlType::BigInt),
        ]))
    }

    #[test]
    fn test_row_access() {
        let row = Row::new(
            vec![
                SqlValue::Text("test".to_string()),
                SqlValue::Int(42),
                SqlValue::Null,
            ],
            make_test_column_info(),
        );

        assert_eq!(row.len(), 3);
        assert_eq!(row.get_value(0).unwrap(), SqlValue::Text("test".to_string()));
        assert_eq!(row.get_value(1).unwrap(), SqlValue::Int(42));
        assert_eq!(row.columns()[2].name, "BIG");
    }

    #[test]
    fn test_typed_zero_on_null() {
        let row = Row::new(
            vec![SqlValue::Null, SqlValue::Null, SqlValue::Null],
            make_test_column_info(),
        );

        assert!(row.was_null(1).unwrap());
        assert_eq!(row.get_i32(1).unwrap(), 0);
        assert_eq!(row.get_string(0).unwrap(), "");
        assert!(!row.get_bool(2).unwrap());
        assert!(row.get_array(2).unwrap().is_empty());
    }

    #[test]
    fn test_typed_getters_coerce() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 21).unwrap();
        let row = Row::new(
            vec![
                SqlValue::Text("17".to_string()),
                SqlValue::Int(42),
                SqlValue::Date(date),
            ],
            make_test_column_info(),
        );

        assert_eq!(row.get_i16(0).unwrap(), 17);
        assert_eq!(row.get_i64(1).unwrap(), 42);
        assert_eq!(row.get_f64(1).unwrap(), 42.0);
        assert_eq!(row.get_string(1).unwrap(), "42");
        assert_eq!(
            row.get_timestamp(2).unwrap(),
            date.and_hms_opt(0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_f32_range() {
        let row = Row::new(
            vec![
                SqlValue::Double(1.5),
                SqlValue::Double(f64::MAX),
                SqlValue::Double(f64::INFINITY),
            ],
            make_test_column_info(),
        );

        assert_eq!(row.get_f32(0).unwrap(), 1.5);
        assert!(matches!(row.get_f32(1), Err(Error::TypeConversion { .. })));
        assert_eq!(row.get_f32(2).unwrap(), f32::INFINITY);
    }

    #[test]
    fn test_getter_errors() {
        let row = Row::new(
            vec![
                SqlValue::Text("abc".to_string()),
                SqlValue::BigInt(i64::from(i32::MAX) + 1),
                SqlValue::Null,
            ],
            make_test_column_info(),
        );

        assert!(matches!(row.get_i32(0), Err(Error::TypeConversion { .. })));
        assert!(matches!(row.get_i32(1), Err(Error::TypeConversion { .. })));
        assert!(matches!(row.get_time(0), Err(Error::TypeConversion { .. })));
        assert!(matches!(
            row.was_null(5),
            Err(Error::ColumnIndexOutOfBounds { index: 5, count: 3 })
        ));
    }
}
