//! Conversion from converted cell values into binding target types.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::any::type_name;
use thiserror::Error;

use crate::types::SqlValue;

/// Why a value could not be assigned to a target type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    #[error("NULL cannot be assigned to non-optional {target}")]
    UnexpectedNull { target: &'static str },

    #[error("{found} value cannot be assigned to {target}")]
    Mismatch {
        found: &'static str,
        target: &'static str,
    },

    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    #[error("ARRAY value cannot be assigned to non-sequence {target}")]
    ArrayIntoScalar { target: &'static str },
}

/// Shape of a binding target, checked against ARRAY columns before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetShape {
    /// Single value; ARRAY columns are rejected.
    Scalar,
    /// Sequence that ARRAY columns unwrap into element by element.
    Sequence,
    /// Accepts any value unchanged.
    Any,
}

/// A type that a column value can be assigned to.
///
/// Implemented for the scalar types of the conversion table, for
/// `Option<T>` (NULL becomes `None`), for `Vec<T>` (ARRAY values) and for
/// [`SqlValue`] itself.
pub trait FromSqlValue: Sized {
    /// Shape of the target.
    const SHAPE: TargetShape = TargetShape::Scalar;

    /// Convert a value produced by the conversion table.
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError>;
}

/// Error for a value that does not fit scalar target `T`.
fn reject<T>(value: &SqlValue) -> ValueError {
    let target = type_name::<T>();
    match value {
        SqlValue::Null => ValueError::UnexpectedNull { target },
        SqlValue::Array(_) => ValueError::ArrayIntoScalar { target },
        other => ValueError::Mismatch {
            found: other.kind_name(),
            target,
        },
    }
}

macro_rules! impl_from_sql_integer {
    ($($ty:ty),*) => {
        $(
            impl FromSqlValue for $ty {
                fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
                    let wide = match value {
                        SqlValue::SmallInt(v) => i64::from(v),
                        SqlValue::Int(v) => i64::from(v),
                        SqlValue::BigInt(v) => v,
                        other => return Err(reject::<$ty>(&other)),
                    };
                    <$ty>::try_from(wide).map_err(|_| ValueError::OutOfRange {
                        value: wide.to_string(),
                        target: type_name::<$ty>(),
                    })
                }
            }
        )*
    };
}

impl_from_sql_integer!(i16, i32, i64);

impl FromSqlValue for bool {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Bool(b) => Ok(b),
            other => Err(reject::<bool>(&other)),
        }
    }
}

impl FromSqlValue for f32 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Float(v) => Ok(v),
            other => Err(reject::<f32>(&other)),
        }
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Float(v) => Ok(f64::from(v)),
            SqlValue::Double(v) => Ok(v),
            other => Err(reject::<f64>(&other)),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Text(s) => Ok(s),
            other => Err(reject::<String>(&other)),
        }
    }
}

impl FromSqlValue for NaiveTime {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Time(t) => Ok(t),
            other => Err(reject::<NaiveTime>(&other)),
        }
    }
}

impl FromSqlValue for NaiveDateTime {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Timestamp(ts) => Ok(ts),
            SqlValue::Date(d) => Ok(d.and_time(NaiveTime::MIN)),
            other => Err(reject::<NaiveDateTime>(&other)),
        }
    }
}

impl FromSqlValue for NaiveDate {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Date(d) => Ok(d),
            SqlValue::Timestamp(ts) => Ok(ts.date()),
            other => Err(reject::<NaiveDate>(&other)),
        }
    }
}

impl FromSqlValue for SqlValue {
    const SHAPE: TargetShape = TargetShape::Any;

    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    const SHAPE: TargetShape = T::SHAPE;

    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Vec<T> {
    const SHAPE: TargetShape = TargetShape::Sequence;

    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Array(items) => items.into_iter().map(T::from_sql_value).collect(),
            SqlValue::Null => Err(ValueError::UnexpectedNull {
                target: type_name::<Vec<T>>(),
            }),
            other => Err(ValueError::Mismatch {
                found: other.kind_name(),
                target: type_name::<Vec<T>>(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SqlValue::SmallInt(7), 7)]
    #[case(SqlValue::Int(-42), -42)]
    #[case(SqlValue::BigInt(1 << 40), 1 << 40)]
    fn test_integers_widen_into_i64(#[case] value: SqlValue, #[case] expected: i64) {
        assert_eq!(i64::from_sql_value(value), Ok(expected));
    }

    #[rstest]
    #[case(SqlValue::BigInt(i64::from(i32::MAX) + 1))]
    #[case(SqlValue::BigInt(i64::from(i32::MIN) - 1))]
    fn test_narrowing_is_checked(#[case] value: SqlValue) {
        assert!(matches!(
            i32::from_sql_value(value),
            Err(ValueError::OutOfRange { target: "i32", .. })
        ));
    }

    #[test]
    fn test_narrowing_in_range() {
        assert_eq!(i16::from_sql_value(SqlValue::Int(300)), Ok(300));
        assert_eq!(i32::from_sql_value(SqlValue::BigInt(42)), Ok(42));
    }

    #[rstest]
    #[case(SqlValue::Text("1".to_string()), "VARCHAR")]
    #[case(SqlValue::Double(1.0), "DOUBLE")]
    #[case(SqlValue::Bool(true), "BOOLEAN")]
    fn test_integer_mismatch(#[case] value: SqlValue, #[case] found: &'static str) {
        assert_eq!(
            i32::from_sql_value(value),
            Err(ValueError::Mismatch {
                found,
                target: "i32"
            })
        );
    }

    #[test]
    fn test_null_handling() {
        assert!(matches!(
            String::from_sql_value(SqlValue::Null),
            Err(ValueError::UnexpectedNull { .. })
        ));
        assert_eq!(Option::<String>::from_sql_value(SqlValue::Null), Ok(None));
        assert_eq!(
            Option::<String>::from_sql_value(SqlValue::Text("abc".to_string())),
            Ok(Some("abc".to_string()))
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(f32::from_sql_value(SqlValue::Float(1.5)), Ok(1.5));
        assert_eq!(f64::from_sql_value(SqlValue::Float(1.5)), Ok(1.5));
        assert!(f32::from_sql_value(SqlValue::Double(1.5)).is_err());
    }

    #[test]
    fn test_dates() {
        let ts = NaiveDate::from_ymd_opt(2024, 10, 21)
            .unwrap()
            .and_hms_opt(12, 36, 5)
            .unwrap();
        assert_eq!(
            NaiveDate::from_sql_value(SqlValue::Timestamp(ts)),
            Ok(ts.date())
        );
        assert_eq!(NaiveDateTime::from_sql_value(SqlValue::Timestamp(ts)), Ok(ts));
        assert_eq!(NaiveTime::from_sql_value(SqlValue::Time(ts.time())), Ok(ts.time()));
    }

    #[test]
    fn test_array_unwraps_in_order() {
        let value = SqlValue::Array(vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]);
        assert_eq!(Vec::<i32>::from_sql_value(value), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn test_array_null_elements() {
        let value = SqlValue::Array(vec![SqlValue::Int(1), SqlValue::Null]);
        assert_eq!(
            Vec::<Option<i32>>::from_sql_value(value.clone()),
            Ok(vec![Some(1), None])
        );
        assert!(matches!(
            Vec::<i32>::from_sql_value(value),
            Err(ValueError::UnexpectedNull { .. })
        ));
    }

    #[test]
    fn test_array_into_scalar_rejected() {
        let value = SqlValue::Array(vec![SqlValue::Int(1)]);
        assert_eq!(
            i32::from_sql_value(value.clone()),
            Err(ValueError::ArrayIntoScalar { target: "i32" })
        );
        assert!(matches!(
            Option::<i32>::from_sql_value(value),
            Err(ValueError::ArrayIntoScalar { .. })
        ));
    }

    #[test]
    fn test_shapes() {
        assert_eq!(<i32 as FromSqlValue>::SHAPE, TargetShape::Scalar);
        assert_eq!(<Vec<i32> as FromSqlValue>::SHAPE, TargetShape::Sequence);
        assert_eq!(<Option<Vec<String>> as FromSqlValue>::SHAPE, TargetShape::Sequence);
        assert_eq!(<SqlValue as FromSqlValue>::SHAPE, TargetShape::Any);
    }
}
