//! Closed set of SQL types the decoder knows how to convert.
//!
//! Every supported type code maps to exactly one [`ValueKind`]. Adding a
//! supported type means adding a variant here; the compiler then points at
//! every match that needs a new arm.

use super::codes::*;

/// Supported SQL column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Char,
    Varchar,
    LongVarchar,
    NChar,
    NVarchar,
    LongNVarchar,
    Float,
    Real,
    Numeric,
    Decimal,
    Double,
    Time,
    TimeWithTimezone,
    Date,
    Timestamp,
    TimestampWithTimezone,
    Array,
}

/// Kind of value a supported column converts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    SmallInt,
    Int,
    BigInt,
    Text,
    Float,
    Double,
    Time,
    Timestamp,
    Array,
}

impl SqlType {
    /// Look up a driver-reported type code.
    ///
    /// Returns `None` for codes outside the conversion table.
    pub fn from_code(code: i32) -> Option<Self> {
        let sql_type = match code {
            SQL_TYPE_BOOLEAN => SqlType::Boolean,
            SQL_TYPE_SMALLINT => SqlType::SmallInt,
            SQL_TYPE_INTEGER => SqlType::Integer,
            SQL_TYPE_BIGINT => SqlType::BigInt,
            SQL_TYPE_CHAR => SqlType::Char,
            SQL_TYPE_VARCHAR => SqlType::Varchar,
            SQL_TYPE_LONGVARCHAR => SqlType::LongVarchar,
            SQL_TYPE_NCHAR => SqlType::NChar,
            SQL_TYPE_NVARCHAR => SqlType::NVarchar,
            SQL_TYPE_LONGNVARCHAR => SqlType::LongNVarchar,
            SQL_TYPE_FLOAT => SqlType::Float,
            SQL_TYPE_REAL => SqlType::Real,
            SQL_TYPE_NUMERIC => SqlType::Numeric,
            SQL_TYPE_DECIMAL => SqlType::Decimal,
            SQL_TYPE_DOUBLE => SqlType::Double,
            SQL_TYPE_TIME => SqlType::Time,
            SQL_TYPE_TIME_WITH_TIMEZONE => SqlType::TimeWithTimezone,
            SQL_TYPE_DATE => SqlType::Date,
            SQL_TYPE_TIMESTAMP => SqlType::Timestamp,
            SQL_TYPE_TIMESTAMP_WITH_TIMEZONE => SqlType::TimestampWithTimezone,
            SQL_TYPE_ARRAY => SqlType::Array,
            _ => return None,
        };
        Some(sql_type)
    }

    /// Get the type code.
    pub fn code(&self) -> i32 {
        match self {
            SqlType::Boolean => SQL_TYPE_BOOLEAN,
            SqlType::SmallInt => SQL_TYPE_SMALLINT,
            SqlType::Integer => SQL_TYPE_INTEGER,
            SqlType::BigInt => SQL_TYPE_BIGINT,
            SqlType::Char => SQL_TYPE_CHAR,
            SqlType::Varchar => SQL_TYPE_VARCHAR,
            SqlType::LongVarchar => SQL_TYPE_LONGVARCHAR,
            SqlType::NChar => SQL_TYPE_NCHAR,
            SqlType::NVarchar => SQL_TYPE_NVARCHAR,
            SqlType::LongNVarchar => SQL_TYPE_LONGNVARCHAR,
            SqlType::Float => SQL_TYPE_FLOAT,
            SqlType::Real => SQL_TYPE_REAL,
            SqlType::Numeric => SQL_TYPE_NUMERIC,
            SqlType::Decimal => SQL_TYPE_DECIMAL,
            SqlType::Double => SQL_TYPE_DOUBLE,
            SqlType::Time => SQL_TYPE_TIME,
            SqlType::TimeWithTimezone => SQL_TYPE_TIME_WITH_TIMEZONE,
            SqlType::Date => SQL_TYPE_DATE,
            SqlType::Timestamp => SQL_TYPE_TIMESTAMP,
            SqlType::TimestampWithTimezone => SQL_TYPE_TIMESTAMP_WITH_TIMEZONE,
            SqlType::Array => SQL_TYPE_ARRAY,
        }
    }

    /// Kind of value a column of this type converts into.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            SqlType::Boolean => ValueKind::Bool,
            SqlType::SmallInt => ValueKind::SmallInt,
            SqlType::Integer => ValueKind::Int,
            SqlType::BigInt => ValueKind::BigInt,
            SqlType::Char
            | SqlType::Varchar
            | SqlType::LongVarchar
            | SqlType::NChar
            | SqlType::NVarchar
            | SqlType::LongNVarchar => ValueKind::Text,
            SqlType::Float | SqlType::Real => ValueKind::Float,
            SqlType::Numeric | SqlType::Decimal | SqlType::Double => ValueKind::Double,
            SqlType::Time | SqlType::TimeWithTimezone => ValueKind::Time,
            SqlType::Date | SqlType::Timestamp | SqlType::TimestampWithTimezone => {
                ValueKind::Timestamp
            }
            SqlType::Array => ValueKind::Array,
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Char => "CHAR",
            SqlType::Varchar => "VARCHAR",
            SqlType::LongVarchar => "LONGVARCHAR",
            SqlType::NChar => "NCHAR",
            SqlType::NVarchar => "NVARCHAR",
            SqlType::LongNVarchar => "LONGNVARCHAR",
            SqlType::Float => "FLOAT",
            SqlType::Real => "REAL",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Double => "DOUBLE",
            SqlType::Time => "TIME",
            SqlType::TimeWithTimezone => "TIME WITH TIME ZONE",
            SqlType::Date => "DATE",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::TimestampWithTimezone => "TIMESTAMP WITH TIME ZONE",
            SqlType::Array => "ARRAY",
        };
        f.write_str(name)
    }
}
