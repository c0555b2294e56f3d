//! Standard SQL type codes as reported by drivers in column metadata.
//!
//! Values follow the JDBC `java.sql.Types` numbering, which most drivers
//! and bridges report regardless of the backing database.

pub const SQL_TYPE_CHAR: i32 = 1;
pub const SQL_TYPE_NUMERIC: i32 = 2;
pub const SQL_TYPE_DECIMAL: i32 = 3;
pub const SQL_TYPE_INTEGER: i32 = 4;
pub const SQL_TYPE_SMALLINT: i32 = 5;
pub const SQL_TYPE_FLOAT: i32 = 6;
pub const SQL_TYPE_REAL: i32 = 7;
pub const SQL_TYPE_DOUBLE: i32 = 8;
pub const SQL_TYPE_VARCHAR: i32 = 12;
pub const SQL_TYPE_BOOLEAN: i32 = 16;
pub const SQL_TYPE_DATE: i32 = 91;
pub const SQL_TYPE_TIME: i32 = 92;
pub const SQL_TYPE_TIMESTAMP: i32 = 93;
pub const SQL_TYPE_ARRAY: i32 = 2003;
pub const SQL_TYPE_TIME_WITH_TIMEZONE: i32 = 2013;
pub const SQL_TYPE_TIMESTAMP_WITH_TIMEZONE: i32 = 2014;
pub const SQL_TYPE_LONGVARCHAR: i32 = -1;
pub const SQL_TYPE_BIGINT: i32 = -5;
pub const SQL_TYPE_NVARCHAR: i32 = -9;
pub const SQL_TYPE_NCHAR: i32 = -15;
pub const SQL_TYPE_LONGNVARCHAR: i32 = -16;

// Reported by drivers but outside the conversion table.
pub const SQL_TYPE_BIT: i32 = -7;
pub const SQL_TYPE_BINARY: i32 = -2;
pub const SQL_TYPE_VARBINARY: i32 = -3;
pub const SQL_TYPE_BLOB: i32 = 2004;
pub const SQL_TYPE_CLOB: i32 = 2005;
pub const SQL_TYPE_OTHER: i32 = 1111;
