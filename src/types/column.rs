//! Column descriptors reported by a result cursor.

use super::sql_type::SqlType;

/// A column in a result set.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Column label as returned by the driver.
    pub name: String,
    /// Raw SQL type code (see [`crate::types::codes`]).
    pub type_code: i32,
    /// Driver-reported type name, used in diagnostics.
    pub type_name: String,
}

impl ColumnDescriptor {
    /// Create a descriptor, deriving the type name from the code.
    pub fn new(name: impl Into<String>, type_code: i32) -> Self {
        let type_name = match SqlType::from_code(type_code) {
            Some(t) => t.to_string(),
            None => format!("UNKNOWN({})", type_code),
        };
        Self {
            name: name.into(),
            type_code,
            type_name,
        }
    }

    /// Create a descriptor for a supported type.
    pub fn of(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self::new(name, sql_type.code())
    }

    /// Override the reported type name (e.g. `int4`, `jsonb`).
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Supported SQL type, or `None` when the code is outside the table.
    pub fn sql_type(&self) -> Option<SqlType> {
        SqlType::from_code(self.type_code)
    }
}

/// Shared column information for all rows in a result set.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    /// Column definitions.
    pub columns: Vec<ColumnDescriptor>,
}

impl ColumnInfo {
    /// Create new column info from columns.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column by index.
    pub fn get(&self, index: usize) -> Option<&ColumnDescriptor> {
        self.columns.get(index)
    }
}
