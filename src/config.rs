//! Decoder configuration.

/// Which column wins when a result reports the same name more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateColumns {
    /// The leftmost column with the name is used.
    #[default]
    FirstWins,
    /// The rightmost column with the name is used.
    LastWins,
}

/// How binding column names are matched against result column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnMatching {
    /// Names must match exactly as reported by the driver.
    #[default]
    Exact,
    /// Names are compared after lowercasing both sides.
    CaseInsensitive,
}

impl ColumnMatching {
    /// Normalize a column name into a lookup key.
    pub(crate) fn key(&self, name: &str) -> String {
        match self {
            ColumnMatching::Exact => name.to_string(),
            ColumnMatching::CaseInsensitive => name.to_lowercase(),
        }
    }
}

/// Options controlling how result columns are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapperConfig {
    /// Duplicate column policy (default: first wins).
    pub duplicate_columns: DuplicateColumns,
    /// Column name matching (default: exact).
    pub column_matching: ColumnMatching,
}

impl MapperConfig {
    /// Set the duplicate column policy.
    ///
    /// # Example
    ///
    /// ```
    /// use rowmap::{DuplicateColumns, MapperConfig};
    ///
    /// let config = MapperConfig::default().with_duplicate_columns(DuplicateColumns::LastWins);
    /// assert_eq!(config.duplicate_columns, DuplicateColumns::LastWins);
    /// ```
    pub fn with_duplicate_columns(mut self, policy: DuplicateColumns) -> Self {
        self.duplicate_columns = policy;
        self
    }

    /// Set the column name matching mode.
    pub fn with_column_matching(mut self, matching: ColumnMatching) -> Self {
        self.column_matching = matching;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapperConfig::default();
        assert_eq!(config.duplicate_columns, DuplicateColumns::FirstWins);
        assert_eq!(config.column_matching, ColumnMatching::Exact);
    }

    #[test]
    fn test_builder() {
        let config = MapperConfig::default()
            .with_duplicate_columns(DuplicateColumns::LastWins)
            .with_column_matching(ColumnMatching::CaseInsensitive);
        assert_eq!(config.duplicate_columns, DuplicateColumns::LastWins);
        assert_eq!(config.column_matching.key("User_ID"), "user_id");
        assert_eq!(ColumnMatching::Exact.key("User_ID"), "User_ID");
    }
}
