//! Column name to ordinal lookup, rebuilt for every decode call.

use std::collections::HashMap;

use crate::config::{DuplicateColumns, MapperConfig};
use crate::types::ColumnDescriptor;

/// Map from result column name to its 0-based position.
#[derive(Debug, Clone, Default)]
pub struct ColumnIndexMap {
    indexes: HashMap<String, usize>,
    config: MapperConfig,
}

impl ColumnIndexMap {
    /// Build the map from the live column descriptors of a result.
    pub fn build(columns: &[ColumnDescriptor], config: &MapperConfig) -> Self {
        let mut indexes = HashMap::with_capacity(columns.len());
        for (index, column) in columns.iter().enumerate() {
            let key = config.column_matching.key(&column.name);
            match config.duplicate_columns {
                DuplicateColumns::FirstWins => {
                    indexes.entry(key).or_insert(index);
                }
                DuplicateColumns::LastWins => {
                    indexes.insert(key, index);
                }
            }
        }
        Self {
            indexes,
            config: *config,
        }
    }

    /// Position of the column a binding names, if the result has it.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.indexes
            .get(&self.config.column_matching.key(name))
            .copied()
    }

    /// Number of distinct column names.
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
