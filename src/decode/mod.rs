//! Row decoding: from a result cursor to typed instances.
//!
//! A decode call builds a [`ColumnIndexMap`] from the cursor's own column
//! descriptors, plans every binding against it (bindings whose column is
//! absent are skipped), then walks the rows in cursor order. Any failure
//! aborts the call; no partial output is returned.

mod convert;
mod index;

pub use convert::{column_kind, convert_cell};
pub use index::ColumnIndexMap;

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::config::{DuplicateColumns, MapperConfig};
use crate::cursor::{CellAccess, CursorGuard, ResultCursor};
use crate::error::{Error, Result};
use crate::mapping::{AssignError, Binding, BindingKind, BindingMetadata, TargetShape, ValueError};
use crate::types::{ColumnDescriptor, SqlValue, ValueKind};

/// Untyped row: column name to raw value.
pub type RowMap = BTreeMap<String, SqlValue>;

/// Decode every row of `cursor` into `T` with the default configuration.
pub fn decode<T, C: ResultCursor>(metadata: &BindingMetadata<T>, cursor: C) -> Result<Vec<T>> {
    RowDecoder::new(metadata).decode(cursor)
}

/// Decodes results into instances of `T` using resolved metadata.
#[derive(Debug)]
pub struct RowDecoder<'m, T> {
    metadata: &'m BindingMetadata<T>,
    config: MapperConfig,
}

impl<'m, T> RowDecoder<'m, T> {
    /// Create a decoder with the default configuration.
    pub fn new(metadata: &'m BindingMetadata<T>) -> Self {
        Self::with_config(metadata, MapperConfig::default())
    }

    /// Create a decoder with an explicit configuration.
    pub fn with_config(metadata: &'m BindingMetadata<T>, config: MapperConfig) -> Self {
        Self { metadata, config }
    }

    /// Decode all rows, closing the cursor on every exit path.
    ///
    /// Errors are wrapped in [`Error::RowMapping`] with the target type name
    /// and, once rows are being read, the 1-based row ordinal.
    pub fn decode<C: ResultCursor>(&self, cursor: C) -> Result<Vec<T>> {
        let mut guard = CursorGuard::new(cursor);
        let mut row_num = 0u64;
        match self.decode_rows(&mut guard, &mut row_num) {
            Ok(items) => {
                guard.finish().map_err(|e| self.wrap(e, None))?;
                Ok(items)
            }
            Err(e) => Err(self.wrap(e, (row_num > 0).then_some(row_num))),
        }
    }

    fn wrap(&self, source: Error, row: Option<u64>) -> Error {
        Error::RowMapping {
            type_name: self.metadata.type_name(),
            row,
            source: Box::new(source),
        }
    }

    fn decode_rows<C: ResultCursor>(
        &self,
        guard: &mut CursorGuard<C>,
        row_num: &mut u64,
    ) -> Result<Vec<T>> {
        let columns = guard.columns();
        let index_map = ColumnIndexMap::build(columns, &self.config);
        let fields = plan(self.metadata.fields(), &index_map, columns)?;
        let methods = plan(self.metadata.methods(), &index_map, columns)?;
        debug!(
            target_type = self.metadata.type_name(),
            columns = columns.len(),
            fields = fields.len(),
            methods = methods.len(),
            "decoding result"
        );

        let mut items = Vec::new();
        loop {
            // Counted before the fetch so a fetch failure names the row it was reading.
            *row_num += 1;
            let Some(row) = guard.next_row()? else {
                *row_num -= 1;
                break;
            };
            let mut instance = self.metadata.instantiate();
            for step in fields.iter().chain(methods.iter()) {
                step.apply(&mut instance, &row, *row_num)?;
            }
            items.push(instance);
        }

        debug!(
            target_type = self.metadata.type_name(),
            rows = items.len(),
            "decoded result"
        );
        Ok(items)
    }
}

/// A binding whose column is present in the current result.
struct Step<'b, T> {
    binding: &'b Binding<T>,
    index: usize,
    kind: ValueKind,
}

fn plan<'b, T>(
    bindings: &'b [Binding<T>],
    index_map: &ColumnIndexMap,
    columns: &[ColumnDescriptor],
) -> Result<Vec<Step<'b, T>>> {
    let mut steps = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let Some(index) = index_map.get(binding.column_name()) else {
            trace!(
                binding = binding.name(),
                column = binding.column_name(),
                "column not in result, skipping"
            );
            continue;
        };
        let kind = convert::column_kind(&columns[index])?;
        if kind == ValueKind::Array && binding.shape() == TargetShape::Scalar {
            return Err(Error::ArrayToScalarBinding {
                column: binding.column_name().to_string(),
                binding: binding.name(),
                target: binding.target_type(),
            });
        }
        steps.push(Step {
            binding,
            index,
            kind,
        });
    }
    Ok(steps)
}

impl<T> Step<'_, T> {
    fn apply<R: CellAccess>(&self, instance: &mut T, row: &R, row_num: u64) -> Result<()> {
        let binding = self.binding;
        let value = convert_cell(row, self.index, self.kind)?;
        trace!(
            binding = binding.name(),
            column = binding.column_name(),
            row = row_num,
            value = %value,
            "assigning"
        );

        if value.is_null() && binding.is_required() {
            let column = binding.column_name().to_string();
            return Err(match binding.kind() {
                BindingKind::Field => Error::NullRequiredField {
                    field: binding.name(),
                    column,
                    row: row_num,
                },
                BindingKind::Method => Error::NullRequiredParameter {
                    method: binding.name(),
                    column,
                    row: row_num,
                },
            });
        }

        binding.apply(instance, value).map_err(|err| match err {
            AssignError::Value(ValueError::ArrayIntoScalar { target }) => {
                Error::ArrayToScalarBinding {
                    column: binding.column_name().to_string(),
                    binding: binding.name(),
                    target,
                }
            }
            AssignError::Value(other) => Error::ValueConversion {
                column: binding.column_name().to_string(),
                binding: binding.name(),
                message: other.to_string(),
            },
            AssignError::Setter(source) => Error::Setter {
                method: binding.name(),
                column: binding.column_name().to_string(),
                source,
            },
        })
    }
}

/// Read every row into a column-name map, without the conversion table.
///
/// Duplicate column names follow `config.duplicate_columns`.
pub fn decode_maps<C: ResultCursor>(cursor: C, config: &MapperConfig) -> Result<Vec<RowMap>> {
    let mut guard = CursorGuard::new(cursor);
    let names: Vec<String> = guard.columns().iter().map(|c| c.name.clone()).collect();

    let mut maps = Vec::new();
    while let Some(row) = guard.next_row()? {
        let mut map = RowMap::new();
        for (index, name) in names.iter().enumerate() {
            let value = row.get_value(index)?;
            match config.duplicate_columns {
                DuplicateColumns::FirstWins => {
                    map.entry(name.clone()).or_insert(value);
                }
                DuplicateColumns::LastWins => {
                    map.insert(name.clone(), value);
                }
            }
        }
        maps.push(map);
    }
    guard.finish()?;
    Ok(maps)
}
