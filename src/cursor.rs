//! Forward-only result cursors.
//!
//! The query-execution layer hands the decoder a [`ResultCursor`]: ordered
//! column descriptors plus a single-pass row stream. Each row exposes
//! positional typed getters and a per-cell null predicate through
//! [`CellAccess`]. [`RowSet`] is the in-memory implementation used by
//! executors that fetch eagerly.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime};

use crate::error::{Error, Result};
use crate::types::{ColumnDescriptor, ColumnInfo, Row, SqlValue};

/// Positional access to the cells of one row (0-based indexes).
///
/// Typed getters return the type's zero value for a NULL cell, the way
/// drivers do. Callers that care about NULL must consult [`was_null`].
///
/// [`was_null`]: CellAccess::was_null
pub trait CellAccess {
    /// Whether the cell at `index` holds SQL NULL.
    fn was_null(&self, index: usize) -> Result<bool>;

    /// Raw cell value, without any conversion.
    fn get_value(&self, index: usize) -> Result<SqlValue>;

    fn get_bool(&self, index: usize) -> Result<bool>;
    fn get_i16(&self, index: usize) -> Result<i16>;
    fn get_i32(&self, index: usize) -> Result<i32>;
    fn get_i64(&self, index: usize) -> Result<i64>;
    fn get_f32(&self, index: usize) -> Result<f32>;
    fn get_f64(&self, index: usize) -> Result<f64>;
    fn get_string(&self, index: usize) -> Result<String>;

    /// Time of day. Zoned values are reported in their local time.
    fn get_time(&self, index: usize) -> Result<NaiveTime>;

    /// Date-time. Zoned values are normalized to UTC by the driver.
    fn get_timestamp(&self, index: usize) -> Result<NaiveDateTime>;

    /// Elements of an ARRAY cell, in order.
    fn get_array(&self, index: usize) -> Result<Vec<SqlValue>>;
}

/// Forward-only, single-pass cursor over a query result.
///
/// # Example
///
/// ```
/// use rowmap::{ColumnDescriptor, ResultCursor, RowSet, SqlType, SqlValue};
///
/// let mut rows = RowSet::new(vec![ColumnDescriptor::of("id", SqlType::Integer)]);
/// rows.push_row(vec![SqlValue::Int(1)]).unwrap();
///
/// let mut count = 0;
/// while let Some(_row) = rows.next_row().unwrap() {
///     count += 1;
/// }
/// assert_eq!(count, 1);
/// ```
pub trait ResultCursor {
    /// Row type yielded by this cursor.
    type Row: CellAccess;

    /// Column metadata for this cursor.
    fn columns(&self) -> &[ColumnDescriptor];

    /// Get the next row.
    ///
    /// Returns `Ok(None)` when exhausted.
    fn next_row(&mut self) -> Result<Option<Self::Row>>;

    /// Close the cursor and release its resources.
    ///
    /// Closing twice is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// Fully fetched result held in memory.
#[derive(Debug, Clone)]
pub struct RowSet {
    column_info: Arc<ColumnInfo>,
    rows: VecDeque<Row>,
    rows_fetched: u64,
    closed: bool,
}

impl RowSet {
    /// Create an empty result with the given columns.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            column_info: Arc::new(ColumnInfo::new(columns)),
            rows: VecDeque::new(),
            rows_fetched: 0,
            closed: false,
        }
    }

    /// Append a row.
    ///
    /// Fails when the number of values differs from the number of columns.
    pub fn push_row(&mut self, values: Vec<SqlValue>) -> Result<()> {
        if values.len() != self.column_info.len() {
            return Err(Error::ColumnCountMismatch {
                expected: self.column_info.len(),
                actual: values.len(),
            });
        }
        self.rows
            .push_back(Row::new(values, Arc::clone(&self.column_info)));
        Ok(())
    }

    /// Builder form of [`push_row`](Self::push_row).
    pub fn with_row(mut self, values: Vec<SqlValue>) -> Result<Self> {
        self.push_row(values)?;
        Ok(self)
    }

    /// Get column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.column_info.column_names()
    }

    /// Rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows handed out so far.
    pub fn rowcount(&self) -> u64 {
        self.rows_fetched
    }

    /// Whether [`ResultCursor::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ResultCursor for RowSet {
    type Row = Row;

    fn columns(&self) -> &[ColumnDescriptor] {
        &self.column_info.columns
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        if self.closed {
            return Err(Error::CursorClosed);
        }
        let row = self.rows.pop_front();
        if row.is_some() {
            self.rows_fetched += 1;
        }
        Ok(row)
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.rows.clear();
        Ok(())
    }
}

/// Owns a cursor for the duration of one decode call.
///
/// The cursor is closed on every exit path: explicitly through
/// [`finish`](Self::finish) on success, and from `Drop` otherwise.
pub(crate) struct CursorGuard<C: ResultCursor> {
    cursor: C,
    closed: bool,
}

impl<C: ResultCursor> CursorGuard<C> {
    pub(crate) fn new(cursor: C) -> Self {
        Self {
            cursor,
            closed: false,
        }
    }

    pub(crate) fn columns(&self) -> &[ColumnDescriptor] {
        self.cursor.columns()
    }

    pub(crate) fn next_row(&mut self) -> Result<Option<C::Row>> {
        self.cursor.next_row()
    }

    /// Close the cursor, surfacing a close failure to the caller.
    pub(crate) fn finish(mut self) -> Result<()> {
        self.closed = true;
        self.cursor.close()
    }
}

impl<C: ResultCursor> Drop for CursorGuard<C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // Already unwinding from another error; keep that one.
        if let Err(err) = self.cursor.close() {
            tracing::warn!(error = %err, "failed to close cursor after decode failure");
        }
    }
}
