//! Query facade: run a statement and decode its result.
//!
//! The executor is the seam to a database driver. It issues a statement and
//! hands back a [`ResultCursor`]; everything after that (column lookup,
//! conversion, assignment, cursor cleanup) happens here.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::MapperConfig;
use crate::cursor::ResultCursor;
use crate::decode::{decode_maps, RowDecoder, RowMap};
use crate::error::{Error, Result};
use crate::mapping::{Mapped, MetadataCache};
use crate::types::SqlValue;

/// Statement parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Params {
    /// No parameters.
    #[default]
    None,
    /// Bound by position, 1-based on the driver side.
    Positional(Vec<SqlValue>),
    /// Bound by name.
    Named(BTreeMap<String, SqlValue>),
}

impl Params {
    pub fn none() -> Self {
        Params::None
    }

    /// Positional parameters from any sequence of convertible values.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Named parameters from `(name, value)` pairs.
    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<SqlValue>,
    {
        Params::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Append a positional parameter.
    ///
    /// Turns `None` into a positional list. Fails on named parameters.
    pub fn bind(self, value: impl Into<SqlValue>) -> Result<Self> {
        match self {
            Params::None => Ok(Params::Positional(vec![value.into()])),
            Params::Positional(mut values) => {
                values.push(value.into());
                Ok(Params::Positional(values))
            }
            Params::Named(_) => Err(Error::MixedParameters {
                existing: "named",
                requested: "positional",
            }),
        }
    }

    /// Set a named parameter, replacing any earlier value for `name`.
    ///
    /// Turns `None` into a named map. Fails on positional parameters.
    pub fn set(self, name: impl Into<String>, value: impl Into<SqlValue>) -> Result<Self> {
        match self {
            Params::None => Ok(Params::Named(BTreeMap::from([(
                name.into(),
                value.into(),
            )]))),
            Params::Named(mut values) => {
                values.insert(name.into(), value.into());
                Ok(Params::Named(values))
            }
            Params::Positional(_) => Err(Error::MixedParameters {
                existing: "positional",
                requested: "named",
            }),
        }
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        match self {
            Params::None => 0,
            Params::Positional(values) => values.len(),
            Params::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Issues statements against a database.
pub trait QueryExecutor {
    /// Cursor type returned for a query.
    type Cursor: ResultCursor;

    /// Execute `sql` with `params` and return an open cursor.
    fn query(&self, sql: &str, params: &Params) -> Result<Self::Cursor>;
}

/// Loads typed objects and raw maps through a [`QueryExecutor`].
///
/// Binding metadata is resolved through a shared [`MetadataCache`], so a
/// type is resolved once no matter how many repositories use it.
#[derive(Debug)]
pub struct Repository<E> {
    executor: E,
    cache: Arc<MetadataCache>,
    config: MapperConfig,
}

impl<E: QueryExecutor> Repository<E> {
    /// Create a repository with its own metadata cache.
    pub fn new(executor: E) -> Self {
        Self::with_cache(executor, Arc::new(MetadataCache::new()))
    }

    /// Create a repository sharing `cache` with other repositories.
    pub fn with_cache(executor: E, cache: Arc<MetadataCache>) -> Self {
        Self {
            executor,
            cache,
            config: MapperConfig::default(),
        }
    }

    /// Set the decoding configuration.
    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Run `sql` and decode every row into `T`.
    ///
    /// Metadata for `T` is resolved before the statement is issued, so a
    /// broken declaration never reaches the database.
    pub fn load_list<T: Mapped>(&self, sql: &str, params: &Params) -> Result<Vec<T>> {
        let metadata = self.cache.get_or_resolve::<T>()?;
        debug!(target_type = metadata.type_name(), params = params.len(), sql, "load_list");
        let cursor = self.executor.query(sql, params)?;
        RowDecoder::with_config(&metadata, self.config).decode(cursor)
    }

    /// Run `sql` and return the first decoded row.
    ///
    /// Fails with [`Error::EmptyResult`] when the query returns no rows.
    pub fn load_object<T: Mapped>(&self, sql: &str, params: &Params) -> Result<T> {
        head(self.load_list(sql, params)?)
    }

    /// Run `sql` and return every row as a column-name map.
    pub fn load_maps(&self, sql: &str, params: &Params) -> Result<Vec<RowMap>> {
        debug!(params = params.len(), sql, "load_maps");
        let cursor = self.executor.query(sql, params)?;
        decode_maps(cursor, &self.config)
    }

    /// Run `sql` and return the first row as a column-name map.
    pub fn load_map(&self, sql: &str, params: &Params) -> Result<RowMap> {
        head(self.load_maps(sql, params)?)
    }
}

/// First item of a result, or [`Error::EmptyResult`].
pub fn head<T, I: IntoIterator<Item = T>>(items: I) -> Result<T> {
    items.into_iter().next().ok_or(Error::EmptyResult)
}
