//! Row mapping for SQL results
//!
//! Turns the rows of a result cursor into typed Rust values. A type
//! declares which columns it binds (directly into fields, or through
//! setters), whether a column may be NULL, and which mapped base it
//! embeds. The declaration is resolved once into immutable
//! [`BindingMetadata`] and then shared by every decode of that type.
//!
//! # Example
//!
//! ```
//! use rowmap::{
//!     decode, BindingMetadata, Column, ColumnDescriptor, Declaration, Mapped, Result, RowSet,
//!     SqlType, SqlValue,
//! };
//!
//! #[derive(Default)]
//! struct Audit {
//!     created_by: Option<String>,
//! }
//!
//! impl Mapped for Audit {
//!     fn declare(decl: &mut Declaration<Self>) {
//!         decl.mapped_base()
//!             .field("created_by", Column::named("created_by"), |a| &mut a.created_by);
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Product {
//!     id: i64,
//!     tags: Vec<String>,
//!     audit: Audit,
//! }
//!
//! impl Mapped for Product {
//!     fn declare(decl: &mut Declaration<Self>) {
//!         decl.entity()
//!             .default_constructor()
//!             .extends(|p| &mut p.audit)
//!             .field("id", Column::named("id").not_null(), |p| &mut p.id)
//!             .field("tags", Column::named("tags"), |p| &mut p.tags);
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let metadata = BindingMetadata::<Product>::resolve()?;
//!
//!     let rows = RowSet::new(vec![
//!         ColumnDescriptor::of("id", SqlType::BigInt),
//!         ColumnDescriptor::of("tags", SqlType::Array),
//!         ColumnDescriptor::of("created_by", SqlType::Varchar),
//!     ])
//!     .with_row(vec![
//!         SqlValue::BigInt(7),
//!         vec!["new", "sale"].into(),
//!         SqlValue::Null,
//!     ])?;
//!
//!     let products = decode(&metadata, rows)?;
//!     assert_eq!(products[0].id, 7);
//!     assert_eq!(products[0].tags, ["new", "sale"]);
//!     assert!(products[0].audit.created_by.is_none());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cursor;
pub mod decode;
pub mod error;
pub mod mapping;
pub mod repository;
pub mod types;

// Re-export main types
pub use config::{ColumnMatching, DuplicateColumns, MapperConfig};
pub use cursor::{CellAccess, ResultCursor, RowSet};
pub use decode::{decode, decode_maps, RowDecoder, RowMap};
pub use error::{BoxError, Error, Result};
pub use mapping::{
    Binding, BindingKind, BindingMetadata, Column, Declaration, FromSqlValue, Mapped,
    MetadataCache, TargetShape, ValueError,
};
pub use repository::{Params, QueryExecutor, Repository};
pub use types::{ColumnDescriptor, ColumnInfo, Row, SqlType, SqlValue, ValueKind};
