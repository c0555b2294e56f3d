//! Binding declarations and their resolved, cacheable metadata.

pub mod cache;
mod declare;
mod from_value;
mod metadata;

pub use cache::MetadataCache;
pub use declare::{Column, Declaration, Mapped};
pub use from_value::{FromSqlValue, TargetShape, ValueError};
pub use metadata::{Binding, BindingKind, BindingMetadata};

pub(crate) use metadata::AssignError;
