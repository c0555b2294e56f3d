//! Declaration surface for mappable types.
//!
//! A type opts in by implementing [`Mapped`] and describing itself on a
//! [`Declaration`]: its stereotype (entity or mapped base), its zero-argument
//! constructor, its column bindings, and optionally the base it embeds.
//!
//! ```
//! use rowmap::{Column, Declaration, Mapped};
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
//! struct Invoice {
//!     id: i64,
//!     total: Option<f64>,
//!     audit: Audit,
//! }
//!
//! impl Invoice {
//!     fn set_total(&mut self, total: Option<f64>) {
//!         self.total = total;
//!     }
//! }
//!
//! impl Mapped for Invoice {
//!     fn declare(decl: &mut Declaration<Self>) {
//!         decl.entity()
//!             .default_constructor()
//!             .extends(|i| &mut i.audit)
//!             .field("id", Column::named("invoice_id").not_null(), |i| &mut i.id)
//!             .setter("set_total", Column::named("total"), Invoice::set_total);
//!     }
//! }
//! ```

use std::any::{type_name, TypeId};
use std::sync::Arc;

use super::from_value::FromSqlValue;
use super::metadata::{AssignError, AssignResult, Binding, BindingKind};
use crate::error::{BoxError, Error, Result};
use crate::types::SqlValue;

/// Column a binding reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
    not_null: bool,
}

impl Column {
    /// Bind to the result column with this label.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            not_null: false,
        }
    }

    /// Mark the binding as required: a NULL cell fails the decode.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Column label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether NULL is rejected.
    pub fn is_required(&self) -> bool {
        self.not_null
    }
}

/// A type whose instances can be produced from result rows.
pub trait Mapped: Sized + 'static {
    /// Describe the type's stereotype, constructor and bindings.
    fn declare(decl: &mut Declaration<Self>);
}

/// Bindings gathered while walking a base chain.
pub(crate) type Collected<T> = (Vec<Binding<T>>, Vec<Binding<T>>);

type BaseLink<T> = Box<dyn FnOnce(&mut Chain) -> Result<Collected<T>>>;

/// State of one base-chain walk.
pub(crate) struct Chain {
    pub(crate) target: &'static str,
    pub(crate) visiting: Vec<TypeId>,
}

/// Builder a [`Mapped`] type fills in from [`Mapped::declare`].
pub struct Declaration<T> {
    pub(crate) entity: bool,
    pub(crate) mapped_base: bool,
    pub(crate) constructor: Option<fn() -> T>,
    fields: Vec<Binding<T>>,
    methods: Vec<Binding<T>>,
    base: Option<BaseLink<T>>,
    base_count: usize,
}

impl<T: 'static> Declaration<T> {
    pub(crate) fn new() -> Self {
        Self {
            entity: false,
            mapped_base: false,
            constructor: None,
            fields: Vec::new(),
            methods: Vec::new(),
            base: None,
            base_count: 0,
        }
    }

    /// Mark the type as an entity: a type rows decode into directly.
    pub fn entity(&mut self) -> &mut Self {
        self.entity = true;
        self
    }

    /// Mark the type as a mapped base whose bindings entities inherit.
    pub fn mapped_base(&mut self) -> &mut Self {
        self.mapped_base = true;
        self
    }

    /// Register the zero-argument constructor used for every row.
    pub fn constructor(&mut self, constructor: fn() -> T) -> &mut Self {
        self.constructor = Some(constructor);
        self
    }

    /// Register `T::default` as the constructor.
    pub fn default_constructor(&mut self) -> &mut Self
    where
        T: Default,
    {
        self.constructor(T::default)
    }

    /// Inherit the bindings of base `B`, embedded in `T` at `project`.
    ///
    /// `B` must declare itself a mapped base. A type has at most one base.
    pub fn extends<B: Mapped>(&mut self, project: fn(&mut T) -> &mut B) -> &mut Self {
        self.base_count += 1;
        if self.base.is_none() {
            self.base = Some(Box::new(move |chain: &mut Chain| -> Result<Collected<T>> {
                let (fields, methods) = collect_base::<B>(chain)?;
                Ok((
                    fields.into_iter().map(|b| b.lift(project)).collect(),
                    methods.into_iter().map(|b| b.lift(project)).collect(),
                ))
            }));
        }
        self
    }

    /// Bind a field, assigned directly through `access`.
    pub fn field<V>(
        &mut self,
        name: &'static str,
        column: Column,
        access: fn(&mut T) -> &mut V,
    ) -> &mut Self
    where
        V: FromSqlValue + 'static,
    {
        let assign = Arc::new(move |instance: &mut T, value: SqlValue| -> AssignResult {
            *access(instance) = V::from_sql_value(value).map_err(AssignError::Value)?;
            Ok(())
        });
        self.fields.push(Binding::new::<V>(
            name,
            type_name::<T>(),
            column,
            BindingKind::Field,
            assign,
        ));
        self
    }

    /// Bind a single-parameter setter.
    pub fn setter<P, F>(&mut self, name: &'static str, column: Column, setter: F) -> &mut Self
    where
        P: FromSqlValue + 'static,
        F: Fn(&mut T, P) + Send + Sync + 'static,
    {
        let assign = Arc::new(move |instance: &mut T, value: SqlValue| -> AssignResult {
            setter(instance, P::from_sql_value(value).map_err(AssignError::Value)?);
            Ok(())
        });
        self.methods.push(Binding::new::<P>(
            name,
            type_name::<T>(),
            column,
            BindingKind::Method,
            assign,
        ));
        self
    }

    /// Bind a single-parameter setter that may reject the value.
    pub fn try_setter<P, E, F>(&mut self, name: &'static str, column: Column, setter: F) -> &mut Self
    where
        P: FromSqlValue + 'static,
        E: Into<BoxError>,
        F: Fn(&mut T, P) -> std::result::Result<(), E> + Send + Sync + 'static,
    {
        let assign = Arc::new(move |instance: &mut T, value: SqlValue| -> AssignResult {
            let param = P::from_sql_value(value).map_err(AssignError::Value)?;
            setter(instance, param).map_err(|e| AssignError::Setter(e.into()))
        });
        self.methods.push(Binding::new::<P>(
            name,
            type_name::<T>(),
            column,
            BindingKind::Method,
            assign,
        ));
        self
    }

    /// Own bindings first, then those of the base chain.
    pub(crate) fn into_bindings(self, chain: &mut Chain) -> Result<Collected<T>> {
        if self.base_count > 1 {
            return Err(Error::MultipleBases {
                type_name: type_name::<T>(),
            });
        }
        let mut fields = self.fields;
        let mut methods = self.methods;
        if let Some(link) = self.base {
            let (base_fields, base_methods) = link(chain)?;
            fields.extend(base_fields);
            methods.extend(base_methods);
        }
        Ok((fields, methods))
    }
}

/// Declare `B` as a base of the chain's target and collect its bindings.
fn collect_base<B: Mapped>(chain: &mut Chain) -> Result<Collected<B>> {
    let id = TypeId::of::<B>();
    if chain.visiting.contains(&id) {
        return Err(Error::CyclicBase {
            type_name: type_name::<B>(),
            target: chain.target,
        });
    }

    let mut decl = Declaration::<B>::new();
    B::declare(&mut decl);
    if !decl.mapped_base {
        return Err(Error::UnmarkedBase {
            base: type_name::<B>(),
            target: chain.target,
        });
    }

    chain.visiting.push(id);
    decl.into_bindings(chain)
}
