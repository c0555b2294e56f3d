//! Resolved binding metadata for one target type.

use std::any::{type_name, TypeId};
use std::fmt;
use std::sync::Arc;

use super::declare::{Chain, Column, Declaration, Mapped};
use super::from_value::{FromSqlValue, TargetShape, ValueError};
use crate::error::{BoxError, Error, Result};
use crate::types::SqlValue;

/// Failure raised while assigning one converted value.
#[derive(Debug)]
pub(crate) enum AssignError {
    Value(ValueError),
    Setter(BoxError),
}

pub(crate) type AssignResult = std::result::Result<(), AssignError>;

type Assign<T> = Arc<dyn Fn(&mut T, SqlValue) -> AssignResult + Send + Sync>;

/// How a binding writes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Direct field assignment.
    Field,
    /// Single-parameter setter invocation.
    Method,
}

/// Association between a column and a field or setter of `T`.
pub struct Binding<T> {
    name: &'static str,
    declared_in: &'static str,
    column: Column,
    target: &'static str,
    shape: TargetShape,
    kind: BindingKind,
    assign: Assign<T>,
}

impl<T: 'static> Binding<T> {
    pub(crate) fn new<V: FromSqlValue>(
        name: &'static str,
        declared_in: &'static str,
        column: Column,
        kind: BindingKind,
        assign: Assign<T>,
    ) -> Self {
        Self {
            name,
            declared_in,
            column,
            target: type_name::<V>(),
            shape: V::SHAPE,
            kind,
            assign,
        }
    }

    /// Re-root the binding onto a type that embeds `T`.
    pub(crate) fn lift<D: 'static>(self, project: fn(&mut D) -> &mut T) -> Binding<D> {
        let inner = self.assign;
        Binding {
            name: self.name,
            declared_in: self.declared_in,
            column: self.column,
            target: self.target,
            shape: self.shape,
            kind: self.kind,
            assign: Arc::new(move |outer: &mut D, value: SqlValue| -> AssignResult {
                inner(project(outer), value)
            }),
        }
    }
}

impl<T> Binding<T> {
    /// Field or setter name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type that declared the binding (the target or one of its bases).
    pub fn declared_in(&self) -> &'static str {
        self.declared_in
    }

    /// Column label the binding reads.
    pub fn column_name(&self) -> &str {
        self.column.name()
    }

    /// Whether a NULL cell fails the decode.
    pub fn is_required(&self) -> bool {
        self.column.is_required()
    }

    /// Rust type the value is assigned as.
    pub fn target_type(&self) -> &'static str {
        self.target
    }

    /// Shape of the target type.
    pub fn shape(&self) -> TargetShape {
        self.shape
    }

    pub fn kind(&self) -> BindingKind {
        self.kind
    }

    pub(crate) fn apply(&self, instance: &mut T, value: SqlValue) -> AssignResult {
        (self.assign)(instance, value)
    }
}

impl<T> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("declared_in", &self.declared_in)
            .field("column", &self.column)
            .field("target", &self.target)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Immutable binding table for target type `T`.
///
/// Built once by [`BindingMetadata::resolve`] and shared read-only across
/// decode calls and threads.
pub struct BindingMetadata<T> {
    type_name: &'static str,
    constructor: fn() -> T,
    fields: Vec<Binding<T>>,
    methods: Vec<Binding<T>>,
}

impl<T: Mapped> BindingMetadata<T> {
    /// Walk `T`'s declaration and base chain and validate it.
    ///
    /// Fails when `T` is not marked as an entity or mapped base, when a base
    /// is not a mapped base, when the chain repeats a type or forks, or when
    /// `T` has no zero-argument constructor.
    pub fn resolve() -> Result<Self> {
        let target = type_name::<T>();
        let mut decl = Declaration::<T>::new();
        T::declare(&mut decl);

        if !decl.entity && !decl.mapped_base {
            return Err(Error::MissingMarker { type_name: target });
        }
        let constructor = decl
            .constructor
            .ok_or(Error::NoDefaultConstructor { type_name: target })?;

        let mut chain = Chain {
            target,
            visiting: vec![TypeId::of::<T>()],
        };
        let (fields, methods) = decl.into_bindings(&mut chain)?;

        let metadata = Self {
            type_name: target,
            constructor,
            fields,
            methods,
        };
        tracing::debug!(
            target_type = target,
            fields = metadata.fields.len(),
            methods = metadata.methods.len(),
            bases = chain.visiting.len() - 1,
            "resolved binding metadata"
        );
        Ok(metadata)
    }
}

impl<T> BindingMetadata<T> {
    /// Name of the target type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Field bindings, most derived type first.
    pub fn fields(&self) -> &[Binding<T>] {
        &self.fields
    }

    /// Setter bindings, most derived type first.
    pub fn methods(&self) -> &[Binding<T>] {
        &self.methods
    }

    /// Create a fresh instance through the declared constructor.
    pub fn instantiate(&self) -> T {
        (self.constructor)()
    }

    /// Columns referenced by any binding, in binding order.
    pub fn column_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .chain(self.methods.iter())
            .map(|b| b.column_name())
            .collect()
    }
}

impl<T> fmt::Debug for BindingMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingMetadata")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .finish()
    }
}

impl<T> fmt::Display for BindingMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: [", self.type_name)?;
        writeln!(f, "\tfields: [")?;
        for b in &self.fields {
            writeln!(f, "\t\t{} <- {}", b.name, b.column.name())?;
        }
        writeln!(f, "\t],")?;
        writeln!(f, "\tmethods: [")?;
        for b in &self.methods {
            writeln!(f, "\t\t{}({}) <- {}", b.name, b.target, b.column.name())?;
        }
        writeln!(f, "\t]")?;
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Stamped {
        version: i64,
        updated_by: Option<String>,
    }

    impl Mapped for Stamped {
        fn declare(decl: &mut Declaration<Self>) {
            decl.mapped_base()
                .field("version", Column::named("version").not_null(), |s| {
                    &mut s.version
                })
                .setter("set_updated_by", Column::named("updated_by"), |s, v: Option<String>| {
                    s.updated_by = v
                });
        }
    }

    #[derive(Default)]
    struct Named {
        name: String,
        stamped: Stamped,
    }

    impl Mapped for Named {
        fn declare(decl: &mut Declaration<Self>) {
            decl.mapped_base()
                .extends(|n| &mut n.stamped)
                .field("name", Column::named("name"), |n| &mut n.name);
        }
    }

    #[derive(Default)]
    struct Account {
        id: i64,
        tags: Vec<String>,
        named: Named,
    }

    impl Mapped for Account {
        fn declare(decl: &mut Declaration<Self>) {
            decl.entity()
                .default_constructor()
                .field("id", Column::named("account_id").not_null(), |a| &mut a.id)
                .field("tags", Column::named("tags"), |a| &mut a.tags)
                .extends(|a| &mut a.named);
        }
    }

    #[test]
    fn test_resolve_collects_chain_derived_first() {
        let meta = BindingMetadata::<Account>::resolve().unwrap();

        let fields: Vec<_> = meta.fields().iter().map(|b| b.name()).collect();
        assert_eq!(fields, vec!["id", "tags", "name", "version"]);
        let methods: Vec<_> = meta.methods().iter().map(|b| b.name()).collect();
        assert_eq!(methods, vec!["set_updated_by"]);

        assert!(meta.fields()[0].is_required());
        assert!(!meta.fields()[2].is_required());
        assert_eq!(meta.fields()[1].shape(), TargetShape::Sequence);
        assert_eq!(meta.fields()[3].declared_in(), type_name::<Stamped>());
        assert_eq!(meta.methods()[0].kind(), BindingKind::Method);
        assert_eq!(
            meta.column_names(),
            vec!["account_id", "tags", "name", "version", "updated_by"]
        );
    }

    #[test]
    fn test_lifted_binding_writes_through_base() {
        let meta = BindingMetadata::<Account>::resolve().unwrap();
        let mut account = meta.instantiate();

        meta.fields()[3]
            .apply(&mut account, SqlValue::BigInt(7))
            .unwrap();
        meta.methods()[0]
            .apply(&mut account, SqlValue::Text("ops".to_string()))
            .unwrap();

        assert_eq!(account.named.stamped.version, 7);
        assert_eq!(account.named.stamped.updated_by.as_deref(), Some("ops"));
    }

    #[test]
    fn test_mapped_base_resolves_as_target_with_constructor() {
        struct Bare;
        impl Mapped for Bare {
            fn declare(decl: &mut Declaration<Self>) {
                decl.mapped_base().constructor(|| Bare);
            }
        }
        let meta = BindingMetadata::<Bare>::resolve().unwrap();
        assert!(meta.fields().is_empty());
        assert!(meta.methods().is_empty());
    }

    #[test]
    fn test_missing_marker() {
        #[derive(Default)]
        struct Plain {
            id: i32,
        }
        impl Mapped for Plain {
            fn declare(decl: &mut Declaration<Self>) {
                decl.default_constructor()
                    .field("id", Column::named("id"), |p| &mut p.id);
            }
        }
        let err = BindingMetadata::<Plain>::resolve().unwrap_err();
        assert!(matches!(err, Error::MissingMarker { .. }));
        assert!(err.is_definition_error());
    }

    #[test]
    fn test_unmarked_base_without_bindings_fails() {
        #[derive(Default)]
        struct Unmarked;
        impl Mapped for Unmarked {
            fn declare(_decl: &mut Declaration<Self>) {}
        }

        #[derive(Default)]
        struct Child {
            base: Unmarked,
        }
        impl Mapped for Child {
            fn declare(decl: &mut Declaration<Self>) {
                decl.entity().default_constructor().extends(|c| &mut c.base);
            }
        }

        let err = BindingMetadata::<Child>::resolve().unwrap_err();
        match err {
            Error::UnmarkedBase { base, target } => {
                assert_eq!(base, type_name::<Unmarked>());
                assert_eq!(target, type_name::<Child>());
            }
            other => panic!("Expected UnmarkedBase, got {:?}", other),
        }
    }

    #[test]
    fn test_entity_is_not_a_base() {
        #[derive(Default)]
        struct Manager {
            account: Account,
        }
        impl Mapped for Manager {
            fn declare(decl: &mut Declaration<Self>) {
                decl.entity().default_constructor().extends(|m| &mut m.account);
            }
        }
        assert!(matches!(
            BindingMetadata::<Manager>::resolve(),
            Err(Error::UnmarkedBase { .. })
        ));
    }

    #[test]
    fn test_unmarked_grandparent_fails() {
        #[derive(Default)]
        struct Root;
        impl Mapped for Root {
            fn declare(decl: &mut Declaration<Self>) {
                decl.entity();
            }
        }

        #[derive(Default)]
        struct Middle {
            root: Root,
        }
        impl Mapped for Middle {
            fn declare(decl: &mut Declaration<Self>) {
                decl.mapped_base().extends(|m| &mut m.root);
            }
        }

        #[derive(Default)]
        struct Leaf {
            middle: Middle,
        }
        impl Mapped for Leaf {
            fn declare(decl: &mut Declaration<Self>) {
                decl.entity().default_constructor().extends(|l| &mut l.middle);
            }
        }

        match BindingMetadata::<Leaf>::resolve() {
            Err(Error::UnmarkedBase { base, .. }) => assert_eq!(base, type_name::<Root>()),
            other => panic!("Expected UnmarkedBase, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_missing_constructor() {
        struct NoCtor {
            _id: i32,
        }
        impl Mapped for NoCtor {
            fn declare(decl: &mut Declaration<Self>) {
                decl.entity().field("id", Column::named("id"), |n| &mut n._id);
            }
        }
        assert!(matches!(
            BindingMetadata::<NoCtor>::resolve(),
            Err(Error::NoDefaultConstructor { .. })
        ));
    }

    #[test]
    fn test_multiple_bases() {
        #[derive(Default)]
        struct Forked {
            a: Stamped,
            b: Stamped,
        }
        impl Mapped for Forked {
            fn declare(decl: &mut Declaration<Self>) {
                decl.entity()
                    .default_constructor()
                    .extends(|f| &mut f.a)
                    .extends(|f| &mut f.b);
            }
        }
        assert!(matches!(
            BindingMetadata::<Forked>::resolve(),
            Err(Error::MultipleBases { .. })
        ));
    }

    #[test]
    fn test_cyclic_chain() {
        #[derive(Default)]
        struct Looped {
            inner: Option<Box<Looped>>,
        }
        impl Mapped for Looped {
            fn declare(decl: &mut Declaration<Self>) {
                decl.entity()
                    .mapped_base()
                    .default_constructor()
                    .extends(|l| &mut **l.inner.get_or_insert_with(Default::default));
            }
        }
        assert!(matches!(
            BindingMetadata::<Looped>::resolve(),
            Err(Error::CyclicBase { .. })
        ));
    }

    #[test]
    fn test_display() {
        let meta = BindingMetadata::<Account>::resolve().unwrap();
        let text = meta.to_string();
        assert!(text.starts_with(type_name::<Account>()));
        assert!(text.contains("\t\tid <- account_id"));
        assert!(text.contains("\t\tset_updated_by("));
        assert!(text.ends_with("<- updated_by\n\t]\n]"));
    }
}
