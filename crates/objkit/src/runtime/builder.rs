//! Incremental class construction.
//!
//! A [`ClassBuilder`] collects a class definition piece by piece and turns
//! it into a registered class/metaclass pair with
//! [`finalize`](ClassBuilder::finalize). Members are staged in
//! [`OrderedSet`]s: the first member added under a name wins and later
//! duplicates are dropped, while insertion order is kept for the final
//! tables.
//!
//! `finalize` consumes the builder, so a finalized builder cannot be
//! mutated or finalized twice.

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::runtime::class::{Class, ClassDef};
use crate::runtime::ivar::IvarStub;
use crate::runtime::method::Method;
use crate::runtime::ordered::OrderedSet;
use crate::runtime::property::Property;
use crate::runtime::protocol::Protocol;
use objkit_log::debug;

/// Which half of a class a member belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Instance side: the class's own tables
    Instance,
    /// Class side: the metaclass's tables
    Class,
}

/// Builder for a new class and its metaclass.
///
/// # Example
///
/// ```rust
/// use objkit::runtime::{ClassBuilder, IvarStub, Method, Runtime, Side, Type};
///
/// let mut rt = Runtime::bootstrap().unwrap();
///
/// let mut builder = ClassBuilder::new(&rt, "Point").unwrap();
/// builder
///     .add_ivars([IvarStub::new("x", Type::Integer), IvarStub::new("y", Type::Integer)])
///     .add_methods(
///         [Method::new("origin", Type::object("Point"), [], |this, _, _| Box::new(this))],
///         Side::Class,
///     );
///
/// let point = builder.finalize(&mut rt).unwrap();
/// assert_eq!(point.isa().unwrap().name(), "Point.meta");
/// assert!(ClassBuilder::new(&rt, "Point").is_none());
/// ```
#[derive(Debug)]
pub struct ClassBuilder {
    name: String,
    superclass: Option<Class>,
    extra_bytes: usize,
    methods: OrderedSet<Method>,
    class_methods: OrderedSet<Method>,
    ivars: OrderedSet<IvarStub>,
    properties: OrderedSet<Property>,
    class_properties: OrderedSet<Property>,
    protocols: OrderedSet<Protocol>,
}

impl ClassBuilder {
    /// Opens a builder for a subclass of the runtime's root class.
    ///
    /// Without a root class (a runtime created with [`Runtime::new`]) the
    /// new class becomes a root itself.
    ///
    /// Returns `None` if a class with this name is already registered.
    #[must_use]
    pub fn new(rt: &Runtime, name: impl Into<String>) -> Option<Self> {
        Self::with_superclass(rt, name, rt.root_class())
    }

    /// Opens a builder with an explicit superclass, or `None` for a new root.
    ///
    /// Returns `None` if a class with this name is already registered.
    #[must_use]
    pub fn with_superclass(rt: &Runtime, name: impl Into<String>, superclass: Option<Class>) -> Option<Self> {
        let name = name.into();
        if rt.contains_class(&name) {
            return None;
        }

        Some(ClassBuilder {
            name,
            superclass,
            extra_bytes: 0,
            methods: OrderedSet::new(),
            class_methods: OrderedSet::new(),
            ivars: OrderedSet::new(),
            properties: OrderedSet::new(),
            class_properties: OrderedSet::new(),
            protocols: OrderedSet::new(),
        })
    }

    /// Returns the name of the class being built.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the superclass the class will have.
    #[must_use]
    pub fn superclass(&self) -> Option<Class> {
        self.superclass
    }

    /// Reserves `bytes` of untyped storage after the last ivar.
    pub fn extra_bytes(&mut self, bytes: usize) -> &mut Self {
        self.extra_bytes = bytes;
        self
    }

    /// Stages methods for one side; selectors already staged there are
    /// skipped.
    pub fn add_methods(&mut self, methods: impl IntoIterator<Item = Method>, side: Side) -> &mut Self {
        let staged = match side {
            Side::Instance => &mut self.methods,
            Side::Class => &mut self.class_methods,
        };
        staged.extend(methods);
        self
    }

    /// Stages instance ivars; names already staged are skipped.
    pub fn add_ivars(&mut self, ivars: impl IntoIterator<Item = IvarStub>) -> &mut Self {
        self.ivars.extend(ivars);
        self
    }

    /// Stages properties for one side; names already staged there are
    /// skipped.
    pub fn add_properties(&mut self, properties: impl IntoIterator<Item = Property>, side: Side) -> &mut Self {
        let staged = match side {
            Side::Instance => &mut self.properties,
            Side::Class => &mut self.class_properties,
        };
        staged.extend(properties);
        self
    }

    /// Stages adopted protocols; names already staged are skipped.
    pub fn add_protocols(&mut self, protocols: impl IntoIterator<Item = Protocol>) -> &mut Self {
        self.protocols.extend(protocols);
        self
    }

    /// Builds the metaclass and then the class, and registers both.
    ///
    /// The metaclass is named `<name>.meta`, holds the class-side members
    /// and inherits from the superclass's metaclass.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassAlreadyExists`] if the class or metaclass name
    /// was registered after the builder was opened, or
    /// [`Error::UnknownClass`]/[`Error::UnknownStruct`] if an ivar cannot be
    /// sized. Nothing is registered on error.
    pub fn finalize(self, rt: &mut Runtime) -> Result<Class> {
        let meta_name = format!("{}.meta", self.name);
        for name in [&self.name, &meta_name] {
            if rt.contains_class(name) {
                return Err(Error::ClassAlreadyExists { name: name.clone() });
            }
        }

        let metaclass = Class::allocate(
            rt,
            ClassDef {
                name: meta_name,
                isa: None,
                superclass: self.superclass.and_then(|s| s.isa()),
                methods: self.class_methods.into_vec(),
                properties: self.class_properties.into_vec(),
                ..ClassDef::default()
            },
        )?;

        let class = Class::allocate(
            rt,
            ClassDef {
                name: self.name,
                isa: Some(metaclass),
                superclass: self.superclass,
                ivars: self.ivars.into_vec(),
                methods: self.methods.into_vec(),
                properties: self.properties.into_vec(),
                protocols: self.protocols.into_vec(),
                extra_bytes: self.extra_bytes,
            },
        )?;

        rt.insert_class(metaclass);
        rt.insert_class(class);
        debug!(
            "finalized {} : {}",
            class.name(),
            class.superclass().map_or("nil", |s| s.name())
        );
        Ok(class)
    }
}
