//! Classes and metaclasses.
//!
//! Every class is a pair: the class itself, holding instance-side methods,
//! and its metaclass, holding class-side methods. The two hierarchies run in
//! parallel:
//!
//! ```text
//!   superclass chain            isa
//!   Person  -> Object           Person -> Person.meta
//!   Person.meta -> Object.meta  Person.meta -> nil
//! ```
//!
//! # Memory Layout
//!
//! Class records are allocated in the process-wide metadata arena and never
//! freed, so a [`Class`] is a plain copyable pointer. The record starts with
//! one header word followed by the `isa` field:
//!
//! ```text
//! +--------+-----+------------+------+---------------+-----
//! | magic  | isa | superclass | name | instance_size | ...
//! +--------+-----+------------+------+---------------+-----
//!          ^
//!          class-object view (Class::as_object)
//! ```
//!
//! Shifting the record address past the header gives a view whose first word
//! is the isa, exactly like an instance whose first word is its class. That
//! view is what lets a class be messaged as an ordinary receiver, and what
//! the isa-depth classification in [`Id::classify`] reads.
//!
//! # Thread Safety
//!
//! None. Method implementations are `Rc` closures, which makes classes
//! `!Send` and `!Sync`.

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::runtime::ivar::{self, Ivar, IvarStub};
use crate::runtime::method::Method;
use crate::runtime::object::{Id, Receiver};
use crate::runtime::platform::HEADER_SIZE;
use crate::runtime::property::Property;
use crate::runtime::protocol::Protocol;
use fxhash::FxHashMap;
use objkit_log::debug;
use objkit_mem::{RawCell, block, metadata_arena};
use std::fmt;
use std::mem::offset_of;
use std::ptr::NonNull;

/// Marker stored in the header word of every class record.
const CLASS_MAGIC: usize = 0xAAAA_BBBB_CCCC_DDDD_u64 as usize;

/// Class record, allocated in the metadata arena and never mutated after
/// construction.
#[repr(C)]
pub(crate) struct ClassInner {
    magic: usize,
    /// Class-object view of the metaclass; `None` for a metaclass
    isa: Option<Id>,
    superclass: Option<Class>,
    name: String,
    instance_size: usize,
    ivars: Vec<Ivar>,
    methods: FxHashMap<String, Method>,
    properties: Vec<Property>,
    protocols: Vec<Protocol>,
}

/// Distance from a class record to its class-object view.
const CLASS_OBJECT_OFFSET: usize = offset_of!(ClassInner, isa);

/// Everything needed to construct a class directly.
///
/// Most classes are built with a [`ClassBuilder`](crate::runtime::ClassBuilder),
/// which fills this in (including the metaclass). Direct construction is for
/// bootstrap classes such as the root class.
#[derive(Debug, Clone, Default)]
pub struct ClassDef {
    /// Unique class name
    pub name: String,
    /// The metaclass; `None` when defining a metaclass
    pub isa: Option<Class>,
    /// The superclass; `None` for a root
    pub superclass: Option<Class>,
    /// Own ivars in declaration order
    pub ivars: Vec<IvarStub>,
    /// Own methods; for a repeated selector the last one wins
    pub methods: Vec<Method>,
    /// Own properties
    pub properties: Vec<Property>,
    /// Adopted protocols
    pub protocols: Vec<Protocol>,
    /// Trailing bytes reserved after the last ivar
    pub extra_bytes: usize,
}

/// Handle to a class or metaclass.
///
/// Handles are cheap to copy and compare by identity.
///
/// # Example
///
/// ```rust
/// use objkit::runtime::{Class, ClassDef, IvarStub, Runtime, Type};
/// use objkit::runtime::platform::{HEADER_SIZE, WORD_SIZE};
///
/// let mut rt = Runtime::new();
/// let point = Class::create(&mut rt, ClassDef {
///     name: "Point".into(),
///     ivars: vec![IvarStub::new("x", Type::Integer), IvarStub::new("y", Type::Integer)],
///     ..ClassDef::default()
/// })
/// .unwrap();
///
/// assert_eq!(point.instance_size(), HEADER_SIZE + 2 * WORD_SIZE);
/// assert_eq!(point.ivar_offset("y"), Some(HEADER_SIZE + WORD_SIZE));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Class {
    inner: NonNull<ClassInner>,
}

impl Class {
    /// Creates a class and registers it in `rt`.
    ///
    /// Ivar offsets continue from the superclass's instance size (or the
    /// header size for a root), and the instance size is the end of the last
    /// ivar plus `extra_bytes`.
    ///
    /// No pairing is enforced: the caller supplies `def.isa`, and is expected
    /// to create the metaclass first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClassAlreadyExists`] if the name is taken, or
    /// [`Error::UnknownClass`]/[`Error::UnknownStruct`] if an ivar type
    /// cannot be sized. The registry is unchanged on error.
    pub fn create(rt: &mut Runtime, def: ClassDef) -> Result<Class> {
        if rt.contains_class(&def.name) {
            return Err(Error::ClassAlreadyExists { name: def.name });
        }

        let class = Self::allocate(rt, def)?;
        rt.insert_class(class);
        Ok(class)
    }

    /// Lays out and allocates a class without registering it.
    pub(crate) fn allocate(rt: &Runtime, def: ClassDef) -> Result<Class> {
        let start = def.superclass.map_or(HEADER_SIZE, |s| s.instance_size());
        let (ivars, end) = ivar::layout(&def.ivars, start, rt)?;

        let mut methods = FxHashMap::default();
        for method in def.methods {
            methods.insert(method.selector().to_string(), method);
        }

        let inner = ClassInner {
            magic: CLASS_MAGIC,
            isa: def.isa.map(Class::as_object),
            superclass: def.superclass,
            name: def.name,
            instance_size: end + def.extra_bytes,
            ivars,
            methods,
            properties: def.properties,
            protocols: def.protocols,
        };

        let class = Class {
            inner: metadata_arena().alloc(inner),
        };
        debug!(
            "created class {} (instance size {}, {} ivars, {} methods)",
            class.name(),
            class.instance_size(),
            class.ivars().len(),
            class.inner().methods.len()
        );
        Ok(class)
    }

    fn inner(&self) -> &'static ClassInner {
        // SAFETY: class records live in the metadata arena, which is never
        // freed, and are never mutated after allocation
        unsafe { &*self.inner.as_ptr() }
    }

    /// Returns the class-object view of this class.
    ///
    /// The view's first word is this class's isa, so it classifies as a
    /// class (or a metaclass) and can be used as a message receiver.
    #[must_use]
    pub fn as_object(self) -> Id {
        let record = RawCell::<u8>::new(self.inner.cast());
        Id::from_non_null(record.byte_add(CLASS_OBJECT_OFFSET).as_non_null())
    }

    /// Recovers the class from a class-object view.
    ///
    /// Returns `None` if `object` is an instance.
    ///
    /// # Safety
    ///
    /// `object` must be a live instance or a view produced by
    /// [`as_object`](Self::as_object).
    #[must_use]
    pub unsafe fn from_object(object: Id) -> Option<Class> {
        match unsafe { object.classify() } {
            Receiver::Instance(_) => None,
            Receiver::Class(class) | Receiver::Metaclass(class) => Some(class),
        }
    }

    /// Recovers the class from a view without classifying it.
    ///
    /// # Safety
    ///
    /// `object` must be a view produced by [`as_object`](Self::as_object).
    pub(crate) unsafe fn from_object_unchecked(object: Id) -> Class {
        let record = object.cell().byte_sub(CLASS_OBJECT_OFFSET);
        let class = Class {
            inner: record.as_non_null().cast(),
        };
        debug_assert_eq!(class.inner().magic, CLASS_MAGIC, "not a class object: {object:?}");
        class
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        &self.inner().name
    }

    /// Returns the metaclass, or `None` if this is a metaclass.
    #[must_use]
    pub fn isa(&self) -> Option<Class> {
        // SAFETY: isa is always a view produced by as_object
        self.inner()
            .isa
            .map(|view| unsafe { Class::from_object_unchecked(view) })
    }

    /// Alias for [`isa`](Self::isa).
    #[must_use]
    pub fn metaclass(&self) -> Option<Class> {
        self.isa()
    }

    /// Returns the superclass, or `None` for a root (or root metaclass).
    #[must_use]
    pub fn superclass(&self) -> Option<Class> {
        self.inner().superclass
    }

    /// Returns the size in bytes of an instance of this class.
    #[must_use]
    pub fn instance_size(&self) -> usize {
        self.inner().instance_size
    }

    /// Returns `true` if this is a metaclass.
    #[must_use]
    pub fn is_metaclass(&self) -> bool {
        self.inner().isa.is_none()
    }

    /// Returns `true` if `other` is this class or one of its ancestors.
    #[must_use]
    pub fn is_subclass_of(&self, other: Class) -> bool {
        self.ancestors().any(|class| class == other)
    }

    /// Iterates over this class and then each superclass up to the root.
    #[must_use]
    pub fn ancestors(&self) -> Ancestors {
        Ancestors { next: Some(*self) }
    }

    /// Own ivars in layout order.
    #[must_use]
    pub fn ivars(&self) -> &'static [Ivar] {
        &self.inner().ivars
    }

    /// Own methods, in no particular order.
    pub fn methods(&self) -> impl Iterator<Item = &'static Method> {
        self.inner().methods.values()
    }

    /// Own properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &'static [Property] {
        &self.inner().properties
    }

    /// Adopted protocols in declaration order.
    #[must_use]
    pub fn protocols(&self) -> &'static [Protocol] {
        &self.inner().protocols
    }

    /// Looks up a method in this class's own table only.
    #[must_use]
    pub fn method(&self, selector: &str) -> Option<&'static Method> {
        self.inner().methods.get(selector)
    }

    /// Looks up an own ivar by name.
    #[must_use]
    pub fn ivar(&self, name: &str) -> Option<&'static Ivar> {
        self.inner().ivars.iter().find(|ivar| ivar.name() == name)
    }

    /// Looks up an own property by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&'static Property> {
        self.inner().properties.iter().find(|prop| prop.name() == name)
    }

    /// Looks up a method in this class, then in each ancestor.
    #[must_use]
    pub fn lookup_method(&self, selector: &str) -> Option<&'static Method> {
        self.ancestors().find_map(|class| class.method(selector))
    }

    /// Returns the nearest class in the chain whose own table has `selector`.
    #[must_use]
    pub fn method_provider(&self, selector: &str) -> Option<Class> {
        self.ancestors().find(|class| class.method(selector).is_some())
    }

    /// Looks up an ivar in this class, then in each ancestor.
    ///
    /// Names are not required to be unique along the chain. A subclass that
    /// redeclares an inherited name gets a new slot, and this lookup finds
    /// the subclass's slot first.
    #[must_use]
    pub fn find_ivar(&self, name: &str) -> Option<&'static Ivar> {
        self.ancestors().find_map(|class| class.ivar(name))
    }

    /// Offset of the named ivar, searching ancestors as well.
    #[must_use]
    pub fn ivar_offset(&self, name: &str) -> Option<usize> {
        self.find_ivar(name).map(Ivar::offset)
    }

    /// Returns `true` if this class or an ancestor lists a protocol with
    /// this name.
    #[must_use]
    pub fn conforms_to(&self, protocol: &str) -> bool {
        self.ancestors()
            .any(|class| class.protocols().iter().any(|p| p.name() == protocol))
    }

    /// Allocates a zeroed instance and stores this class in its header.
    ///
    /// Nothing else is initialized; that is the job of an `init` method.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInstantiable`] for a metaclass, whose instances
    /// would classify as classes, or [`Error::OutOfMemory`] if the block
    /// cannot be allocated.
    pub fn create_instance(self) -> Result<Id> {
        if self.is_metaclass() {
            return Err(Error::NotInstantiable {
                name: self.name().to_string(),
            });
        }

        let block = block::alloc_zeroed(self.instance_size())?;
        let cell = RawCell::<u8>::new(block);

        // SAFETY: the block is at least HEADER_SIZE bytes and the header
        // slot is exactly one Id wide
        unsafe { cell.write(self.as_object(), 0) };
        Ok(Id::from_non_null(block))
    }
}

/// Iterator over a class and its superclasses. See [`Class::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<Class>,
}

impl Iterator for Ancestors {
    type Item = Class;

    fn next(&mut self) -> Option<Class> {
        let current = self.next?;
        self.next = current.superclass();
        Some(current)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let isa = self.isa();
        let superclass = self.superclass();

        writeln!(f, "<Class {} ({:p})> {{", self.name(), self.inner)?;
        writeln!(f, "    isa:        {},", isa.map_or("nil", |c| c.name()))?;
        writeln!(f, "    superclass: {},", superclass.map_or("nil", |c| c.name()))?;
        writeln!(f, "    methods:    {},", self.inner().methods.len())?;
        writeln!(f, "    properties: {},", self.properties().len())?;
        writeln!(f, "    protocols:  {},", self.protocols().len())?;
        write!(f, "}}")
    }
}
