//! The runtime context: class, protocol and struct registries.
//!
//! A [`Runtime`] is an explicit value rather than process-wide state. Every
//! operation that creates or looks up classes by name takes one, so two
//! runtimes never see each other's classes. Class records themselves live in
//! the shared metadata arena and outlive any runtime.

use crate::error::{Error, Result};
use crate::runtime::class::Class;
use crate::runtime::protocol::Protocol;
use crate::runtime::root;
use fxhash::FxHashMap;
use objkit_log::{debug, info};
use std::fmt;

/// A named struct size, used to size `Struct` and `Tuple` ivars.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StructLayout {
    /// Struct name
    pub name: String,
    /// Size in bytes
    pub size: usize,
}

impl fmt::Debug for StructLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "struct {} ({} bytes)", self.name, self.size)
    }
}

/// Registry of classes, protocols and structs.
///
/// # Example
///
/// ```rust
/// use objkit::runtime::Runtime;
///
/// let rt = Runtime::bootstrap().unwrap();
/// let object = rt.class_named("Object").unwrap();
///
/// assert_eq!(rt.root_class(), Some(object));
/// assert!(rt.class_named("Object.meta").unwrap().is_metaclass());
/// ```
#[derive(Default)]
pub struct Runtime {
    classes: Vec<Class>,
    index: FxHashMap<String, Class>,
    protocols: FxHashMap<String, Protocol>,
    structs: FxHashMap<String, StructLayout>,
    root: Option<Class>,
}

impl Runtime {
    /// Creates an empty runtime with no root class.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runtime with the root class `Object` installed.
    ///
    /// Also applies the log level from `OBJKIT_LOG`, if set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the root classes cannot be
    /// allocated.
    pub fn bootstrap() -> Result<Self> {
        objkit_log::init_from_env();

        let mut rt = Self::new();
        let root = root::install(&mut rt)?;
        info!("runtime ready with root class {}", root.name());
        Ok(rt)
    }

    /// Returns the default superclass for new classes, if one is installed.
    #[must_use]
    pub fn root_class(&self) -> Option<Class> {
        self.root
    }

    pub(crate) fn set_root(&mut self, class: Class) {
        self.root = Some(class);
    }

    /// Looks up a class or metaclass by name.
    #[must_use]
    pub fn class_named(&self, name: &str) -> Option<Class> {
        self.index.get(name).copied()
    }

    /// Returns `true` if a class or metaclass with this name is registered.
    #[must_use]
    pub fn contains_class(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterates over registered classes and metaclasses in registration
    /// order.
    pub fn classes(&self) -> impl Iterator<Item = Class> + '_ {
        self.classes.iter().copied()
    }

    /// Returns the number of registered classes and metaclasses.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Registers an allocated class. The caller has checked the name.
    pub(crate) fn insert_class(&mut self, class: Class) {
        debug_assert!(!self.contains_class(class.name()));
        debug!("registered class {}", class.name());
        self.index.insert(class.name().to_string(), class);
        self.classes.push(class);
    }

    /// Registers a protocol.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolAlreadyExists`] if the name is taken.
    pub fn register_protocol(&mut self, protocol: Protocol) -> Result<()> {
        if self.protocols.contains_key(protocol.name()) {
            return Err(Error::ProtocolAlreadyExists {
                name: protocol.name().to_string(),
            });
        }
        self.protocols.insert(protocol.name().to_string(), protocol);
        Ok(())
    }

    /// Looks up a protocol by name.
    #[must_use]
    pub fn protocol_named(&self, name: &str) -> Option<&Protocol> {
        self.protocols.get(name)
    }

    /// Iterates over registered protocols, in no particular order.
    pub fn protocols(&self) -> impl Iterator<Item = &Protocol> {
        self.protocols.values()
    }

    /// Registers the size of a named struct.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StructAlreadyExists`] if the name is taken.
    pub fn register_struct(&mut self, name: impl Into<String>, size: usize) -> Result<()> {
        let name = name.into();
        if self.structs.contains_key(&name) {
            return Err(Error::StructAlreadyExists { name });
        }
        self.structs.insert(name.clone(), StructLayout { name, size });
        Ok(())
    }

    /// Looks up a struct layout by name.
    #[must_use]
    pub fn struct_named(&self, name: &str) -> Option<&StructLayout> {
        self.structs.get(name)
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("classes", &self.classes.iter().map(|c| c.name()).collect::<Vec<_>>())
            .field("protocols", &self.protocols.len())
            .field("structs", &self.structs.values().collect::<Vec<_>>())
            .field("root", &self.root.map(|c| c.name()))
            .finish()
    }
}
