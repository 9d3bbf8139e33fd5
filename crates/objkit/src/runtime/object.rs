//! Receiver handles and the isa-depth classification rule.
//!
//! An [`Id`] is the address of anything that can receive a message: an
//! instance, or the class-object view of a class or metaclass. All three
//! start with an isa word:
//!
//! | receiver  | isa                      | isa's isa             |
//! |-----------|--------------------------|-----------------------|
//! | instance  | its class (view)         | the metaclass (view)  |
//! | class     | its metaclass (view)     | nil                   |
//! | metaclass | nil                      |                       |
//!
//! so reading at most two words tells the three apart. [`Id::classify`]
//! implements exactly that rule and every part of the runtime that needs to
//! type a receiver goes through it.
//!
//! # Safety
//!
//! An `Id` does not own its memory. Anything that reads through it is
//! `unsafe`, and the caller guarantees the receiver is still live: an
//! instance that has not been freed, or a class-object view (always live).

use crate::error::{Error, Result, fatal};
use crate::runtime::class::Class;
use crate::runtime::dispatch;
use objkit_mem::{RawCell, block};
use std::fmt;
use std::ptr::NonNull;

/// The header every receiver starts with.
#[repr(C)]
pub struct ObjectHeader {
    /// Class-object view of the receiver's class, or `None` for a metaclass
    pub isa: Option<Id>,
}

/// Handle to a message receiver.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Id(RawCell<ObjectHeader>);

/// What a receiver is, together with the class that describes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// An instance of the class
    Instance(Class),
    /// The class itself
    Class(Class),
    /// The metaclass itself
    Metaclass(Class),
}

impl Receiver {
    /// Drops the class, keeping only the kind.
    #[must_use]
    pub fn kind(self) -> ObjectKind {
        match self {
            Receiver::Instance(_) => ObjectKind::Instance,
            Receiver::Class(_) => ObjectKind::Class,
            Receiver::Metaclass(_) => ObjectKind::Metaclass,
        }
    }

    /// The instance's class, or the class/metaclass itself.
    #[must_use]
    pub fn class(self) -> Class {
        match self {
            Receiver::Instance(class) | Receiver::Class(class) | Receiver::Metaclass(class) => class,
        }
    }
}

/// Kind of a receiver, see [`Id::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// An ordinary instance
    Instance,
    /// A class used as a receiver
    Class,
    /// A metaclass used as a receiver
    Metaclass,
}

impl Id {
    /// Wraps an address as a receiver handle.
    #[must_use]
    pub const fn from_non_null(ptr: NonNull<u8>) -> Self {
        Id(RawCell::new(ptr))
    }

    /// Wraps an address, returning `None` for null.
    #[must_use]
    pub fn from_ptr(ptr: *mut u8) -> Option<Self> {
        NonNull::new(ptr).map(Self::from_non_null)
    }

    /// Returns the address as a byte pointer.
    #[must_use]
    pub const fn as_ptr(self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Returns the numeric address.
    #[must_use]
    pub fn addr(self) -> usize {
        self.0.addr()
    }

    /// Returns a byte-addressed cell over the receiver's memory.
    #[must_use]
    pub const fn cell(self) -> RawCell<u8> {
        self.0.cast()
    }

    /// Reads the raw isa word.
    ///
    /// # Safety
    ///
    /// The receiver must be live.
    #[must_use]
    pub unsafe fn raw_isa(self) -> Option<Id> {
        unsafe { self.0.cast::<Option<Id>>().get() }
    }

    /// Classifies the receiver with the isa-depth rule.
    ///
    /// # Safety
    ///
    /// The receiver must be live.
    #[must_use]
    pub unsafe fn classify(self) -> Receiver {
        // SAFETY: every isa is a class-object view, and class records are
        // never freed
        unsafe {
            match self.raw_isa() {
                None => Receiver::Metaclass(Class::from_object_unchecked(self)),
                Some(isa) => match isa.raw_isa() {
                    None => Receiver::Class(Class::from_object_unchecked(self)),
                    Some(_) => Receiver::Instance(Class::from_object_unchecked(isa)),
                },
            }
        }
    }

    /// Returns the receiver's kind.
    ///
    /// # Safety
    ///
    /// The receiver must be live.
    #[must_use]
    pub unsafe fn kind(self) -> ObjectKind {
        unsafe { self.classify() }.kind()
    }

    /// Returns the class the receiver's isa points at: an instance's class,
    /// a class's metaclass, or `None` for a metaclass.
    ///
    /// # Safety
    ///
    /// The receiver must be live.
    #[must_use]
    pub unsafe fn isa(self) -> Option<Class> {
        // SAFETY: isa words always hold class-object views
        unsafe { self.raw_isa().map(|view| Class::from_object_unchecked(view)) }
    }

    /// Reads the named ivar, searching the receiver's class chain.
    ///
    /// Returns `None` if no such ivar exists. The stored value is cloned and
    /// stays in place.
    ///
    /// # Safety
    ///
    /// The receiver must be live, and the ivar must currently hold a valid
    /// `T` (a zeroed slot is only valid for plain numeric types and `bool`).
    #[must_use]
    pub unsafe fn get_ivar<T: Clone>(self, name: &str) -> Option<T> {
        let class = unsafe { self.isa() }?;
        let ivar = class.find_ivar(name)?;
        debug_assert!(std::mem::size_of::<T>() <= ivar.size());
        Some(unsafe { self.cell().read_cloned::<T>(ivar.offset()) })
    }

    /// Writes the named ivar, searching the receiver's class chain.
    ///
    /// The previous contents are overwritten without being dropped.
    ///
    /// # Safety
    ///
    /// The receiver must be live and `T` must fit in the ivar's slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IvarNotFound`] if neither the class nor an ancestor
    /// declares the ivar.
    pub unsafe fn set_ivar<T>(self, name: &str, value: T) -> Result<()> {
        let class = unsafe { self.isa() };
        let Some(ivar) = class.and_then(|c| c.find_ivar(name)) else {
            return Err(Error::IvarNotFound {
                class: class.map_or("nil", |c| c.name()).to_string(),
                ivar: name.to_string(),
            });
        };

        debug_assert!(std::mem::size_of::<T>() <= ivar.size());
        unsafe { self.cell().write(value, ivar.offset()) };
        Ok(())
    }

    /// Returns `true` if a send of `selector` would find a method.
    ///
    /// # Safety
    ///
    /// The receiver must be live.
    #[must_use]
    pub unsafe fn responds_to(self, selector: &str) -> bool {
        unsafe { dispatch::resolve(self, selector, false) }.is_some()
    }

    /// Releases an instance's storage.
    ///
    /// Ivars are not dropped. Freeing a class object is fatal.
    ///
    /// # Safety
    ///
    /// The receiver must be a live instance, and must not be used afterwards.
    pub unsafe fn free(self) {
        match unsafe { self.classify() } {
            Receiver::Instance(class) => {
                objkit_log::trace!("freeing {} at {:p}", class.name(), self);
                // SAFETY: instances are allocated by create_instance with the
                // class's instance size
                unsafe { block::free(self.0.as_non_null(), class.instance_size()) };
            }
            Receiver::Class(class) | Receiver::Metaclass(class) => {
                fatal!("Attempt to free class object {:p} ({})", self, class.name())
            }
        }
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({:p})", self.0)
    }
}

impl fmt::Pointer for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.0, f)
    }
}
