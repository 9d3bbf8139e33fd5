//! Type descriptors for ivars, method signatures and properties.
//!
//! A [`Type`] tags the storage category of a value. It yields:
//!
//! - a byte size, used to lay out ivars (see [`Type::size`])
//! - a compact textual encoding in the spirit of Objective-C's `@encode()`
//!   (see [`Type::encoding`])
//! - a human-readable description (`Display`)
//!
//! # Encoding Format
//!
//! - `v` - void
//! - `^T` - pointer to `T`
//! - `q` / `i` - integer (64-bit / 32-bit word)
//! - `d` / `f` - float (64-bit / 32-bit word)
//! - `C` - bool
//! - `{6String}` - text
//! - `?<len><desc>` - optional, followed by the length-prefixed description
//! - `@` - object
//! - `{<len><name>}` - struct (and tuple, encoded as its struct)
//! - `#` - class reference
//!
//! Method signatures concatenate the return encoding, `@` for the receiver,
//! `:` for the selector and then each argument: `v@:q` is a void method
//! taking one integer.

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::runtime::platform::{IS_64_BIT, WORD_SIZE};
use std::fmt;

/// Storage category of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// No value
    Void,
    /// Pointer to a value of the inner type
    Pointer(Box<Type>),
    /// Native signed word (`isize`)
    Integer,
    /// Floating-point number, double width on 64-bit targets
    Float,
    /// Boolean
    Bool,
    /// Owned text (`String`)
    Text,
    /// Tuple laid out as the named struct
    Tuple(String),
    /// Optional value of the inner type
    Optional(Box<Type>),
    /// Instance of the named class, stored inline
    Object(String),
    /// Named struct from the runtime's struct registry
    Struct(String),
    /// Reference to the named class itself
    Class(String),
}

impl Type {
    /// Shorthand for `Type::Pointer(Box::new(pointee))`.
    #[must_use]
    pub fn pointer(pointee: Type) -> Self {
        Type::Pointer(Box::new(pointee))
    }

    /// Shorthand for `Type::Optional(Box::new(wrapped))`.
    #[must_use]
    pub fn optional(wrapped: Type) -> Self {
        Type::Optional(Box::new(wrapped))
    }

    /// Shorthand for `Type::Object(name.into())`.
    #[must_use]
    pub fn object(class_name: impl Into<String>) -> Self {
        Type::Object(class_name.into())
    }

    /// Returns the number of bytes a value of this type occupies in an
    /// instance.
    ///
    /// Object, struct and tuple sizes are looked up in `rt`. A class
    /// reference has size zero: the size of a class itself is never needed.
    /// An optional pointer uses the null address as its empty state and is
    /// one word; every other optional carries a one-byte tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownClass`] or [`Error::UnknownStruct`] if a
    /// referenced name is not registered.
    ///
    /// # Example
    ///
    /// ```
    /// use objkit::runtime::{Runtime, Type};
    ///
    /// let rt = Runtime::new();
    /// assert_eq!(Type::Integer.size(&rt).unwrap(), std::mem::size_of::<isize>());
    /// assert_eq!(Type::optional(Type::Bool).size(&rt).unwrap(), 2);
    /// assert!(Type::object("Missing").size(&rt).is_err());
    /// ```
    pub fn size(&self, rt: &Runtime) -> Result<usize> {
        match self {
            Type::Void | Type::Class(_) => Ok(0),
            Type::Pointer(_) | Type::Integer => Ok(WORD_SIZE),
            Type::Float => Ok(if IS_64_BIT { 8 } else { 4 }),
            Type::Bool => Ok(std::mem::size_of::<bool>()),
            Type::Text => Ok(std::mem::size_of::<String>()),
            Type::Optional(wrapped) => match wrapped.as_ref() {
                Type::Pointer(_) => Ok(WORD_SIZE),
                other => Ok(other.size(rt)? + 1),
            },
            Type::Object(name) => rt
                .class_named(name)
                .map(|class| class.instance_size())
                .ok_or_else(|| Error::UnknownClass { name: name.clone() }),
            Type::Struct(name) | Type::Tuple(name) => rt
                .struct_named(name)
                .map(|layout| layout.size)
                .ok_or_else(|| Error::UnknownStruct { name: name.clone() }),
        }
    }

    /// Returns the textual encoding of this type.
    ///
    /// # Example
    ///
    /// ```
    /// use objkit::runtime::Type;
    ///
    /// assert_eq!(Type::pointer(Type::Void).encoding(), "^v");
    /// assert_eq!(Type::Struct("Point".into()).encoding(), "{5Point}");
    /// assert_eq!(Type::optional(Type::Text).encoding(), "?6String");
    /// ```
    #[must_use]
    pub fn encoding(&self) -> String {
        match self {
            Type::Void => "v".to_string(),
            Type::Pointer(pointee) => format!("^{}", pointee.encoding()),
            Type::Integer => String::from(if IS_64_BIT { "q" } else { "i" }),
            Type::Float => String::from(if IS_64_BIT { "d" } else { "f" }),
            Type::Bool => "C".to_string(),
            Type::Text => "{6String}".to_string(),
            Type::Tuple(name) | Type::Struct(name) => {
                format!("{{{}{name}}}", name.chars().count())
            }
            Type::Optional(wrapped) => {
                let description = wrapped.to_string();
                format!("?{}{description}", description.chars().count())
            }
            Type::Object(_) => "@".to_string(),
            Type::Class(_) => "#".to_string(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("Void"),
            Type::Pointer(pointee) => write!(f, "Pointer<{pointee}>"),
            Type::Integer => f.write_str("Integer"),
            Type::Float => f.write_str("Float"),
            Type::Bool => f.write_str("Bool"),
            Type::Text => f.write_str("String"),
            Type::Optional(wrapped) => write!(f, "{wrapped}?"),
            Type::Tuple(name) | Type::Object(name) | Type::Struct(name) | Type::Class(name) => {
                f.write_str(name)
            }
        }
    }
}
