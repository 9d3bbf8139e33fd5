//! Error types for the `objkit` runtime.
//!
//! Recoverable failures (duplicate names, unknown types, missing ivars) are
//! reported through [`Error`]. Broken runtime invariants such as an
//! unrecognized selector or an over-released object are not recoverable and
//! go through [`fatal_error`] instead.

use objkit_mem::AllocError;
use std::fmt;

/// Errors that can occur in the `objkit` runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A class with this name is already registered.
    ClassAlreadyExists {
        /// The duplicated class name.
        name: String,
    },

    /// A protocol with this name is already registered.
    ProtocolAlreadyExists {
        /// The duplicated protocol name.
        name: String,
    },

    /// A struct layout with this name is already registered.
    StructAlreadyExists {
        /// The duplicated struct name.
        name: String,
    },

    /// A type refers to a class that is not registered.
    UnknownClass {
        /// The missing class name.
        name: String,
    },

    /// A type refers to a struct layout that is not registered.
    UnknownStruct {
        /// The missing struct name.
        name: String,
    },

    /// No ivar with this name exists on the class or its ancestors.
    IvarNotFound {
        /// Name of the receiver's class.
        class: String,
        /// The ivar that was looked up.
        ivar: String,
    },

    /// Instances of this class cannot be created (it is a metaclass).
    NotInstantiable {
        /// Name of the class.
        name: String,
    },

    /// Instance storage could not be allocated.
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ClassAlreadyExists { name } => {
                write!(f, "Class '{name}' already exists in registry")
            }
            Error::ProtocolAlreadyExists { name } => {
                write!(f, "Protocol '{name}' already exists")
            }
            Error::StructAlreadyExists { name } => {
                write!(f, "Struct '{name}' already exists")
            }
            Error::UnknownClass { name } => write!(f, "Unknown class '{name}'"),
            Error::UnknownStruct { name } => write!(f, "Unknown struct '{name}'"),
            Error::IvarNotFound { class, ivar } => {
                write!(f, "Ivar '{ivar}' not found on class '{class}'")
            }
            Error::NotInstantiable { name } => {
                write!(f, "Class '{name}' is a metaclass and cannot be instantiated")
            }
            Error::OutOfMemory => write!(f, "Out of memory"),
        }
    }
}

impl std::error::Error for Error {}

impl From<AllocError> for Error {
    fn from(_: AllocError) -> Self {
        Error::OutOfMemory
    }
}

/// Result type for `objkit` runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Aborts the current operation because a runtime invariant was violated.
///
/// The message is logged at error level (with a captured backtrace when the
/// `fatal_backtrace` feature is enabled) and then raised as a panic.
#[cold]
#[track_caller]
pub fn fatal_error(args: fmt::Arguments<'_>) -> ! {
    objkit_log::error!("{args}");

    #[cfg(feature = "fatal_backtrace")]
    {
        let trace = backtrace::Backtrace::new();
        objkit_log::error!("backtrace:\n{trace:?}");
    }

    panic!("{args}");
}

/// Formats a message and passes it to [`fatal_error`](crate::error::fatal_error).
macro_rules! fatal {
    ($($arg:tt)*) => {
        $crate::error::fatal_error(format_args!($($arg)*))
    };
}

pub(crate) use fatal;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", Error::OutOfMemory), "Out of memory");
        assert_eq!(
            format!(
                "{}",
                Error::IvarNotFound {
                    class: "Person".into(),
                    ivar: "_height".into()
                }
            ),
            "Ivar '_height' not found on class 'Person'"
        );
        assert_eq!(
            Error::UnknownStruct {
                name: "CGPoint".into()
            }
            .to_string(),
            "Unknown struct 'CGPoint'"
        );
        assert_eq!(
            Error::NotInstantiable {
                name: "Object.meta".into()
            }
            .to_string(),
            "Class 'Object.meta' is a metaclass and cannot be instantiated"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            Error::ClassAlreadyExists { name: "Foo".into() },
            Error::ClassAlreadyExists { name: "Foo".into() }
        );
        assert_ne!(
            Error::ClassAlreadyExists { name: "Foo".into() },
            Error::ClassAlreadyExists { name: "Bar".into() }
        );
    }

    #[test]
    fn test_alloc_error_maps_to_out_of_memory() {
        let err: Error = AllocError { requested: 64 }.into();
        assert_eq!(err, Error::OutOfMemory);
    }

    #[test]
    #[should_panic(expected = "runtime invariant broken: 3")]
    fn test_fatal_panics_with_message() {
        fatal!("runtime invariant broken: {}", 3);
    }
}
