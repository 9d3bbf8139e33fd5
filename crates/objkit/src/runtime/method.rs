//! Method descriptors and the implementation ABI.
//!
//! A method implementation receives the receiver, the selector it was
//! invoked under and an opaque argument bundle, and returns a boxed value:
//!
//! ```text
//! Fn(receiver: Id, selector: &str, args: &dyn Any) -> Box<dyn Any>
//! ```
//!
//! By convention the argument bundle is a tuple (`()` for no arguments) and
//! void methods return `Box::new(())`. The runtime performs no type checking
//! of arguments; implementations downcast the bundle to whatever their
//! signature promises.

use crate::runtime::object::Id;
use crate::runtime::ordered::Named;
use crate::runtime::types::Type;
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Result of a message send.
pub type Value = Box<dyn Any>;

/// Method implementation.
pub type Imp = Rc<dyn Fn(Id, &str, &dyn Any) -> Value>;

/// A selector bound to an implementation and its signature.
///
/// Methods compare and hash by selector only: two methods with the same
/// selector are the same method as far as method tables are concerned.
///
/// # Example
///
/// ```
/// use objkit::runtime::{Method, Type};
///
/// let set_age = Method::new("setAge:", Type::Void, [Type::Integer], |_, _, args| {
///     let (_age,) = args.downcast_ref::<(isize,)>().copied().unwrap();
///     Box::new(())
/// });
///
/// assert_eq!(set_age.selector(), "setAge:");
/// assert!(set_age.type_encoding().starts_with("v@:"));
/// ```
#[derive(Clone)]
pub struct Method {
    selector: String,
    return_type: Type,
    argument_types: Vec<Type>,
    imp: Imp,
}

impl Method {
    /// Creates a method from a selector, its signature and an implementation.
    pub fn new<F>(
        selector: impl Into<String>,
        return_type: Type,
        argument_types: impl IntoIterator<Item = Type>,
        imp: F,
    ) -> Self
    where
        F: Fn(Id, &str, &dyn Any) -> Value + 'static,
    {
        Method {
            selector: selector.into(),
            return_type,
            argument_types: argument_types.into_iter().collect(),
            imp: Rc::new(imp),
        }
    }

    /// Returns the selector.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Returns the declared return type.
    #[must_use]
    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    /// Returns the declared argument types, excluding receiver and selector.
    #[must_use]
    pub fn argument_types(&self) -> &[Type] {
        &self.argument_types
    }

    /// Returns the implementation.
    #[must_use]
    pub fn imp(&self) -> &Imp {
        &self.imp
    }

    /// Returns the full signature encoding: return type, `@` for the
    /// receiver, `:` for the selector, then each argument.
    #[must_use]
    pub fn type_encoding(&self) -> String {
        let mut encoding = self.return_type.encoding();
        encoding.push_str("@:");
        for arg in &self.argument_types {
            encoding.push_str(&arg.encoding());
        }
        encoding
    }

    /// Calls the implementation directly, without any lookup.
    pub fn invoke(&self, receiver: Id, args: &dyn Any) -> Value {
        (self.imp)(receiver, &self.selector, args)
    }
}

impl Named for Method {
    fn name(&self) -> &str {
        &self.selector
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        self.selector == other.selector
    }
}

impl Eq for Method {}

impl Hash for Method {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.selector.hash(state);
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("selector", &self.selector)
            .field("types", &self.type_encoding())
            .field("imp", &Rc::as_ptr(&self.imp).cast::<()>())
            .finish()
    }
}
