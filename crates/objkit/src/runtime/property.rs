//! Property descriptors.

use crate::runtime::method::Method;
use crate::runtime::ordered::Named;
use crate::runtime::types::Type;

/// A named accessor pair.
///
/// The getter is mandatory and defines the property's type; the setter is
/// optional (read-only properties have none). Properties are descriptive:
/// the accessor methods still have to be added to the class's method table
/// to be reachable through dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    getter: Method,
    setter: Option<Method>,
}

impl Property {
    /// Creates a property from its accessors.
    #[must_use]
    pub fn new(name: impl Into<String>, getter: Method, setter: Option<Method>) -> Self {
        Property {
            name: name.into(),
            getter,
            setter,
        }
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the getter.
    #[must_use]
    pub fn getter(&self) -> &Method {
        &self.getter
    }

    /// Returns the setter, if the property is writable.
    #[must_use]
    pub fn setter(&self) -> Option<&Method> {
        self.setter.as_ref()
    }

    /// Returns `true` if the property has no setter.
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.setter.is_none()
    }

    /// The property's type: the getter's return type.
    #[must_use]
    pub fn ty(&self) -> &Type {
        self.getter.return_type()
    }
}

impl Named for Property {
    fn name(&self) -> &str {
        &self.name
    }
}
