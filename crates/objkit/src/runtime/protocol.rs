//! Protocol descriptors.
//!
//! A protocol is a named list of methods. Conformance is purely nominal: a
//! class conforms to a protocol when it lists a protocol of that name, and
//! the method list is never checked against the class's method table.

use crate::runtime::method::Method;
use crate::runtime::ordered::Named;

/// A named set of method declarations.
#[derive(Debug, Clone)]
pub struct Protocol {
    name: String,
    methods: Vec<Method>,
}

impl Protocol {
    /// Creates a protocol.
    #[must_use]
    pub fn new(name: impl Into<String>, methods: impl IntoIterator<Item = Method>) -> Self {
        Protocol {
            name: name.into(),
            methods: methods.into_iter().collect(),
        }
    }

    /// Returns the protocol name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared methods.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns the declared method with this selector.
    #[must_use]
    pub fn method(&self, selector: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.selector() == selector)
    }
}

impl Named for Protocol {
    fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Protocol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Protocol {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::types::Type;

    fn copying() -> Protocol {
        let copy = Method::new("copy", Type::object("self"), [], |this, _, _| Box::new(this));
        Protocol::new("Copying", [copy])
    }

    #[test]
    fn test_method_lookup() {
        let proto = copying();

        assert_eq!(proto.name(), "Copying");
        assert_eq!(proto.methods().len(), 1);
        assert!(proto.method("copy").is_some());
        assert!(proto.method("mutableCopy").is_none());
    }

    #[test]
    fn test_equality_is_by_name() {
        assert_eq!(copying(), Protocol::new("Copying", []));
        assert_ne!(copying(), Protocol::new("Coding", []));
    }
}
