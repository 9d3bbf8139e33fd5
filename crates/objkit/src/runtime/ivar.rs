//! Instance variable descriptors and ivar layout.
//!
//! Ivars are declared as [`IvarStub`]s (name and type) and turned into
//! [`Ivar`]s with fixed byte offsets when their class is created. Offsets
//! continue from the superclass's instance size, so a subclass's storage
//! always follows its ancestors' storage:
//!
//! ```text
//! Object:  | isa (word) | _retainCount |
//! Person:  | isa (word) | _retainCount | _name | _age |
//! ```
//!
//! Ivars are packed: each one starts exactly where the previous one ends.

use crate::error::Result;
use crate::runtime::Runtime;
use crate::runtime::ordered::Named;
use crate::runtime::types::Type;

/// An ivar declaration that has not been laid out yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IvarStub {
    /// Ivar name
    pub name: String,
    /// Storage type
    pub ty: Type,
}

impl IvarStub {
    /// Creates an ivar declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        IvarStub {
            name: name.into(),
            ty,
        }
    }
}

impl Named for IvarStub {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A laid-out instance variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ivar {
    name: String,
    ty: Type,
    offset: usize,
    size: usize,
}

impl Ivar {
    /// Returns the ivar's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ivar's storage type.
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Returns the byte offset of this ivar from the start of an instance.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of bytes the ivar occupies.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Assigns offsets to `stubs` in declaration order, starting at `start`.
///
/// Returns the laid-out ivars and the offset one past the last of them.
pub(crate) fn layout(stubs: &[IvarStub], start: usize, rt: &Runtime) -> Result<(Vec<Ivar>, usize)> {
    let mut offset = start;
    let mut ivars = Vec::with_capacity(stubs.len());

    for stub in stubs {
        let size = stub.ty.size(rt)?;
        ivars.push(Ivar {
            name: stub.name.clone(),
            ty: stub.ty.clone(),
            offset,
            size,
        });
        offset += size;
    }

    Ok((ivars, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::runtime::platform::{HEADER_SIZE, WORD_SIZE};

    #[test]
    fn test_layout_is_contiguous() {
        let rt = Runtime::new();
        let stubs = [
            IvarStub::new("_flag", Type::Bool),
            IvarStub::new("_count", Type::Integer),
            IvarStub::new("_name", Type::Text),
        ];

        let (ivars, end) = layout(&stubs, HEADER_SIZE, &rt).unwrap();

        assert_eq!(ivars[0].offset(), HEADER_SIZE);
        assert_eq!(ivars[1].offset(), HEADER_SIZE + 1);
        assert_eq!(ivars[2].offset(), HEADER_SIZE + 1 + WORD_SIZE);
        assert_eq!(end, ivars[2].offset() + std::mem::size_of::<String>());

        for pair in ivars.windows(2) {
            assert_eq!(pair[0].offset() + pair[0].size(), pair[1].offset());
        }
    }

    #[test]
    fn test_layout_keeps_declaration_order() {
        let rt = Runtime::new();
        let stubs = [
            IvarStub::new("z", Type::Integer),
            IvarStub::new("a", Type::Integer),
        ];

        let (ivars, _) = layout(&stubs, 24, &rt).unwrap();
        let names: Vec<&str> = ivars.iter().map(Ivar::name).collect();

        assert_eq!(names, ["z", "a"]);
        assert_eq!(ivars[0].offset(), 24);
    }

    #[test]
    fn test_empty_layout() {
        let rt = Runtime::new();
        let (ivars, end) = layout(&[], 16, &rt).unwrap();

        assert!(ivars.is_empty());
        assert_eq!(end, 16);
    }

    #[test]
    fn test_layout_fails_on_unknown_struct() {
        let rt = Runtime::new();
        let stubs = [IvarStub::new("_origin", Type::Struct("Point".into()))];

        assert_eq!(
            layout(&stubs, HEADER_SIZE, &rt),
            Err(Error::UnknownStruct {
                name: "Point".into()
            })
        );
    }
}
