//! Human-readable descriptions of receivers.

use crate::runtime::dispatch::msg_send;
use crate::runtime::object::{Id, Receiver};

/// Describes a receiver.
///
/// If the receiver responds to `description`, that method's `String` result
/// is returned. Otherwise the description is `<ClassName 0xADDR>`, naming the
/// instance's class or the class itself.
///
/// # Safety
///
/// The receiver must be live.
///
/// # Example
///
/// ```rust
/// use objkit::runtime::{Runtime, describe};
///
/// let rt = Runtime::bootstrap().unwrap();
/// let object = rt.class_named("Object").unwrap().as_object();
///
/// let text = unsafe { describe(object) };
/// assert!(text.starts_with("<Object 0x"));
/// ```
#[must_use]
pub unsafe fn describe(receiver: Id) -> String {
    unsafe {
        if receiver.responds_to("description") {
            return msg_send(receiver, "description", &());
        }

        match receiver.classify() {
            Receiver::Instance(class) | Receiver::Class(class) | Receiver::Metaclass(class) => {
                format!("<{} {:p}>", class.name(), receiver)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::method::Method;
    use crate::runtime::types::Type;
    use crate::runtime::{ClassBuilder, Runtime, Side};

    #[test]
    fn test_default_description() {
        let mut rt = Runtime::bootstrap().unwrap();
        let plain = ClassBuilder::new(&rt, "Plain").unwrap().finalize(&mut rt).unwrap();

        unsafe {
            let obj: Id = msg_send(plain.as_object(), "new", &());
            assert_eq!(describe(obj), format!("<Plain {obj:p}>"));
            assert_eq!(describe(plain.as_object()), format!("<Plain {:p}>", plain.as_object()));

            let meta = plain.isa().unwrap().as_object();
            assert_eq!(describe(meta), format!("<Plain.meta {meta:p}>"));
            let () = msg_send(obj, "release", &());
        }
    }

    #[test]
    fn test_description_override() {
        let mut rt = Runtime::bootstrap().unwrap();
        let mut builder = ClassBuilder::new(&rt, "Loud").unwrap();
        builder
            .add_methods(
                [Method::new("description", Type::Text, [], |_, _, _| {
                    Box::new(String::from("LOUD"))
                })],
                Side::Instance,
            )
            .add_methods(
                [Method::new("description", Type::Text, [], |_, _, _| {
                    Box::new(String::from("class Loud"))
                })],
                Side::Class,
            );
        let loud = builder.finalize(&mut rt).unwrap();

        unsafe {
            let obj: Id = msg_send(loud.as_object(), "new", &());
            assert_eq!(describe(obj), "LOUD");
            assert_eq!(describe(loud.as_object()), "class Loud");
            let () = msg_send(obj, "release", &());
        }
    }
}
