//! `objkit`: a small reflective object runtime.
//!
//! `objkit` models how a Smalltalk/Objective-C style runtime works below the
//! language level. Classes, metaclasses, instances and method tables are
//! built out of raw memory with explicit layout rules, and messages are
//! resolved at run time by walking the class chain.
//!
//! - **Byte-exact layout**: instance size and ivar offsets follow the
//!   inheritance chain with no padding
//! - **Class/metaclass pairs**: classes can be messaged as ordinary objects
//! - **Dynamic dispatch**: selector lookup over two parallel hierarchies,
//!   including `super` sends
//! - **Class builder**: incremental, deduplicated class definitions frozen
//!   into the registry in one step
//!
//! # Example
//!
//! ```rust
//! use objkit::runtime::{ClassBuilder, Method, Runtime, Side, Type, msg_send};
//!
//! let mut rt = Runtime::bootstrap().unwrap();
//!
//! let mut builder = ClassBuilder::new(&rt, "Greeter").unwrap();
//! builder.add_methods(
//!     [Method::new("greeting", Type::Text, [], |_, _, _| {
//!         Box::new(String::from("hello"))
//!     })],
//!     Side::Instance,
//! );
//! let greeter = builder.finalize(&mut rt).unwrap();
//!
//! unsafe {
//!     let obj = greeter.create_instance().unwrap();
//!     let text: String = msg_send(obj, "greeting", &());
//!     assert_eq!(text, "hello");
//!     obj.free();
//! }
//! ```

pub mod error;
pub mod runtime;

pub use error::{Error, Result};
