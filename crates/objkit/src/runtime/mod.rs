//! Object runtime.
//!
//! This module provides the dynamic object model:
//!
//! - [`types`]: type descriptors, sizes and encodings
//! - [`ivar`]: instance variable declarations and layout
//! - [`method`], [`property`], [`protocol`]: class members
//! - [`class`]: class and metaclass records
//! - [`object`]: receiver handles and isa-depth classification
//! - [`dispatch`]: message sends, including `super` sends
//! - [`builder`]: incremental class construction
//! - [`registry`]: the [`Runtime`] context
//! - [`root`]: the root class `Object` and reference counting
//!
//! # Architecture
//!
//! ```text
//!   ClassBuilder ──finalize──> Class + Class.meta ──> Runtime registry
//!                                    │
//!                       create_instance / alloc
//!                                    ▼
//!   msg_send ──classify──> starting class ──ancestors──> Method::invoke
//! ```
//!
//! Class records live in a process-wide metadata arena and are never freed.
//! Instances are zeroed blocks whose first word is the class-object view of
//! their class.
//!
//! # Example
//!
//! ```rust
//! use objkit::runtime::{ClassBuilder, Id, IvarStub, Method, Runtime, Side, Type, msg_send};
//!
//! let mut rt = Runtime::bootstrap().unwrap();
//!
//! let mut builder = ClassBuilder::new(&rt, "Account").unwrap();
//! builder
//!     .add_ivars([IvarStub::new("_balance", Type::Integer)])
//!     .add_methods(
//!         [
//!             Method::new("deposit:", Type::Void, [Type::Integer], |this, _, args| {
//!                 let (amount,) = *args.downcast_ref::<(isize,)>().unwrap();
//!                 unsafe {
//!                     let balance: isize = this.get_ivar("_balance").unwrap();
//!                     this.set_ivar("_balance", balance + amount).unwrap();
//!                 }
//!                 Box::new(())
//!             }),
//!             Method::new("balance", Type::Integer, [], |this, _, _| {
//!                 Box::new(unsafe { this.get_ivar::<isize>("_balance") }.unwrap())
//!             }),
//!         ],
//!         Side::Instance,
//!     );
//! let account = builder.finalize(&mut rt).unwrap();
//!
//! unsafe {
//!     let obj: Id = msg_send(account.as_object(), "new", &());
//!     let () = msg_send(obj, "deposit:", &(25_isize,));
//!     assert_eq!(msg_send::<isize>(obj, "balance", &()), 25);
//!     let () = msg_send(obj, "release", &());
//! }
//! ```

pub mod builder;
pub mod class;
pub mod describe;
pub mod dispatch;
pub mod ivar;
pub mod method;
pub mod object;
pub mod ordered;
pub mod platform;
pub mod property;
pub mod protocol;
pub mod registry;
pub mod root;
pub mod types;

pub use builder::{ClassBuilder, Side};
pub use class::{Ancestors, Class, ClassDef};
pub use describe::describe;
pub use dispatch::{msg_send, msg_send_super, resolve, send};
pub use ivar::{Ivar, IvarStub};
pub use method::{Imp, Method, Value};
pub use object::{Id, ObjectHeader, ObjectKind, Receiver};
pub use ordered::{Named, OrderedSet};
pub use property::Property;
pub use protocol::Protocol;
pub use registry::{Runtime, StructLayout};
pub use root::{RETAIN_COUNT_IVAR, ROOT_CLASS_NAME};
pub use types::Type;
