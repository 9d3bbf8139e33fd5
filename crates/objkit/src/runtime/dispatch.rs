//! Message dispatch.
//!
//! This is the runtime's `objc_msgSend`. A send resolves a selector against
//! the receiver's class chain and invokes the first implementation found.
//!
//! # Dispatch Algorithm
//!
//! 1. Classify the receiver (instance, class or metaclass).
//! 2. Pick the starting class:
//!    - instance → its class; a `super` send starts at the class's superclass
//!    - class → its metaclass; a `super` send starts at the metaclass's
//!      superclass
//!    - metaclass → none (metaclasses are not messaged)
//! 3. Walk the `superclass` chain, checking each class's own method table.
//! 4. Invoke the first match, or abort with an unrecognized-selector error.
//!
//! Method tables are never merged, so walking upward and stopping at the
//! first hit is all inheritance needs.
//!
//! # Super Sends
//!
//! A `super` send made from inside a running implementation starts at the
//! superclass of the class that *defines* that implementation, not of the
//! receiver's class. Each send pushes a frame recording the receiver and the
//! defining class on a per-thread stack. For a direct instance of the
//! defining class both rules give the same answer. For an instance of a
//! subclass that inherits the method, the receiver-based rule would land on
//! the same implementation again and recurse forever.
//!
//! # Example
//!
//! ```rust
//! use objkit::runtime::{ClassBuilder, Method, Runtime, Side, Type, msg_send};
//!
//! let mut rt = Runtime::bootstrap().unwrap();
//! let mut builder = ClassBuilder::new(&rt, "Counter").unwrap();
//! builder.add_methods(
//!     [Method::new("double:", Type::Integer, [Type::Integer], |_, _, args| {
//!         let (n,) = *args.downcast_ref::<(isize,)>().unwrap();
//!         Box::new(n * 2)
//!     })],
//!     Side::Instance,
//! );
//! let counter = builder.finalize(&mut rt).unwrap();
//!
//! unsafe {
//!     let obj = counter.create_instance().unwrap();
//!     let doubled: isize = msg_send(obj, "double:", &(21_isize,));
//!     assert_eq!(doubled, 42);
//!     obj.free();
//! }
//! ```

use crate::error::fatal;
use crate::runtime::class::Class;
use crate::runtime::method::{Method, Value};
use crate::runtime::object::{Id, Receiver};
use objkit_log::trace;
use std::any::{Any, type_name};
use std::cell::RefCell;

/// An implementation currently running on this thread.
#[derive(Clone, Copy)]
struct Frame {
    receiver: Id,
    defining: Class,
}

thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a frame on the stack for the duration of an invocation, including
/// when the implementation panics.
struct FrameGuard;

impl FrameGuard {
    fn enter(frame: Frame) -> Self {
        FRAMES.with_borrow_mut(|frames| frames.push(frame));
        FrameGuard
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with_borrow_mut(|frames| {
            frames.pop();
        });
    }
}

/// Defining class of the innermost running implementation, if it was
/// invoked on `receiver`.
fn enclosing_definer(receiver: Id) -> Option<Class> {
    FRAMES.with_borrow(|frames| {
        frames
            .last()
            .filter(|frame| frame.receiver == receiver)
            .map(|frame| frame.defining)
    })
}

fn starting_class(receiver: Id, kind: Receiver, super_call: bool) -> Option<Class> {
    if super_call {
        if let Some(definer) = enclosing_definer(receiver) {
            return definer.superclass();
        }
    }

    match kind {
        Receiver::Instance(class) if super_call => class.superclass(),
        Receiver::Instance(class) => Some(class),
        Receiver::Class(class) if super_call => class.isa().and_then(|meta| meta.superclass()),
        Receiver::Class(class) => class.isa(),
        Receiver::Metaclass(_) => None,
    }
}

fn lookup(receiver: Id, kind: Receiver, selector: &str, super_call: bool) -> Option<(Class, &'static Method)> {
    starting_class(receiver, kind, super_call)?
        .ancestors()
        .find_map(|class| class.method(selector).map(|method| (class, method)))
}

/// Finds the method a send would invoke, without invoking it.
///
/// Returns the class whose table holds the method together with the method.
///
/// # Safety
///
/// The receiver must be live.
#[must_use]
pub unsafe fn resolve(receiver: Id, selector: &str, super_call: bool) -> Option<(Class, &'static Method)> {
    let kind = unsafe { receiver.classify() };
    lookup(receiver, kind, selector, super_call)
}

/// Sends a message and returns the implementation's result.
///
/// `args` is passed through untouched; by convention it is a tuple, `&()`
/// when there are no arguments.
///
/// # Safety
///
/// The receiver must be live.
///
/// # Panics
///
/// Aborts with an "Unrecognized selector" error if no implementation is
/// found. Sends to a metaclass, and `super` sends from a root, never find
/// one.
pub unsafe fn send(receiver: Id, selector: &str, args: &dyn Any, super_call: bool) -> Value {
    let kind = unsafe { receiver.classify() };
    let Some((defining, method)) = lookup(receiver, kind, selector, super_call) else {
        unrecognized(receiver, kind, selector)
    };

    trace!(
        "{}[{} {}] on {:p}{}",
        indicator(kind),
        defining.name(),
        selector,
        receiver,
        if super_call { " (super)" } else { "" }
    );

    let _frame = FrameGuard::enter(Frame { receiver, defining });
    method.invoke(receiver, args)
}

/// Sends a message and downcasts the result to `T`.
///
/// # Safety
///
/// The receiver must be live.
///
/// # Panics
///
/// Aborts if the selector is unrecognized or the result is not a `T`.
pub unsafe fn msg_send<T: 'static>(receiver: Id, selector: &str, args: &dyn Any) -> T {
    let value = unsafe { send(receiver, selector, args, false) };
    downcast(value, receiver, selector)
}

/// Sends a message to the superclass implementation and downcasts the
/// result to `T`.
///
/// # Safety
///
/// The receiver must be live.
///
/// # Panics
///
/// Aborts if the selector is unrecognized or the result is not a `T`.
pub unsafe fn msg_send_super<T: 'static>(receiver: Id, selector: &str, args: &dyn Any) -> T {
    let value = unsafe { send(receiver, selector, args, true) };
    downcast(value, receiver, selector)
}

fn downcast<T: 'static>(value: Value, receiver: Id, selector: &str) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => fatal!(
            "Result of '{selector}' sent to {receiver:p} is not a `{}`",
            type_name::<T>()
        ),
    }
}

fn indicator(kind: Receiver) -> char {
    match kind {
        Receiver::Instance(_) => '-',
        Receiver::Class(_) | Receiver::Metaclass(_) => '+',
    }
}

#[cold]
fn unrecognized(receiver: Id, kind: Receiver, selector: &str) -> ! {
    let noun = match kind {
        Receiver::Instance(_) => "instance",
        Receiver::Class(_) => "class",
        Receiver::Metaclass(_) => "metaclass",
    };

    fatal!(
        "Unrecognized selector sent to {noun} {receiver:p}: {}[{} {selector}]",
        indicator(kind),
        kind.class().name()
    )
}
