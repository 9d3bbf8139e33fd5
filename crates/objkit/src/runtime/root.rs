//! The root class `Object` and manual reference counting.
//!
//! `Object` is installed by [`Runtime::bootstrap`] and is the default
//! superclass of every class built afterwards. It provides:
//!
//! | side     | selector      | behaviour                                   |
//! |----------|---------------|---------------------------------------------|
//! | class    | `alloc`       | zeroed instance of the receiving class      |
//! | class    | `new`         | `alloc` then `init`                         |
//! | class    | `class`       | the receiver                                |
//! | instance | `init`        | sets the retain count to 1, returns self    |
//! | instance | `retain`      | increments the count, returns self          |
//! | instance | `release`     | decrements the count, frees at zero         |
//! | instance | `retainCount` | current count as `isize`                    |
//! | instance | `class`       | the class object                            |
//!
//! Releasing below zero is fatal.
//!
//! Freeing an instance releases its block without dropping any ivar. A
//! subclass that stores owned values (`Text`, or smart pointers in pointer
//! slots) must take them out in its own `release` override, when the count
//! is about to reach zero, before forwarding to `super`.

use crate::error::{Result, fatal};
use crate::runtime::Runtime;
use crate::runtime::class::{Class, ClassDef};
use crate::runtime::dispatch::msg_send;
use crate::runtime::ivar::IvarStub;
use crate::runtime::method::{Method, Value};
use crate::runtime::object::Id;
use crate::runtime::types::Type;
use objkit_log::trace;
use std::any::Any;

/// Name of the root class.
pub const ROOT_CLASS_NAME: &str = "Object";

/// Name of the ivar holding an instance's retain count.
pub const RETAIN_COUNT_IVAR: &str = "_retainCount";

/// Creates `Object` and its metaclass in `rt` and makes it the root class.
pub(crate) fn install(rt: &mut Runtime) -> Result<Class> {
    let meta = Class::create(
        rt,
        ClassDef {
            name: format!("{ROOT_CLASS_NAME}.meta"),
            methods: vec![
                Method::new("alloc", Type::object("self"), [], alloc),
                Method::new("new", Type::object("self"), [], new),
                Method::new("class", Type::Class("self".into()), [], |this, _, _| Box::new(this)),
            ],
            ..ClassDef::default()
        },
    )?;

    let root = Class::create(
        rt,
        ClassDef {
            name: ROOT_CLASS_NAME.to_string(),
            isa: Some(meta),
            ivars: vec![IvarStub::new(RETAIN_COUNT_IVAR, Type::Integer)],
            methods: vec![
                Method::new("init", Type::object("self"), [], init),
                Method::new("retain", Type::object("self"), [], retain),
                Method::new("release", Type::Void, [], release),
                Method::new("retainCount", Type::Integer, [], |this, _, _| {
                    Box::new(unsafe { retain_count(this) })
                }),
                Method::new("class", Type::Class("self".into()), [], class),
            ],
            ..ClassDef::default()
        },
    )?;

    rt.set_root(root);
    Ok(root)
}

unsafe fn retain_count(this: Id) -> isize {
    unsafe { this.get_ivar(RETAIN_COUNT_IVAR) }.unwrap_or_else(|| {
        fatal!("Object at {this:p} has no {RETAIN_COUNT_IVAR} ivar")
    })
}

unsafe fn set_retain_count(this: Id, count: isize) {
    if let Err(err) = unsafe { this.set_ivar(RETAIN_COUNT_IVAR, count) } {
        fatal!("{err}")
    }
}

fn alloc(this: Id, _: &str, _: &dyn Any) -> Value {
    // SAFETY: class-side methods only ever receive class objects
    let Some(class) = (unsafe { Class::from_object(this) }) else {
        fatal!("alloc sent to instance {this:p}")
    };

    match class.create_instance() {
        Ok(obj) => {
            trace!("alloc {} at {:p}", class.name(), obj);
            Box::new(obj)
        }
        Err(err) => fatal!("Cannot allocate {}: {err}", class.name()),
    }
}

fn new(this: Id, _: &str, _: &dyn Any) -> Value {
    unsafe {
        let obj: Id = msg_send(this, "alloc", &());
        Box::new(msg_send::<Id>(obj, "init", &()))
    }
}

fn init(this: Id, _: &str, _: &dyn Any) -> Value {
    unsafe { set_retain_count(this, 1) };
    Box::new(this)
}

fn retain(this: Id, _: &str, _: &dyn Any) -> Value {
    unsafe { set_retain_count(this, retain_count(this) + 1) };
    Box::new(this)
}

/// Decrements the retain count and frees the block at zero. Ivars are not
/// dropped.
fn release(this: Id, _: &str, _: &dyn Any) -> Value {
    unsafe {
        let count = retain_count(this) - 1;
        if count < 0 {
            fatal!("Over-released object at {this:p}");
        }

        set_retain_count(this, count);
        if count == 0 {
            this.free();
        }
    }
    Box::new(())
}

fn class(this: Id, _: &str, _: &dyn Any) -> Value {
    // SAFETY: instance-side methods receive live instances
    match unsafe { this.isa() } {
        Some(class) => Box::new(class.as_object()),
        None => fatal!("class sent to metaclass {this:p}"),
    }
}
