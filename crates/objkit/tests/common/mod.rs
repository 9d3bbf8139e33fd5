// Common test utilities for integration tests
//
// This module provides shared helper functions and test fixtures
// for use across all integration tests.

#![allow(dead_code)]

use objkit::runtime::{Class, ClassBuilder, Id, IvarStub, Method, Runtime, Side, Type, msg_send};
use std::sync::atomic::{AtomicUsize, Ordering};

static CLASS_ID: AtomicUsize = AtomicUsize::new(0);

/// Returns a class name that no other test has used
pub fn unique_name(prefix: &str) -> String {
    let id = CLASS_ID.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}_{id}")
}

/// Creates a runtime with the root class installed
pub fn runtime() -> Runtime {
    Runtime::bootstrap().expect("Failed to bootstrap runtime")
}

/// Creates a method that takes no arguments and returns a fixed integer
pub fn constant(selector: &str, value: isize) -> Method {
    Method::new(selector, Type::Integer, [], move |_, _, _| Box::new(value))
}

/// Creates a method that returns a fixed string
pub fn text(selector: &str, value: &'static str) -> Method {
    Method::new(selector, Type::Text, [], move |_, _, _| Box::new(String::from(value)))
}

/// Builds and finalizes a class with instance-side methods
pub fn define(rt: &mut Runtime, name: &str, superclass: Option<Class>, methods: Vec<Method>) -> Class {
    let mut builder =
        ClassBuilder::with_superclass(rt, name, superclass).expect("Class name already registered");
    builder.add_methods(methods, Side::Instance);
    builder.finalize(rt).expect("Failed to finalize class")
}

/// Builds and finalizes a subclass of the root class with the given ivars
pub fn define_with_ivars(rt: &mut Runtime, name: &str, ivars: Vec<IvarStub>) -> Class {
    let mut builder = ClassBuilder::new(rt, name).expect("Class name already registered");
    builder.add_ivars(ivars);
    builder.finalize(rt).expect("Failed to finalize class")
}

/// Sends `new` to a class
///
/// # Safety
///
/// The class must inherit from the root class
pub unsafe fn new_instance(class: Class) -> Id {
    unsafe { msg_send(class.as_object(), "new", &()) }
}

/// Sends `release` to an instance
///
/// # Safety
///
/// The instance must be live
pub unsafe fn release(obj: Id) {
    unsafe { msg_send::<()>(obj, "release", &()) }
}

/// Reads the root retain count
///
/// # Safety
///
/// The instance must be live
pub unsafe fn retain_count(obj: Id) -> isize {
    unsafe { msg_send(obj, "retainCount", &()) }
}
