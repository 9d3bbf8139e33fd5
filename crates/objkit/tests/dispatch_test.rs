//! Message dispatch through builder-made hierarchies.
//!
//! Run with: `cargo test --test dispatch_test`

mod common;

use common::{constant, define, release, runtime, text, unique_name};
use objkit::runtime::{ClassBuilder, Id, Method, ObjectKind, Side, Type, msg_send, msg_send_super, resolve};
use std::cell::RefCell;
use std::rc::Rc;

// ============================================================================
// Lookup
// ============================================================================

#[test]
fn test_classification_of_builder_classes() {
    let mut rt = runtime();
    let root = rt.root_class();
    let class = define(&mut rt, &unique_name("Kinds"), root, vec![]);

    unsafe {
        let obj: Id = msg_send(class.as_object(), "new", &());
        assert_eq!(obj.kind(), ObjectKind::Instance);
        assert_eq!(class.as_object().kind(), ObjectKind::Class);
        assert_eq!(class.isa().unwrap().as_object().kind(), ObjectKind::Metaclass);
        release(obj);
    }
}

#[test]
fn test_nearest_ancestor_wins() {
    let mut rt = runtime();
    let root = rt.root_class();
    let a = define(&mut rt, &unique_name("A"), root, vec![text("who", "A"), text("only_a", "A")]);
    let b = define(&mut rt, &unique_name("B"), Some(a), vec![text("who", "B")]);
    let c = define(&mut rt, &unique_name("C"), Some(b), vec![]);

    unsafe {
        let obj: Id = msg_send(c.as_object(), "new", &());
        assert_eq!(msg_send::<String>(obj, "who", &()), "B");
        assert_eq!(msg_send::<String>(obj, "only_a", &()), "A");

        assert_eq!(resolve(obj, "who", false).map(|(owner, _)| owner), Some(b));
        assert_eq!(resolve(obj, "retain", false).map(|(owner, _)| owner), rt.root_class());
        assert!(resolve(obj, "missing", false).is_none());
        assert!(obj.responds_to("only_a"));
        assert!(!obj.responds_to("missing"));
        release(obj);
    }
}

#[test]
fn test_class_side_methods_are_inherited() {
    let mut rt = runtime();

    let mut builder = ClassBuilder::new(&rt, unique_name("Factory")).unwrap();
    builder.add_methods([constant("defaultSize", 8)], Side::Class);
    let base = builder.finalize(&mut rt).unwrap();
    let derived = define(&mut rt, &unique_name("SubFactory"), Some(base), vec![]);

    unsafe {
        assert_eq!(msg_send::<isize>(derived.as_object(), "defaultSize", &()), 8);
        assert!(derived.as_object().responds_to("alloc"));

        let obj: Id = msg_send(derived.as_object(), "new", &());
        assert!(!obj.responds_to("defaultSize"));
        release(obj);
    }
}

#[test]
fn test_arguments_are_passed_through() {
    let mut rt = runtime();
    let joiner = Method::new("join:with:", Type::Text, [Type::Text, Type::Text], |_, cmd, args| {
        let (left, right) = args.downcast_ref::<(&str, &str)>().unwrap();
        Box::new(format!("{cmd} {left}{right}"))
    });
    let root = rt.root_class();
    let class = define(&mut rt, &unique_name("Joiner"), root, vec![joiner]);

    unsafe {
        let obj: Id = msg_send(class.as_object(), "new", &());
        let joined: String = msg_send(obj, "join:with:", &("ab", "cd"));
        assert_eq!(joined, "join:with: abcd");
        release(obj);
    }
}

// ============================================================================
// Super Sends
// ============================================================================

fn tracing(selector: &str, label: &'static str, log: &Rc<RefCell<Vec<&'static str>>>, chain: bool) -> Method {
    let log = Rc::clone(log);
    Method::new(selector, Type::Void, [], move |this, cmd, _| {
        log.borrow_mut().push(label);
        if chain {
            unsafe { msg_send_super::<()>(this, cmd, &()) };
        }
        Box::new(())
    })
}

#[test]
fn test_super_chain_visits_each_level_once() {
    let mut rt = runtime();
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = rt.root_class();

    let a = define(&mut rt, &unique_name("SuperA"), root, vec![tracing("visit", "A", &log, false)]);
    let b = define(&mut rt, &unique_name("SuperB"), Some(a), vec![tracing("visit", "B", &log, true)]);
    let c = define(&mut rt, &unique_name("SuperC"), Some(b), vec![tracing("visit", "C", &log, true)]);
    let d = define(&mut rt, &unique_name("SuperD"), Some(c), vec![]);

    unsafe {
        let obj: Id = msg_send(d.as_object(), "new", &());
        let () = msg_send(obj, "visit", &());
        assert_eq!(*log.borrow(), ["C", "B", "A"]);
        release(obj);
    }
}

#[test]
fn test_super_from_inherited_method_does_not_recurse() {
    let mut rt = runtime();
    let log = Rc::new(RefCell::new(Vec::new()));
    let root = rt.root_class();

    let base = define(&mut rt, &unique_name("Base"), root, vec![tracing("ping", "base", &log, false)]);
    let middle = define(&mut rt, &unique_name("Middle"), Some(base), vec![tracing("ping", "middle", &log, true)]);
    let leaf = define(&mut rt, &unique_name("Leaf"), Some(middle), vec![]);
    let deeper = define(&mut rt, &unique_name("Deeper"), Some(leaf), vec![]);

    unsafe {
        let obj: Id = msg_send(deeper.as_object(), "new", &());
        let () = msg_send(obj, "ping", &());
        assert_eq!(*log.borrow(), ["middle", "base"]);
        release(obj);
    }
}

#[test]
fn test_class_side_super_send() {
    let mut rt = runtime();

    let mut builder = ClassBuilder::new(&rt, unique_name("Named")).unwrap();
    builder.add_methods([text("kind", "base")], Side::Class);
    let base = builder.finalize(&mut rt).unwrap();

    let mut builder = ClassBuilder::with_superclass(&rt, unique_name("Renamed"), Some(base)).unwrap();
    builder.add_methods(
        [Method::new("kind", Type::Text, [], |this, _, _| unsafe {
            let inherited: String = msg_send_super(this, "kind", &());
            Box::new(format!("derived of {inherited}"))
        })],
        Side::Class,
    );
    let derived = builder.finalize(&mut rt).unwrap();

    unsafe {
        assert_eq!(msg_send::<String>(derived.as_object(), "kind", &()), "derived of base");
        assert_eq!(msg_send::<String>(base.as_object(), "kind", &()), "base");
    }
}

#[test]
fn test_super_send_outside_implementation_uses_receiver_class() {
    let mut rt = runtime();
    let root = rt.root_class();
    let parent = define(&mut rt, &unique_name("Parent"), root, vec![text("name", "parent")]);
    let child = define(&mut rt, &unique_name("Child"), Some(parent), vec![text("name", "child")]);

    unsafe {
        let obj: Id = msg_send(child.as_object(), "new", &());
        assert_eq!(msg_send_super::<String>(obj, "name", &()), "parent");
        release(obj);
    }
}

// ============================================================================
// Fatal Paths
// ============================================================================

#[test]
#[should_panic(expected = "Unrecognized selector sent to instance")]
fn test_unknown_instance_selector_is_fatal() {
    let mut rt = runtime();
    let root = rt.root_class();
    let class = define(&mut rt, &unique_name("Quiet"), root, vec![]);

    unsafe {
        let obj: Id = msg_send(class.as_object(), "new", &());
        let () = msg_send(obj, "shout", &());
    }
}

#[test]
#[should_panic(expected = "+[Object shout]")]
fn test_unknown_class_selector_names_class() {
    let rt = runtime();
    let root = rt.root_class().unwrap();
    unsafe {
        let () = msg_send(root.as_object(), "shout", &());
    }
}

#[test]
#[should_panic(expected = "Unrecognized selector sent to metaclass")]
fn test_metaclass_receiver_is_fatal() {
    let rt = runtime();
    let meta = rt.class_named("Object.meta").unwrap();
    unsafe {
        let _: Id = msg_send(meta.as_object(), "alloc", &());
    }
}

#[test]
#[should_panic(expected = "is not a `alloc::string::String`")]
fn test_wrong_result_type_is_fatal() {
    let rt = runtime();
    let root = rt.root_class().unwrap();
    unsafe {
        let obj: Id = msg_send(root.as_object(), "new", &());
        let _: String = msg_send(obj, "retainCount", &());
    }
}
