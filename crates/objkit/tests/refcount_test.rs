//! Root class reference counting.

mod common;

use common::{define_with_ivars, new_instance, release, retain_count, runtime, unique_name};
use objkit::runtime::{ClassBuilder, Id, IvarStub, Method, RETAIN_COUNT_IVAR, Side, Type, msg_send, msg_send_super};
use std::rc::Rc;

#[test]
fn test_retain_release_restores_count() {
    let mut rt = runtime();
    let class = define_with_ivars(&mut rt, &unique_name("Counted"), vec![IvarStub::new("v", Type::Integer)]);

    unsafe {
        let obj = new_instance(class);
        assert_eq!(retain_count(obj), 1);

        for expected in 2..=5 {
            let same: Id = msg_send(obj, "retain", &());
            assert_eq!(same, obj);
            assert_eq!(retain_count(obj), expected);
        }
        for expected in (1..=4).rev() {
            release(obj);
            assert_eq!(retain_count(obj), expected);
        }

        release(obj);
    }
}

#[test]
fn test_subclass_uses_inherited_count() {
    let mut rt = runtime();
    let class = define_with_ivars(&mut rt, &unique_name("Sub"), vec![IvarStub::new("x", Type::Integer)]);

    unsafe {
        let obj = new_instance(class);
        assert_eq!(obj.get_ivar::<isize>(RETAIN_COUNT_IVAR), Some(1));
        assert_eq!(class.ivar(RETAIN_COUNT_IVAR), None);
        release(obj);
    }
}

#[test]
fn test_release_override_clears_owned_ivar() {
    let mut rt = runtime();
    let mut builder = ClassBuilder::new(&rt, unique_name("Holder")).unwrap();
    builder
        .add_ivars([IvarStub::new("_token", Type::optional(Type::pointer(Type::Void)))])
        .add_methods(
            [Method::new("release", Type::Void, [], |this, _, _| unsafe {
                if retain_count(this) == 1 {
                    let offset = this.isa().unwrap().ivar_offset("_token").unwrap();
                    drop(this.cell().read::<Option<Rc<()>>>(offset));
                    this.cell().write::<Option<Rc<()>>>(None, offset);
                }
                msg_send_super::<()>(this, "release", &());
                Box::new(())
            })],
            Side::Instance,
        );
    let class = builder.finalize(&mut rt).unwrap();
    let token = Rc::new(());

    unsafe {
        let obj = new_instance(class);
        obj.set_ivar("_token", Some(Rc::clone(&token))).unwrap();
        assert_eq!(Rc::strong_count(&token), 2);

        let _: Id = msg_send(obj, "retain", &());
        release(obj);
        assert_eq!(Rc::strong_count(&token), 2);

        release(obj);
    }

    assert_eq!(Rc::strong_count(&token), 1);
}

#[test]
#[should_panic(expected = "Over-released object")]
fn test_release_below_zero_is_fatal() {
    let mut rt = runtime();
    let class = define_with_ivars(&mut rt, &unique_name("Over"), vec![]);

    unsafe {
        let obj: Id = msg_send(class.as_object(), "alloc", &());
        release(obj);
    }
}
