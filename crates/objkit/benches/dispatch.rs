// Dispatch benchmarks
//
// This benchmark suite measures:
// - Own-table sends
// - Inheritance traversal cost by chain depth
// - Class-side sends through the metaclass chain
// - Super sends
// - Allocation through the root class

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use objkit::runtime::{Class, ClassBuilder, Id, Method, Runtime, Side, Type, msg_send, msg_send_super};

fn constant(selector: &str) -> Method {
    Method::new(selector, Type::Integer, [], |_, _, _| Box::new(1_isize))
}

// Helper function to build a chain of `depth` subclasses under the root, with
// the method defined on the first one
fn build_chain(rt: &mut Runtime, prefix: &str, depth: usize) -> Class {
    let mut builder = ClassBuilder::new(rt, format!("{prefix}0")).unwrap();
    builder.add_methods([constant("value")], Side::Instance);
    let mut class = builder.finalize(rt).unwrap();

    for i in 1..depth {
        class = ClassBuilder::with_superclass(rt, format!("{prefix}{i}"), Some(class))
            .unwrap()
            .finalize(rt)
            .unwrap();
    }
    class
}

/// Benchmark a send that hits the receiver's own table
fn bench_own_dispatch(c: &mut Criterion) {
    let mut rt = Runtime::bootstrap().unwrap();
    let class = build_chain(&mut rt, "Own", 1);
    let obj: Id = unsafe { msg_send(class.as_object(), "new", &()) };

    c.bench_function("own_dispatch", |b| {
        b.iter(|| black_box(unsafe { msg_send::<isize>(black_box(obj), "value", &()) }))
    });

    unsafe { msg_send::<()>(obj, "release", &()) };
}

/// Benchmark inheritance traversal cost
fn bench_inheritance_depth(c: &mut Criterion) {
    let mut rt = Runtime::bootstrap().unwrap();
    let mut group = c.benchmark_group("inheritance_depth");

    for depth in [1, 2, 4, 8, 16] {
        let leaf = build_chain(&mut rt, &format!("Depth{depth}_"), depth);
        let obj: Id = unsafe { msg_send(leaf.as_object(), "new", &()) };

        group.bench_with_input(BenchmarkId::from_parameter(depth), &obj, |b, &obj| {
            b.iter(|| black_box(unsafe { msg_send::<isize>(black_box(obj), "value", &()) }))
        });

        unsafe { msg_send::<()>(obj, "release", &()) };
    }

    group.finish();
}

/// Benchmark a class-side send resolved on the root metaclass
fn bench_class_side_dispatch(c: &mut Criterion) {
    let mut rt = Runtime::bootstrap().unwrap();
    let leaf = build_chain(&mut rt, "ClassSide", 4);

    c.bench_function("class_side_dispatch", |b| {
        b.iter(|| black_box(unsafe { msg_send::<Id>(black_box(leaf.as_object()), "class", &()) }))
    });
}

/// Benchmark an override that forwards to its superclass implementation
fn bench_super_dispatch(c: &mut Criterion) {
    let mut rt = Runtime::bootstrap().unwrap();
    let base = build_chain(&mut rt, "SuperBase", 1);

    let mut builder = ClassBuilder::with_superclass(&rt, "SuperChild", Some(base)).unwrap();
    builder.add_methods(
        [Method::new("value", Type::Integer, [], |this, _, _| {
            Box::new(unsafe { msg_send_super::<isize>(this, "value", &()) } + 1)
        })],
        Side::Instance,
    );
    let child = builder.finalize(&mut rt).unwrap();
    let obj: Id = unsafe { msg_send(child.as_object(), "new", &()) };

    c.bench_function("super_dispatch", |b| {
        b.iter(|| black_box(unsafe { msg_send::<isize>(black_box(obj), "value", &()) }))
    });

    unsafe { msg_send::<()>(obj, "release", &()) };
}

/// Benchmark `new` followed by `release`
fn bench_new_release(c: &mut Criterion) {
    let mut rt = Runtime::bootstrap().unwrap();
    let class = build_chain(&mut rt, "Lifecycle", 2);

    c.bench_function("new_release", |b| {
        b.iter(|| unsafe {
            let obj: Id = msg_send(class.as_object(), "new", &());
            msg_send::<()>(black_box(obj), "release", &());
        })
    });
}

criterion_group!(
    benches,
    bench_own_dispatch,
    bench_inheritance_depth,
    bench_class_side_dispatch,
    bench_super_dispatch,
    bench_new_release
);
criterion_main!(benches);
