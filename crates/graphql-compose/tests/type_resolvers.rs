#![allow(unused_crate_dependencies)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use graphql_compose::{
    AbstractTypeComposer, ComposeError, DispatchOutcome, ObjectTypeId, OutputType, ResolveInfo, SchemaComposer,
    TypeComposer, TypeResolveFn, TypeResolverPredicate,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn shapes() -> SchemaComposer {
    let mut sc = SchemaComposer::new();
    sc.add_type_defs(
        r#"
        type Circle { radius: Float }
        type Square { side: Float }
        type Triangle { base: Float }
        type Blob { mass: Float }
        union Shape = Circle | Square | Triangle | Blob
        input ShapeFilter { kind: String }
        "#,
    )
    .unwrap();
    sc
}

fn object(sc: &mut SchemaComposer, name: &str) -> ObjectTypeId {
    sc.get_otc(name).unwrap().id()
}

fn constant(answer: bool) -> TypeResolverPredicate {
    TypeResolverPredicate::new(move |_, _, _| answer)
}

fn dispatch_sync(resolve_type: &TypeResolveFn, value: Value) -> Option<ObjectTypeId> {
    let info = ResolveInfo::default();
    let outcome = resolve_type.dispatch(&value, &(), &info);
    match outcome {
        DispatchOutcome::Ready(selected) => selected,
        DispatchOutcome::Pending(_) => unreachable!("synchronous predicates only"),
    }
}

#[test]
fn first_truthy_predicate_selects_the_type() {
    let mut sc = shapes();
    let triangle = object(&mut sc, "Triangle");

    let mut shape = sc.get_utc("Shape").unwrap();
    shape
        .set_type_resolvers([
            ("Circle", constant(false)),
            ("Square", constant(false)),
            ("Triangle", constant(true)),
        ])
        .unwrap();
    assert_eq!(shape.get_type_resolver_names(), vec!["Circle", "Square", "Triangle"]);

    let resolve_type = shape.get_resolve_type().unwrap();
    assert!(!resolve_type.is_async());
    assert_eq!(dispatch_sync(&resolve_type, json!({"kind": "blue"})), Some(triangle));
}

#[test]
fn fallback_and_no_match() {
    let mut sc = shapes();
    let blob = object(&mut sc, "Blob");

    let mut shape = sc.get_utc("Shape").unwrap();
    shape
        .set_type_resolvers([("Circle", constant(false)), ("Square", constant(false))])
        .unwrap();
    let resolve_type = shape.get_resolve_type().unwrap();
    assert_eq!(dispatch_sync(&resolve_type, json!({"kind": "blue"})), None);

    shape.set_type_resolver_fallback("Blob").unwrap();
    let resolve_type = shape.get_resolve_type().unwrap();
    assert_eq!(dispatch_sync(&resolve_type, json!({"kind": "blue"})), Some(blob));

    shape.clear_type_resolver_fallback();
    shape.clear_type_resolvers();
    assert!(shape.get_resolve_type().is_none());
}

#[test]
fn invalid_candidate_installs_nothing() {
    let mut sc = shapes();
    let mut shape = sc.get_utc("Shape").unwrap();
    shape.add_type_resolver("Circle", constant(true)).unwrap();

    let err = shape
        .set_type_resolvers([("Square", constant(true)), ("ShapeFilter", constant(true))])
        .unwrap_err();
    assert!(matches!(err, ComposeError::InvalidTypeResolver { .. }));
    insta::assert_snapshot!(
        err.to_string(),
        @"Shape: type resolver candidate 'ShapeFilter' must be object type, got input"
    );
    assert_eq!(shape.get_type_resolver_names(), vec!["Circle"]);
}

#[test]
fn table_changes_recompile_and_reach_the_output_type() {
    let mut sc = shapes();
    let square = object(&mut sc, "Square");
    let calls = Arc::new(AtomicUsize::new(0));

    let mut shape = sc.get_utc("Shape").unwrap();
    let counting = {
        let calls = calls.clone();
        TypeResolverPredicate::new(move |value, _, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            value["sides"] == 4
        })
    };
    shape.add_type_resolver("Circle", constant(false)).unwrap();
    shape.add_type_resolver("Square", counting).unwrap();
    // Probed once when added, once more when Circle is removed.
    shape.remove_type_resolver("Circle").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let OutputType::Union(output) = shape.get_type().unwrap() else {
        unreachable!("union composers build unions");
    };
    let resolve_type = output.resolve_type.clone().unwrap();
    assert_eq!(dispatch_sync(&resolve_type, json!({"sides": 4})), Some(square));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn custom_resolve_type_wins_over_the_table() {
    let mut sc = shapes();
    let blob = object(&mut sc, "Blob");

    let mut shape = sc.get_utc("Shape").unwrap();
    shape.add_type_resolver("Circle", constant(true)).unwrap();
    shape.set_resolve_type(Some(TypeResolveFn::custom(move |_, _, _| DispatchOutcome::Ready(Some(blob)))));

    let resolve_type = shape.get_resolve_type().unwrap();
    assert_eq!(dispatch_sync(&resolve_type, json!({})), Some(blob));
}

#[tokio::test]
async fn async_predicates_are_awaited_in_order() {
    let mut sc = shapes();
    let square = object(&mut sc, "Square");
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

    let recording = |name: &'static str, answer: bool| {
        let seen = seen.clone();
        TypeResolverPredicate::new_async(move |value, _, _| {
            let seen = seen.clone();
            let probing = value.is_null();
            async move {
                if !probing {
                    seen.lock().unwrap().push(name);
                }
                answer
            }
        })
    };

    let mut shape = sc.get_utc("Shape").unwrap();
    shape
        .set_type_resolvers([
            ("Circle", recording("Circle", false)),
            ("Square", recording("Square", true)),
            ("Triangle", recording("Triangle", true)),
        ])
        .unwrap();

    let resolve_type = shape.get_resolve_type().unwrap();
    assert!(resolve_type.is_async());

    let value = json!({"sides": 4});
    let info = ResolveInfo::default();
    let selected = resolve_type.dispatch(&value, &(), &info).resolved().await;
    assert_eq!(selected, Some(square));
    assert_eq!(*seen.lock().unwrap(), vec!["Circle", "Square"]);
}
