#![allow(unused_crate_dependencies)]

use graphql_compose::{
    AbstractTypeComposer, ArgumentsComposer, CloneMap, DispatchOutcome, FieldsComposer, InterfacesComposer, NamedTypeId,
    ResolveInfo, SchemaComposer, TypeComposer, TypeResolverPredicate, TypedFieldsComposer,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn self_reference_points_at_the_clone() {
    let mut source = SchemaComposer::new();
    let mut node = source.create_object("Node").unwrap();
    node.add_fields([("id", "ID!"), ("parent", "Node")]).unwrap();
    let node = node.id();

    let mut target = SchemaComposer::new();
    let mut map = CloneMap::new();
    let cloned = source.object(node).unwrap().clone_to(&mut target, &mut map).unwrap();

    assert_eq!(map.get_object(node), Some(cloned));
    let mut cloned_node = target.object(cloned).unwrap();
    assert_eq!(cloned_node.get_field_otc("parent").unwrap().id(), cloned);
    assert_eq!(cloned_node.get_field_type_name("id").unwrap(), "ID!");

    // The source is left alone.
    let parent = source.object(node).unwrap().get_field_tc("parent").unwrap();
    assert_eq!(parent, NamedTypeId::from(node));
}

#[test]
fn shared_references_are_cloned_once() {
    let mut source = SchemaComposer::new();
    source
        .add_type_defs(
            r#"
            type A { f1: B, f2: [B!]!, f3(filter: Filter): B }
            type B { name: String }
            input Filter { name: String }
            "#,
        )
        .unwrap();
    let a = source.get_otc("A").unwrap().id();
    let b = source.get_otc("B").unwrap().id();

    let mut target = SchemaComposer::new();
    let mut map = CloneMap::new();
    let cloned = source.object(a).unwrap().clone_to(&mut target, &mut map).unwrap();

    let cloned_b = map.get_object(b).unwrap();
    let mut cloned_a = target.object(cloned).unwrap();
    for field in ["f1", "f2", "f3"] {
        assert_eq!(cloned_a.get_field_otc(field).unwrap().id(), cloned_b, "{field}");
    }
    assert_eq!(cloned_a.get_field_arg_type_name("f3", "filter").unwrap(), "Filter");

    // A, B, Filter and String.
    assert_eq!(map.len(), 4);
    assert_eq!(target.registry().names().count(), source.registry().names().count());
}

#[test]
fn clone_map_is_shared_across_calls() {
    let mut source = SchemaComposer::new();
    source
        .add_type_defs("type Post { author: User } type Comment { author: User } type User { id: ID }")
        .unwrap();
    let post = source.get_otc("Post").unwrap().id();
    let comment = source.get_otc("Comment").unwrap().id();

    let mut target = SchemaComposer::new();
    let mut map = CloneMap::new();
    let post = source.object(post).unwrap().clone_to(&mut target, &mut map).unwrap();
    let comment = source.object(comment).unwrap().clone_to(&mut target, &mut map).unwrap();

    let post_author = target.object(post).unwrap().get_field_tc("author").unwrap();
    let comment_author = target.object(comment).unwrap().get_field_tc("author").unwrap();
    assert_eq!(post_author, comment_author);
}

#[test]
fn abstract_types_keep_their_type_resolvers() {
    let mut source = SchemaComposer::new();
    source
        .add_type_defs(
            r#"
            interface Pet { name: String }
            type Dog implements Pet { name: String }
            type Cat implements Pet { name: String }
            "#,
        )
        .unwrap();
    let mut pet = source.get_iftc("Pet").unwrap();
    pet.add_type_resolver("Dog", TypeResolverPredicate::new(|value, _, _| value["barks"] == true))
        .unwrap();
    pet.set_type_resolver_fallback("Cat").unwrap();
    let pet = pet.id();

    let mut target = SchemaComposer::new();
    let mut map = CloneMap::new();
    let cloned = source.interface(pet).unwrap().clone_to(&mut target, &mut map).unwrap();

    let cloned_pet = target.interface(cloned).unwrap();
    assert_eq!(cloned_pet.get_type_resolver_names(), vec!["Dog"]);
    let fallback = cloned_pet.get_type_resolver_fallback().unwrap();
    assert_eq!(target.registry().type_name(fallback).unwrap(), "Cat");

    let dispatch = target.interface(cloned).unwrap().get_resolve_type().unwrap();
    let info = ResolveInfo::default();
    let DispatchOutcome::Ready(Some(selected)) = dispatch.dispatch(&json!({"barks": true}), &(), &info) else {
        unreachable!("a synchronous dispatcher with a match");
    };
    assert_eq!(Some(selected), map.get_object(source.get_otc("Dog").unwrap().id()));
}

#[test]
fn clone_type_within_a_session_shares_references() {
    let mut sc = SchemaComposer::new();
    sc.add_type_defs("interface Node { id: ID! } type User implements Node { id: ID! friends: [User] }")
        .unwrap();

    let mut user = sc.get_otc("User").unwrap();
    let user_id = user.id();
    let admin = user.clone_type("Admin").unwrap();

    let mut admin = sc.object(admin).unwrap();
    assert_eq!(admin.get_interface_names().unwrap(), vec!["Node"]);
    assert_eq!(admin.get_field_otc("friends").unwrap().id(), user_id);
}
