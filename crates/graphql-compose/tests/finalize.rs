#![allow(unused_crate_dependencies)]

use graphql_compose::{
    FieldsComposer, NamedTypeId, ObjectTypeId, OutputType, SchemaComposer, TypeComposer, TypeKind, TypedFieldsComposer,
};
use pretty_assertions::assert_eq;

fn person(sc: &mut SchemaComposer) -> ObjectTypeId {
    let mut person = sc.create_object("Person").unwrap();
    person.add_fields([("name", "String"), ("age", "Int")]).unwrap();
    person.id()
}

fn field_types(ty: &OutputType) -> Vec<(String, String)> {
    ty.output_fields()
        .unwrap()
        .iter()
        .map(|(name, field)| (name.clone(), field.ty.to_string()))
        .collect()
}

#[test]
fn make_field_non_null_shows_in_the_materialized_type() {
    let mut sc = SchemaComposer::new();
    let person = person(&mut sc);

    sc.object(person).unwrap().make_field_non_null("age").unwrap();
    let ty = sc.get_type(person).unwrap();

    assert_eq!(
        field_types(ty),
        vec![
            ("name".to_owned(), "String".to_owned()),
            ("age".to_owned(), "Int!".to_owned()),
        ]
    );
}

#[test]
fn materialized_type_keeps_its_address_across_changes() {
    let mut sc = SchemaComposer::new();
    let person = person(&mut sc);

    let first: *const OutputType = sc.get_type(person).unwrap();
    let again: *const OutputType = sc.get_type(person).unwrap();
    assert!(std::ptr::eq(first, again));

    sc.object(person).unwrap().set_field("email", "String!").unwrap();
    let second = sc.get_type(person).unwrap();
    assert!(std::ptr::eq(first, second));
    assert_eq!(second.output_fields().unwrap().len(), 3);

    sc.object(person).unwrap().remove_field(["name", "email"]).unwrap();
    let third = sc.get_type(person).unwrap();
    assert!(std::ptr::eq(first, third));
    assert_eq!(field_types(third), vec![("age".to_owned(), "Int".to_owned())]);
}

#[test]
fn non_null_then_nullable_restores_the_type() {
    let mut sc = SchemaComposer::new();
    let mut post = sc.create_object("Post").unwrap();
    post.add_fields([("tags", "[String!]"), ("title", "String")]).unwrap();

    post.make_field_non_null(["tags", "title"]).unwrap();
    assert_eq!(post.get_field_type_name("tags").unwrap(), "[String!]!");
    post.make_field_non_null("tags").unwrap();
    assert_eq!(post.get_field_type_name("tags").unwrap(), "[String!]!");

    post.make_field_nullable(["tags", "title"]).unwrap();
    assert_eq!(post.get_field_type_name("tags").unwrap(), "[String!]");
    assert_eq!(post.get_field_type_name("title").unwrap(), "String");
    assert!(!post.is_field_non_null("title").unwrap());
}

#[test]
fn non_plural_keeps_inner_non_null() {
    let mut sc = SchemaComposer::new();
    let mut post = sc.create_object("Post").unwrap();
    post.set_field("author", "[User!]!").unwrap();
    sc.create_object("User").unwrap();

    let mut post = sc.get_otc("Post").unwrap();
    assert!(post.is_field_plural("author").unwrap());
    post.make_field_non_plural("author").unwrap();
    assert_eq!(post.get_field_type_name("author").unwrap(), "User!");
    post.make_field_plural("author").unwrap();
    assert_eq!(post.get_field_type_name("author").unwrap(), "[User!]");
}

#[test]
fn cyclic_types_finalize() {
    let mut sc = SchemaComposer::new();
    sc.add_type_defs(
        r#"
        type User { posts: [Post!]! }
        type Post { author: User! }
        "#,
    )
    .unwrap();
    let user = sc.get_otc("User").unwrap().id();
    let post = sc.get_otc("Post").unwrap().id();

    let user_output: *const OutputType = sc.get_type(user).unwrap();
    assert!(!sc.object(post).unwrap().is_modified());

    let author = &sc.get_type(post).unwrap().output_fields().unwrap()["author"];
    assert_eq!(author.ty.id, NamedTypeId::from(user));
    assert_eq!(author.ty.to_string(), "User!");

    sc.finalize_all().unwrap();
    assert!(std::ptr::eq(user_output, sc.get_type(user).unwrap()));
}

#[test]
fn forward_references_resolve_once_the_type_exists() {
    let mut sc = SchemaComposer::new();
    let mut query = sc.create_object("Query").unwrap();
    query.set_field("posts", "[Post!]!").unwrap();
    assert_eq!(query.get_field_type_name("posts").unwrap(), "[Post!]!");
    let query = query.id();

    let err = sc.get_type(query).unwrap_err();
    assert!(err.is_not_found());

    sc.create_object("Post").unwrap().set_field("title", "String").unwrap();
    let ty = sc.get_type(query).unwrap();
    let posts = &ty.output_fields().unwrap()["posts"];
    assert_eq!(posts.ty.id.kind(), TypeKind::Object);
    insta::assert_snapshot!(posts.ty.to_string(), @"[Post!]!");
}

#[test]
fn snapshots_are_detached() {
    let mut sc = SchemaComposer::new();
    let person = person(&mut sc);

    let snapshot = sc.snapshot(person).unwrap();
    sc.object(person).unwrap().remove_field("age").unwrap();

    assert_eq!(snapshot.output_fields().unwrap().len(), 2);
    assert_eq!(sc.get_type(person).unwrap().output_fields().unwrap().len(), 1);
}

#[test]
fn renaming_updates_materialized_references() {
    let mut sc = SchemaComposer::new();
    sc.add_type_defs(
        r#"
        type A { b: B!, bs(first: Int): [B] }
        type B { id: ID }
        union Any = A | B
        "#,
    )
    .unwrap();
    let a = sc.get_otc("A").unwrap().id();
    let any = sc.get_utc("Any").unwrap().id();
    sc.get_type(a).unwrap();
    sc.get_type(any).unwrap();

    sc.get_otc("B").unwrap().set_type_name("C").unwrap();
    assert!(!sc.has("B"));

    let OutputType::Object(output) = sc.get_type(a).unwrap() else {
        unreachable!("object composers build objects");
    };
    assert_eq!(output.fields["b"].ty.to_string(), "C!");
    assert_eq!(output.fields["bs"].ty.to_string(), "[C]");

    let OutputType::Union(output) = sc.get_type(any).unwrap() else {
        unreachable!("union composers build unions");
    };
    let members = output.types.iter().map(|ty| ty.name.as_str()).collect::<Vec<_>>();
    assert_eq!(members, vec!["A", "C"]);
}
