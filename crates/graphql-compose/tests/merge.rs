#![allow(unused_crate_dependencies)]

use graphql_compose::{
    ComposeError, Deferred, EnumValueDefinition, FieldsComposer, InterfacesComposer, NamedTypeId, SchemaComposer,
    TypeComposer, TypeRef, TypedFieldsComposer,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn external_types_are_imported_once() {
    let mut other = SchemaComposer::new();
    other
        .add_type_defs(
            r#"
            "An author"
            type Author { name: String! books: [Book!]! }
            type Book { title: String }
            "#,
        )
        .unwrap();
    let author = other.get_otc("Author").unwrap().id();
    let external = other.snapshot(author).unwrap();

    let mut sc = SchemaComposer::new();
    let mut query = sc.create_object("Query").unwrap();
    query.set_field("author", external.clone()).unwrap();
    query.set_field("authors", [external.clone()]).unwrap();

    let imported = query.get_field_tc("author").unwrap();
    assert_eq!(query.get_field_tc("authors").unwrap(), imported);
    assert_eq!(query.get_field_type_name("authors").unwrap(), "[Author]");

    let author = sc.get_otc("Author").unwrap();
    assert_eq!(author.description(), Some("An author"));
    assert_eq!(author.get_field_names(), vec!["name", "books"]);
    // Only the snapshot itself is imported, its references stay names.
    assert_eq!(author.get_field_type_name("books").unwrap(), "[Book!]!");
    assert!(!sc.has("Book"));
}

#[test]
fn type_extensions_add_to_existing_types() {
    let mut sc = SchemaComposer::new();
    sc.add_type_defs("interface Node { id: ID! } type User { name: String }")
        .unwrap();
    sc.add_type_defs("extend type User implements Node { id: ID! email: String @deprecated }")
        .unwrap();

    let user = sc.get_otc("User").unwrap();
    assert_eq!(user.get_field_names(), vec!["name", "id", "email"]);
    assert_eq!(user.get_interface_names().unwrap(), vec!["Node"]);
    assert_eq!(
        user.get_field("email").unwrap().meta.deprecation_reason.as_deref(),
        Some("No longer supported")
    );
}

#[test]
fn enums_and_unions_merge_their_members() {
    let mut sc = SchemaComposer::new();
    sc.add_type_defs(
        r#"
        enum Sort { ASC DESC }
        enum ExtraSort { RELEVANCE }
        type Post { id: ID }
        type Video { id: ID }
        union Media = Post
        union MoreMedia = Post | Video
        "#,
    )
    .unwrap();

    let mut sort = sc.get_etc("Sort").unwrap();
    sort.set_field("NEWEST", EnumValueDefinition::new().value(json!("created_at_desc")))
        .unwrap();
    sort.merge("ExtraSort").unwrap();
    assert_eq!(sort.get_field_names(), vec!["ASC", "DESC", "NEWEST", "RELEVANCE"]);
    assert_eq!(sort.get_value_name(&json!("created_at_desc")), Some("NEWEST"));

    let mut media = sc.get_utc("Media").unwrap();
    media.merge("MoreMedia").unwrap();
    assert_eq!(media.get_type_names().unwrap(), vec!["Post", "Video"]);

    let err = media.merge("Sort").unwrap_err();
    assert!(matches!(err, ComposeError::KindMismatch { .. }));
}

#[test]
fn interfaces_merge_into_objects() {
    let mut other = SchemaComposer::new();
    other
        .add_type_defs("interface Timestamped { createdAt: String updatedAt(format: String = \"iso\"): String }")
        .unwrap();
    let timestamped = other.get_iftc("Timestamped").unwrap().id();

    let mut sc = SchemaComposer::new();
    let mut post = sc.create_object("Post").unwrap();
    post.set_field("title", "String").unwrap();
    post.merge_from(&other, timestamped).unwrap();

    assert_eq!(post.get_field_names(), vec!["title", "createdAt", "updatedAt"]);
    let updated_at = post.get_field("updatedAt").unwrap();
    assert_eq!(updated_at.args["format"].default_value, Some(json!("iso")));
}

#[test]
fn merged_fields_are_copied_by_type_name() {
    let mut sc = SchemaComposer::new();
    let user = sc.create_object("User").unwrap().id();
    let mut viewer = sc.create_object("Viewer").unwrap();
    viewer
        .set_field("me", Deferred::new(move |_| Ok(TypeRef::non_null(user))))
        .unwrap();
    viewer.set_field("team", "Team").unwrap();
    assert!(viewer.get_field("me").unwrap().ty.has_deferred());

    let mut session = sc.create_object("Session").unwrap();
    session.merge("Viewer").unwrap();
    assert_eq!(session.get_field_names(), vec!["me", "team"]);
    assert!(!session.get_field("me").unwrap().ty.has_deferred());
    assert_eq!(session.get_field_type_name("me").unwrap(), "User!");
    drop(session);

    // The unregistered name is carried over as a name and resolves in the receiving type too.
    let team = sc.create_object("Team").unwrap().id();
    let mut session = sc.get_otc("Session").unwrap();
    assert_eq!(session.get_field_type_name("team").unwrap(), "Team");
    assert_eq!(session.get_field_tc("team").unwrap(), NamedTypeId::from(team));
}
