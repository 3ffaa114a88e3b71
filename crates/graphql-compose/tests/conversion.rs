#![allow(unused_crate_dependencies)]

use graphql_compose::{
    ArgumentDefinition, ArgumentsComposer, ComposeError, ComposerConfig, Deferred, ErrorCategory, FieldDefinition,
    FieldsComposer, RegistryKey, SchemaComposer, TypeComposer, TypeInput, TypeKind, TypePosition, TypeRef,
    TypedFieldsComposer, DEFAULT_DEPRECATION_REASON,
};
use pretty_assertions::assert_eq;

#[test]
fn array_shorthand_takes_exactly_one_type() {
    let mut sc = SchemaComposer::new();
    let mut post = sc.create_object("Post").unwrap();

    post.set_field("tags", ["String"]).unwrap();
    assert_eq!(post.get_field_type_name("tags").unwrap(), "[String]");

    let err = post.set_field("scores", ["Int", "Float"]).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Definition);
    insta::assert_snapshot!(err.to_string(), @"Post.scores: can accept array with exactly one type definition, got 2");

    let err = post.set_field("empty", Vec::<&str>::new()).unwrap_err();
    assert!(matches!(err, ComposeError::ArrayShorthand { len: 0, .. }));
    assert_eq!(post.get_field_names(), vec!["tags"]);
}

#[test]
fn nested_array_shorthand_adds_one_list_per_level() {
    let mut sc = SchemaComposer::new();
    let ty = sc
        .type_ref(TypeInput::Array(vec![TypeInput::Array(vec!["Int!".into()])]), TypePosition::Output)
        .unwrap();
    assert_eq!(ty.type_name(sc.registry()).unwrap(), "[[Int!]]");
}

#[test]
fn identical_sdl_literals_yield_one_type() {
    let mut sc = SchemaComposer::new();
    let literal = "type Author { name: String }";
    let mut post = sc.create_object("Post").unwrap();
    post.add_fields([("author", literal), ("editor", literal)]).unwrap();

    let author = post.get_field_tc("author").unwrap();
    let editor = post.get_field_tc("editor").unwrap();
    assert_eq!(author, editor);
    assert_eq!(sc.get("Author").unwrap(), author);
    assert_eq!(sc.get(RegistryKey::Literal(literal.to_owned())).unwrap(), author);
}

#[test]
fn literal_registration_can_be_disabled() {
    let config = ComposerConfig {
        register_sdl_literals: false,
        ..Default::default()
    };
    let mut sc = SchemaComposer::with_config(config);
    let literal = "enum Sort { ASC DESC }";
    let first = sc.add(literal).unwrap();
    let second = sc.add(literal).unwrap();

    // Still one type: the second literal finds the type by name.
    assert_eq!(first, second);
    assert!(!sc.has(RegistryKey::Literal(literal.to_owned())));
    assert_eq!(first.kind(), TypeKind::Enum);
}

#[test]
fn unknown_names_are_forward_references_unless_disabled() {
    let mut sc = SchemaComposer::new();
    let ty = sc.type_ref("[Comment!]", TypePosition::Output).unwrap();
    assert!(ty.has_deferred());
    assert_eq!(ty.type_name(sc.registry()).unwrap(), "[Comment!]");

    let mut strict = SchemaComposer::with_config(ComposerConfig {
        forward_references: false,
        ..Default::default()
    });
    let err = strict.type_ref("Comment", TypePosition::Output).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Type with key 'Comment' does not exist in the registry");
}

#[test]
fn deferred_callbacks_run_once() {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    let mut sc = SchemaComposer::new();
    let user = sc.create_object("User").unwrap().id();
    let calls = Arc::new(AtomicUsize::new(0));
    let deferred = {
        let calls = calls.clone();
        Deferred::new(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(TypeRef::non_null(user))
        })
    };

    let mut query = sc.create_object("Query").unwrap();
    query.set_field("me", deferred.clone()).unwrap();
    query.set_field("viewer", TypeRef::list(deferred)).unwrap();

    assert_eq!(query.get_field_type_name("me").unwrap(), "User!");
    assert_eq!(query.get_field_type_name("viewer").unwrap(), "[User!]");
    query.get_type().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn types_must_match_their_position() {
    let mut sc = SchemaComposer::new();
    sc.create_input("UserFilter").unwrap();
    sc.create_object("User").unwrap();

    let mut query = sc.create_object("Query").unwrap();
    let err = query
        .set_field("users", FieldDefinition::new("[User!]!").arg("filter", "User"))
        .unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"Query.users(filter:): type 'User' is object type and cannot be used in input position"
    );

    let err = query.set_field("filter", "UserFilter").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::KindMismatch);

    query
        .set_field(
            "users",
            FieldDefinition::new("[User!]!").arg("filter", ArgumentDefinition::new("UserFilter")),
        )
        .unwrap();
    assert_eq!(query.get_field_arg_type_name("users", "filter").unwrap(), "UserFilter");
}

#[test]
fn kind_narrowed_lookups() {
    let mut sc = SchemaComposer::new();
    sc.create_object("User").unwrap();

    let err = sc.get_itc("User").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Type 'User' is object type, expected input type");
    assert!(sc.get_otc("User").is_ok());
    assert!(sc.get_utc("Nobody").unwrap_err().is_not_found());
}

#[test]
fn unparseable_inputs_are_definition_errors() {
    let mut sc = SchemaComposer::new();

    let err = sc.add("not a type").unwrap_err();
    assert!(matches!(err, ComposeError::UnknownTypeInput { .. }));

    let err = sc.add("type Broken {").unwrap_err();
    assert!(matches!(err, ComposeError::InvalidSdl { .. }));
}

#[test]
fn non_ascii_type_names_are_rejected() {
    let mut sc = SchemaComposer::new();
    let mut post = sc.create_object("Post").unwrap();
    for ty in ["é]", "[Ünïcode!]", "[[Pöst]!]", "Pöst!"] {
        let err = post.set_field("author", ty).unwrap_err();
        assert!(matches!(err, ComposeError::UnknownTypeInput { .. }), "{ty}");
    }
    assert!(!post.has_field("author"));
}

#[test]
fn misplaced_snippets_register_nothing() {
    let snippet = "input SearchFilter { text: String }";
    let mut sc = SchemaComposer::new();
    let mut query = sc.create_object("Query").unwrap();

    let err = query.set_field("filter", snippet).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::KindMismatch);
    insta::assert_snapshot!(
        err.to_string(),
        @"Query.filter: type 'SearchFilter' is input type and cannot be used in output position"
    );
    assert!(!query.has_field("filter"));
    drop(query);

    assert!(!sc.has("SearchFilter"));
    assert!(!sc.has(RegistryKey::Literal(snippet.to_owned())));

    let mut query = sc.get_otc("Query").unwrap();
    query
        .set_field("search", FieldDefinition::new("[String]").arg("filter", snippet))
        .unwrap();
    drop(query);
    assert!(sc.has("SearchFilter"));
}

#[test]
fn deprecating_a_missing_field_changes_nothing() {
    let mut sc = SchemaComposer::new();
    let mut user = sc.create_object("User").unwrap();
    user.add_fields([("name", "String"), ("login", "String")]).unwrap();
    user.get_type().unwrap();

    let err = user.deprecate_fields(["login", "missingField"]).unwrap_err();
    assert!(err.is_not_found());
    assert!(user.get_field("login").unwrap().meta.deprecation_reason.is_none());
    assert!(!user.is_modified());

    user.deprecate_fields([("login", "Use name")]).unwrap();
    user.deprecate_fields("name").unwrap();
    assert_eq!(user.get_field("login").unwrap().meta.deprecation_reason.as_deref(), Some("Use name"));
    assert_eq!(
        user.get_field("name").unwrap().meta.deprecation_reason.as_deref(),
        Some(DEFAULT_DEPRECATION_REASON)
    );
}

#[test]
fn nested_paths_remove_fields_of_field_types() {
    let mut sc = SchemaComposer::new();
    sc.add_type_defs(
        r#"
        type Post { title: String author: Author }
        type Author { name: String address: Address }
        type Address { street: String city: String }
        "#,
    )
    .unwrap();

    sc.get_otc("Post")
        .unwrap()
        .remove_field(["author.address.city", "title", "unknown"])
        .unwrap();

    assert_eq!(sc.get_otc("Post").unwrap().get_field_names(), vec!["author"]);
    assert_eq!(sc.get_otc("Address").unwrap().get_field_names(), vec!["street"]);
}

#[test]
fn renamed_types_resolve_under_the_new_name_only() {
    let mut sc = SchemaComposer::new();
    sc.create_object("Taken").unwrap();
    let mut user = sc.create_object("User").unwrap();

    assert!(matches!(
        user.set_type_name("Taken").unwrap_err(),
        ComposeError::Validation { .. }
    ));
    user.set_type_name("Account").unwrap();
    let user = user.id();

    assert!(!sc.has("User"));
    assert_eq!(sc.get_otc("Account").unwrap().id(), user);
    assert_eq!(sc.get_type(user).unwrap().name(), "Account");
}
