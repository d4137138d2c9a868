use super::*;
use battlegen_schema::prelude::*;

fn hello() -> Message {
    Message::new(0x10, "Hello").version(
        VersionDelta::new(1, 0)
            .add("a", "int")
            .add("b", "Foo[]")
            .add("c", "Bar*"),
    )
}

fn messages(messages: Vec<Message>) -> Definitions {
    Definitions {
        objects: vec![],
        messages,
    }
}

fn export(defs: &Definitions, config: &Config) -> String {
    let out = RustBackend.export(defs, config).expect("export");
    syn::parse_file(&out).unwrap_or_else(|e| panic!("generated module does not parse: {e}\n{out}"));

    out
}

// token printing spacing differs between proc-macro2 versions
fn squash(text: &str) -> String {
    text.split_whitespace().collect()
}

fn pos(haystack: &str, needle: &TokenStream) -> usize {
    let haystack = squash(haystack);
    let needle = squash(&needle.to_string());

    haystack
        .find(&needle)
        .unwrap_or_else(|| panic!("missing `{needle}` in:\n{haystack}"))
}

fn contains(haystack: &str, needle: &TokenStream) -> bool {
    squash(haystack).contains(&squash(&needle.to_string()))
}

#[test]
fn empty_schema_still_has_a_register_fn() {
    let out = export(&Definitions::new(), &Config::default());

    assert!(out.starts_with("// @generated"));
    pos(
        &out,
        &quote!(pub fn register(registry: &mut impl openbattle_core::FactoryRegistry)),
    );
}

#[test]
fn message_scaffolding() {
    let out = export(&messages(vec![hello()]), &Config::default());

    pos(&out, &quote!(pub const MSG_HELLO: u8 = 0x10;));
    pos(&out, &quote!(pub const VERSION: u8 = 0x1;));
    pos(&out, &quote!(impl openbattle_core::Message for HelloMessage));
    pos(&out, &quote!(fn type_id(&self) -> u8 { MSG_HELLO }));
    pos(&out, &quote!(fn version(&self) -> u8 { self.ver }));
    pos(&out, &quote!(impl openbattle_core::MessageFactory for HelloMessageFactory));
    pos(&out, &quote!(::std::boxed::Box::new(HelloMessage::with_version(ver))));
}

#[test]
fn fields_use_option_vec_and_box_shapes() {
    let out = export(&messages(vec![hello()]), &Config::default());

    let a = pos(&out, &quote!(pub a: ::core::option::Option<i32>,));
    let b = pos(
        &out,
        &quote!(pub b: ::core::option::Option<::std::vec::Vec<Foo>>,),
    );
    let c = pos(
        &out,
        &quote!(pub c: ::core::option::Option<::std::boxed::Box<Bar>>,),
    );

    assert!(a < b && b < c);
}

#[test]
fn serialize_writes_header_first() {
    let out = export(&messages(vec![hello()]), &Config::default());

    let header = pos(
        &out,
        &quote!(openbattle_core::Message::serialize_header(self, serializer, stream);),
    );
    let count = pos(
        &out,
        &quote!(<u8 as openbattle_core::Scalar>::write(&count, serializer, stream);),
    );

    assert!(header < count);
}

#[test]
fn array_count_saturates_and_bounds_the_items_written() {
    let out = export(&messages(vec![hello()]), &Config::default());

    let count = pos(
        &out,
        &quote!(let count = u8::try_from(items.len()).unwrap_or(u8::MAX);),
    );
    let items = pos(
        &out,
        &quote!(for item in items.iter().take(usize::from(count))),
    );

    assert!(count < items);
    assert!(!contains(&out, &quote!(items.len() as u8)));
}

#[test]
fn unset_pointer_serializes_a_default_value() {
    let out = export(&messages(vec![hello()]), &Config::default());

    pos(
        &out,
        &quote! {
            match &self.c {
                ::core::option::Option::Some(value) => value.serialize(serializer, stream),
                ::core::option::Option::None => {
                    let value: ::std::boxed::Box<Bar> = ::core::default::Default::default();
                    value.serialize(serializer, stream);
                }
            }
        },
    );
}

#[test]
fn field_mapping_onto_the_version_member_is_rejected() {
    let defs = messages(vec![
        Message::new(1, "Clash").version(VersionDelta::new(1, 0).add("Ver", "int")),
    ]);

    let err = RustBackend
        .export(&defs, &Config::default())
        .expect_err("`Ver` snake cases to the version member");

    assert!(matches!(
        err,
        BuildError::ReservedFieldName { ref message, ref field }
            if message == "Clash" && field == "Ver"
    ));
}

#[test]
fn objects_are_plain_serializables() {
    let defs = Definitions {
        objects: vec![Object::new("Vec2").field("x", "short").field("y", "short")],
        messages: vec![],
    };
    let out = export(&defs, &Config::default());

    pos(&out, &quote!(#[derive(Debug, Default)] pub struct Vec2));
    pos(&out, &quote!(impl openbattle_core::Serializable for Vec2));
    assert!(!out.contains("serialize_header"));
}

#[test]
fn rollback_disposes_at_every_failure_exit() {
    let mut config = Config::default();
    config.generate.rollback_on_failure = true;

    let out = export(&messages(vec![hello()]), &config);
    let exit = squash(&quote!(self.dispose(); return false;).to_string());

    assert_eq!(squash(&out).matches(&exit).count(), 4);
}

#[test]
fn default_config_returns_without_disposing() {
    let out = export(&messages(vec![hello()]), &Config::default());
    assert!(!contains(&out, &quote!(self.dispose();)));
}

#[test]
fn register_lists_factories_in_declaration_order() {
    let defs = messages(vec![
        Message::new(0x20, "Zeta"),
        Message::new(0x01, "Alpha"),
    ]);
    let out = export(&defs, &Config::default());

    let zeta = pos(&out, &quote!(::std::boxed::Box::new(ZetaMessageFactory)));
    let alpha = pos(&out, &quote!(::std::boxed::Box::new(AlphaMessageFactory)));

    assert!(zeta < alpha);
}

#[test]
fn constants_are_upper_snake_case() {
    let out = export(&messages(vec![Message::new(3, "PlayerMove")]), &Config::default());

    pos(&out, &quote!(pub const MSG_PLAYER_MOVE: u8 = 0x3;));
}

#[test]
fn duplicate_ids_are_all_emitted() {
    let defs = messages(vec![Message::new(7, "First"), Message::new(7, "Second")]);
    let out = export(&defs, &Config::default());

    pos(&out, &quote!(pub const MSG_FIRST: u8 = 0x7;));
    pos(&out, &quote!(pub const MSG_SECOND: u8 = 0x7;));
}

#[test]
fn runtime_path_comes_from_config() {
    let mut config = Config::default();
    config.rust.runtime_path = "crate::wire".to_string();

    let out = export(&messages(vec![hello()]), &config);

    pos(&out, &quote!(impl crate::wire::Serializable for HelloMessage));
    assert!(!out.contains("openbattle_core"));
}

#[test]
fn invalid_runtime_path_is_reported() {
    let mut config = Config::default();
    config.rust.runtime_path = "not a path".to_string();

    let err = RustBackend
        .export(&Definitions::new(), &config)
        .expect_err("runtime path is invalid");

    assert!(matches!(err, BuildError::InvalidRuntimePath { .. }));
}

#[test]
fn every_kind_renders_valid_rust() {
    let defs = Definitions {
        objects: vec![
            Object::new("Unit")
                .field("hp", "unsigned short")
                .field("name", "String")
                .field("tags", "char[]"),
        ],
        messages: vec![
            Message::new(1, "Spawn")
                .version(
                    VersionDelta::new(1, 0)
                        .add("units", "Unit[]")
                        .add("leader", "Unit*")
                        .add("reserve", "Unit[]*")
                        .add("origin", "Unit"),
                )
                .version(VersionDelta::new(2, 0).add("chain", "Unit**").add("type", "int")),
        ],
    };
    let mut config = Config::default();
    config.generate.rollback_on_failure = true;

    let out = export(&defs, &config);

    pos(&out, &quote!(pub r#type: ::core::option::Option<i32>,));
    pos(
        &out,
        &quote!(pub reserve: ::core::option::Option<::std::vec::Vec<::std::boxed::Box<Unit>>>,),
    );
}
