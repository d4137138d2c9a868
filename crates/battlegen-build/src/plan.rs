//! Backend-independent emission plan.
//!
//! Every backend renders from the same [`SchemaPlan`]: objects with their
//! declared fields, messages with their replayed field sets, and a parsed
//! [`TypeDescriptor`] per field.

use crate::BuildError;
use battlegen_config_build::GenerateConfig;
use battlegen_schema::{
    prelude::*,
    resolve::{ResolvedField, resolve_with},
};
use std::collections::BTreeMap;

/// Member every generated message wrapper keeps its wire version in.
pub const VERSION_MEMBER: &str = "ver";

///
/// FieldPlan
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldPlan {
    pub name: String,
    pub index: usize,
    pub descriptor: TypeDescriptor,
}

impl FieldPlan {
    #[must_use]
    pub fn new(name: &str, index: usize, ty: &str, matching: BuiltinMatch) -> Self {
        Self {
            name: name.to_string(),
            index,
            descriptor: TypeDescriptor::parse_with(ty, matching),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.descriptor.kind()
    }

    #[must_use]
    pub const fn disposable(&self) -> bool {
        self.descriptor.disposable
    }

    fn from_resolved(field: &ResolvedField, matching: BuiltinMatch) -> Self {
        Self::new(&field.name, field.index, &field.ty, matching)
    }
}

///
/// ObjectPlan
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectPlan {
    pub name: String,
    pub fields: Vec<FieldPlan>,
}

impl ObjectPlan {
    /// Object fields keep their declaration order and position as index.
    #[must_use]
    pub fn from_object(object: &Object, matching: BuiltinMatch) -> Self {
        let fields = object
            .fields
            .iter()
            .enumerate()
            .map(|(index, spec)| FieldPlan::new(&spec.name, index, &spec.ty, matching))
            .collect();

        Self {
            name: object.name.clone(),
            fields,
        }
    }
}

///
/// MessagePlan
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessagePlan {
    pub id: u8,
    pub name: String,
    pub version: u8,
    pub fields: Vec<FieldPlan>,
}

impl MessagePlan {
    pub fn from_message(message: &Message, config: &GenerateConfig) -> Result<Self, BuildError> {
        let resolved = resolve_with(message, config.change_on_missing)?;
        if resolved.get(VERSION_MEMBER).is_some() {
            return Err(BuildError::ReservedFieldName {
                message: message.name.clone(),
                field: VERSION_MEMBER.to_string(),
            });
        }
        let fields: Vec<_> = resolved
            .fields
            .iter()
            .map(|field| FieldPlan::from_resolved(field, config.builtin_matching))
            .collect();
        log::debug!(
            "message '{}' resolved to version {} with {} fields",
            message.name,
            resolved.version,
            fields.len()
        );

        Ok(Self {
            id: message.id,
            name: message.name.clone(),
            version: resolved.version,
            fields,
        })
    }
}

///
/// SchemaPlan
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SchemaPlan {
    pub objects: Vec<ObjectPlan>,
    pub messages: Vec<MessagePlan>,
}

impl SchemaPlan {
    /// Plan every object and message in definition order.
    ///
    /// Messages sharing a type tag are all planned; each repeat is logged.
    pub fn new(defs: &Definitions, config: &GenerateConfig) -> Result<Self, BuildError> {
        let objects = defs
            .objects
            .iter()
            .map(|object| ObjectPlan::from_object(object, config.builtin_matching))
            .collect();

        let mut seen: BTreeMap<u8, &str> = BTreeMap::new();
        let mut messages = Vec::with_capacity(defs.messages.len());
        for message in &defs.messages {
            if let Some(first) = seen.insert(message.id, &message.name) {
                log::warn!(
                    "message '{}' reuses type tag {:#x} already taken by '{first}'",
                    message.name,
                    message.id
                );
            }
            messages.push(MessagePlan::from_message(message, config)?);
        }

        Ok(Self { objects, messages })
    }

    /// Type tags used by more than one message, ascending.
    #[must_use]
    pub fn duplicate_ids(&self) -> Vec<u8> {
        let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
        for message in &self.messages {
            *counts.entry(message.id).or_default() += 1;
        }

        counts
            .into_iter()
            .filter_map(|(id, n)| (n > 1).then_some(id))
            .collect()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use battlegen_schema::resolve::ResolveError;

    fn hello() -> Message {
        Message::new(0x10, "Hello")
            .version(
                VersionDelta::new(1, 0)
                    .add("a", "int")
                    .add("b", "Foo[]")
                    .add("c", "Bar*"),
            )
            .version(VersionDelta::new(2, 0).remove("a").add("d", "Vec2"))
    }

    #[test]
    fn message_plan_carries_resolved_fields() {
        let plan = MessagePlan::from_message(&hello(), &GenerateConfig::default()).expect("plan");

        assert_eq!(plan.version, 2);
        let kinds: Vec<_> = plan.fields.iter().map(FieldPlan::kind).collect();
        assert_eq!(
            kinds,
            [FieldKind::Array, FieldKind::Pointer, FieldKind::Nested]
        );
        let indices: Vec<_> = plan.fields.iter().map(|f| f.index).collect();
        assert_eq!(indices, [1, 2, 3]);
    }

    #[test]
    fn object_plan_indexes_by_position() {
        let object = Object::new("Vec2").field("x", "short").field("y", "short");
        let plan = ObjectPlan::from_object(&object, BuiltinMatch::Substring);

        assert_eq!(plan.fields[1].name, "y");
        assert_eq!(plan.fields[1].index, 1);
        assert!(!plan.fields[0].disposable());
    }

    #[test]
    fn matching_mode_reaches_the_descriptor() {
        let object = Object::new("Shape").field("p", "Point");

        let loose = ObjectPlan::from_object(&object, BuiltinMatch::Substring);
        let strict = ObjectPlan::from_object(&object, BuiltinMatch::Token);

        assert_eq!(loose.fields[0].kind(), FieldKind::Builtin);
        assert_eq!(strict.fields[0].kind(), FieldKind::Nested);
    }

    #[test]
    fn reject_policy_fails_the_plan() {
        let message = Message::new(1, "Broken").version(VersionDelta::new(1, 0).change("x", "int"));
        let config = GenerateConfig {
            change_on_missing: ChangePolicy::Reject,
            ..GenerateConfig::default()
        };

        let err = SchemaPlan::new(
            &Definitions {
                objects: vec![],
                messages: vec![message],
            },
            &config,
        )
        .expect_err("change of unknown field");

        assert!(matches!(
            err,
            BuildError::Resolve(ResolveError::UnknownChangeTarget { .. })
        ));
    }

    #[test]
    fn version_member_name_is_reserved() {
        let message = Message::new(1, "Clash").version(VersionDelta::new(1, 0).add("ver", "int"));

        let err = MessagePlan::from_message(&message, &GenerateConfig::default())
            .expect_err("ver is taken by the wrapper");

        assert!(matches!(
            err,
            BuildError::ReservedFieldName { ref message, ref field }
                if message == "Clash" && field == "ver"
        ));
    }

    #[test]
    fn removed_version_member_name_is_allowed() {
        let message = Message::new(1, "Clash")
            .version(VersionDelta::new(1, 0).add("ver", "int").add("hp", "int"))
            .version(VersionDelta::new(2, 0).remove("ver"));

        assert!(MessagePlan::from_message(&message, &GenerateConfig::default()).is_ok());
    }

    #[test]
    fn duplicate_ids_are_planned_and_reported() {
        let defs = Definitions {
            objects: vec![],
            messages: vec![
                Message::new(1, "First"),
                Message::new(2, "Second"),
                Message::new(1, "Third"),
            ],
        };

        let plan = SchemaPlan::new(&defs, &GenerateConfig::default()).expect("plan");

        assert_eq!(plan.messages.len(), 3);
        assert_eq!(plan.duplicate_ids(), [1]);
    }
}
