//! Version replay.
//!
//! A message's history is an ordered list of deltas. Replaying them in
//! declaration order yields the single field set that is emitted, along with
//! the highest major version seen.

mod table;


use crate::{node::Message, prelude::*};
use derive_more::Display;
use table::FieldTable;
use thiserror::Error as ThisError;

///
/// ResolveError
///

#[derive(Debug, ThisError)]
pub enum ResolveError {
    #[error(
        "message '{message}' version {major}.{minor} changes field '{field}' which was never added"
    )]
    UnknownChangeTarget {
        message: String,
        field: String,
        major: u8,
        minor: u8,
    },
}

///
/// ChangePolicy
///
/// What a `change` on a field with no live slot does.
///
/// `ZeroIndex` inserts the field at index 0 without consuming an index,
/// which matches the behaviour existing schemas were written against.
/// `Reject` turns it into a [`ResolveError`].
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangePolicy {
    #[default]
    #[display("zero-index")]
    ZeroIndex,

    #[display("reject")]
    Reject,
}

///
/// ResolvedField
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedField {
    pub index: usize,
    pub name: String,
    pub ty: String,
}

///
/// ResolvedFieldSet
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ResolvedFieldSet {
    pub version: u8,
    pub fields: Vec<ResolvedField>,
}

impl ResolvedFieldSet {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Replay a message with the default [`ChangePolicy`]. Never fails.
#[must_use]
pub fn resolve(message: &Message) -> ResolvedFieldSet {
    let mut table = FieldTable::new();
    let mut version = 0;

    for delta in &message.versions {
        version = version.max(delta.major);
        replay_zero_index(&mut table, delta);
    }

    finish(version, table)
}

/// Replay a message under an explicit [`ChangePolicy`].
pub fn resolve_with(
    message: &Message,
    policy: ChangePolicy,
) -> Result<ResolvedFieldSet, ResolveError> {
    match policy {
        ChangePolicy::ZeroIndex => Ok(resolve(message)),
        ChangePolicy::Reject => resolve_strict(message),
    }
}

fn resolve_strict(message: &Message) -> Result<ResolvedFieldSet, ResolveError> {
    let mut table = FieldTable::new();
    let mut version = 0;

    for delta in &message.versions {
        version = version.max(delta.major);

        apply_adds_and_removes(&mut table, delta);
        for change in &delta.change {
            if !table.change(&change.name, &change.ty) {
                return Err(ResolveError::UnknownChangeTarget {
                    message: message.name.clone(),
                    field: change.name.clone(),
                    major: delta.major,
                    minor: delta.minor,
                });
            }
        }
    }

    Ok(finish(version, table))
}

fn replay_zero_index(table: &mut FieldTable, delta: &VersionDelta) {
    apply_adds_and_removes(table, delta);

    for change in &delta.change {
        if !table.change(&change.name, &change.ty) {
            log::debug!(
                "version {delta}: change of unknown field '{}' inserted at index 0",
                change.name
            );
            table.insert_at(&change.name, 0, &change.ty);
        }
    }
}

fn apply_adds_and_removes(table: &mut FieldTable, delta: &VersionDelta) {
    for add in &delta.add {
        table.add(&add.name, &add.ty);
    }
    for remove in &delta.remove {
        table.remove(&remove.name);
    }
}

fn finish(version: u8, table: FieldTable) -> ResolvedFieldSet {
    let fields = table
        .into_ordered()
        .into_iter()
        .map(|(index, name, ty)| ResolvedField { index, name, ty })
        .collect();

    ResolvedFieldSet { version, fields }
}
