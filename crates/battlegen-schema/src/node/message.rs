use crate::node::{ChangeSpec, FieldSpec, RemoveSpec};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// Message
///
/// A versioned wire message. `id` is the wire type tag; uniqueness across
/// messages is not enforced.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Message {
    /// One-byte wire tag. Values above 0xff fail to load rather than being
    /// emitted as a tag the one-byte header cannot carry.
    pub id: u8,

    #[serde(rename = "type")]
    pub name: String,

    #[serde(default)]
    pub flags: u32,

    #[serde(default, rename = "version")]
    pub versions: Vec<VersionDelta>,
}

impl Message {
    pub fn new(id: u8, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            flags: 0,
            versions: Vec::new(),
        }
    }

    #[must_use]
    pub fn version(mut self, delta: VersionDelta) -> Self {
        self.versions.push(delta);
        self
    }
}

///
/// VersionDelta
///
/// One `(major, minor)` step of a message's history. Replay applies the
/// adds, then the removes, then the changes.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct VersionDelta {
    /// Bounded to one byte like `id`, since the final major is the wire
    /// version.
    pub major: u8,

    #[serde(default)]
    pub minor: u8,

    #[serde(default)]
    pub add: Vec<FieldSpec>,

    #[serde(default)]
    pub remove: Vec<RemoveSpec>,

    #[serde(default)]
    pub change: Vec<ChangeSpec>,
}

impl VersionDelta {
    #[must_use]
    pub const fn new(major: u8, minor: u8) -> Self {
        Self {
            major,
            minor,
            add: Vec::new(),
            remove: Vec::new(),
            change: Vec::new(),
        }
    }

    #[must_use]
    pub fn add(mut self, name: &str, ty: &str) -> Self {
        self.add.push(FieldSpec::new(name, ty));
        self
    }

    #[must_use]
    pub fn remove(mut self, name: &str) -> Self {
        self.remove.push(RemoveSpec::new(name));
        self
    }

    #[must_use]
    pub fn change(mut self, name: &str, ty: &str) -> Self {
        self.change.push(ChangeSpec::new(name, ty));
        self
    }
}

impl Display for VersionDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
