mod field;
mod message;
mod object;

pub use field::*;
pub use message::*;
pub use object::*;

use serde::{Deserialize, Serialize};

///
/// Definitions
///
/// The merged schema handed to the emitters. Objects and messages keep the
/// order in which their files were visited and, within a file, their
/// declaration order.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Definitions {
    #[serde(default, rename = "object")]
    pub objects: Vec<Object>,

    #[serde(default, rename = "message")]
    pub messages: Vec<Message>,
}

impl Definitions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            objects: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Append another definition set after this one.
    pub fn merge(&mut self, other: Self) {
        self.objects.extend(other.objects);
        self.messages.extend(other.messages);
    }

    #[must_use]
    pub fn get_message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.name == name)
    }

    #[must_use]
    pub fn get_object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.name == name)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.messages.is_empty()
    }
}
