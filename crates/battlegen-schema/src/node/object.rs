use crate::node::FieldSpec;
use serde::{Deserialize, Serialize};

///
/// Object
///
/// A reusable, unversioned value type. Fields are emitted exactly in
/// declaration order.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Object {
    #[serde(rename = "type")]
    pub name: String,

    #[serde(default, rename = "add")]
    pub fields: Vec<FieldSpec>,
}

impl Object {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: &str, ty: &str) -> Self {
        self.fields.push(FieldSpec::new(name, ty));
        self
    }
}
