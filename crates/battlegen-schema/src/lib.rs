//! Schema model for battlegen: message/object definitions, version replay,
//! and the type-annotation grammar shared by every output backend.

pub mod descriptor;
pub mod load;
pub mod node;
pub mod resolve;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        descriptor::{BuiltinMatch, FieldKind, TypeDescriptor},
        node::*,
        resolve::{ChangePolicy, ResolvedField, ResolvedFieldSet},
    };
    pub use serde::{Deserialize, Serialize};
}
