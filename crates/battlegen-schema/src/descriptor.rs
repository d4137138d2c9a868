//! Type annotation grammar.
//!
//! A field type is written as
//! `[builtin] ["<" ident ">"] ["[]"] ["*"]*`, e.g. `int`, `Foo[]`, `Bar**`
//! or `List<Foo>`. Parsing is total: text that does not follow the grammar
//! degrades to whatever partial match was found.

use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// BUILTINS
///
/// Scalars the runtime serializer reads and writes directly, in the order
/// they are tried by substring matching.
///

pub const BUILTINS: [&str; 10] = [
    "long",
    "unsigned long",
    "int",
    "unsigned int",
    "short",
    "unsigned short",
    "char",
    "unsigned char",
    "float",
    "String",
];

const ARRAY_MARKER: &str = "[]";
const POINTER_MARKER: char = '*';

///
/// BuiltinMatch
///
/// How the builtin scalar is recognised inside a raw type string.
///
/// `Substring` takes the first builtin contained anywhere in the text, so a
/// user type such as `Point` is read as `int` and `unsigned int` as `int`.
/// `Token` compares the whole leading identifier run instead.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinMatch {
    #[default]
    #[display("substring")]
    Substring,

    #[display("token")]
    Token,
}

///
/// FieldKind
///
/// The four field categories every emitted routine dispatches on.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum FieldKind {
    /// Heap array with a one-byte element count on the wire.
    Array,

    /// Scalar handled directly by the serializer.
    Builtin,

    /// Nested value stored inline.
    Nested,

    /// Lazily allocated nested value behind one or more pointers.
    Pointer,
}

///
/// TypeDescriptor
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct TypeDescriptor {
    pub origin: String,
    pub builtin: bool,
    pub base_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_param: Option<String>,

    pub is_array: bool,
    pub pointer_depth: usize,
    pub disposable: bool,
    pub reference_spelling: String,
}

impl TypeDescriptor {
    /// Parse with the default substring matching.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self::parse_with(raw, BuiltinMatch::default())
    }

    #[must_use]
    pub fn parse_with(raw: &str, matching: BuiltinMatch) -> Self {
        let (builtin, mut text) = match matching {
            BuiltinMatch::Substring => match_substring(raw),
            BuiltinMatch::Token => match_token(raw),
        };

        // generic parameter; the brackets go even when empty
        let mut generic_param = None;
        if let Some(open) = text.find('<')
            && let Some(close) = text.find('>')
            && close > open
        {
            let inner = &text[open + 1..close];
            if !inner.is_empty() {
                generic_param = Some(inner.to_string());
            }
            text = format!("{}{}", &text[..open], &text[close + 1..]);
        }

        let is_array = text.contains(ARRAY_MARKER);
        if is_array {
            text = text.replacen(ARRAY_MARKER, "", 1);
        }

        let pointer_depth = text.matches(POINTER_MARKER).count();
        if pointer_depth > 0 {
            text = text.replace(POINTER_MARKER, "");
        }

        let base_name = match (&generic_param, builtin) {
            (Some(param), _) => format!("{text}<{param}>"),
            (None, Some(name)) => name.to_string(),
            (None, None) => text.trim().to_string(),
        };
        let reference_spelling = spell_reference(&base_name, pointer_depth);

        Self {
            origin: raw.to_string(),
            builtin: builtin.is_some(),
            base_name,
            generic_param,
            is_array,
            pointer_depth,
            disposable: is_array || pointer_depth > 0,
            reference_spelling,
        }
    }

    /// Field category, checked in the order builtin, array, pointer.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        if self.builtin {
            FieldKind::Builtin
        } else if self.is_array {
            FieldKind::Array
        } else if self.pointer_depth > 0 {
            FieldKind::Pointer
        } else {
            FieldKind::Nested
        }
    }

    /// The raw spelling with the array and pointer markers removed.
    #[must_use]
    pub fn scalar_spelling(&self) -> String {
        let stripped = self
            .origin
            .replacen(ARRAY_MARKER, "", 1)
            .replace(POINTER_MARKER, "");

        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

// first builtin contained anywhere in the text wins
fn match_substring(raw: &str) -> (Option<&'static str>, String) {
    BUILTINS
        .iter()
        .find(|name| raw.contains(*name))
        .map_or_else(
            || (None, raw.to_string()),
            |name| (Some(*name), raw.replacen(name, "", 1)),
        )
}

// the identifier run before any `<`, `[` or `*` must be a builtin as a whole
fn match_token(raw: &str) -> (Option<&'static str>, String) {
    let head_len = raw.find(['<', '[', POINTER_MARKER]).unwrap_or(raw.len());
    let (head, rest) = raw.split_at(head_len);
    let normalized = head.split_whitespace().collect::<Vec<_>>().join(" ");

    match BUILTINS.iter().find(|name| **name == normalized) {
        Some(name) => (Some(*name), rest.to_string()),
        None => (None, raw.to_string()),
    }
}

fn spell_reference(base_name: &str, pointer_depth: usize) -> String {
    let mut spelling = String::with_capacity(base_name.len() + pointer_depth);
    spelling.push_str(base_name);
    for _ in 0..pointer_depth {
        spelling.push(POINTER_MARKER);
    }

    spelling
}

///
/// TESTS
///
