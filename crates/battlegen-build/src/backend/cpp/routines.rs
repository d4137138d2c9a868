//! The four per-type routines: `length`, `deserialize`, `serialize` and
//! `dispose`. Each one dispatches on [`FieldKind`] for every field, in
//! field order.

use super::field::{CppField, alloc_expr, deref_access, release_stmts};
use battlegen_schema::prelude::*;
use std::fmt::{self, Write};

// methods sit two tabs deep inside the namespace and class
const METHOD_DEPTH: usize = 2;

///
/// Routines
///

pub struct Routines<'a> {
    fields: &'a [CppField<'a>],
    message: bool,
    rollback: bool,
}

impl<'a> Routines<'a> {
    pub const fn new(fields: &'a [CppField<'a>], message: bool, rollback: bool) -> Self {
        Self {
            fields,
            message,
            rollback,
        }
    }

    pub fn write(&self, out: &mut String) -> fmt::Result {
        let mut w = Lines { out };

        self.length(&mut w)?;
        self.deserialize(&mut w)?;
        self.serialize(&mut w)?;
        self.dispose(&mut w)
    }

    fn length(&self, w: &mut Lines<'_>) -> fmt::Result {
        let d = METHOD_DEPTH;

        w.line(d, "unsigned char length(Serializer* serializer) {")?;
        w.line(d + 1, "unsigned char len = 0;")?;
        for field in self.fields {
            let name = field.name();
            let dynamic = format!("len += serializer->sizeOf(this->{name});");
            let fixed = format!("len += sizeof this->{name};");

            match field.kind() {
                FieldKind::Array => {
                    let count = field.count_member().unwrap_or_default();
                    w.line(
                        d + 1,
                        &format!("len += serializer->sizeOf(this->{name}, this->{count});"),
                    )?;
                }
                FieldKind::Builtin if field.plan.disposable() => w.line(d + 1, &dynamic)?,
                FieldKind::Builtin | FieldKind::Nested => w.line(d + 1, &fixed)?,
                FieldKind::Pointer => w.line(d + 1, &dynamic)?,
            }
        }
        w.line(d + 1, "return len;")?;
        w.line(d, "}")
    }

    fn deserialize(&self, w: &mut Lines<'_>) -> fmt::Result {
        let d = METHOD_DEPTH;

        w.line(d, "bool deserialize(Serializer *serializer) {")?;
        for field in self.fields {
            let name = field.name();
            let desc = field.descriptor();

            match field.kind() {
                FieldKind::Builtin => {
                    w.line(
                        d + 1,
                        &format!("if (this->{name} == 0 && !serializer->read(&this->{name})) {{"),
                    )?;
                    self.fail(w, d + 2)?;
                    w.line(d + 1, "}")?;
                }
                FieldKind::Array => {
                    let count = field.count_member().unwrap_or_default();
                    let elem = format!("this->{name}[__i]");

                    w.line(d + 1, &format!("if (this->{name} == 0) {{"))?;
                    w.line(d + 2, "unsigned char __len = 0;")?;
                    w.line(d + 2, "if (!serializer->read(&__len)) {")?;
                    self.fail(w, d + 3)?;
                    w.line(d + 2, "}")?;
                    w.line(
                        d + 2,
                        &format!("this->{name} = new {}[__len]();", field.element_type()),
                    )?;
                    w.line(d + 2, &format!("this->{count} = __len;"))?;
                    w.line(d + 1, "}")?;

                    w.line(
                        d + 1,
                        &format!("for (unsigned char __i = 0; __i < this->{count}; __i++) {{"),
                    )?;
                    if desc.pointer_depth > 0 {
                        w.line(d + 2, &format!("if ({elem} == 0) {{"))?;
                        w.line(
                            d + 3,
                            &format!(
                                "{elem} = {};",
                                alloc_expr(&desc.base_name, desc.pointer_depth)
                            ),
                        )?;
                        w.line(d + 2, "}")?;
                    }
                    w.line(
                        d + 2,
                        &format!(
                            "if (!{}deserialize(serializer)) {{",
                            deref_access(&elem, desc.pointer_depth)
                        ),
                    )?;
                    self.fail(w, d + 3)?;
                    w.line(d + 2, "}")?;
                    w.line(d + 1, "}")?;
                }
                FieldKind::Pointer => {
                    let target = format!("this->{name}");

                    w.line(d + 1, &format!("if ({target} == 0) {{"))?;
                    w.line(
                        d + 2,
                        &format!(
                            "{target} = {};",
                            alloc_expr(&desc.base_name, desc.pointer_depth)
                        ),
                    )?;
                    w.line(d + 1, "}")?;
                    w.line(
                        d + 1,
                        &format!(
                            "if (!{}deserialize(serializer)) {{",
                            deref_access(&target, desc.pointer_depth)
                        ),
                    )?;
                    self.fail(w, d + 2)?;
                    w.line(d + 1, "}")?;
                }
                FieldKind::Nested => {
                    w.line(
                        d + 1,
                        &format!("if (!this->{name}.deserialize(serializer)) {{"),
                    )?;
                    self.fail(w, d + 2)?;
                    w.line(d + 1, "}")?;
                }
            }
        }
        w.line(d + 1, "return true;")?;
        w.line(d, "}")
    }

    fn serialize(&self, w: &mut Lines<'_>) -> fmt::Result {
        let d = METHOD_DEPTH;

        w.line(d, "void serialize(Serializer *serializer, Stream *stream) {")?;
        if self.message {
            w.line(d + 1, "Message::serialize(serializer, stream);")?;
        }
        for field in self.fields {
            let name = field.name();
            let depth = field.descriptor().pointer_depth;

            match field.kind() {
                FieldKind::Builtin => {
                    w.line(d + 1, &format!("serializer->write(this->{name}, stream);"))?;
                }
                FieldKind::Array => {
                    let count = field.count_member().unwrap_or_default();
                    let elem = deref_access(&format!("this->{name}[__i]"), depth);

                    w.line(d + 1, &format!("serializer->write(this->{count}, stream);"))?;
                    w.line(
                        d + 1,
                        &format!("for (unsigned char __i = 0; __i < this->{count}; __i++) {{"),
                    )?;
                    w.line(d + 2, &format!("{elem}serialize(serializer, stream);"))?;
                    w.line(d + 1, "}")?;
                }
                FieldKind::Pointer => {
                    let target = deref_access(&format!("this->{name}"), depth);
                    w.line(d + 1, &format!("{target}serialize(serializer, stream);"))?;
                }
                FieldKind::Nested => {
                    w.line(d + 1, &format!("this->{name}.serialize(serializer, stream);"))?;
                }
            }
        }
        w.line(d, "}")
    }

    fn dispose(&self, w: &mut Lines<'_>) -> fmt::Result {
        let d = METHOD_DEPTH;

        w.line(d, "void dispose() {")?;
        for field in self.fields {
            let name = field.name();
            let target = format!("this->{name}");
            let desc = field.descriptor();

            match field.kind() {
                FieldKind::Builtin if field.plan.disposable() => {
                    w.line(d + 1, &format!("if ({target} != 0) {{"))?;
                    if desc.is_array {
                        w.line(d + 2, &format!("delete[] {target};"))?;
                    } else {
                        for stmt in release_stmts(&target, desc.pointer_depth) {
                            w.line(d + 2, &stmt)?;
                        }
                    }
                    w.line(d + 2, &format!("{target} = 0;"))?;
                    w.line(d + 1, "}")?;
                }
                FieldKind::Builtin | FieldKind::Nested => {}
                FieldKind::Array => {
                    let count = field.count_member().unwrap_or_default();
                    let elem = format!("{target}[__i]");

                    w.line(d + 1, &format!("if ({target} != 0) {{"))?;
                    w.line(
                        d + 2,
                        &format!("for (unsigned char __i = 0; __i < this->{count}; __i++) {{"),
                    )?;
                    if desc.pointer_depth == 0 {
                        w.line(d + 3, &format!("{elem}.dispose();"))?;
                    } else {
                        w.line(d + 3, &format!("if ({elem} != 0) {{"))?;
                        w.line(
                            d + 4,
                            &format!("{}dispose();", deref_access(&elem, desc.pointer_depth)),
                        )?;
                        for stmt in release_stmts(&elem, desc.pointer_depth) {
                            w.line(d + 4, &stmt)?;
                        }
                        w.line(d + 3, "}")?;
                    }
                    w.line(d + 2, "}")?;
                    w.line(d + 2, &format!("delete[] {target};"))?;
                    w.line(d + 2, &format!("{target} = 0;"))?;
                    w.line(d + 2, &format!("this->{count} = 0;"))?;
                    w.line(d + 1, "}")?;
                }
                FieldKind::Pointer => {
                    w.line(d + 1, &format!("if ({target} != 0) {{"))?;
                    for stmt in release_stmts(&target, desc.pointer_depth) {
                        w.line(d + 2, &stmt)?;
                    }
                    w.line(d + 2, &format!("{target} = 0;"))?;
                    w.line(d + 1, "}")?;
                }
            }
        }
        w.line(d, "}")
    }

    fn fail(&self, w: &mut Lines<'_>, depth: usize) -> fmt::Result {
        if self.rollback {
            w.line(depth, "this->dispose();")?;
        }
        w.line(depth, "return false;")
    }
}

///
/// Lines
///

struct Lines<'a> {
    out: &'a mut String,
}

impl Lines<'_> {
    fn line(&mut self, depth: usize, text: &str) -> fmt::Result {
        for _ in 0..depth {
            self.out.push('\t');
        }
        writeln!(self.out, "{text}")
    }
}
