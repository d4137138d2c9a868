//! C++ header backend.
//!
//! Renders one header holding every object class, every message class with
//! its factory, and a `REGISTER(p)` macro that adds the factories to a
//! registry in declaration order.

mod field;
mod routines;


use crate::{
    Backend, BuildError,
    plan::{MessagePlan, ObjectPlan, SchemaPlan},
};
use battlegen_config_build::{Config, CppConfig};
use battlegen_schema::node::Definitions;
use field::CppField;
use routines::Routines;
use std::fmt::{self, Write};

const INDENT: &str = "\t";
const MEMBER: &str = "\t\t";

///
/// CppBackend
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CppBackend;

impl Backend for CppBackend {
    fn languages(&self) -> &'static [&'static str] {
        &["c", "cpp"]
    }

    fn export(&self, defs: &Definitions, config: &Config) -> Result<String, BuildError> {
        let plan = SchemaPlan::new(defs, &config.generate)?;
        let writer = HeaderWriter {
            config: &config.cpp,
            rollback: config.generate.rollback_on_failure,
        };

        let mut out = String::new();
        writer.header(&mut out, &plan)?;

        Ok(out)
    }
}

///
/// HeaderWriter
///

struct HeaderWriter<'a> {
    config: &'a CppConfig,
    rollback: bool,
}

impl HeaderWriter<'_> {
    fn header(&self, out: &mut String, plan: &SchemaPlan) -> fmt::Result {
        let guard = &self.config.include_guard;

        writeln!(out, "#ifndef {guard}")?;
        writeln!(out, "#define {guard}")?;
        writeln!(out)?;
        writeln!(out, "#include \"{}\"", self.config.core_header)?;
        writeln!(out)?;
        writeln!(out, "namespace {} {{", self.config.namespace)?;

        for object in &plan.objects {
            self.object(out, object)?;
        }
        for message in &plan.messages {
            self.message(out, message)?;
        }

        writeln!(out, "#define REGISTER(p)\t\\")?;
        for message in &plan.messages {
            writeln!(out, "{INDENT}p.addFactory(new {}MessageFactory());\t\\", message.name)?;
        }
        writeln!(out)?;

        writeln!(out, "}}")?;
        writeln!(out, "#endif")
    }

    fn object(&self, out: &mut String, object: &ObjectPlan) -> fmt::Result {
        let name = &object.name;
        let fields: Vec<_> = object.fields.iter().map(CppField::new).collect();

        writeln!(out, "{INDENT}class {name} : public ISerializable {{")?;
        writeln!(out, "{INDENT}public:")?;
        write_declarations(out, &fields)?;

        if fields.is_empty() {
            writeln!(out, "{MEMBER}{name}() {{}}")?;
        } else {
            let defaults = join(fields.iter().flat_map(CppField::default_inits));
            let params = join(fields.iter().flat_map(CppField::params));
            let inits = join(fields.iter().flat_map(CppField::copy_inits));

            writeln!(out, "{MEMBER}{name}() : {defaults} {{}}")?;
            writeln!(out, "{MEMBER}{name}({params}) : {inits} {{}}")?;
        }
        writeln!(out)?;

        Routines::new(&fields, false, self.rollback).write(out)?;

        writeln!(out, "{INDENT}}};")?;
        writeln!(out)
    }

    fn message(&self, out: &mut String, message: &MessagePlan) -> fmt::Result {
        let name = &message.name;
        let constant = format!("MSG_{}", name.to_uppercase());
        let fields: Vec<_> = message.fields.iter().map(CppField::new).collect();

        writeln!(out, "{INDENT}#define {constant} {:#x}", message.id)?;
        writeln!(out)?;

        writeln!(out, "{INDENT}class {name}Message : public Message {{")?;
        writeln!(out, "{MEMBER}unsigned char ver;")?;
        writeln!(out, "{INDENT}public:")?;
        writeln!(out, "{MEMBER}{name}Message() : ver({:#x}) {{}}", message.version)?;
        writeln!(out, "{MEMBER}{name}Message(unsigned char ver) : ver(ver) {{}}")?;
        write_declarations(out, &fields)?;
        writeln!(out)?;

        writeln!(out, "{MEMBER}unsigned char type() {{ return {constant}; }}")?;
        writeln!(out, "{MEMBER}unsigned char version() {{ return this->ver; }}")?;
        Routines::new(&fields, true, self.rollback).write(out)?;
        writeln!(out, "{INDENT}}};")?;

        writeln!(out, "{INDENT}class {name}MessageFactory : public MessageFactory {{")?;
        writeln!(out, "{INDENT}public:")?;
        writeln!(out, "{MEMBER}unsigned char type() {{ return {constant}; }}")?;
        writeln!(
            out,
            "{MEMBER}Message* get(unsigned char ver) {{ return new {name}Message(ver); }}"
        )?;
        writeln!(out, "{INDENT}}};")?;
        writeln!(out)
    }
}

fn write_declarations(out: &mut String, fields: &[CppField<'_>]) -> fmt::Result {
    for field in fields {
        for decl in field.declarations() {
            writeln!(out, "{MEMBER}{decl}")?;
        }
    }

    Ok(())
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(", ")
}
