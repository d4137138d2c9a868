//! Rust module backend.
//!
//! Renders the same wire contract as the C++ header as a Rust module bound
//! to a runtime crate (`openbattle_core` unless configured otherwise). The
//! runtime provides:
//!
//! - `Serializable` with `length`, `deserialize`, `serialize` and `dispose`
//! - `Message: Serializable` with `type_id`, `version` and `serialize_header`
//! - `MessageFactory` with `type_id` and `get(ver) -> Box<dyn Message>`
//! - `FactoryRegistry` with `add_factory`
//! - `Scalar` for values the serializer reads and writes directly
//! - `Measure` for the dynamic size of disposable fields
//! - the `Serializer` and `Stream` objects
//!
//! Unset fields are `None`; arrays are `Option<Vec<T>>` and pointers are
//! `Option<Box<..>>` nested once per pointer level.

mod field;
mod routines;

#[cfg(test)]
mod tests;

use crate::{
    Backend, BuildError,
    plan::{MessagePlan, ObjectPlan, SchemaPlan, VERSION_MEMBER},
};
use battlegen_config_build::Config;
use battlegen_schema::node::Definitions;
use convert_case::{Case, Casing};
use field::{RustField, rust_ident};
use proc_macro2::{Span, TokenStream};
use quote::quote;
use routines::Routines;
use syn::{LitInt, Path, parse_str};

///
/// RustBackend
///

#[derive(Clone, Copy, Debug, Default)]
pub struct RustBackend;

impl Backend for RustBackend {
    fn languages(&self) -> &'static [&'static str] {
        &["rust", "rs"]
    }

    fn export(&self, defs: &Definitions, config: &Config) -> Result<String, BuildError> {
        let plan = SchemaPlan::new(defs, &config.generate)?;
        let builder = ModuleBuilder::new(config)?;
        let tokens = builder.generate(&plan)?;

        Ok(format!("// @generated by battlegen, do not edit\n{tokens}\n"))
    }
}

///
/// ModuleBuilder
///

pub struct ModuleBuilder {
    runtime: Path,
    rollback: bool,
}

impl ModuleBuilder {
    pub fn new(config: &Config) -> Result<Self, BuildError> {
        let path = &config.rust.runtime_path;
        let runtime = parse_str(path).map_err(|source| BuildError::InvalidRuntimePath {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            runtime,
            rollback: config.generate.rollback_on_failure,
        })
    }

    pub fn generate(&self, plan: &SchemaPlan) -> Result<TokenStream, BuildError> {
        let rt = &self.runtime;

        let mut tokens = quote! {
            #[allow(unused_imports)]
            use #rt::Serializable as _;
        };
        for object in &plan.objects {
            tokens.extend(self.object(object)?);
        }
        for message in &plan.messages {
            tokens.extend(self.message(message)?);
        }
        tokens.extend(self.register(&plan.messages)?);

        Ok(tokens)
    }

    fn object(&self, object: &ObjectPlan) -> Result<TokenStream, BuildError> {
        let rt = &self.runtime;
        let ident = rust_ident(&object.name)?;
        let fields = object
            .fields
            .iter()
            .map(RustField::new)
            .collect::<Result<Vec<_>, _>>()?;

        let idents = fields.iter().map(|f| &f.ident);
        let tys = fields.iter().map(|f| &f.ty);
        let routines = Routines::new(rt, &fields, false, self.rollback).generate();

        Ok(quote! {
            #[derive(Debug, Default)]
            pub struct #ident {
                #(pub #idents: #tys,)*
            }

            #[allow(unused_mut, unused_variables)]
            impl #rt::Serializable for #ident {
                #routines
            }
        })
    }

    fn message(&self, message: &MessagePlan) -> Result<TokenStream, BuildError> {
        let rt = &self.runtime;
        let ident = rust_ident(&format!("{}Message", message.name))?;
        let factory = rust_ident(&format!("{}MessageFactory", message.name))?;
        let constant = type_constant(&message.name)?;
        let id = hex_literal(message.id);
        let version = hex_literal(message.version);

        let fields = message
            .fields
            .iter()
            .map(RustField::new)
            .collect::<Result<Vec<_>, _>>()?;
        // snake casing can map a distinct schema name such as `Ver` onto the member
        if let Some(clash) = fields.iter().find(|f| f.ident == VERSION_MEMBER) {
            return Err(BuildError::ReservedFieldName {
                message: message.name.clone(),
                field: clash.plan.name.clone(),
            });
        }
        let idents: Vec<_> = fields.iter().map(|f| &f.ident).collect();
        let tys = fields.iter().map(|f| &f.ty);
        let routines = Routines::new(rt, &fields, true, self.rollback).generate();

        Ok(quote! {
            pub const #constant: u8 = #id;

            #[derive(Debug)]
            pub struct #ident {
                ver: u8,
                #(pub #idents: #tys,)*
            }

            impl #ident {
                pub const VERSION: u8 = #version;

                #[must_use]
                pub fn new() -> Self {
                    Self::with_version(Self::VERSION)
                }

                #[must_use]
                pub fn with_version(ver: u8) -> Self {
                    Self {
                        ver,
                        #(#idents: ::core::default::Default::default(),)*
                    }
                }
            }

            impl ::core::default::Default for #ident {
                fn default() -> Self {
                    Self::new()
                }
            }

            #[allow(unused_mut, unused_variables)]
            impl #rt::Serializable for #ident {
                #routines
            }

            impl #rt::Message for #ident {
                fn type_id(&self) -> u8 {
                    #constant
                }

                fn version(&self) -> u8 {
                    self.ver
                }
            }

            #[derive(Clone, Copy, Debug, Default)]
            pub struct #factory;

            impl #rt::MessageFactory for #factory {
                fn type_id(&self) -> u8 {
                    #constant
                }

                fn get(&self, ver: u8) -> ::std::boxed::Box<dyn #rt::Message> {
                    ::std::boxed::Box::new(#ident::with_version(ver))
                }
            }
        })
    }

    fn register(&self, messages: &[MessagePlan]) -> Result<TokenStream, BuildError> {
        let rt = &self.runtime;
        let factories = messages
            .iter()
            .map(|message| rust_ident(&format!("{}MessageFactory", message.name)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(quote! {
            /// Add one factory per message, in declaration order.
            #[allow(unused_variables)]
            pub fn register(registry: &mut impl #rt::FactoryRegistry) {
                #(
                    #rt::FactoryRegistry::add_factory(
                        registry,
                        ::std::boxed::Box::new(#factories),
                    );
                )*
            }
        })
    }
}

// MSG_<NAME> with the name in upper snake case
fn type_constant(name: &str) -> Result<syn::Ident, BuildError> {
    rust_ident(&format!("MSG_{}", name.to_case(Case::Constant)))
}

fn hex_literal(value: u8) -> LitInt {
    LitInt::new(&format!("{value:#x}"), Span::call_site())
}
