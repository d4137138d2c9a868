use crate::{BuildError, plan::FieldPlan};
use battlegen_schema::prelude::*;
use convert_case::{Case, Casing};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, Type, parse_str};

///
/// RustField
///
/// `ty` is the declared field type; `value` is the type the runtime reads,
/// writes or measures for it (the scalar shape for builtins, the element
/// for arrays, the boxed chain for pointers, the value for nested fields).
///

pub struct RustField<'a> {
    pub plan: &'a FieldPlan,
    pub ident: Ident,
    pub ty: TokenStream,
    pub value: TokenStream,
}

impl<'a> RustField<'a> {
    pub fn new(plan: &'a FieldPlan) -> Result<Self, BuildError> {
        let d = &plan.descriptor;
        let ident = rust_ident(&plan.name.to_case(Case::Snake))?;

        let (ty, value) = match plan.kind() {
            FieldKind::Builtin => {
                let scalar = builtin_type(plan)?;
                let shaped = if d.is_array {
                    quote!(::std::vec::Vec<#scalar>)
                } else {
                    scalar
                };
                let value = boxed(shaped, d.pointer_depth);

                (quote!(::core::option::Option<#value>), value)
            }
            FieldKind::Array => {
                let elem = boxed(nested_type(plan)?, d.pointer_depth);

                (
                    quote!(::core::option::Option<::std::vec::Vec<#elem>>),
                    elem,
                )
            }
            FieldKind::Pointer => {
                let value = boxed(nested_type(plan)?, d.pointer_depth);

                (quote!(::core::option::Option<#value>), value)
            }
            FieldKind::Nested => {
                let value = nested_type(plan)?;

                (value.clone(), value)
            }
        };

        Ok(Self {
            plan,
            ident,
            ty,
            value,
        })
    }

    pub const fn kind(&self) -> FieldKind {
        self.plan.kind()
    }
}

/// Parse `name` as an identifier, falling back to a raw identifier for
/// reserved words.
pub fn rust_ident(name: &str) -> Result<Ident, BuildError> {
    parse_str::<Ident>(name)
        .or_else(|_| parse_str::<Ident>(&format!("r#{name}")))
        .map_err(|_| BuildError::InvalidRustIdent {
            name: name.to_string(),
        })
}

/// Rust spelling of a builtin scalar name.
#[must_use]
pub fn rust_scalar(name: &str) -> Option<TokenStream> {
    let ty = match name {
        "char" => quote!(i8),
        "unsigned char" => quote!(u8),
        "short" => quote!(i16),
        "unsigned short" => quote!(u16),
        "int" => quote!(i32),
        "unsigned int" => quote!(u32),
        "long" => quote!(i64),
        "unsigned long" => quote!(u64),
        "float" => quote!(f32),
        "String" => quote!(::std::string::String),
        _ => return None,
    };

    Some(ty)
}

// the written spelling wins so `unsigned int` stays unsigned under substring matching
fn builtin_type(plan: &FieldPlan) -> Result<TokenStream, BuildError> {
    let d = &plan.descriptor;

    rust_scalar(&d.scalar_spelling())
        .or_else(|| rust_scalar(&d.base_name))
        .ok_or_else(|| BuildError::InvalidRustType {
            field: plan.name.clone(),
            ty: d.origin.clone(),
            source: syn::Error::new(
                proc_macro2::Span::call_site(),
                format!("'{}' is not a builtin scalar", d.base_name),
            ),
        })
}

fn nested_type(plan: &FieldPlan) -> Result<TokenStream, BuildError> {
    let d = &plan.descriptor;
    let ty = parse_str::<Type>(&d.base_name).map_err(|source| BuildError::InvalidRustType {
        field: plan.name.clone(),
        ty: d.origin.clone(),
        source,
    })?;

    Ok(quote!(#ty))
}

fn boxed(inner: TokenStream, depth: usize) -> TokenStream {
    (0..depth).fold(inner, |ty, _| quote!(::std::boxed::Box<#ty>))
}

///
/// TESTS
///
