use super::field::RustField;
use battlegen_schema::prelude::*;
use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

///
/// Routines
///
/// Body of a `Serializable` impl. Each routine dispatches on [`FieldKind`]
/// for every field, in field order.
///

pub struct Routines<'a> {
    rt: &'a Path,
    fields: &'a [RustField<'a>],
    message: bool,
    rollback: bool,
}

impl<'a> Routines<'a> {
    pub const fn new(
        rt: &'a Path,
        fields: &'a [RustField<'a>],
        message: bool,
        rollback: bool,
    ) -> Self {
        Self {
            rt,
            fields,
            message,
            rollback,
        }
    }

    pub fn generate(&self) -> TokenStream {
        let length = self.length();
        let deserialize = self.deserialize();
        let serialize = self.serialize();
        let dispose = self.dispose();

        quote! {
            #length
            #deserialize
            #serialize
            #dispose
        }
    }

    fn length(&self) -> TokenStream {
        let rt = self.rt;
        let parts = self.fields.iter().map(|field| {
            let ident = &field.ident;
            let value = &field.value;
            let dynamic = quote! {
                len = len.wrapping_add(#rt::Measure::measure(&self.#ident, serializer));
            };
            let fixed = quote! {
                len = len.wrapping_add(::core::mem::size_of::<#value>() as u8);
            };

            match field.kind() {
                FieldKind::Builtin if field.plan.disposable() => dynamic,
                FieldKind::Builtin | FieldKind::Nested => fixed,
                FieldKind::Array | FieldKind::Pointer => dynamic,
            }
        });

        quote! {
            fn length(&self, serializer: &dyn #rt::Serializer) -> u8 {
                let mut len: u8 = 0;
                #(#parts)*
                len
            }
        }
    }

    fn deserialize(&self) -> TokenStream {
        let rt = self.rt;
        let fail = self.fail();
        let parts = self.fields.iter().map(|field| {
            let ident = &field.ident;
            let value = &field.value;

            match field.kind() {
                FieldKind::Builtin => quote! {
                    if self.#ident.is_none() {
                        match <#value as #rt::Scalar>::read(serializer) {
                            ::core::option::Option::Some(value) => {
                                self.#ident = ::core::option::Option::Some(value);
                            }
                            ::core::option::Option::None => { #fail }
                        }
                    }
                },
                FieldKind::Array => quote! {
                    if self.#ident.is_none() {
                        let ::core::option::Option::Some(count) =
                            <u8 as #rt::Scalar>::read(serializer)
                        else {
                            #fail
                        };
                        self.#ident = ::core::option::Option::Some(
                            (0..count).map(|_| ::core::default::Default::default()).collect(),
                        );
                    }
                    let count = self.#ident.as_ref().map_or(0, ::std::vec::Vec::len);
                    for i in 0..count {
                        let ok = self
                            .#ident
                            .as_mut()
                            .is_some_and(|items| items[i].deserialize(serializer));
                        if !ok { #fail }
                    }
                },
                FieldKind::Pointer => quote! {
                    let ok = self
                        .#ident
                        .get_or_insert_with(::core::default::Default::default)
                        .deserialize(serializer);
                    if !ok { #fail }
                },
                FieldKind::Nested => quote! {
                    if !self.#ident.deserialize(serializer) { #fail }
                },
            }
        });

        quote! {
            fn deserialize(&mut self, serializer: &mut dyn #rt::Serializer) -> bool {
                #(#parts)*
                true
            }
        }
    }

    fn serialize(&self) -> TokenStream {
        let rt = self.rt;
        let header = self.message.then(|| {
            quote! {
                #rt::Message::serialize_header(self, serializer, stream);
            }
        });
        let parts = self.fields.iter().map(|field| {
            let ident = &field.ident;
            let value = &field.value;

            match field.kind() {
                FieldKind::Builtin => quote! {
                    <#value as #rt::Scalar>::write(
                        self.#ident.as_ref().unwrap_or(&::core::default::Default::default()),
                        serializer,
                        stream,
                    );
                },
                FieldKind::Array => quote! {
                    match &self.#ident {
                        ::core::option::Option::Some(items) => {
                            let count = u8::try_from(items.len()).unwrap_or(u8::MAX);
                            <u8 as #rt::Scalar>::write(&count, serializer, stream);
                            for item in items.iter().take(usize::from(count)) {
                                item.serialize(serializer, stream);
                            }
                        }
                        ::core::option::Option::None => {
                            <u8 as #rt::Scalar>::write(&0, serializer, stream);
                        }
                    }
                },
                FieldKind::Pointer => quote! {
                    match &self.#ident {
                        ::core::option::Option::Some(value) => value.serialize(serializer, stream),
                        ::core::option::Option::None => {
                            let value: #value = ::core::default::Default::default();
                            value.serialize(serializer, stream);
                        }
                    }
                },
                FieldKind::Nested => quote! {
                    self.#ident.serialize(serializer, stream);
                },
            }
        });

        quote! {
            fn serialize(&self, serializer: &mut dyn #rt::Serializer, stream: &mut dyn #rt::Stream) {
                #header
                #(#parts)*
            }
        }
    }

    fn dispose(&self) -> TokenStream {
        let parts = self.fields.iter().map(|field| {
            let ident = &field.ident;

            match field.kind() {
                FieldKind::Builtin if field.plan.disposable() => quote! {
                    self.#ident = ::core::option::Option::None;
                },
                FieldKind::Builtin | FieldKind::Nested => quote!(),
                FieldKind::Array => quote! {
                    if let ::core::option::Option::Some(items) = self.#ident.as_mut() {
                        for item in items.iter_mut() {
                            item.dispose();
                        }
                    }
                    self.#ident = ::core::option::Option::None;
                },
                FieldKind::Pointer => quote! {
                    self.#ident = ::core::option::Option::None;
                },
            }
        });

        quote! {
            fn dispose(&mut self) {
                #(#parts)*
            }
        }
    }

    // failure exit of the deserialize routine
    fn fail(&self) -> TokenStream {
        if self.rollback {
            quote! {
                self.dispose();
                return false;
            }
        } else {
            quote! {
                return false;
            }
        }
    }
}
