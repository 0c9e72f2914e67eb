use proc_macro2::TokenStream;
use quote::quote;

use crate::{PStruct, parse_struct};

/// Entry point of `#[derive(Decode)]`.
pub fn derive_decode(input: TokenStream) -> TokenStream {
    match parse_struct(input) {
        Ok(parsed) => emit_decode(&parsed),
        Err(err) => err.to_compile_error(),
    }
}

/// Emits the `Decode` and `RecordSlot` impls for a parsed struct.
pub fn emit_decode(parsed: &PStruct) -> TokenStream {
    let name = &parsed.name;
    let type_identifier = name.to_string();

    let fields = parsed.fields.iter().map(|field| {
        let field_name = field.name();
        let ty = &field.ty;
        let exported = field.public;
        let embedded = field.embedded;
        let tags = field.tags.iter().map(|(key, value)| quote! { (#key, #value) });
        quote! {
            ::mapcast::Field {
                name: #field_name,
                shape: || <#ty as ::mapcast::Decode>::SHAPE,
                tags: &[#(#tags),*],
                exported: #exported,
                embedded: #embedded,
            }
        }
    });

    // non-pub fields have no arm, so the decoder can never write them
    let arms = parsed
        .fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.public)
        .map(|(position, field)| {
            let ident = &field.ident;
            quote! {
                #position => ::core::option::Option::Some(&mut self.#ident as &mut dyn ::mapcast::Target),
            }
        });

    quote! {
        #[automatically_derived]
        impl ::mapcast::Decode for #name {
            const SHAPE: &'static ::mapcast::Shape = &const {
                ::mapcast::Shape {
                    id: ::mapcast::ConstTypeId::of::<#name>(),
                    type_identifier: #type_identifier,
                    def: ::mapcast::Def::Struct(::mapcast::StructDef {
                        fields: &const { [#(#fields),*] },
                    }),
                }
            };

            fn slot(&mut self) -> ::mapcast::Slot<'_> {
                ::mapcast::Slot::Record(self)
            }
        }

        #[automatically_derived]
        impl ::mapcast::RecordSlot for #name {
            #[allow(clippy::match_single_binding)]
            fn field_mut(
                &mut self,
                position: usize,
            ) -> ::core::option::Option<&mut dyn ::mapcast::Target> {
                match position {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    }
}
