//! Entity derive macro implementation

use crate::attrs;
use heck::{ToShoutySnakeCase, ToSnakeCase};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }

    let table = match attrs::table_name(&input)? {
        Some(table) => quote!(::core::option::Option::Some(#table)),
        None => quote!(::core::option::Option::None),
    };
    let simple_name = name.unraw().to_string();

    let mut descriptors = Vec::new();
    let mut constants = Vec::new();
    for field in attrs::named_fields(&input, "Entity")? {
        let attr = attrs::field_attr(field)?;
        if attr.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let property = ident.unraw().to_string();
        let column = match &attr.column {
            Some(column) => quote!(::core::option::Option::Some(#column)),
            None => quote!(::core::option::Option::None),
        };
        descriptors.push(quote! {
            ::fluentsql::FieldDescriptor {
                property: #property,
                column: #column,
            }
        });

        let const_name = format_ident!("{}", property.to_shouty_snake_case());
        let doc = format!(
            "Field reference for `{}`.",
            attr.column.clone().unwrap_or_else(|| property.to_snake_case())
        );
        constants.push(quote! {
            #[doc = #doc]
            #vis const #const_name: ::fluentsql::Field = ::fluentsql::Field::new(
                <Self as ::fluentsql::Entity>::DESCRIPTOR,
                #property,
            );
        });
    }

    if descriptors.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "Entity requires at least one persisted field",
        ));
    }

    Ok(quote! {
        impl ::fluentsql::Entity for #name {
            const DESCRIPTOR: &'static ::fluentsql::EntityDescriptor =
                &::fluentsql::EntityDescriptor {
                    type_path: ::core::concat!(::core::module_path!(), "::", #simple_name),
                    name: #simple_name,
                    table: #table,
                    fields: &[#(#descriptors),*],
                };
        }

        impl #name {
            #(#constants)*
        }

        ::fluentsql::inventory::submit! {
            ::fluentsql::EntityRegistration {
                descriptor: <#name as ::fluentsql::Entity>::DESCRIPTOR,
            }
        }
    })
}
