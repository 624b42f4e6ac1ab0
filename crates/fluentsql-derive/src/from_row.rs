//! FromRow derive macro implementation

use crate::attrs;
use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut field_extracts = Vec::new();
    for field in attrs::named_fields(&input, "FromRow")? {
        let attr = attrs::field_attr(field)?;
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        if attr.skip {
            field_extracts.push(quote! {
                #field_name: ::core::default::Default::default()
            });
            continue;
        }

        // property label first (select lists alias to it), column as fallback
        let property = field_name.unraw().to_string();
        let column = attr.column.unwrap_or_else(|| property.to_snake_case());
        let labels = if column == property {
            quote!(&[#property])
        } else {
            quote!(&[#property, #column])
        };
        field_extracts.push(quote! {
            #field_name: row.try_get_any(#labels)?
        });
    }

    Ok(quote! {
        impl #impl_generics ::fluentsql::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &::fluentsql::Row) -> ::fluentsql::FluentResult<Self> {
                ::core::result::Result::Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}
