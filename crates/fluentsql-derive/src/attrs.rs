//! Parsing of `#[fluent(...)]` attributes.
//!
//! Struct level: `#[fluent(table = "name")]`.
//! Field level: `#[fluent(column = "name")]`, `#[fluent(skip)]`.

use syn::{DeriveInput, Result};

/// Everything a `#[fluent(...)]` list can carry.
#[derive(Default)]
pub struct FluentAttr {
    pub table: Option<String>,
    pub column: Option<String>,
    pub skip: bool,
}

impl syn::parse::Parse for FluentAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FluentAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            if ident == "skip" {
                attr.skip = true;
            } else if ident == "table" || ident == "column" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                if value.value().is_empty() {
                    return Err(syn::Error::new_spanned(value, "name must not be empty"));
                }
                if ident == "table" {
                    attr.table = Some(value.value());
                } else {
                    attr.column = Some(value.value());
                }
            } else {
                return Err(syn::Error::new_spanned(
                    &ident,
                    format!("unknown fluent attribute `{ident}`"),
                ));
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attr)
    }
}

/// Merge every `#[fluent(...)]` on an item.
pub fn parse_all(attrs: &[syn::Attribute]) -> Result<FluentAttr> {
    let mut merged = FluentAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("fluent") {
            continue;
        }
        let parsed: FluentAttr = attr.parse_args()?;
        if parsed.table.is_some() {
            merged.table = parsed.table;
        }
        if parsed.column.is_some() {
            merged.column = parsed.column;
        }
        merged.skip |= parsed.skip;
    }
    Ok(merged)
}

/// Explicit table name from the struct attributes, if any.
pub fn table_name(input: &DeriveInput) -> Result<Option<String>> {
    let attr = parse_all(&input.attrs)?;
    if attr.column.is_some() || attr.skip {
        return Err(syn::Error::new_spanned(
            input,
            "only `table` is allowed on the struct",
        ));
    }
    Ok(attr.table)
}

/// Named fields of a struct, or an error naming the derive.
pub fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> Result<&'a syn::punctuated::Punctuated<syn::Field, syn::Token![,]>> {
    match &input.data {
        syn::Data::Struct(data) => match &data.fields {
            syn::Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}

/// Field-level attribute, rejecting `table`.
pub fn field_attr(field: &syn::Field) -> Result<FluentAttr> {
    let attr = parse_all(&field.attrs)?;
    if attr.table.is_some() {
        return Err(syn::Error::new_spanned(
            field,
            "`table` is only allowed on the struct",
        ));
    }
    Ok(attr)
}
