//! Derive macros for fluentsql
//!
//! Provides `#[derive(Entity)]` and `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod entity;
mod from_row;

/// Derive `Entity` metadata for a struct.
///
/// # Example
///
/// ```ignore
/// use fluentsql::Entity;
///
/// #[derive(Entity)]
/// #[fluent(table = "saas_tenant")]
/// struct Tenant {
///     id: i64,
///     #[fluent(column = "tenant_name")]
///     name: String,
///     #[fluent(skip)]
///     cached_label: String,
/// }
/// ```
///
/// # Generated
///
/// - `impl Entity` with a static `EntityDescriptor`
/// - one `Field` constant per persisted field (`Tenant::ID`, `Tenant::NAME`)
/// - an `inventory` registration, so the entity shows up in
///   `fluentsql::registered_entities()`
///
/// # Attributes
///
/// - `#[fluent(table = "name")]` - Table name (default: snake_case of the struct name)
/// - `#[fluent(column = "name")]` - Column name (default: snake_case of the field name)
/// - `#[fluent(skip)]` - Not persisted
#[proc_macro_derive(Entity, attributes(fluent))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `FromRow` for a struct.
///
/// Each field is read by its property name (what select lists alias to),
/// falling back to its column name. `#[fluent(skip)]` fields take
/// `Default::default()`.
///
/// # Example
///
/// ```ignore
/// use fluentsql::FromRow;
///
/// #[derive(FromRow)]
/// struct TenantSummary {
///     id: i64,
///     #[fluent(column = "tenant_name")]
///     name: String,
///     remark: Option<String>,
/// }
/// ```
#[proc_macro_derive(FromRow, attributes(fluent))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
