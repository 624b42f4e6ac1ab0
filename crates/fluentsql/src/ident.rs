//! Identifier quoting and naming conventions.
//!
//! Rendered SQL uses a single generic dialect: identifiers are wrapped in
//! backticks, with embedded backticks doubled. Qualified column references
//! keep the alias bare; table declarations quote both the table and its alias.

use heck::ToSnakeCase;

/// Wrap an identifier in backticks.
///
/// Already-wrapped identifiers are returned unchanged.
pub fn quote(name: &str) -> String {
    if name.len() >= 2 && name.starts_with('`') && name.ends_with('`') {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 2);
    out.push('`');
    for ch in name.chars() {
        if ch == '`' {
            out.push('`');
        }
        out.push(ch);
    }
    out.push('`');
    out
}

/// Qualify a column with a bare alias, quoting the column only.
pub fn qualify(alias: &str, column: &str) -> String {
    let column = quote(column);
    let mut out = String::with_capacity(alias.len() + column.len() + 1);
    out.push_str(alias);
    out.push('.');
    out.push_str(&column);
    out
}

/// Default table/column naming: `SaasTenant` -> `saas_tenant`, `orderType` -> `order_type`.
pub fn to_snake(name: &str) -> String {
    name.to_snake_case()
}
