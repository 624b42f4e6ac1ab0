//! Field and table name resolution.
//!
//! Per-type metadata (table name + property -> column map) is computed once
//! per entity type and kept in a process-wide bounded LRU cache keyed by the
//! type path. Recomputing an evicted entry is harmless: descriptors are
//! static, so the result is always the same.

use crate::alias::{AliasContext, TableKey};
use crate::cache::LruCache;
use crate::config::config;
use crate::entity::{EntityDescriptor, Field, registered_entities};
use crate::error::{FluentError, FluentResult};
use crate::ident::{qualify, quote, to_snake};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

/// Resolved naming metadata for one entity type.
#[derive(Debug)]
pub struct EntityMeta {
    descriptor: &'static EntityDescriptor,
    table: String,
    columns: HashMap<&'static str, String>,
}

impl EntityMeta {
    fn build(descriptor: &'static EntityDescriptor) -> Self {
        let table = descriptor
            .table
            .map(str::to_string)
            .unwrap_or_else(|| to_snake(descriptor.name));
        let columns = descriptor
            .fields
            .iter()
            .map(|f| {
                let column = f
                    .column
                    .map(str::to_string)
                    .unwrap_or_else(|| to_snake(f.property));
                (f.property, column)
            })
            .collect();
        Self {
            descriptor,
            table,
            columns,
        }
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    /// Unquoted table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Unquoted column name for a property.
    pub fn column(&self, property: &str) -> FluentResult<&str> {
        self.columns.get(property).map(String::as_str).ok_or_else(|| {
            FluentError::resolution(format!(
                "no property '{}' on entity '{}'",
                property, self.descriptor.name
            ))
        })
    }

    /// `(property, column)` pairs in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.descriptor
            .fields
            .iter()
            .filter_map(|f| self.columns.get(f.property).map(|c| (f.property, c.as_str())))
    }
}

static METADATA: LazyLock<LruCache<&'static str, Arc<EntityMeta>>> =
    LazyLock::new(|| LruCache::new(config().metadata_cache_capacity));

pub(crate) fn metadata_cache() -> &'static LruCache<&'static str, Arc<EntityMeta>> {
    &METADATA
}

/// Metadata for an entity type, computed on first use.
pub fn metadata(descriptor: &'static EntityDescriptor) -> FluentResult<Arc<EntityMeta>> {
    lookup(metadata_cache(), descriptor)
}

fn lookup(
    cache: &LruCache<&'static str, Arc<EntityMeta>>,
    descriptor: &'static EntityDescriptor,
) -> FluentResult<Arc<EntityMeta>> {
    let meta = match cache.get(&descriptor.type_path) {
        Some(meta) => meta,
        None => {
            let built = Arc::new(EntityMeta::build(descriptor));

            #[cfg(feature = "tracing")]
            tracing::debug!(
                entity = descriptor.type_path,
                table = %built.table,
                "entity metadata cache miss"
            );

            cache.insert_if_absent(descriptor.type_path, built)
        }
    };

    if meta.descriptor != descriptor {
        return Err(FluentError::Conflict {
            key: descriptor.type_path.to_string(),
            cached: format!("{:?}", meta.descriptor),
            requested: format!("{:?}", descriptor),
        });
    }
    Ok(meta)
}

/// Load metadata for every registered entity. Returns how many were loaded.
pub fn warm_up() -> FluentResult<usize> {
    let mut loaded = 0;
    for descriptor in registered_entities() {
        metadata(descriptor)?;
        loaded += 1;
    }
    Ok(loaded)
}

/// Unquoted table name for an entity.
pub fn table_name(descriptor: &'static EntityDescriptor) -> FluentResult<String> {
    Ok(metadata(descriptor)?.table().to_string())
}

/// Unquoted column name for a field.
pub fn column_name(field: &Field) -> FluentResult<String> {
    let meta = metadata(field.entity())?;
    Ok(meta.column(field.property())?.to_string())
}

/// Column reference, alias-qualified when the owning table has an alias.
pub fn to_name(field: &Field, aliases: &AliasContext) -> FluentResult<String> {
    let column = column_name(field)?;
    Ok(match aliases.alias_of(&TableKey::from(field.entity())) {
        Some(alias) => qualify(alias, &column),
        None => quote(&column),
    })
}

/// Select-list item: the column reference plus `AS` the output name.
///
/// The output name is the registered column alias, or the property name so
/// rows can be mapped back by property.
pub fn to_select(field: &Field, aliases: &AliasContext) -> FluentResult<String> {
    let name = to_name(field, aliases)?;
    let output = aliases
        .column_alias(field)
        .unwrap_or_else(|| field.property());
    Ok(format!("{} AS {}", name, quote(output)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::FieldDescriptor;

    static SAAS_TENANT: EntityDescriptor = EntityDescriptor {
        type_path: "resolver_tests::SaasTenant",
        name: "SaasTenant",
        table: None,
        fields: &[
            FieldDescriptor {
                property: "id",
                column: None,
            },
            FieldDescriptor {
                property: "orderType",
                column: None,
            },
            FieldDescriptor {
                property: "enable",
                column: Some("is_enabled"),
            },
        ],
    };

    static RENAMED: EntityDescriptor = EntityDescriptor {
        type_path: "resolver_tests::Renamed",
        name: "Renamed",
        table: Some("legacy_table"),
        fields: &[],
    };

    static IMPOSTOR: EntityDescriptor = EntityDescriptor {
        type_path: "resolver_tests::Renamed",
        name: "Renamed",
        table: Some("other"),
        fields: &[],
    };

    #[test]
    fn default_names_are_snake_case() {
        let meta = metadata(&SAAS_TENANT).unwrap();
        assert_eq!(meta.table(), "saas_tenant");
        assert_eq!(meta.column("orderType").unwrap(), "order_type");
    }

    #[test]
    fn explicit_overrides_win() {
        assert_eq!(table_name(&RENAMED).unwrap(), "legacy_table");
        let enable = Field::new(&SAAS_TENANT, "enable");
        assert_eq!(column_name(&enable).unwrap(), "is_enabled");
    }

    #[test]
    fn unknown_property_is_resolution_error() {
        let missing = Field::new(&SAAS_TENANT, "missing");
        let err = column_name(&missing).unwrap_err();
        assert!(err.is_resolution());
    }

    #[test]
    fn same_key_different_descriptor_conflicts() {
        let cache = LruCache::new(4);
        lookup(&cache, &RENAMED).unwrap();
        let err = lookup(&cache, &IMPOSTOR).unwrap_err();
        assert!(matches!(err, FluentError::Conflict { .. }));
    }

    #[test]
    fn cache_is_bounded() {
        let cache = LruCache::new(1);
        lookup(&cache, &RENAMED).unwrap();
        lookup(&cache, &SAAS_TENANT).unwrap();
        assert_eq!(cache.len(), 1);
        // evicted entries are simply recomputed
        assert_eq!(lookup(&cache, &RENAMED).unwrap().table(), "legacy_table");
    }

    #[test]
    fn to_name_qualifies_only_known_tables() {
        let id = Field::new(&SAAS_TENANT, "id");
        let mut aliases = AliasContext::new();
        assert_eq!(to_name(&id, &aliases).unwrap(), "`id`");

        aliases.add(TableKey::from(&SAAS_TENANT), None);
        assert_eq!(to_name(&id, &aliases).unwrap(), "t1.`id`");
    }

    #[test]
    fn to_select_uses_property_or_column_alias() {
        let order_type = Field::new(&SAAS_TENANT, "orderType");
        let mut aliases = AliasContext::new();
        aliases.add(TableKey::from(&SAAS_TENANT), None);
        assert_eq!(
            to_select(&order_type, &aliases).unwrap(),
            "t1.`order_type` AS `orderType`"
        );

        aliases.add_column(order_type, "kind");
        assert_eq!(
            to_select(&order_type, &aliases).unwrap(),
            "t1.`order_type` AS `kind`"
        );
    }

    #[test]
    fn columns_follow_declaration_order() {
        let meta = metadata(&SAAS_TENANT).unwrap();
        let props: Vec<_> = meta.columns().map(|(p, _)| p).collect();
        assert_eq!(props, ["id", "orderType", "enable"]);
    }
}
