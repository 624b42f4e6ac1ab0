//! Table and column alias allocation for one statement build.
//!
//! An [`AliasContext`] lives inside a [`BuildSession`](crate::BuildSession)
//! and never outlives a single render. Tables are keyed by [`TableKey`]:
//! either an entity type or a literal table name.
//!
//! - An explicit alias always wins, even over one generated earlier.
//! - Generated aliases are `t1`, `t2`, ... in first-reference order.
//! - Column aliases are a separate map keyed by [`Field`].

use crate::entity::{Entity, EntityDescriptor, Field};
use crate::ident::{qualify, quote};
use std::collections::HashMap;

/// Identity of a table within a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableKey {
    /// An entity type, keyed by its type path.
    Entity(&'static str),
    /// A literal table name.
    Named(String),
    /// A literal table name declared under an explicit alias; one table may
    /// appear several times this way (self-joins).
    NamedAs { table: String, alias: String },
}

impl TableKey {
    pub fn entity<E: Entity>() -> Self {
        Self::Entity(E::DESCRIPTOR.type_path)
    }

    pub fn named(table: impl Into<String>) -> Self {
        Self::Named(table.into())
    }
}

impl From<&'static EntityDescriptor> for TableKey {
    fn from(d: &'static EntityDescriptor) -> Self {
        Self::Entity(d.type_path)
    }
}

#[derive(Debug, Clone)]
struct TableEntry {
    key: TableKey,
    /// Physical table name, when known; used to match `table.column` strings.
    table: Option<String>,
    alias: String,
}

/// Scoped alias registry.
#[derive(Debug, Default)]
pub struct AliasContext {
    tables: Vec<TableEntry>,
    sequence: usize,
    columns: HashMap<Field, String>,
}

impl AliasContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table, returning its alias.
    ///
    /// A non-empty `alias` is stored and returned, replacing any previous
    /// mapping; otherwise the existing alias is kept or the next `tN` is
    /// generated.
    pub fn add(&mut self, key: TableKey, alias: Option<&str>) -> String {
        match alias.filter(|a| !a.is_empty()) {
            Some(alias) => {
                if let Some(entry) = self.entry_mut(&key) {
                    entry.alias = alias.to_string();
                } else {
                    self.tables.push(TableEntry {
                        key,
                        table: None,
                        alias: alias.to_string(),
                    });
                }
                alias.to_string()
            }
            None => self.get(&key),
        }
    }

    /// Register a table together with its physical name.
    pub fn add_table(&mut self, key: TableKey, table: &str, alias: Option<&str>) -> String {
        let alias = self.add(key.clone(), alias);
        if let Some(entry) = self.entry_mut(&key) {
            entry.table = Some(table.to_string());
        }
        alias
    }

    /// Current alias for `key`, generating one on first access.
    pub fn get(&mut self, key: &TableKey) -> String {
        if let Some(entry) = self.entry(key) {
            return entry.alias.clone();
        }
        // skip names already taken by explicit aliases
        let alias = loop {
            self.sequence += 1;
            let candidate = format!("t{}", self.sequence);
            if !self.tables.iter().any(|e| e.alias == candidate) {
                break candidate;
            }
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(?key, %alias, "generated table alias");

        self.tables.push(TableEntry {
            key: key.clone(),
            table: None,
            alias: alias.clone(),
        });
        alias
    }

    /// Alias for `key` without generating one.
    pub fn alias_of(&self, key: &TableKey) -> Option<&str> {
        self.entry(key).map(|e| e.alias.as_str())
    }

    /// Presence check; never generates.
    pub fn has(&self, key: &TableKey) -> bool {
        self.entry(key).is_some()
    }

    /// Number of registered tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Register an output alias for a selected field.
    pub fn add_column(&mut self, field: Field, alias: impl Into<String>) {
        self.columns.insert(field, alias.into());
    }

    /// Output alias registered for `field`.
    pub fn column_alias(&self, field: &Field) -> Option<&str> {
        self.columns.get(field).map(String::as_str)
    }

    /// Drop every mapping and restart the `tN` sequence.
    pub fn flush(&mut self) {
        self.tables.clear();
        self.columns.clear();
        self.sequence = 0;
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.columns.is_empty() && self.sequence == 0
    }

    /// Qualify a raw column string.
    ///
    /// `left.right` is split on the first dot: a known alias or table name on
    /// the left is replaced by its canonical alias, anything else passes
    /// through as typed. A bare column is qualified only when exactly one
    /// table is registered.
    pub fn qualify_column(&self, raw: &str) -> String {
        match raw.split_once('.') {
            Some((left, right)) => match self.resolve_prefix(left) {
                Some(alias) => qualify(alias, right),
                None => qualify(left, right),
            },
            None => match self.single_alias() {
                Some(alias) => qualify(alias, raw),
                None => quote(raw),
            },
        }
    }

    fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        if let Some(entry) = self.tables.iter().find(|e| e.alias == prefix) {
            return Some(&entry.alias);
        }
        self.tables
            .iter()
            .find(|e| match (&e.key, &e.table) {
                (_, Some(table)) if table == prefix => true,
                (TableKey::Named(name), _) | (TableKey::NamedAs { table: name, .. }, _) => {
                    name == prefix
                }
                _ => false,
            })
            .map(|e| e.alias.as_str())
    }

    fn single_alias(&self) -> Option<&str> {
        match self.tables.as_slice() {
            [only] => Some(&only.alias),
            _ => None,
        }
    }

    fn entry(&self, key: &TableKey) -> Option<&TableEntry> {
        self.tables.iter().find(|e| &e.key == key)
    }

    fn entry_mut(&mut self, key: &TableKey) -> Option<&mut TableEntry> {
        self.tables.iter_mut().find(|e| &e.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityDescriptor, FieldDescriptor};

    static USER: EntityDescriptor = EntityDescriptor {
        type_path: "app::User",
        name: "User",
        table: None,
        fields: &[FieldDescriptor {
            property: "name",
            column: None,
        }],
    };

    #[test]
    fn generates_sequential_aliases() {
        let mut ctx = AliasContext::new();
        assert_eq!(ctx.get(&TableKey::named("a")), "t1");
        assert_eq!(ctx.get(&TableKey::named("b")), "t2");
        assert_eq!(ctx.get(&TableKey::named("a")), "t1");
    }

    #[test]
    fn explicit_alias_wins_after_generation() {
        let mut ctx = AliasContext::new();
        let key = TableKey::named("orders");
        assert_eq!(ctx.get(&key), "t1");
        assert_eq!(ctx.add(key.clone(), Some("o")), "o");
        assert_eq!(ctx.get(&key), "o");
    }

    #[test]
    fn empty_alias_is_treated_as_missing() {
        let mut ctx = AliasContext::new();
        assert_eq!(ctx.add(TableKey::named("a"), Some("")), "t1");
    }

    #[test]
    fn explicit_alias_does_not_consume_sequence() {
        let mut ctx = AliasContext::new();
        ctx.add(TableKey::named("a"), Some("x"));
        assert_eq!(ctx.add(TableKey::named("b"), None), "t1");
    }

    #[test]
    fn generated_alias_skips_explicit_names() {
        let mut ctx = AliasContext::new();
        ctx.add(TableKey::named("a"), Some("t1"));
        assert_eq!(ctx.get(&TableKey::named("b")), "t2");
        assert_eq!(ctx.get(&TableKey::named("c")), "t3");
    }

    #[test]
    fn same_table_under_two_aliases() {
        let mut ctx = AliasContext::new();
        let emp = |alias: &str| TableKey::NamedAs {
            table: "emp".into(),
            alias: alias.into(),
        };
        ctx.add_table(emp("e"), "emp", Some("e"));
        ctx.add_table(emp("m"), "emp", Some("m"));

        assert_eq!(ctx.alias_of(&emp("e")), Some("e"));
        assert_eq!(ctx.alias_of(&emp("m")), Some("m"));
        assert_eq!(ctx.qualify_column("m.id"), "m.`id`");
        assert_eq!(ctx.qualify_column("e.manager_id"), "e.`manager_id`");
    }

    #[test]
    fn has_does_not_generate() {
        let ctx = AliasContext::new();
        assert!(!ctx.has(&TableKey::named("a")));
        assert_eq!(ctx.table_count(), 0);
    }

    #[test]
    fn flush_resets_to_fresh_state() {
        let mut ctx = AliasContext::new();
        ctx.get(&TableKey::named("a"));
        ctx.add_column(Field::new(&USER, "name"), "user_name");
        ctx.flush();
        assert!(ctx.is_empty());
        assert_eq!(ctx.get(&TableKey::named("b")), "t1");
    }

    #[test]
    fn flush_on_fresh_context_is_safe() {
        let mut ctx = AliasContext::new();
        ctx.flush();
        assert!(ctx.is_empty());
    }

    #[test]
    fn column_aliases_are_keyed_by_field() {
        let mut ctx = AliasContext::new();
        let name = Field::new(&USER, "name");
        ctx.add_column(name, "user_name");
        assert_eq!(ctx.column_alias(&name), Some("user_name"));
    }

    #[test]
    fn qualify_known_alias_and_table() {
        let mut ctx = AliasContext::new();
        ctx.add_table(TableKey::from(&USER), "app_user", Some("u"));
        ctx.add(TableKey::named("orders"), None);

        assert_eq!(ctx.qualify_column("u.name"), "u.`name`");
        assert_eq!(ctx.qualify_column("app_user.name"), "u.`name`");
        assert_eq!(ctx.qualify_column("orders.total"), "t1.`total`");
    }

    #[test]
    fn qualify_unknown_prefix_passes_through() {
        let mut ctx = AliasContext::new();
        ctx.add(TableKey::named("orders"), None);
        assert_eq!(ctx.qualify_column("x.total"), "x.`total`");
    }

    #[test]
    fn qualify_bare_column() {
        let mut ctx = AliasContext::new();
        assert_eq!(ctx.qualify_column("total"), "`total`");

        ctx.add(TableKey::named("orders"), None);
        assert_eq!(ctx.qualify_column("total"), "t1.`total`");

        ctx.add(TableKey::named("items"), None);
        assert_eq!(ctx.qualify_column("total"), "`total`");
    }
}
