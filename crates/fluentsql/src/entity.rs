//! Entity metadata and typed field references.
//!
//! An entity is described by a static [`EntityDescriptor`], normally generated
//! by `#[derive(Entity)]`. Field references are plain [`Field`] constants that
//! point back at that descriptor, so no runtime reflection is needed to find a
//! column's owning table.
//!
//! ```ignore
//! #[derive(Entity)]
//! #[fluent(table = "saas_tenant")]
//! struct Tenant {
//!     id: i64,
//!     #[fluent(column = "is_enabled")]
//!     enable: bool,
//! }
//!
//! // generated: Tenant::ID, Tenant::ENABLE
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

/// Static description of one persisted property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Property name (Rust field name).
    pub property: &'static str,
    /// Explicit column override.
    pub column: Option<&'static str>,
}

/// Static description of an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    /// Fully qualified type path; the stable cache key.
    pub type_path: &'static str,
    /// Simple type name, used for the default table name.
    pub name: &'static str,
    /// Explicit table override.
    pub table: Option<&'static str>,
    /// Declared fields, in declaration order.
    pub fields: &'static [FieldDescriptor],
}

impl EntityDescriptor {
    /// Look up a declared field by property name.
    pub fn field(&self, property: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.property == property)
    }
}

/// Types with static entity metadata.
pub trait Entity {
    const DESCRIPTOR: &'static EntityDescriptor;
}

/// A typed reference to one property of an entity.
///
/// Equality and hashing use the owning type path and the property name.
#[derive(Clone, Copy)]
pub struct Field {
    entity: &'static EntityDescriptor,
    property: &'static str,
}

impl Field {
    pub const fn new(entity: &'static EntityDescriptor, property: &'static str) -> Self {
        Self { entity, property }
    }

    /// Owning entity.
    pub fn entity(&self) -> &'static EntityDescriptor {
        self.entity
    }

    /// Property name.
    pub fn property(&self) -> &'static str {
        self.property
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.entity.type_path == other.entity.type_path && self.property == other.property
    }
}

impl Eq for Field {}

impl Hash for Field {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity.type_path.hash(state);
        self.property.hash(state);
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.entity.name, self.property)
    }
}

// ==================== Registration ====================

/// Link-time registration of an entity, submitted by `#[derive(Entity)]`.
pub struct EntityRegistration {
    pub descriptor: &'static EntityDescriptor,
}

inventory::collect!(EntityRegistration);

/// All entities registered via `#[derive(Entity)]` in the final binary.
pub fn registered_entities() -> impl Iterator<Item = &'static EntityDescriptor> {
    inventory::iter::<EntityRegistration>
        .into_iter()
        .map(|r| r.descriptor)
}

/// Find a registered entity by simple type name or table name.
pub fn find_entity(name: &str) -> Option<&'static EntityDescriptor> {
    registered_entities().find(|d| d.name == name || d.table == Some(name))
}
