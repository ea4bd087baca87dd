use std::fmt;

use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::resource::Meta;

/// Opaque identifier of an entity.
///
/// `Display` renders the bare value so it can be used directly as a URL
/// path segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    Int(i64),
    Uuid(Uuid),
    Str(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(v) => write!(f, "{}", v),
            EntityId::Uuid(v) => write!(f, "{}", v.as_hyphenated()),
            EntityId::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for EntityId {
    fn from(v: i64) -> Self {
        EntityId::Int(v)
    }
}

impl From<i32> for EntityId {
    fn from(v: i32) -> Self {
        EntityId::Int(i64::from(v))
    }
}

impl From<u32> for EntityId {
    fn from(v: u32) -> Self {
        EntityId::Int(i64::from(v))
    }
}

impl From<Uuid> for EntityId {
    fn from(v: Uuid) -> Self {
        EntityId::Uuid(v)
    }
}

impl From<String> for EntityId {
    fn from(v: String) -> Self {
        EntityId::Str(v)
    }
}

impl From<&str> for EntityId {
    fn from(v: &str) -> Self {
        EntityId::Str(v.to_string())
    }
}

/// Type-level declaration that an entity exposes a navigable relation
/// `name`, resolved through the resource (controller) called `resource`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LinkDeclaration {
    pub name: &'static str,
    pub resource: &'static str,
}

impl LinkDeclaration {
    pub const fn new(name: &'static str, resource: &'static str) -> Self {
        Self { name, resource }
    }
}

/// Runtime value of an embeddable property.
pub enum Embed<'a> {
    One(&'a dyn Entity),
    Many(Vec<&'a dyn Entity>),
}

impl<'a> Embed<'a> {
    pub fn one<E: Entity>(entity: &'a E) -> Self {
        Embed::One(entity)
    }

    pub fn many<E: Entity>(entities: &'a [E]) -> Self {
        Embed::Many(entities.iter().map(|e| e as &dyn Entity).collect())
    }

    /// `None` stands for a null property value, which is never embedded.
    pub fn optional<E: Entity>(entity: Option<&'a E>) -> Option<Self> {
        entity.map(Embed::one)
    }
}

/// Accessor for one embeddable property of `E`.
///
/// `get` returns `None` when the property currently holds no value.
pub struct EmbeddedProperty<E> {
    pub name: &'static str,
    pub get: fn(&E) -> Option<Embed<'_>>,
}

impl<E> EmbeddedProperty<E> {
    pub const fn new(name: &'static str, get: fn(&E) -> Option<Embed<'_>>) -> Self {
        Self { name, get }
    }
}

/// Static description of an entity type.
///
/// Implementations form the per-type registration table: link declarations
/// and embeddable property accessors are fixed at compile time and read
/// without synchronization from any thread.
///
/// ```ignore
/// impl EntityKind for Order {
///     const TYPE_NAME: &'static str = "Order";
///     const LINKS: &'static [LinkDeclaration] = &[LinkDeclaration::new("customer", "Customers")];
///
///     fn id(&self) -> EntityId {
///         self.id.into()
///     }
///
///     fn embedded_properties() -> &'static [EmbeddedProperty<Self>] {
///         const PROPS: &[EmbeddedProperty<Order>] = &[EmbeddedProperty::new("Items", order_items)];
///         PROPS
///     }
/// }
/// ```
pub trait EntityKind: Serialize + Send + Sync + 'static {
    /// Declared type name; doubles as the controller name for self links.
    /// Must be unique across entity types.
    const TYPE_NAME: &'static str;

    const LINKS: &'static [LinkDeclaration] = &[];

    fn id(&self) -> EntityId;

    fn embedded_properties() -> &'static [EmbeddedProperty<Self>]
    where
        Self: Sized,
    {
        &[]
    }
}

/// Hook that lets an entity add or override metadata on its resource.
pub trait MetaContributor {
    fn populate_meta(&self, _meta: &mut Meta) {}
}

/// Object-safe view of an entity, used while walking embedded graphs.
///
/// Blanket-implemented for every `EntityKind + MetaContributor`.
pub trait Entity: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn entity_id(&self) -> EntityId;

    fn link_declarations(&self) -> &'static [LinkDeclaration];

    /// Embeddable properties that currently hold a value, in declaration order.
    fn embedded(&self) -> Vec<(&'static str, Embed<'_>)>;

    fn contribute_meta(&self, meta: &mut Meta);

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Same declared type and same identifier.
    fn same_entity(&self, other: &dyn Entity) -> bool {
        self.type_name() == other.type_name() && self.entity_id() == other.entity_id()
    }
}

impl<T> Entity for T
where
    T: EntityKind + MetaContributor,
{
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn entity_id(&self) -> EntityId {
        EntityKind::id(self)
    }

    fn link_declarations(&self) -> &'static [LinkDeclaration] {
        T::LINKS
    }

    fn embedded(&self) -> Vec<(&'static str, Embed<'_>)> {
        T::embedded_properties()
            .iter()
            .filter_map(|p| (p.get)(self).map(|value| (p.name, value)))
            .collect()
    }

    fn contribute_meta(&self, meta: &mut Meta) {
        MetaContributor::populate_meta(self, meta)
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl fmt::Debug for dyn Entity + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type", &self.type_name())
            .field("id", &self.entity_id())
            .finish()
    }
}

impl Serialize for dyn Entity + '_ {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = self.to_json().map_err(serde::ser::Error::custom)?;
        value.serialize(serializer)
    }
}
