use std::collections::BTreeMap;

use serde::Serialize;

use crate::entity::Entity;

/// Type tag used for payloads that are not entities.
pub const ANONYMOUS_TYPE: &str = "Anonymous";

/// Link relation → URL. `None` marks a relation that is known but absent
/// (for example `previous` on the first page) and serializes as `null`.
pub type Links = BTreeMap<String, Option<String>>;

/// Free-form metadata about a resource.
pub type Meta = BTreeMap<String, serde_json::Value>;

/// Embedded sub-resources keyed by property name.
pub type Embedded<'a> = BTreeMap<String, EmbeddedResource<'a>>;

/// A Hypertext Application Language representation of a resource.
#[derive(Clone, Debug, Serialize)]
pub struct HalResource<'a, T> {
    #[serde(rename = "_links")]
    pub links: Links,

    #[serde(rename = "_meta")]
    pub meta: Meta,

    #[serde(rename = "_embedded")]
    pub embedded: Embedded<'a>,

    pub resource: T,
}

/// Value of one `_embedded` entry: a single resource or an ordered list.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum EmbeddedResource<'a> {
    One(Box<HalResource<'a, &'a dyn Entity>>),
    Many(Vec<HalResource<'a, &'a dyn Entity>>),
}

impl<'a> EmbeddedResource<'a> {
    pub fn as_one(&self) -> Option<&HalResource<'a, &'a dyn Entity>> {
        match self {
            EmbeddedResource::One(r) => Some(r),
            EmbeddedResource::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[HalResource<'a, &'a dyn Entity>]> {
        match self {
            EmbeddedResource::One(_) => None,
            EmbeddedResource::Many(list) => Some(list),
        }
    }
}

impl<'a, T> HalResource<'a, T> {
    pub fn new(links: Links, meta: Meta, resource: T) -> Self {
        Self::with_embedded(links, meta, BTreeMap::new(), resource)
    }

    pub fn with_embedded(links: Links, meta: Meta, embedded: Embedded<'a>, resource: T) -> Self {
        Self {
            links,
            meta,
            embedded,
            resource,
        }
    }

    /// Wrap `resource` with nothing but a `self` link.
    pub fn with_self(self_link: impl Into<String>, resource: T) -> Self {
        let mut links = Links::new();
        links.insert("self".to_string(), Some(self_link.into()));
        Self::new(links, Meta::new(), resource)
    }

    pub fn self_link(&self) -> Option<&str> {
        self.link("self")
    }

    /// URL of the `name` relation; `None` when missing or explicitly null.
    pub fn link(&self, name: &str) -> Option<&str> {
        self.links.get(name).and_then(|l| l.as_deref())
    }

    pub fn meta_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.meta.get(name)
    }

    pub fn embedded_entry(&self, name: &str) -> Option<&EmbeddedResource<'a>> {
        self.embedded.get(name)
    }

    /// Map the wrapped resource while keeping links, meta and embedded data.
    pub fn map_resource<U>(self, f: impl FnOnce(T) -> U) -> HalResource<'a, U> {
        HalResource {
            links: self.links,
            meta: self.meta,
            embedded: self.embedded,
            resource: f(self.resource),
        }
    }
}
