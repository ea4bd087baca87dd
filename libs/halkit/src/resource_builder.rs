//! Entity → HAL resource projection.
//!
//! One builder serves both plain and versioned APIs; the only difference
//! is the optional [`ApiVersion`] passed to the [`UrlBuilder`] and the shape
//! of the synthesized self link.

use serde::{Deserialize, Serialize};

use hal_core::{
    Embed, Embedded, EmbeddedResource, Entity, HalResource, Links, Meta, ANONYMOUS_TYPE,
};

use crate::url::{ApiVersion, UrlBuilder, GET_ACTION};
use crate::{SELF_REL, TYPE_KEY};

/// Which entities are left out of `_embedded` to stop self-embedding.
///
/// An entity is a repeat when both its declared type and id match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleGuard {
    /// Compare against the immediate parent only.
    Parent,
    /// Compare against every entity on the path from the root.
    #[default]
    Ancestors,
}

type Parts<'a> = (Links, Meta, Embedded<'a>);

#[derive(Debug)]
pub struct ResourceBuilder<'u, U: ?Sized> {
    url: &'u U,
    version: Option<ApiVersion>,
    cycle_guard: CycleGuard,
}

impl<U: ?Sized> Clone for ResourceBuilder<'_, U> {
    fn clone(&self) -> Self {
        Self {
            url: self.url,
            version: self.version,
            cycle_guard: self.cycle_guard,
        }
    }
}

impl<'u, U: UrlBuilder + ?Sized> ResourceBuilder<'u, U> {
    pub fn new(url: &'u U) -> Self {
        Self {
            url,
            version: None,
            cycle_guard: CycleGuard::default(),
        }
    }

    /// Thread `version` through every URL this builder synthesizes.
    pub fn versioned(mut self, version: ApiVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_cycle_guard(mut self, guard: CycleGuard) -> Self {
        self.cycle_guard = guard;
        self
    }

    pub fn version(&self) -> Option<&ApiVersion> {
        self.version.as_ref()
    }

    pub fn url(&self) -> &'u U {
        self.url
    }

    pub fn build<'a, E: Entity>(&self, entity: &'a E) -> HalResource<'a, &'a E> {
        self.build_with(entity, Links::new(), Meta::new())
    }

    /// Build with caller-supplied links and metadata as the baseline.
    ///
    /// Caller entries win over declared relation links and the synthesized
    /// self link; the entity's own metadata hook runs after them and may
    /// override anything.
    pub fn build_with<'a, E: Entity>(
        &self,
        entity: &'a E,
        links: Links,
        meta: Meta,
    ) -> HalResource<'a, &'a E> {
        let (links, meta, embedded) = self.assemble(entity, links, meta, &mut Vec::new());
        tracing::debug!(
            entity_type = entity.type_name(),
            id = %entity.entity_id(),
            links = links.len(),
            embedded = embedded.len(),
            "built hal resource"
        );
        HalResource::with_embedded(links, meta, embedded, entity)
    }

    pub fn build_dyn<'a>(
        &self,
        entity: &'a dyn Entity,
        links: Links,
        meta: Meta,
    ) -> HalResource<'a, &'a dyn Entity> {
        let (links, meta, embedded) = self.assemble(entity, links, meta, &mut Vec::new());
        HalResource::with_embedded(links, meta, embedded, entity)
    }

    /// Wrap a payload that is not an entity.
    ///
    /// Nothing is embedded and no self link is synthesized; `type` defaults
    /// to `"Anonymous"`.
    pub fn build_anonymous<T>(
        &self,
        payload: T,
        links: Links,
        mut meta: Meta,
    ) -> HalResource<'static, T> {
        meta.entry(TYPE_KEY.to_string())
            .or_insert_with(|| ANONYMOUS_TYPE.into());
        HalResource::new(links, meta, payload)
    }

    fn assemble<'a>(
        &self,
        entity: &'a dyn Entity,
        mut links: Links,
        mut meta: Meta,
        path: &mut Vec<&'a dyn Entity>,
    ) -> Parts<'a> {
        path.push(entity);
        let embedded = self.embed(entity, path);
        path.pop();

        self.populate_links(entity, &mut links);
        entity.contribute_meta(&mut meta);

        if !matches!(links.get(SELF_REL), Some(Some(_))) {
            links.insert(SELF_REL.to_string(), Some(self.self_link(entity)));
        }
        meta.entry(TYPE_KEY.to_string())
            .or_insert_with(|| entity.type_name().into());

        (links, meta, embedded)
    }

    fn embed<'a>(&self, entity: &'a dyn Entity, path: &mut Vec<&'a dyn Entity>) -> Embedded<'a> {
        let mut out = Embedded::new();

        for (name, value) in entity.embedded() {
            match value {
                Embed::One(child) => {
                    if self.is_repeat(child, path) {
                        tracing::trace!(
                            property = name,
                            entity_type = child.type_name(),
                            id = %child.entity_id(),
                            "skipping self-referencing embedded entity"
                        );
                        continue;
                    }
                    let resource = self.child_resource(child, path);
                    out.insert(name.to_string(), EmbeddedResource::One(Box::new(resource)));
                }
                Embed::Many(children) => {
                    let mut list = Vec::with_capacity(children.len());
                    for child in children {
                        if self.is_repeat(child, path) {
                            tracing::trace!(
                                property = name,
                                entity_type = child.type_name(),
                                id = %child.entity_id(),
                                "skipping self-referencing embedded entity"
                            );
                            continue;
                        }
                        list.push(self.child_resource(child, path));
                    }
                    out.insert(name.to_string(), EmbeddedResource::Many(list));
                }
            }
        }

        out
    }

    fn child_resource<'a>(
        &self,
        child: &'a dyn Entity,
        path: &mut Vec<&'a dyn Entity>,
    ) -> HalResource<'a, &'a dyn Entity> {
        let (links, meta, embedded) = self.assemble(child, Links::new(), Meta::new(), path);
        HalResource::with_embedded(links, meta, embedded, child)
    }

    /// `path` ends with the entity whose properties are being embedded.
    fn is_repeat(&self, candidate: &dyn Entity, path: &[&dyn Entity]) -> bool {
        match self.cycle_guard {
            CycleGuard::Parent => path.last().is_some_and(|p| p.same_entity(candidate)),
            CycleGuard::Ancestors => path.iter().any(|p| p.same_entity(candidate)),
        }
    }

    /// Declared relations point at the target's list action, qualified by
    /// this entity's type and id: `{Target}/Get/{Type}/{id}`.
    fn populate_links(&self, entity: &dyn Entity, links: &mut Links) {
        let id = entity.entity_id();
        for decl in entity.link_declarations() {
            links.entry(decl.name.to_string()).or_insert_with(|| {
                let base = self.url.action(GET_ACTION, decl.resource, self.version.as_ref());
                Some(format!("{}/{}/{}", base, entity.type_name(), id))
            });
        }
    }

    /// `{Type}/Get/{id}` for plain APIs, `{Type}/{id}` for versioned ones.
    fn self_link(&self, entity: &dyn Entity) -> String {
        let base = self
            .url
            .action(GET_ACTION, entity.type_name(), self.version.as_ref());
        let base = match self.version {
            Some(_) => strip_action(&base, GET_ACTION),
            None => base.as_str(),
        };
        format!("{}/{}", base, entity.entity_id())
    }
}

/// Drop one trailing `/{action}` segment, compared ASCII case-insensitively.
fn strip_action<'s>(url: &'s str, action: &str) -> &'s str {
    let Some(cut) = url.len().checked_sub(action.len() + 1) else {
        return url;
    };
    if !url.is_char_boundary(cut) {
        return url;
    }
    let (head, tail) = url.split_at(cut);
    match tail.strip_prefix('/') {
        Some(last) if last.eq_ignore_ascii_case(action) => head,
        _ => url,
    }
}

#[cfg(test)]
#[path = "resource_builder_tests.rs"]
mod resource_builder_tests;
