//! Builders wired from configuration.

use halkit::{
    ApiVersion, CycleGuard, Entity, HalResource, PageBuilder, PageLimits, PageParams,
    PagedEntities, ResourceBuilder, RouteUrlBuilder, UrlBuilder, GET_ACTION,
};
use runtime::HalConfig;

pub type Page<'a, E> = HalResource<'a, Vec<HalResource<'a, &'a E>>>;

#[derive(Clone, Debug)]
pub struct Renderer {
    urls: RouteUrlBuilder,
    cycle_guard: CycleGuard,
    limits: PageLimits,
}

impl Renderer {
    pub fn from_config(hal: &HalConfig) -> Self {
        Self {
            urls: hal.url_builder(),
            cycle_guard: hal.cycle_guard,
            limits: hal.paging,
        }
    }

    pub fn limits(&self) -> &PageLimits {
        &self.limits
    }

    pub fn resources(&self, version: Option<ApiVersion>) -> ResourceBuilder<'_, RouteUrlBuilder> {
        let builder = ResourceBuilder::new(&self.urls).with_cycle_guard(self.cycle_guard);
        match version {
            Some(v) => builder.versioned(v),
            None => builder,
        }
    }

    /// Envelope for the `controller` list action.
    pub fn collection<'a, E: Entity>(
        &self,
        controller: &str,
        version: Option<ApiVersion>,
        params: &PageParams,
        paged: &'a PagedEntities<E>,
    ) -> Page<'a, E> {
        let pages = PageBuilder::new(self.resources(version));
        match version {
            Some(_) => pages.build_versioned_page(controller, GET_ACTION, params, paged),
            None => {
                let base = self.urls.action(GET_ACTION, controller, None);
                pages.build_page(params, &base, paged)
            }
        }
    }

    /// Envelope for a relation link target, `{controller}/Get/{owner}/{id}`.
    pub fn related_collection<'a, E: Entity>(
        &self,
        controller: &str,
        owner: (&str, i64),
        version: Option<ApiVersion>,
        params: &PageParams,
        paged: &'a PagedEntities<E>,
    ) -> Page<'a, E> {
        let base = format!(
            "{}/{}/{}",
            self.urls.action(GET_ACTION, controller, version.as_ref()),
            owner.0,
            owner.1
        );
        PageBuilder::new(self.resources(version)).build_page(params, &base, paged)
    }
}
