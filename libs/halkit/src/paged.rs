//! Collection envelopes with navigation links.

use hal_core::{
    format_desc, Entity, HalResource, Links, Meta, PageParams, PagedEntities, SortParam,
};
use serde_json::Value;

use crate::resource_builder::ResourceBuilder;
use crate::url::UrlBuilder;
use crate::SELF_REL;

/// `&Sort={field}&Desc={True|False}` per sort key, in request order.
pub fn sort_query_fragment(sort: &[SortParam]) -> String {
    sort.iter()
        .map(|s| {
            format!(
                "&Sort={}&Desc={}",
                urlencoding::encode(&s.field),
                format_desc(s.desc)
            )
        })
        .collect()
}

/// Navigation links of one collection page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLinks {
    pub self_link: String,
    /// `None` on the first page.
    pub previous: Option<String>,
    /// Clamped to `pages` once there is no further page.
    pub next: String,
    pub first: String,
    pub last: String,
}

impl PageLinks {
    pub fn compute(self_link_base: &str, params: &PageParams, pages: u64) -> Self {
        let self_link = format!(
            "{}?size={}{}",
            self_link_base,
            params.size,
            sort_query_fragment(&params.sort)
        );
        let at = |page: u64| format!("{}&page={}", self_link, page);

        let next_page = match params.page.checked_add(1) {
            Some(next) if next < pages => next,
            _ => pages,
        };

        Self {
            previous: params.page.checked_sub(1).map(at),
            next: at(next_page),
            first: at(0),
            last: at(pages),
            self_link,
        }
    }

    pub fn into_links(self) -> Links {
        Links::from([
            (SELF_REL.to_string(), Some(self.self_link)),
            ("previous".to_string(), self.previous),
            ("next".to_string(), Some(self.next)),
            ("first".to_string(), Some(self.first)),
            ("last".to_string(), Some(self.last)),
        ])
    }
}

/// Builds collection envelopes, delegating each item to a [`ResourceBuilder`].
///
/// A versioned `ResourceBuilder` makes this the versioned envelope builder:
/// items get versioned links and [`PageBuilder::build_versioned_page`]
/// resolves its own self link with the same version.
#[derive(Debug)]
pub struct PageBuilder<'u, U: ?Sized> {
    resources: ResourceBuilder<'u, U>,
}

impl<U: ?Sized> Clone for PageBuilder<'_, U> {
    fn clone(&self) -> Self {
        Self {
            resources: self.resources.clone(),
        }
    }
}

impl<'u, U: UrlBuilder + ?Sized> PageBuilder<'u, U> {
    pub fn new(resources: ResourceBuilder<'u, U>) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &ResourceBuilder<'u, U> {
        &self.resources
    }

    /// `page_params` is the validated request state; it drives the links
    /// and the reported sort. `page`/`size` in the metadata come from the
    /// state the result was produced with.
    pub fn build_page<'a, E: Entity>(
        &self,
        page_params: &PageParams,
        self_link_base: &str,
        paged: &'a PagedEntities<E>,
    ) -> HalResource<'a, Vec<HalResource<'a, &'a E>>> {
        let items = paged
            .items
            .iter()
            .map(|item| self.resources.build(item))
            .collect();
        envelope(page_params, self_link_base, paged, items)
    }

    /// Like [`build_page`](Self::build_page), resolving the self link base
    /// from `controller`/`action` and this builder's API version.
    pub fn build_versioned_page<'a, E: Entity>(
        &self,
        controller: &str,
        action: &str,
        page_params: &PageParams,
        paged: &'a PagedEntities<E>,
    ) -> HalResource<'a, Vec<HalResource<'a, &'a E>>> {
        let self_link_base = self
            .resources
            .url()
            .action(action, controller, self.resources.version());
        self.build_page(page_params, &self_link_base, paged)
    }

    /// Envelope over payloads that are not entities.
    pub fn build_anonymous_page<'a, T>(
        &self,
        page_params: &PageParams,
        self_link_base: &str,
        paged: &'a PagedEntities<T>,
    ) -> HalResource<'a, Vec<HalResource<'static, &'a T>>> {
        let items = paged
            .items
            .iter()
            .map(|item| {
                self.resources
                    .build_anonymous(item, Links::new(), Meta::new())
            })
            .collect();
        envelope(page_params, self_link_base, paged, items)
    }
}

fn envelope<'a, T, R>(
    page_params: &PageParams,
    self_link_base: &str,
    paged: &PagedEntities<T>,
    items: Vec<R>,
) -> HalResource<'a, Vec<R>> {
    let links = PageLinks::compute(self_link_base, page_params, paged.pages).into_links();

    let last_sort = page_params.last_sort();
    let meta = Meta::from([
        ("count".to_string(), Value::from(paged.count)),
        ("pages".to_string(), Value::from(paged.pages)),
        ("page".to_string(), Value::from(paged.page_params.page)),
        ("size".to_string(), Value::from(paged.page_params.size)),
        (
            "sort".to_string(),
            last_sort.map_or(Value::Null, |s| Value::from(s.field.as_str())),
        ),
        (
            "desc".to_string(),
            Value::from(last_sort.is_some_and(|s| s.desc)),
        ),
    ]);

    tracing::debug!(
        count = paged.count,
        pages = paged.pages,
        page = page_params.page,
        items = items.len(),
        "built page envelope"
    );

    HalResource::new(links, meta, items)
}
