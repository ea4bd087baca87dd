use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hal_core::{PageLimits, PageParams};

use crate::api::error::hal_error_to_problem;
use crate::api::problem::ProblemResponse;

/// Read and validate page state from the request query string.
///
/// Limits come from a [`PageLimits`] request extension when one is set
/// (e.g. by a layer built from configuration), otherwise the defaults.
/// A missing query string yields the default page state.
pub fn extract_page_params(parts: &Parts) -> Result<PageParams, ProblemResponse> {
    let limits = parts
        .extensions
        .get::<PageLimits>()
        .copied()
        .unwrap_or_default();
    let raw = parts.uri.query().unwrap_or("");

    PageParams::from_query(raw, &limits).map_err(|e| {
        tracing::debug!(error = %e, query = raw, "rejected page state");
        hal_error_to_problem(&e, parts.uri.path())
    })
}

/// Axum extractor for `size`, `page`, `Sort` and `Desc` query parameters.
///
/// Usage in handlers:
///   async fn list_orders(PageQuery(params): PageQuery) { /* ... */ }
#[derive(Debug, Clone)]
pub struct PageQuery(pub PageParams);

impl PageQuery {
    #[inline]
    pub fn into_inner(self) -> PageParams {
        self.0
    }
}

impl Deref for PageQuery {
    type Target = PageParams;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<PageParams> for PageQuery {
    #[inline]
    fn as_ref(&self) -> &PageParams {
        &self.0
    }
}

impl From<PageQuery> for PageParams {
    #[inline]
    fn from(x: PageQuery) -> Self {
        x.0
    }
}

impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = extract_page_params(parts).map(PageQuery);
        async move { result }
    }
}
