//! HTTP routes serving the catalog as HAL documents.
//!
//! Plain routes live at the root; every supported major version is nested
//! under `/{version_prefix}{major}` so generated links resolve.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use axum::http::StatusCode;
use halkit::{
    ApiVersion, HalJson, PageParams, PageQuery, PagedEntities, Problem, ProblemResponse,
};
use tower_http::trace::TraceLayer;

use crate::catalog::{Catalog, Order};
use crate::render::Renderer;

pub const SUPPORTED_VERSIONS: &[u32] = &[1, 2];

pub struct AppState {
    pub catalog: Catalog,
    pub renderer: Renderer,
}

/// API version of the route that matched; `None` for plain routes.
#[derive(Clone, Copy, Debug)]
struct RouteVersion(Option<ApiVersion>);

type HandlerResult = Result<Response, ProblemResponse>;

fn not_found(what: &str, id: i64) -> ProblemResponse {
    Problem::new(
        StatusCode::NOT_FOUND,
        "Not Found",
        format!("{} {} does not exist", what, id),
    )
    .with_code("NOT_FOUND")
    .into()
}

fn routes(version: Option<ApiVersion>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/Orders/Get", get(list_orders))
        .route("/Orders/Get/Customer/{id}", get(customer_orders))
        .route("/Order/Get/{id}", get(get_order))
        .route("/Order/{id}", get(get_order))
        .route("/Customer/Get/{id}", get(get_customer))
        .route("/Customer/{id}", get(get_customer))
        .route("/Customers/Get/Order/{id}", get(order_customer))
        .layer(Extension(RouteVersion(version)))
}

pub fn router(state: Arc<AppState>, version_prefix: &str) -> Router {
    let prefix = version_prefix.trim_matches('/');
    let mut app = routes(None);
    for major in SUPPORTED_VERSIONS {
        let path = format!("/{}{}", prefix, major);
        app = app.nest(&path, routes(Some(ApiVersion::new(*major))));
    }

    app.layer(Extension(*state.renderer.limits()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Extension(RouteVersion(version)): Extension<RouteVersion>,
    Path(id): Path<i64>,
) -> HandlerResult {
    let order = state.catalog.order(id).ok_or_else(|| not_found("Order", id))?;
    let doc = state.renderer.resources(version).build(order);
    Ok(HalJson(doc).into_response())
}

async fn get_customer(
    State(state): State<Arc<AppState>>,
    Extension(RouteVersion(version)): Extension<RouteVersion>,
    Path(id): Path<i64>,
) -> HandlerResult {
    let customer = state
        .catalog
        .customer(id)
        .ok_or_else(|| not_found("Customer", id))?;
    let doc = state.renderer.resources(version).build(customer);
    Ok(HalJson(doc).into_response())
}

async fn order_customer(
    State(state): State<Arc<AppState>>,
    Extension(RouteVersion(version)): Extension<RouteVersion>,
    Path(id): Path<i64>,
) -> HandlerResult {
    let customer = state
        .catalog
        .order(id)
        .ok_or_else(|| not_found("Order", id))?
        .customer
        .as_ref()
        .ok_or_else(|| not_found("Customer of order", id))?;
    let doc = state.renderer.resources(version).build(customer);
    Ok(HalJson(doc).into_response())
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Extension(RouteVersion(version)): Extension<RouteVersion>,
    PageQuery(params): PageQuery,
) -> HandlerResult {
    let paged = page_for(&state.catalog, &params, None)?;
    let doc = state
        .renderer
        .collection("Orders", version, &params, &paged);
    Ok(HalJson(doc).into_response())
}

async fn customer_orders(
    State(state): State<Arc<AppState>>,
    Extension(RouteVersion(version)): Extension<RouteVersion>,
    Path(id): Path<i64>,
    PageQuery(params): PageQuery,
) -> HandlerResult {
    if state.catalog.customer(id).is_none() {
        return Err(not_found("Customer", id));
    }
    let paged = page_for(&state.catalog, &params, Some(id))?;
    let doc = state
        .renderer
        .related_collection("Orders", ("Customer", id), version, &params, &paged);
    Ok(HalJson(doc).into_response())
}

fn page_for(
    catalog: &Catalog,
    params: &PageParams,
    customer_id: Option<i64>,
) -> Result<PagedEntities<Order>, ProblemResponse> {
    catalog.page(params, customer_id).map_err(|e| {
        Problem::new(StatusCode::BAD_REQUEST, "Unknown Sort Field", e.to_string())
            .with_code("UNKNOWN_SORT_FIELD")
            .into()
    })
}
