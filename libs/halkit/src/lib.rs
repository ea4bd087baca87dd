//! # HalKit - entity to hypermedia projection
//!
//! Turns any [`hal_core::Entity`] into a HAL document and wraps pages of
//! entities in collection envelopes with navigation links.
//!
//! - [`ResourceBuilder`] walks declared links and embeddable properties
//! - [`PageBuilder`] computes `self/previous/next/first/last` links and
//!   collection metadata, delegating items to a `ResourceBuilder`
//! - both accept an optional [`ApiVersion`] that is threaded into every
//!   generated URL
//!
//! ## Example
//!
//! ```rust,ignore
//! use halkit::{PageBuilder, ResourceBuilder, RouteUrlBuilder};
//!
//! let urls = RouteUrlBuilder::new("https://api.example.com");
//! let order = ResourceBuilder::new(&urls).build(&order);
//! assert_eq!(order.self_link(), Some("https://api.example.com/Order/Get/42"));
//! ```

pub use hal_core::{
    Embed, EmbeddedProperty, EmbeddedResource, Entity, EntityId, EntityKind, HalResource,
    LinkDeclaration, Links, Meta, MetaContributor, PageLimits, PageParams, PagedEntities,
    SortParam,
};

pub mod links;
pub mod paged;
pub mod resource_builder;
pub mod url;

// HTTP boundary helpers
pub mod api;

pub use api::page_query::PageQuery;
pub use api::problem::{bad_request, Problem, ProblemResponse};
pub use api::response::HalJson;
pub use links::{read_link_declarations, LinkReader};
pub use paged::{sort_query_fragment, PageBuilder, PageLinks};
pub use resource_builder::{CycleGuard, ResourceBuilder};
pub use url::{ApiVersion, InvalidApiVersion, RouteUrlBuilder, UrlBuilder, GET_ACTION};

/// Link relation every resource carries.
pub const SELF_REL: &str = "self";

/// Metadata key holding the resource type name.
pub const TYPE_KEY: &str = "type";
