//! Transport-agnostic hypermedia model: entities, link declarations,
//! HAL resources and page state.
//!
//! Nothing in this crate knows how URLs are built or how responses are
//! written; see `halkit` for the builders.

pub mod entity;
pub mod page;
pub mod query;
pub mod resource;

pub use entity::{
    Embed, EmbeddedProperty, Entity, EntityId, EntityKind, LinkDeclaration, MetaContributor,
};
pub use page::{PageParams, PagedEntities, SortParam, DEFAULT_PAGE_SIZE};
pub use query::{format_desc, PageLimits, MAX_PAGE_SIZE};
pub use resource::{Embedded, EmbeddedResource, HalResource, Links, Meta, ANONYMOUS_TYPE};

/// Errors raised while reading page state supplied by a caller.
///
/// The builders themselves never fail; these are produced at the boundary
/// where raw query strings or JSON bodies are turned into [`PageParams`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("page state is missing")]
    MissingPageState,

    #[error("malformed page state: {0}")]
    MalformedPageState(String),

    #[error("invalid page size: {0}")]
    InvalidPageSize(u64),

    #[error("page size {size} exceeds the maximum of {max}")]
    PageSizeTooLarge { size: u64, max: u64 },

    #[error("invalid page number: {0}")]
    InvalidPageNumber(String),

    #[error("invalid sort direction: {0}")]
    InvalidSortDirection(String),

    #[error("sort direction given without a sort field")]
    SortWithoutField,
}

pub type Result<T> = std::result::Result<T, Error>;
