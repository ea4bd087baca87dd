use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortParam {
    #[serde(alias = "Field")]
    pub field: String,
    #[serde(default, alias = "Desc")]
    pub desc: bool,
}

impl SortParam {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            desc: true,
        }
    }
}

/// Page size, zero-based page number and ordered sort keys for one query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageParams {
    #[serde(alias = "Page")]
    pub page: u64,
    #[serde(alias = "Size")]
    pub size: u64,
    #[serde(alias = "Sort")]
    pub sort: Vec<SortParam>,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

impl PageParams {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn with_sort(mut self, sort: Vec<SortParam>) -> Self {
        self.sort = sort;
        self
    }

    /// Append one sort key; later keys are lower priority.
    pub fn sort_by(mut self, field: impl Into<String>, desc: bool) -> Self {
        self.sort.push(SortParam {
            field: field.into(),
            desc,
        });
        self
    }

    /// The last requested sort key, which is what collection metadata reports.
    pub fn last_sort(&self) -> Option<&SortParam> {
        self.sort.last()
    }

    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidPageSize(self.size));
        }
        if self.sort.iter().any(|s| s.field.trim().is_empty()) {
            return Err(Error::SortWithoutField);
        }
        Ok(())
    }

    /// Decode page state posted as a JSON object.
    ///
    /// `null` and non-object values mean no page state was supplied; an
    /// object that does not have the expected shape is malformed.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::MissingPageState);
        }
        let params: PageParams = serde_json::from_value(value.clone())
            .map_err(|e| Error::MalformedPageState(e.to_string()))?;
        params.validate()?;
        Ok(params)
    }
}

/// An already computed page of results: the items plus the totals and the
/// page state that produced them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PagedEntities<T> {
    pub items: Vec<T>,
    pub count: u64,
    pub pages: u64,
    pub page_params: PageParams,
}

impl<T> PagedEntities<T> {
    pub fn new(items: Vec<T>, count: u64, pages: u64, page_params: PageParams) -> Self {
        Self {
            items,
            count,
            pages,
            page_params,
        }
    }

    pub fn empty(page_params: PageParams) -> Self {
        Self::new(Vec::new(), 0, 0, page_params)
    }

    /// Slice an in-memory collection. `pages` is `ceil(count / size)`.
    pub fn from_slice(all: &[T], page_params: PageParams) -> Self
    where
        T: Clone,
    {
        let size = page_params.size.max(1);
        let count = all.len() as u64;
        let pages = count.div_ceil(size);
        let start = page_params.page.saturating_mul(size).min(count) as usize;
        let end = (start as u64).saturating_add(size).min(count) as usize;
        Self::new(all[start..end].to_vec(), count, pages, page_params)
    }

    /// Map items while preserving totals and page state.
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> PagedEntities<U> {
        PagedEntities {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
            pages: self.pages,
            page_params: self.page_params,
        }
    }
}
