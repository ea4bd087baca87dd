//! Page state carried in query strings.
//!
//! Collection links are written as `?size=N&Sort=f&Desc=False...&page=P`;
//! [`PageParams::from_query`] reads that shape back.

use serde::{Deserialize, Serialize};

use crate::page::{PageParams, SortParam, DEFAULT_PAGE_SIZE};
use crate::{Error, Result};

pub const MAX_PAGE_SIZE: u64 = 1000;

/// Bounds applied when page state comes from an untrusted source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLimits {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    pub fn check(&self, params: &PageParams) -> Result<()> {
        params.validate()?;
        if params.size > self.max_size {
            return Err(Error::PageSizeTooLarge {
                size: params.size,
                max: self.max_size,
            });
        }
        Ok(())
    }
}

/// `True`/`False`, as written into collection links.
pub fn format_desc(desc: bool) -> &'static str {
    if desc {
        "True"
    } else {
        "False"
    }
}

fn parse_desc(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::InvalidSortDirection(raw.to_string())),
    }
}

impl PageParams {
    /// Parse `size`, `page` and repeated `Sort`/`Desc` pairs.
    ///
    /// Keys are case-insensitive and unknown keys are ignored. Each `Desc`
    /// applies to the closest preceding `Sort` that has no direction yet;
    /// a `Sort` without a `Desc` is ascending.
    pub fn from_query(raw: &str, limits: &PageLimits) -> Result<Self> {
        let raw = raw.strip_prefix('?').unwrap_or(raw);

        let mut params = PageParams {
            page: 0,
            size: limits.default_size,
            sort: Vec::new(),
        };
        // index of the sort key still waiting for its direction
        let mut pending: Option<usize> = None;

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.to_ascii_lowercase().as_str() {
                "size" => {
                    params.size = value
                        .trim()
                        .parse()
                        .map_err(|_| Error::MalformedPageState(format!("size={}", value)))?;
                }
                "page" => {
                    params.page = value
                        .trim()
                        .parse()
                        .map_err(|_| Error::InvalidPageNumber(value.to_string()))?;
                }
                "sort" => {
                    let field = value.trim();
                    if field.is_empty() {
                        return Err(Error::SortWithoutField);
                    }
                    params.sort.push(SortParam::asc(field));
                    pending = Some(params.sort.len() - 1);
                }
                "desc" => {
                    let idx = pending.take().ok_or(Error::SortWithoutField)?;
                    params.sort[idx].desc = parse_desc(&value)?;
                }
                _ => {}
            }
        }

        limits.check(&params)?;
        Ok(params)
    }
}
