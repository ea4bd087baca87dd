use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical action every resource controller exposes for listing.
pub const GET_ACTION: &str = "Get";

/// Major (and optional minor) API version threaded into versioned URLs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: Option<u32>,
}

impl ApiVersion {
    pub const fn new(major: u32) -> Self {
        Self { major, minor: None }
    }

    pub const fn with_minor(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor: Some(minor),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minor {
            Some(minor) => write!(f, "{}.{}", self.major, minor),
            None => write!(f, "{}", self.major),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid api version: {0:?}")]
pub struct InvalidApiVersion(pub String);

impl FromStr for ApiVersion {
    type Err = InvalidApiVersion;

    /// Accepts `1`, `1.2`, `v1` and `V1.2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidApiVersion(s.to_string());
        let raw = s.trim();
        let raw = raw
            .strip_prefix('v')
            .or_else(|| raw.strip_prefix('V'))
            .unwrap_or(raw);

        let (major, minor) = match raw.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (raw, None),
        };
        let major = major.parse().map_err(|_| err())?;
        let minor = minor
            .map(|m| m.parse::<u32>())
            .transpose()
            .map_err(|_| err())?;
        Ok(Self { major, minor })
    }
}

/// Produces canonical base URLs for controller actions.
///
/// Implementations must give distinct resources distinct URLs. The
/// `version`, when present, must be encoded in the returned URL.
pub trait UrlBuilder {
    fn action(&self, action: &str, controller: &str, version: Option<&ApiVersion>) -> String;
}

impl<U: UrlBuilder + ?Sized> UrlBuilder for &U {
    fn action(&self, action: &str, controller: &str, version: Option<&ApiVersion>) -> String {
        (**self).action(action, controller, version)
    }
}

/// Route-template URL builder.
///
/// Renders `{base}/{controller}/{action}`, or
/// `{base}/{prefix}{major}/{controller}/{action}` for versioned calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteUrlBuilder {
    base_url: String,
    version_prefix: String,
}

impl RouteUrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            version_prefix: "v".to_string(),
        }
    }

    pub fn with_version_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.version_prefix = prefix.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl UrlBuilder for RouteUrlBuilder {
    fn action(&self, action: &str, controller: &str, version: Option<&ApiVersion>) -> String {
        match version {
            // routes are keyed by major version only
            Some(v) => format!(
                "{}/{}{}/{}/{}",
                self.base_url, self.version_prefix, v.major, controller, action
            ),
            None => format!("{}/{}/{}", self.base_url, controller, action),
        }
    }
}
