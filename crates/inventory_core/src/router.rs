//! Resource identifiers and route classification.
//!
//! Identifier format: `store://<authority>/products[/<row-id>]`.
//!
//! # Responsibility
//! - Parse and print the structured identifiers exchanged with callers.
//! - Classify identifiers into collection vs single-item targets.
//!
//! # Invariants
//! - Every facade operation consults the same route table; identifiers
//!   are never parsed per-operation.
//! - Route patterns are evaluated in registration order; first match
//!   wins.

use crate::model::product::ProductId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// URI scheme carried by every resource identifier this crate serves.
pub const SCHEME: &str = "store";
/// Fixed application identifier all product identifiers carry.
pub const AUTHORITY: &str = "inventory";
/// Path of the product collection under the authority.
pub const PRODUCTS_PATH: &str = "products";

static COLLECTION_ROUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^products$").expect("valid collection route pattern"));
static ITEM_ROUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^products/([0-9]+)$").expect("valid item route pattern"));

/// A parsed resource identifier: authority plus rooted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceUri {
    pub authority: String,
    pub path: String,
}

impl ResourceUri {
    pub fn new(authority: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            path: path.into(),
        }
    }

    /// Identifier of the whole product collection.
    pub fn collection() -> Self {
        Self::new(AUTHORITY, PRODUCTS_PATH)
    }

    /// Identifier of the single product row with the given id.
    pub fn item(id: ProductId) -> Self {
        Self::new(AUTHORITY, format!("{PRODUCTS_PATH}/{id}"))
    }

    /// Identifier one path segment up, if any.
    ///
    /// A single-item identifier yields its collection; the collection
    /// itself has no parent.
    pub fn parent(&self) -> Option<ResourceUri> {
        let (head, _) = self.path.rsplit_once('/')?;
        Some(Self::new(self.authority.clone(), head))
    }

    /// Whether `other` names a resource nested under this identifier.
    pub fn is_ancestor_of(&self, other: &ResourceUri) -> bool {
        self.authority == other.authority
            && other.path.len() > self.path.len()
            && other.path.starts_with(&self.path)
            && other.path.as_bytes()[self.path.len()] == b'/'
    }

    /// Parses `store://<authority>/<path>`.
    pub fn parse(input: &str) -> Result<Self, UriParseError> {
        let (scheme, rest) = input
            .split_once("://")
            .ok_or_else(|| UriParseError::MissingScheme(input.to_string()))?;
        if scheme != SCHEME {
            return Err(UriParseError::UnknownScheme(scheme.to_string()));
        }
        let (authority, path) = rest
            .split_once('/')
            .ok_or_else(|| UriParseError::MissingPath(input.to_string()))?;
        if authority.is_empty() {
            return Err(UriParseError::MissingAuthority(input.to_string()));
        }
        if path.is_empty() {
            return Err(UriParseError::MissingPath(input.to_string()));
        }
        Ok(Self::new(authority, path))
    }
}

impl Display for ResourceUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{SCHEME}://{}/{}", self.authority, self.path)
    }
}

impl FromStr for ResourceUri {
    type Err = UriParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// An identifier string does not have the `scheme://authority/path` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriParseError {
    MissingScheme(String),
    UnknownScheme(String),
    MissingAuthority(String),
    MissingPath(String),
}

impl Display for UriParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingScheme(input) => {
                write!(f, "resource identifier `{input}` has no scheme")
            }
            Self::UnknownScheme(scheme) => {
                write!(f, "unknown resource scheme `{scheme}`, expected `{SCHEME}`")
            }
            Self::MissingAuthority(input) => {
                write!(f, "resource identifier `{input}` has no authority")
            }
            Self::MissingPath(input) => {
                write!(f, "resource identifier `{input}` has no path")
            }
        }
    }
}

impl Error for UriParseError {}

/// The classification a resource identifier resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceMatch {
    /// The whole product collection.
    Collection,
    /// One product row, addressed by id.
    SingleItem(ProductId),
    /// No registered route matches.
    Unrecognized,
}

/// Tag for a registered route pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteKind {
    Collection,
    Item,
}

struct Route {
    pattern: &'static Regex,
    kind: RouteKind,
}

/// Maps resource identifiers to operation targets.
///
/// Configured once at construction with the two product routes. All four
/// facade operations share this classification, so URI handling cannot
/// drift between them.
pub struct ResourceRouter {
    authority: String,
    routes: Vec<Route>,
}

impl ResourceRouter {
    /// Router for the default authority.
    pub fn new() -> Self {
        Self::with_authority(AUTHORITY)
    }

    /// Router for a caller-chosen authority, with the standard routes.
    pub fn with_authority(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            routes: vec![
                Route {
                    pattern: &COLLECTION_ROUTE,
                    kind: RouteKind::Collection,
                },
                Route {
                    pattern: &ITEM_ROUTE,
                    kind: RouteKind::Item,
                },
            ],
        }
    }

    /// Classifies an identifier against the registered routes.
    ///
    /// Identifiers under another authority, unknown paths, and numeric
    /// segments that do not fit a row id all come back `Unrecognized`.
    pub fn classify(&self, uri: &ResourceUri) -> ResourceMatch {
        if uri.authority != self.authority {
            return ResourceMatch::Unrecognized;
        }
        for route in &self.routes {
            let Some(captures) = route.pattern.captures(&uri.path) else {
                continue;
            };
            return match route.kind {
                RouteKind::Collection => ResourceMatch::Collection,
                RouteKind::Item => match captures[1].parse::<ProductId>() {
                    Ok(id) => ResourceMatch::SingleItem(id),
                    Err(_) => ResourceMatch::Unrecognized,
                },
            };
        }
        ResourceMatch::Unrecognized
    }
}

impl Default for ResourceRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{ResourceMatch, ResourceRouter, ResourceUri};

    #[test]
    fn parent_of_item_is_collection() {
        assert_eq!(
            ResourceUri::item(7).parent(),
            Some(ResourceUri::collection())
        );
        assert_eq!(ResourceUri::collection().parent(), None);
    }

    #[test]
    fn ancestor_check_requires_segment_boundary() {
        let collection = ResourceUri::collection();
        assert!(collection.is_ancestor_of(&ResourceUri::item(12)));
        assert!(!collection.is_ancestor_of(&ResourceUri::new("inventory", "products_archive")));
        assert!(!collection.is_ancestor_of(&collection));
    }

    #[test]
    fn first_matching_route_wins() {
        let router = ResourceRouter::new();
        assert_eq!(
            router.classify(&ResourceUri::collection()),
            ResourceMatch::Collection
        );
        assert_eq!(
            router.classify(&ResourceUri::item(3)),
            ResourceMatch::SingleItem(3)
        );
    }
}
