//! Catalogue search: scope parsing and matching semantics.
//!
//! Matching is plain case-insensitive substring containment, never
//! tokenized or stemmed ("diabetes" must not match "diabetic"). DDA
//! candidates are scanned as a flat JSON text blob; only the tags scope
//! is field-specific.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

/// Which dimensions a search request covers.
///
/// Every flag defaults to `true` when absent from the query string. A
/// request where all five resolve to `false` is invalid.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchScopes {
    pub search_org_name: bool,
    pub search_dda_purpose: bool,
    pub search_dda_description: bool,
    pub search_dataset: bool,
    pub search_tags: bool,
}

impl SearchScopes {
    pub fn any_enabled(&self) -> bool {
        self.search_org_name
            || self.search_dda_purpose
            || self.search_dda_description
            || self.search_dataset
            || self.search_tags
    }

    /// Whether the whole-record blob scan runs at all. The purpose,
    /// description, and dataset flags share one underlying mechanism;
    /// they gate the scan rather than scoping it to sub-fields.
    pub fn record_scan_enabled(&self) -> bool {
        self.search_dda_purpose || self.search_dda_description || self.search_dataset
    }

    /// Whether any DDA-side scope is active (blob scan or tags).
    pub fn dda_scopes_enabled(&self) -> bool {
        self.record_scan_enabled() || self.search_tags
    }
}

/// Parse a boolean query parameter.
///
/// Accepts the literals `"true"`/`"false"` case-insensitively; anything
/// else is a validation error naming the offending parameter. Absent
/// parameters take the default.
pub fn parse_bool_param(raw: Option<&str>, name: &str, default: bool) -> Result<bool, String> {
    match raw {
        None => Ok(default),
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(format!(
                "Invalid value for {name}; expected 'true' or 'false'"
            )),
        },
    }
}

/// Sort dimension for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Relevance,
    OrgName,
    OrgCreatedAt,
    DdaCreatedAt,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" => Ok(SortBy::Relevance),
            "orgName" => Ok(SortBy::OrgName),
            "orgCreatedAt" => Ok(SortBy::OrgCreatedAt),
            "ddaCreatedAt" => Ok(SortBy::DdaCreatedAt),
            _ => Err("Invalid sortBy parameter".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err("Invalid sortOrder parameter".to_string()),
        }
    }
}

/// Case-insensitive containment test for the organisation scope.
///
/// Name and description are folded into the one scope (a historical
/// coupling preserved from the original contract).
pub fn org_matches(name: &str, description: &str, term_lower: &str) -> bool {
    name.to_lowercase().contains(term_lower)
        || description.to_lowercase().contains(term_lower)
}

/// Serialize a record document to a flat text blob and test containment.
///
/// A hit on any field of the document counts; there is no field-level
/// scoping at the record level.
pub fn record_contains(record: &Value, term_lower: &str) -> bool {
    record.to_string().to_lowercase().contains(term_lower)
}

/// Per-tag containment for the field-specific tags scope.
pub fn tags_contain(tags: &[String], term_lower: &str) -> bool {
    tags.iter()
        .any(|tag| tag.to_lowercase().contains(term_lower))
}
