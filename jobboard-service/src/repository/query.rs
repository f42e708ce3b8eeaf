//! Listing queries built from request parameters
//!
//! Each resource declares which query parameters it filters on and how
//! each one matches. [`build_filter`] turns the raw parameters into a
//! store [`Filter`]; parameters not named in the policy are ignored.

use std::collections::HashMap;

use super::pagination::PageRequest;
use crate::{ids::DocumentId, store::Filter};

/// How a filter parameter matches documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Case-insensitive substring on the named field
    Contains(&'static str),
    /// Exact identifier equality on the named field
    ///
    /// Values that do not parse as an identifier are dropped.
    ExactId(&'static str),
    /// Case-insensitive substring on any of the named fields
    AnyOf(&'static [&'static str]),
}

/// One filter parameter a resource accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    /// Query-string parameter name
    pub param: &'static str,
    /// How the value is matched
    pub kind: MatchKind,
}

impl FilterField {
    /// Substring match where the parameter and field share a name
    pub const fn contains(field: &'static str) -> Self {
        Self {
            param: field,
            kind: MatchKind::Contains(field),
        }
    }

    /// Identifier match where the parameter and field share a name
    pub const fn exact_id(field: &'static str) -> Self {
        Self {
            param: field,
            kind: MatchKind::ExactId(field),
        }
    }

    /// Substring match across several fields
    pub const fn any_of(param: &'static str, fields: &'static [&'static str]) -> Self {
        Self {
            param,
            kind: MatchKind::AnyOf(fields),
        }
    }
}

/// Build the conjunction of every non-empty policy parameter
///
/// Clauses appear in policy order. No usable parameter yields the
/// match-all filter.
pub fn build_filter(params: &HashMap<String, String>, policy: &[FilterField]) -> Filter {
    let clauses = policy
        .iter()
        .filter_map(|field| {
            let value = params.get(field.param).filter(|value| !value.is_empty())?;
            match field.kind {
                MatchKind::Contains(name) => Some(Filter::contains(name, value.as_str())),
                MatchKind::ExactId(name) => {
                    let id = DocumentId::parse(value).ok()?;
                    Some(Filter::eq(name, id.to_string()))
                }
                MatchKind::AnyOf(names) => Some(Filter::Or(
                    names
                        .iter()
                        .map(|name| Filter::contains(*name, value.as_str()))
                        .collect(),
                )),
            }
        })
        .collect();
    Filter::And(clauses)
}

/// Parsed parameters of a listing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// Normalised page
    pub page: PageRequest,
    /// Raw filter parameters
    pub filters: HashMap<String, String>,
    /// Requested sort field, empty when absent
    pub sort: String,
    /// Requested order token, empty when absent
    pub order: String,
}

impl ListParams {
    /// Split raw query parameters into paging, ordering and filters
    ///
    /// Non-numeric `page` or `limit` values fall back to the defaults.
    pub fn from_query(mut query: HashMap<String, String>) -> Self {
        let page = query.remove("page").and_then(|v| v.trim().parse().ok());
        let limit = query.remove("limit").and_then(|v| v.trim().parse().ok());
        let sort = query.remove("sort").unwrap_or_default();
        let order = query.remove("order").unwrap_or_default();
        Self {
            page: PageRequest::new(page, limit),
            filters: query,
            sort,
            order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &[FilterField] = &[
        FilterField::contains("title"),
        FilterField::exact_id("company_id"),
        FilterField::any_of("name", &["first_name", "last_name"]),
    ];

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_params_matches_all() {
        let filter = build_filter(&HashMap::new(), POLICY);
        assert!(filter.is_match_all());
    }

    #[test]
    fn test_empty_and_unknown_params_are_ignored() {
        let filter = build_filter(&params(&[("title", ""), ("salary", "100")]), POLICY);
        assert!(filter.is_match_all());
    }

    #[test]
    fn test_clauses_follow_policy_order() {
        let id = DocumentId::new();
        let filter = build_filter(
            &params(&[
                ("name", "ada"),
                ("company_id", &id.to_string()),
                ("title", "Rust"),
            ]),
            POLICY,
        );
        assert_eq!(
            filter,
            Filter::And(vec![
                Filter::contains("title", "Rust"),
                Filter::eq("company_id", id.to_string()),
                Filter::Or(vec![
                    Filter::contains("first_name", "ada"),
                    Filter::contains("last_name", "ada"),
                ]),
            ])
        );
    }

    #[test]
    fn test_malformed_id_is_dropped() {
        let filter = build_filter(&params(&[("company_id", "not-an-id")]), POLICY);
        assert!(filter.is_match_all());
    }

    #[test]
    fn test_list_params_from_query() {
        let parsed = ListParams::from_query(params(&[
            ("page", "2"),
            ("limit", "abc"),
            ("sort", "title"),
            ("order", "asc"),
            ("title", "engineer"),
        ]));
        assert_eq!(parsed.page, PageRequest::new(Some(2), None));
        assert_eq!(parsed.sort, "title");
        assert_eq!(parsed.order, "asc");
        assert_eq!(parsed.filters, params(&[("title", "engineer")]));
    }
}
