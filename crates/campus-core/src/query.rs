//! Query-string building for the CMS REST API.
//!
//! The CMS takes its paging, sorting and filtering parameters in a nested
//! bracket format (`pagination[page]=1&filters[slug][$eq]=...`). Keys and
//! values are form-url-encoded, which the CMS decodes before parsing the
//! brackets.

use crate::types::{ContentKind, ListQuery};

/// Ordered key/value pairs of a CMS query.
pub type QueryPairs = Vec<(String, String)>;

/// Builds the pairs for a listing request.
///
/// Paging, sort order and population are always present. Filters only
/// appear when set on `query`.
pub fn list_query_pairs(kind: ContentKind, query: &ListQuery) -> QueryPairs {
    let query = query.clone().normalized();
    let date_field = kind.date_field();

    let mut pairs: QueryPairs = vec![
        ("pagination[page]".into(), query.page.to_string()),
        ("pagination[pageSize]".into(), query.page_size.to_string()),
        ("sort[0]".into(), format!("{date_field}:desc")),
        ("populate".into(), "*".into()),
    ];

    if let Some(search) = &query.search {
        pairs.push(("filters[$or][0][title][$containsi]".into(), search.clone()));
        pairs.push(("filters[$or][1][summary][$containsi]".into(), search.clone()));
    }
    if let Some(category) = &query.category {
        pairs.push(("filters[categories][slug][$eq]".into(), category.clone()));
    }
    if let Some(tag) = &query.tag {
        pairs.push(("filters[tags][slug][$eq]".into(), tag.clone()));
    }
    if let Some(exclude) = query.exclude {
        pairs.push(("filters[id][$ne]".into(), exclude.to_string()));
    }
    if let Some(since) = query.since {
        pairs.push((format!("filters[{date_field}][$gte]"), since.to_rfc3339()));
    }

    pairs
}

/// Builds the encoded query string for a listing request.
pub fn build_list_query(kind: ContentKind, query: &ListQuery) -> String {
    encode(&list_query_pairs(kind, query))
}

/// Builds the encoded query string that looks up one item by slug.
pub fn build_slug_query(slug: &str) -> String {
    let pairs: QueryPairs = vec![
        ("filters[slug][$eq]".into(), slug.trim().to_string()),
        ("populate".into(), "*".into()),
        ("pagination[pageSize]".into(), "1".into()),
    ];
    encode(&pairs)
}

/// Form-url-encodes query pairs.
pub fn encode(pairs: &[(String, String)]) -> String {
    // Serializing a slice of string tuples cannot fail.
    serde_urlencoded::to_string(pairs).unwrap_or_default()
}

/// Decodes a query string back into pairs.
pub fn decode(query: &str) -> QueryPairs {
    serde_urlencoded::from_str(query).unwrap_or_default()
}
