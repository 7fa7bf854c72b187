//! Normalization of raw CMS payloads into view models.
//!
//! The CMS nests every entity as `{ id, attributes: { ... } }` and wraps
//! every relation or media field as `{ data: ... }`. Newer CMS versions
//! return flat entities instead. Both shapes, and an already-normalized
//! [`ContentItem`] serialized back to JSON, normalize to the same item.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::assets::AssetPolicy;
use crate::types::{ContentId, ContentItem, ContentKind, ImageRef, Page, Pagination, TaxonomyRef};

/// Errors raised while shaping a CMS payload.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The envelope has no `data` member of the expected type.
    #[error("response envelope has no data {0}")]
    MissingData(&'static str),

    /// A required field is absent or empty.
    #[error("entity is missing required field `{0}`")]
    MissingField(&'static str),

    /// The id is neither a non-negative integer nor a numeric string.
    #[error("invalid entity id: {0}")]
    InvalidId(String),

    /// A field has an unexpected type.
    #[error("unexpected entity shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// What the normalizer needs to know besides the payload.
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    pub kind: ContentKind,
    /// Asset resolution; `None` keeps image URLs exactly as returned.
    pub assets: Option<AssetPolicy>,
}

impl NormalizeContext {
    pub fn new(kind: ContentKind) -> Self {
        Self { kind, assets: None }
    }

    pub fn with_assets(mut self, assets: AssetPolicy) -> Self {
        self.assets = Some(assets);
        self
    }
}

// ============================================================================
// Flattening
// ============================================================================

/// Removes the CMS's `attributes` and `data` nesting, recursively.
///
/// Flattening a value that is already flat returns it unchanged.
pub fn flatten_entity(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(flatten_entity).collect()),
        Value::Object(map) => flatten_object(map),
        other => other,
    }
}

fn flatten_object(mut map: Map<String, Value>) -> Value {
    if is_relation_wrapper(&map) {
        return map.remove("data").map(flatten_entity).unwrap_or(Value::Null);
    }

    if matches!(map.get("attributes"), Some(Value::Object(_))) {
        if let Some(Value::Object(attributes)) = map.remove("attributes") {
            for (key, value) in attributes {
                map.entry(key).or_insert(value);
            }
        }
    }

    Value::Object(
        map.into_iter()
            .map(|(key, value)| (key, flatten_entity(value)))
            .collect(),
    )
}

/// `{ data: ... }` with at most a `meta` sibling.
fn is_relation_wrapper(map: &Map<String, Value>) -> bool {
    map.contains_key("data") && map.keys().all(|k| k == "data" || k == "meta")
}

// ============================================================================
// Raw shapes
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawEntry {
    id: Option<Value>,
    document_id: Option<String>,
    slug: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    excerpt: Option<String>,
    description: Option<String>,
    body: Option<Value>,
    content: Option<Value>,
    cover: Option<Value>,
    cover_image: Option<Value>,
    image: Option<Value>,
    thumbnail: Option<Value>,
    date: Option<String>,
    published_at: Option<String>,
    event_date: Option<String>,
    start_date: Option<String>,
    ends_at: Option<String>,
    end_date: Option<String>,
    location: Option<String>,
    categories: Option<Value>,
    category: Option<Value>,
    tags: Option<Value>,
    views: Option<u64>,
    view_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawImage {
    url: Option<String>,
    #[serde(alias = "alt")]
    alternative_text: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawTaxonomy {
    id: Option<Value>,
    #[serde(alias = "title")]
    name: Option<String>,
    slug: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPagination {
    page: Option<u32>,
    page_size: Option<u32>,
    page_count: Option<u32>,
    total: Option<u64>,
    start: Option<u32>,
    limit: Option<u32>,
}

// ============================================================================
// Entities
// ============================================================================

/// Normalizes one raw (nested or flat) entity.
pub fn normalize_entry(value: Value, ctx: &NormalizeContext) -> Result<ContentItem, NormalizeError> {
    let raw: RawEntry = serde_json::from_value(flatten_entity(value))?;

    let id = raw
        .id
        .as_ref()
        .ok_or(NormalizeError::MissingField("id"))
        .and_then(parse_id)?;
    let slug = non_blank(raw.slug).ok_or(NormalizeError::MissingField("slug"))?;
    let title = non_blank(raw.title).ok_or(NormalizeError::MissingField("title"))?;

    let summary = first_text([raw.summary, raw.excerpt, raw.description]);
    let body = [raw.body, raw.content]
        .into_iter()
        .flatten()
        .find_map(|v| rich_text(&v));

    let cover = [raw.cover, raw.cover_image, raw.image, raw.thumbnail]
        .into_iter()
        .flatten()
        .find_map(|v| image(v, ctx.assets.as_ref()));

    let date_candidates = match ctx.kind {
        ContentKind::Event => [raw.event_date, raw.start_date, raw.date, raw.published_at],
        ContentKind::Blog | ContentKind::CaseStudy => {
            [raw.date, raw.published_at, raw.event_date, raw.start_date]
        }
    };
    let date = date_candidates
        .into_iter()
        .flatten()
        .find_map(|s| parse_date(&s));
    let ends_at = [raw.ends_at, raw.end_date]
        .into_iter()
        .flatten()
        .find_map(|s| parse_date(&s));

    let mut categories = raw.categories.map(taxonomies).unwrap_or_default();
    if categories.is_empty() {
        categories = raw.category.map(taxonomies).unwrap_or_default();
    }
    let tags = raw.tags.map(taxonomies).unwrap_or_default();

    Ok(ContentItem {
        id,
        document_id: non_blank(raw.document_id),
        kind: ctx.kind,
        slug,
        title,
        summary,
        body,
        cover,
        date,
        ends_at,
        location: non_blank(raw.location),
        categories,
        tags,
        views: raw.views.or(raw.view_count).unwrap_or(0),
    })
}

/// Normalizes a listing envelope `{ data: [...], meta: { pagination } }`.
///
/// Entries that cannot be normalized are dropped; the remaining entries
/// keep the order the CMS returned them in.
pub fn normalize_page(envelope: Value, ctx: &NormalizeContext) -> Result<Page<ContentItem>, NormalizeError> {
    let Value::Object(mut envelope) = envelope else {
        return Err(NormalizeError::MissingData("object"));
    };
    let Some(Value::Array(data)) = envelope.remove("data") else {
        return Err(NormalizeError::MissingData("array"));
    };

    let mut items = Vec::with_capacity(data.len());
    for (index, entry) in data.into_iter().enumerate() {
        match normalize_entry(entry, ctx) {
            Ok(item) => items.push(item),
            Err(e) => {
                tracing::warn!(kind = %ctx.kind, index, error = %e, "dropping malformed CMS entry");
            }
        }
    }

    let raw_pagination = envelope
        .remove("meta")
        .and_then(|mut meta| meta.get_mut("pagination").map(Value::take))
        .filter(Value::is_object)
        .map(serde_json::from_value::<RawPagination>)
        .transpose()?
        .unwrap_or_default();
    let pagination = pagination_from_raw(raw_pagination, items.len());

    Ok(Page { items, pagination })
}

/// Normalizes a single-entity envelope `{ data: {...} | null }`.
pub fn normalize_single(envelope: Value, ctx: &NormalizeContext) -> Result<Option<ContentItem>, NormalizeError> {
    let Value::Object(mut envelope) = envelope else {
        return Err(NormalizeError::MissingData("object"));
    };
    match envelope.remove("data") {
        None => Err(NormalizeError::MissingData("member")),
        Some(Value::Null) => Ok(None),
        Some(Value::Array(entries)) => match entries.into_iter().next() {
            Some(entry) => normalize_entry(entry, ctx).map(Some),
            None => Ok(None),
        },
        Some(entry) => normalize_entry(entry, ctx).map(Some),
    }
}

fn pagination_from_raw(raw: RawPagination, item_count: usize) -> Pagination {
    let count = item_count as u64;
    let page_size = raw
        .page_size
        .or(raw.limit)
        .unwrap_or_else(|| u32::try_from(item_count).unwrap_or(u32::MAX))
        .max(1);
    let page = raw
        .page
        .or_else(|| raw.start.map(|start| start / page_size + 1))
        .unwrap_or(1)
        .max(1);
    let total = raw.total.unwrap_or(count);

    match raw.page_count {
        Some(page_count) => Pagination {
            page,
            page_size,
            page_count,
            total,
        },
        None => Pagination::from_total(page, page_size, total),
    }
}

// ============================================================================
// Field helpers
// ============================================================================

fn parse_id(value: &Value) -> Result<ContentId, NormalizeError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(ContentId)
            .ok_or_else(|| NormalizeError::InvalidId(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse()
            .map(ContentId)
            .map_err(|_| NormalizeError::InvalidId(s.clone())),
        other => Err(NormalizeError::InvalidId(other.to_string())),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn first_text<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates.into_iter().find_map(non_blank)
}

/// Accepts `2026-10-01T09:00:00Z` and bare `2026-10-01` (midnight UTC).
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Markdown/HTML strings pass through; block-structured rich text is
/// reduced to its text, one paragraph per block.
fn rich_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(Some(s.clone())),
        Value::Array(blocks) => {
            let paragraphs: Vec<String> = blocks
                .iter()
                .map(block_text)
                .filter(|p| !p.trim().is_empty())
                .collect();
            if paragraphs.is_empty() {
                None
            } else {
                Some(paragraphs.join("\n\n"))
            }
        }
        _ => None,
    }
}

fn block_text(block: &Value) -> String {
    match block {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(Value::String(text)) = map.get("text") {
                return text.clone();
            }
            match map.get("children") {
                Some(Value::Array(children)) => children.iter().map(block_text).collect(),
                _ => String::new(),
            }
        }
        _ => String::new(),
    }
}

fn image(value: Value, assets: Option<&AssetPolicy>) -> Option<ImageRef> {
    let value = match value {
        Value::Array(items) => items.into_iter().next()?,
        other => other,
    };
    let raw: RawImage = serde_json::from_value(value).ok()?;
    let url = non_blank(raw.url)?;
    let url = match assets {
        Some(policy) => policy.resolve(&url)?,
        None => url,
    };

    Some(ImageRef {
        url,
        alt: non_blank(raw.alternative_text),
        width: raw.width,
        height: raw.height,
    })
}

fn taxonomies(value: Value) -> Vec<TaxonomyRef> {
    let entries = match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        single => vec![single],
    };

    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawTaxonomy>(entry).ok())
        .filter_map(|raw| {
            let id = parse_id(raw.id.as_ref()?).ok()?;
            let name = non_blank(raw.name)?;
            let slug = non_blank(raw.slug).unwrap_or_else(|| slugify(&name));
            Some(TaxonomyRef { id, name, slug })
        })
        .collect()
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
