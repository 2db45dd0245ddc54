//! Course records, both as the upstream sends them and as callers receive them.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;
use utoipa::ToSchema;

/// One record from the upstream listing.
///
/// The upstream schema is loose: ids and prices show up as strings, numbers or
/// `null` depending on the institution, so every field is captured as text and
/// coerced later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpstreamCourse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    /// `MBA`, `POS`, `CERT`, ...
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub thumb: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub old_price: String,
}

/// Pagination block of an upstream page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageMetadata {
    #[serde(default, rename = "hasNextPage")]
    pub has_next_page: Option<bool>,
}

/// One decoded upstream response.
///
/// `data` stays `None` when the payload has no data container at all, which
/// the aggregator reads as "nothing more to fetch".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UpstreamPage {
    #[serde(default)]
    pub data: Option<Vec<UpstreamCourse>>,
    #[serde(default)]
    pub metadata: Option<PageMetadata>,
    #[serde(default, rename = "hasNextPage")]
    has_next_page: Option<bool>,
}

impl UpstreamPage {
    /// Build a page with data and a continuation flag.
    #[must_use]
    pub fn new(data: Vec<UpstreamCourse>, has_next_page: bool) -> Self {
        Self {
            data: Some(data),
            metadata: Some(PageMetadata {
                has_next_page: Some(has_next_page),
            }),
            has_next_page: None,
        }
    }

    /// Whether the upstream reports another page.
    ///
    /// `metadata.hasNextPage` wins over a top-level `hasNextPage`; neither
    /// present means `false`.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.has_next_page)
            .or(self.has_next_page)
            .unwrap_or(false)
    }
}

/// A course as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: String,
    pub title: String,
    /// Institution id the listing was requested for.
    pub ie: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub thumb: String,
    pub link: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub old_price: Decimal,
}

impl Course {
    /// Convert an upstream record, stamping the requesting institution.
    #[must_use]
    pub fn from_upstream(upstream: UpstreamCourse, institution_id: i32) -> Self {
        Self {
            price: parse_price(&upstream.price),
            old_price: parse_price(&upstream.old_price),
            id: upstream.id,
            title: upstream.title,
            ie: institution_id.to_string(),
            category: upstream.category,
            kind: upstream.kind,
            thumb: upstream.thumb,
            link: upstream.link,
        }
    }
}

/// Parse an upstream price, falling back to zero.
///
/// Accepts plain decimals (`"19.90"`) and scientific notation (`"1.5e2"`).
/// Anything else, including the empty string, yields zero so one bad record
/// never sinks a page.
#[must_use]
pub fn parse_price(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}
