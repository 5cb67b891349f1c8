//! Result rows and normalization
//!
//! The warehouse hands back typed rows where any cell may be null. Clients get
//! [`NormalizedRecord`]s instead: every field is text and nulls read `"0"`.

use serde::{Deserialize, Serialize};

/// Text written in place of a null cell
pub const NULL_REPLACEMENT: &str = "0";

/// One matched row as returned by the warehouse, in ranking order.
///
/// Numeric columns are held as `f64`: integers beyond 2^53 (and NUMERIC values
/// with more than ~15 significant digits) lose precision before rendering.
/// NaN counts as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub name: Option<String>,
    pub img: Option<String>,
    pub price: Option<f64>,
    pub brand: Option<String>,
    pub avg_rating: Option<f64>,
}

/// A row safe for JSON transmission: all five columns present, all text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub name: String,
    pub img: String,
    pub price: String,
    pub brand: String,
    pub avg_rating: String,
}

impl ResultRow {
    pub fn normalize(&self) -> NormalizedRecord {
        NormalizedRecord {
            name: text_or_zero(self.name.as_deref()),
            img: text_or_zero(self.img.as_deref()),
            price: number_or_zero(self.price),
            brand: text_or_zero(self.brand.as_deref()),
            avg_rating: number_or_zero(self.avg_rating),
        }
    }
}

/// Re-reads a normalized record as a typed row. Numeric columns that do not
/// parse become null.
impl From<&NormalizedRecord> for ResultRow {
    fn from(record: &NormalizedRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            img: Some(record.img.clone()),
            price: record.price.parse().ok(),
            brand: Some(record.brand.clone()),
            avg_rating: record.avg_rating.parse().ok(),
        }
    }
}

fn text_or_zero(value: Option<&str>) -> String {
    value.unwrap_or(NULL_REPLACEMENT).to_string()
}

fn number_or_zero(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => v.to_string(),
        _ => NULL_REPLACEMENT.to_string(),
    }
}

/// Normalize rows, preserving order. No filtering, dedup or re-ranking.
pub fn normalize(rows: &[ResultRow]) -> Vec<NormalizedRecord> {
    rows.iter().map(ResultRow::normalize).collect()
}

/// Ranked rows bounded by the configured fan-out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: Vec<ResultRow>,
}

impl ResultSet {
    /// Wrap `rows`, keeping at most `top_k` of them
    pub fn new(mut rows: Vec<ResultRow>, top_k: usize) -> Self {
        if rows.len() > top_k {
            tracing::warn!(
                returned = rows.len(),
                top_k,
                "Warehouse returned more rows than requested, truncating"
            );
            rows.truncate(top_k);
        }
        Self { rows }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn normalize(&self) -> Vec<NormalizedRecord> {
        normalize(&self.rows)
    }
}
