//! crates/catalog_core/src/field_map.rs
//!
//! Declarative field mapping for partner catalogs.
//!
//! Every partner names its fields differently (`bookCover`, `portadaBase64`,
//! `portadaUrl`, ...). Instead of per-partner mapping code, each partner carries a
//! [`FieldMapping`]: an ordered list of candidate names for every canonical field.
//! [`resolve_field`] walks a list and takes the first non-empty value.

use crate::domain::Book;
use serde::Deserialize;
use serde_json::Value;

/// Ordered candidate names for each canonical `Book` field.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FieldMapping {
    pub id: Vec<String>,
    pub title: Vec<String>,
    pub cover_image: Vec<String>,
    pub pdf_document: Vec<String>,
    pub author: Vec<String>,
    pub genre: Vec<String>,
    pub description: Vec<String>,
    pub publish_date: Vec<String>,
}

impl FieldMapping {
    /// Maps one raw partner record into a canonical `Book`.
    ///
    /// `fallback_author` fills the author when none of the candidates is present;
    /// partners usually report the owning institution there.
    pub fn to_book(&self, record: &Value, fallback_author: &str) -> Book {
        let field = |candidates: &Vec<String>| resolve_field(record, candidates).unwrap_or_default();

        let mut author = field(&self.author);
        if author.is_empty() {
            author = fallback_author.to_string();
        }

        Book {
            id: field(&self.id),
            title: field(&self.title),
            cover_image: field(&self.cover_image),
            pdf_document: field(&self.pdf_document),
            author,
            genre: field(&self.genre),
            description: field(&self.description),
            publish_date: field(&self.publish_date),
        }
    }
}

/// Returns the first candidate field of `record` that holds a non-empty value.
///
/// Strings are taken as-is (after trimming); numbers and `true` are rendered
/// with their JSON text, so numeric ids become `"42"`. Nulls, empty strings,
/// zero, `false`, arrays and objects fall through to the next candidate.
pub fn resolve_field(record: &Value, candidates: &[String]) -> Option<String> {
    let object = record.as_object()?;
    candidates.iter().find_map(|name| match object.get(name)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    })
}
