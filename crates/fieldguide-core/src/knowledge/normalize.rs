//! Raw knowledge-base pages to flat records.
//!
//! A page without an expected property is an upstream authoring error. It is reported as an
//! [`IntegrityError`], logged, and skipped so the rest of the batch still renders.

use serde_json::Value;

use super::records::{OnlineResourceRecord, SoftwareToolRecord};
use super::RawResultSet;
use crate::error::IntegrityError;

/// Records that normalized cleanly plus the faults of those that did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub faults: Vec<IntegrityError>,
}

impl<T> Normalized<T> {
    pub fn skipped(&self) -> usize {
        self.faults.len()
    }
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            faults: Vec::new(),
        }
    }
}

/// Read-only view over the `properties` object of one page.
struct PageView<'a> {
    id: &'a str,
    properties: Option<&'a Value>,
}

impl<'a> PageView<'a> {
    fn new(page: &'a Value) -> Self {
        Self {
            id: page.get("id").and_then(Value::as_str).unwrap_or("<unknown>"),
            properties: page.get("properties"),
        }
    }

    fn missing(&self, property: &str) -> IntegrityError {
        IntegrityError::MissingProperty {
            record_id: self.id.to_string(),
            property: property.to_string(),
        }
    }

    fn property(&self, name: &str) -> Result<&'a Value, IntegrityError> {
        self.properties
            .and_then(|p| p.get(name))
            .ok_or_else(|| self.missing(name))
    }

    /// First element of a `title` / `rich_text` array.
    fn first_text(&self, name: &str, kind: &str) -> Result<&'a Value, IntegrityError> {
        self.property(name)?
            .get(kind)
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .ok_or_else(|| self.missing(&format!("{}.{}[0]", name, kind)))
    }

    fn text_field(&self, name: &str, kind: &str, field: &str) -> Result<String, IntegrityError> {
        self.first_text(name, kind)?
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| self.missing(&format!("{}.{}[0].{}", name, kind, field)))
    }

    fn url(&self, name: &str) -> Result<String, IntegrityError> {
        self.property(name)?
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| self.missing(&format!("{}.url", name)))
    }

    fn multi_select(&self, name: &str) -> Result<Vec<String>, IntegrityError> {
        let options = self
            .property(name)?
            .get("multi_select")
            .and_then(Value::as_array)
            .ok_or_else(|| self.missing(&format!("{}.multi_select", name)))?;
        options
            .iter()
            .map(|opt| {
                opt.get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| self.missing(&format!("{}.multi_select[].name", name)))
            })
            .collect()
    }

    /// Optional checkbox; absent means unchecked.
    fn checkbox(&self, name: &str) -> bool {
        self.properties
            .and_then(|p| p.get(name))
            .and_then(|p| p.get("checkbox"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

fn normalize_with<T, F>(dataset: &str, raw: &RawResultSet, parse: F) -> Normalized<T>
where
    F: Fn(&PageView<'_>) -> Result<T, IntegrityError>,
{
    let mut out = Normalized::default();
    for page in &raw.results {
        match parse(&PageView::new(page)) {
            Ok(record) => out.records.push(record),
            Err(fault) => {
                tracing::warn!(
                    target: "fieldguide::knowledge",
                    dataset,
                    error = %fault,
                    "Skipping malformed knowledge-base record"
                );
                out.faults.push(fault);
            }
        }
    }
    tracing::debug!(
        target: "fieldguide::knowledge",
        dataset,
        records = out.records.len(),
        skipped = out.skipped(),
        "Normalized {} records",
        dataset
    );
    out
}

/// Online resources: `Name` title (text + href), `Keywords` multi-select, optional `Favourite`.
pub fn normalize_online_resources(raw: &RawResultSet) -> Normalized<OnlineResourceRecord> {
    normalize_with("online-resources", raw, |page| {
        Ok(OnlineResourceRecord {
            name: page.text_field("Name", "title", "plain_text")?,
            link: page.text_field("Name", "title", "href")?,
            keywords: page.multi_select("Keywords")?,
            favourite: page.checkbox("Favourite"),
        })
    })
}

/// Software tools: `Software tool` title, `Description` rich text, `Homepage` url,
/// `Used for` and `Keywords` multi-selects, optional `Favourite`.
pub fn normalize_software_tools(raw: &RawResultSet) -> Normalized<SoftwareToolRecord> {
    normalize_with("software-tools", raw, |page| {
        Ok(SoftwareToolRecord {
            name: page.text_field("Software tool", "title", "plain_text")?,
            description: page.text_field("Description", "rich_text", "plain_text")?,
            homepage: page.url("Homepage")?,
            used_for: page.multi_select("Used for")?,
            keywords: page.multi_select("Keywords")?,
            favourite: page.checkbox("Favourite"),
        })
    })
}
