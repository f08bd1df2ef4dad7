//! Bulk-ingest wire format.
//!
//! The bulk endpoint takes newline-delimited JSON: an action line naming the
//! target index and document id, followed by the document itself. The whole
//! payload ends with a newline.

use serde::Serialize;

/// The action line of a bulk pair: `{"index":{"_index":...,"_id":...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkDirective<I> {
    index: BulkTarget<I>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct BulkTarget<I> {
    #[serde(rename = "_index")]
    index: String,
    #[serde(rename = "_id")]
    id: I,
}

impl<I> BulkDirective<I> {
    /// An `index` action, which creates the document or replaces it whole.
    pub fn index(index: impl Into<String>, id: I) -> Self {
        Self {
            index: BulkTarget {
                index: index.into(),
                id,
            },
        }
    }

    pub fn id(&self) -> &I {
        &self.index.id
    }
}

/// Encode action/document pairs into a bulk request body.
///
/// # Returns
///
/// * `Ok(String)` - Two lines per pair, newline terminated; empty for no pairs
/// * `Err(serde_json::Error)` - If a directive or document fails to serialize
pub fn encode_bulk<I, D>(items: &[(BulkDirective<I>, D)]) -> Result<String, serde_json::Error>
where
    I: Serialize,
    D: Serialize,
{
    let mut payload = String::new();
    for (directive, document) in items {
        payload.push_str(&serde_json::to_string(directive)?);
        payload.push('\n');
        payload.push_str(&serde_json::to_string(document)?);
        payload.push('\n');
    }
    Ok(payload)
}
