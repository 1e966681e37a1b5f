//! Result publishing
//!
//! Crawl output is merged into the site's intake metadata under `data` and
//! written as a named blob, replacing whatever an earlier crawl stored.

use crate::crawler::PageResult;
use crate::storage::{CrawlJob, SiteStore};
use crate::HarvestError;
use serde_json::{Map, Value};

/// Key the page list is stored under in the published document
pub const DATA_KEY: &str = "data";

/// Merges crawl output into a metadata document
///
/// Metadata that is not a JSON object (malformed, empty, or any other JSON
/// type) is replaced by an empty object. `data` is only written when at
/// least one page was collected, so an empty crawl leaves the metadata as it
/// was.
///
/// # Returns
///
/// The serialized document
pub fn merge_results(metadata: &str, pages: &[PageResult]) -> crate::Result<Vec<u8>> {
    let mut document = match serde_json::from_str::<Value>(metadata) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "Metadata is not an object, starting empty");
            Map::new()
        }
        Err(e) => {
            if !metadata.trim().is_empty() {
                tracing::warn!(error = %e, "Malformed metadata, starting empty");
            }
            Map::new()
        }
    };

    if !pages.is_empty() {
        document.insert(DATA_KEY.to_string(), serde_json::to_value(pages)?);
    }

    Ok(serde_json::to_vec(&Value::Object(document))?)
}

/// Publishes a site's crawl output as `<sanitized name>.json`
///
/// # Returns
///
/// * `Ok(String)` - Name of the blob written
/// * `Err(HarvestError)` - Serialization or the blob write failed
pub fn publish(
    store: &dyn SiteStore,
    job: &CrawlJob,
    pages: &[PageResult],
) -> crate::Result<String> {
    let document = merge_results(&job.metadata, pages)?;
    let name = job.blob_name();

    store
        .put_blob(&name, &document)
        .map_err(|e| HarvestError::Publish(format!("{}: {}", name, e)))?;

    tracing::debug!(job_id = job.id, blob = %name, bytes = document.len(), "Published result");

    Ok(name)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
