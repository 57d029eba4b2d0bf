use crate::omdb::{DetailRecord, OmdbClient, OmdbError, PlotLength};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Process-lifetime store of compact detail records, keyed by IMDb id.
///
/// Shared between card enrichment, the rating filter and the one-shot CLI
/// search. Entries are never invalidated.
#[derive(Default)]
pub struct DetailsCache {
  records: Mutex<HashMap<String, DetailRecord>>,
}

impl DetailsCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, id: &str) -> Option<DetailRecord> {
    self.records.lock().unwrap_or_else(|e| e.into_inner()).get(id).cloned()
  }

  pub fn contains(&self, id: &str) -> bool {
    self.records.lock().unwrap_or_else(|e| e.into_inner()).contains_key(id)
  }

  pub fn insert(&self, record: DetailRecord) {
    self.records.lock().unwrap_or_else(|e| e.into_inner()).insert(record.id.clone(), record);
  }

  pub fn len(&self) -> usize {
    self.records.lock().unwrap_or_else(|e| e.into_inner()).len()
  }

  /// Return the cached record for `id`, fetching the short-plot detail on a miss.
  ///
  /// Failures and negative envelopes yield `None` and leave the cache untouched,
  /// so a later call retries.
  pub async fn fetch_and_cache(&self, client: &OmdbClient, id: &str) -> Option<DetailRecord> {
    if let Some(record) = self.get(id) {
      return Some(record);
    }

    match client.details(id, PlotLength::Short).await {
      Ok(mut record) => {
        // Key by the requested id so lookups from search results always hit.
        record.id = id.to_string();
        self.insert(record.clone());
        Some(record)
      }
      Err(OmdbError::MissingApiKey) => None,
      Err(e) => {
        debug!(id, error = %e, "details: fetch failed");
        None
      }
    }
  }
}
