use crate::constants::constants;
use crate::omdb::DetailRecord;

const NO_DESCRIPTION: &str = "No description available.";
const NOT_AVAILABLE: &str = "N/A";

/// Detail overlay. Holds the full-plot record it was opened with.
#[derive(Debug, Default)]
pub struct Modal {
  record: Option<Box<DetailRecord>>,
  /// Plot scroll offset in lines.
  pub scroll: u16,
}

impl Modal {
  pub fn open(&mut self, record: DetailRecord) {
    self.record = Some(Box::new(record));
    self.scroll = 0;
  }

  /// Idempotent.
  pub fn close(&mut self) {
    self.record = None;
    self.scroll = 0;
  }

  pub fn is_open(&self) -> bool {
    self.record.is_some()
  }

  pub fn record(&self) -> Option<&DetailRecord> {
    self.record.as_deref()
  }

  pub fn scroll_down(&mut self) {
    self.scroll = self.scroll.saturating_add(1);
  }

  pub fn scroll_up(&mut self) {
    self.scroll = self.scroll.saturating_sub(1);
  }

  pub fn view(&self) -> Option<ModalView> {
    self.record().map(ModalView::from_record)
  }
}

/// Display strings for the modal with fallbacks applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
  pub title: String,
  pub year: String,
  pub poster: String,
  pub plot: String,
  pub rating: String,
  pub runtime: String,
  pub genre: String,
}

impl ModalView {
  pub fn from_record(record: &DetailRecord) -> Self {
    let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
    Self {
      title: record.title.clone(),
      year: record.year.clone(),
      poster: record.poster.clone().unwrap_or_else(|| constants().poster_placeholder.clone()),
      plot: record.plot.clone().unwrap_or_else(|| NO_DESCRIPTION.to_string()),
      rating: or_na(&record.imdb_rating),
      runtime: or_na(&record.runtime),
      genre: or_na(&record.genre),
    }
  }
}
