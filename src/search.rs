use crate::omdb::{OmdbClient, OmdbError, SearchItem};
use futures::future::AbortHandle;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

// --- Debounce ---

/// Trailing-edge debounce for the search input.
///
/// Every keystroke re-arms the window with the current text; `poll` yields the
/// text once no input has arrived for a full window.
#[derive(Debug)]
pub struct Debouncer {
  window: Duration,
  pending: Option<(String, Instant)>,
}

impl Debouncer {
  pub fn new(window: Duration) -> Self {
    Self { window, pending: None }
  }

  pub fn input(&mut self, query: &str, now: Instant) {
    self.pending = Some((query.to_string(), now));
  }

  pub fn poll(&mut self, now: Instant) -> Option<String> {
    match &self.pending {
      Some((_, at)) if now.duration_since(*at) >= self.window => self.pending.take().map(|(q, _)| q),
      _ => None,
    }
  }

  /// Take whatever is pending regardless of the window (Enter).
  pub fn flush(&mut self) -> Option<String> {
    self.pending.take().map(|(q, _)| q)
  }

  pub fn cancel(&mut self) {
    self.pending = None;
  }

  pub fn is_armed(&self) -> bool {
    self.pending.is_some()
  }
}

// --- Loading indicator ---

/// Count of in-flight requests. Visible while non-zero.
#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator(Arc<AtomicUsize>);

impl LoadingIndicator {
  pub fn begin(&self) -> LoadingGuard {
    self.0.fetch_add(1, Ordering::SeqCst);
    LoadingGuard(Arc::clone(&self.0))
  }

  pub fn is_active(&self) -> bool {
    self.0.load(Ordering::SeqCst) > 0
  }
}

/// Decrements the indicator on drop, whatever way the request ended.
pub struct LoadingGuard(Arc<AtomicUsize>);

impl Drop for LoadingGuard {
  fn drop(&mut self) {
    self.0.fetch_sub(1, Ordering::SeqCst);
  }
}

// --- Controller ---

#[derive(Debug)]
pub enum SearchOutcome {
  Found(Vec<SearchItem>),
  /// Negative envelope; carries the API message.
  NotFound(String),
  Cancelled,
  Failed(OmdbError),
}

#[derive(Debug)]
pub struct SearchEvent {
  pub generation: u64,
  pub query: String,
  pub outcome: SearchOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStart {
  /// Query too short; display should be cleared.
  Cleared,
  MissingKey,
  Started { generation: u64 },
}

/// Owns the single live list search.
///
/// Each search gets a new generation; completions from older generations are
/// dropped by `accept`, and the previous request is aborted outright.
pub struct SearchController {
  client: OmdbClient,
  loading: LoadingIndicator,
  min_chars: usize,
  generation: u64,
  in_flight: Option<AbortHandle>,
  tx: mpsc::UnboundedSender<SearchEvent>,
  rx: mpsc::UnboundedReceiver<SearchEvent>,
}

impl SearchController {
  pub fn new(client: OmdbClient, loading: LoadingIndicator, min_chars: usize) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self { client, loading, min_chars, generation: 0, in_flight: None, tx, rx }
  }

  /// Start a search for `query`. Must be called from within a tokio runtime.
  pub fn search(&mut self, query: &str) -> SearchStart {
    let query = query.trim();
    if query.chars().count() < self.min_chars {
      self.cancel();
      return SearchStart::Cleared;
    }
    if !self.client.has_api_key() {
      self.cancel();
      return SearchStart::MissingKey;
    }

    self.cancel();
    let generation = self.generation;
    let (handle, registration) = AbortHandle::new_pair();
    self.in_flight = Some(handle);

    let client = self.client.clone();
    let tx = self.tx.clone();
    let guard = self.loading.begin();
    let query = query.to_string();
    info!(generation, query = %query, "search: starting");

    tokio::spawn(async move {
      let outcome = match client.search(&query, registration).await {
        Ok(items) => SearchOutcome::Found(items),
        Err(OmdbError::NotFound(message)) => SearchOutcome::NotFound(message),
        Err(OmdbError::Cancelled) => SearchOutcome::Cancelled,
        Err(e) => SearchOutcome::Failed(e),
      };
      drop(guard);
      let _ = tx.send(SearchEvent { generation, query, outcome });
    });

    SearchStart::Started { generation }
  }

  /// Abort the in-flight search and invalidate its generation.
  pub fn cancel(&mut self) {
    self.generation += 1;
    if let Some(handle) = self.in_flight.take() {
      handle.abort();
    }
  }

  /// Keep `event` only if it belongs to the current search.
  pub fn accept(&mut self, event: SearchEvent) -> Option<SearchEvent> {
    if event.generation != self.generation {
      debug!(stale = event.generation, current = self.generation, "search: dropping stale result");
      return None;
    }
    self.in_flight = None;
    Some(event)
  }

  /// Drain completed searches, returning the latest current one if any.
  pub fn drain(&mut self) -> Option<SearchEvent> {
    let mut latest = None;
    while let Ok(event) = self.rx.try_recv() {
      if let Some(event) = self.accept(event) {
        latest = Some(event);
      }
    }
    latest
  }
}
