use ratatui::{layout::Rect, widgets::ListState};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::cache::DetailsCache;
use crate::config::{Config, Settings};
use crate::constants::constants;
use crate::filter;
use crate::modal::Modal;
use crate::omdb::{DetailRecord, OmdbClient, OmdbError, PlotLength, SearchItem};
use crate::panel::{FilterPanel, PanelEffect, PanelEvent, PanelField};
use crate::search::{Debouncer, LoadingIndicator, SearchController, SearchEvent, SearchOutcome, SearchStart};
use crate::theme::{THEMES, Theme, theme_index};

// --- Types ---

pub type DetailResult = Result<DetailRecord, OmdbError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Input,
  Results,
}

/// Inline message shown in place of the result cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
  /// Pipeline produced nothing.
  Empty,
  /// Negative search envelope, with the API's message.
  NoResults(String),
  SearchError,
  MissingKey,
}

impl Notice {
  pub fn message(&self) -> String {
    match self {
      Notice::Empty => "No results found.".to_string(),
      Notice::NoResults(msg) => msg.clone(),
      Notice::SearchError => "Search error — see log.".to_string(),
      Notice::MissingKey => {
        "No OMDb API key set. Pass --api-key, export OMDB_API_KEY, or add api_key to config.toml.".to_string()
      }
    }
  }

  pub fn is_error(&self) -> bool {
    matches!(self, Notice::SearchError | Notice::MissingKey)
  }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResultsPane {
  #[default]
  Idle,
  Notice(Notice),
  Cards(Vec<SearchItem>),
}

impl ResultsPane {
  /// True when the pane shows filter pipeline output, so a re-run may replace it.
  fn from_pipeline(&self) -> bool {
    matches!(self, ResultsPane::Cards(_) | ResultsPane::Notice(Notice::Empty))
  }
}

/// Display strings for one result card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
  pub title: String,
  pub year: String,
  pub poster: String,
  /// Empty until details are cached.
  pub genre: String,
  pub rating: String,
}

pub fn card_view(item: &SearchItem, detail: Option<&DetailRecord>) -> CardView {
  let year = detail.map(|d| d.year.as_str()).filter(|y| !y.is_empty()).unwrap_or(item.year.as_str()).to_string();
  CardView {
    title: item.title.clone(),
    year,
    poster: item.poster.clone().unwrap_or_else(|| constants().poster_placeholder.clone()),
    genre: detail.and_then(DetailRecord::short_genre).unwrap_or_default(),
    rating: detail.and_then(|d| d.imdb_rating.as_deref()).map(|r| format!("★ {}", r)).unwrap_or_default(),
  }
}

/// Completion of a background compact-detail fetch.
#[derive(Debug)]
pub enum DetailEvent {
  Cached(String),
  Missing(String),
}

/// Screen regions recorded during the last draw, for mouse hit-testing.
#[derive(Debug, Default)]
pub struct HitAreas {
  pub filter_toggle: Option<Rect>,
  pub panel: Option<Rect>,
  pub panel_fields: Vec<(PanelField, Rect)>,
  /// Card index into the current pane, with its on-screen rows.
  pub cards: Vec<(usize, Rect)>,
  pub input: Option<Rect>,
  pub modal_dialog: Option<Rect>,
  pub modal_close: Option<Rect>,
}

/// In-flight async task receivers.
pub(crate) struct AsyncTasks {
  pub(crate) details_tx: mpsc::UnboundedSender<DetailEvent>,
  pub(crate) details_rx: mpsc::UnboundedReceiver<DetailEvent>,
  /// Ids with a compact-detail fetch in flight.
  pub(crate) pending_details: HashSet<String>,
  pub(crate) modal_rx: Option<(String, oneshot::Receiver<DetailResult>)>,
}

impl Default for AsyncTasks {
  fn default() -> Self {
    let (details_tx, details_rx) = mpsc::unbounded_channel();
    Self { details_tx, details_rx, pending_details: HashSet::new(), modal_rx: None }
  }
}

pub struct App {
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub mode: AppMode,
  pub theme_index: usize,
  pub should_quit: bool,
  pub client: OmdbClient,
  pub cache: Arc<DetailsCache>,
  pub loading: LoadingIndicator,
  pub search: SearchController,
  pub debouncer: Debouncer,
  pub panel: FilterPanel,
  pub modal: Modal,
  /// Items from the last successful search; sole input of the filter pipeline.
  pub last_results: Vec<SearchItem>,
  pub pane: ResultsPane,
  pub list_state: ListState,
  pub status_message: Option<String>,
  /// Blocking alert; swallows input until dismissed.
  pub alert: Option<String>,
  pub hits: HitAreas,
  pub(crate) tasks: AsyncTasks,
  config: Config,
}

impl App {
  pub fn new(client: OmdbClient, settings: &Settings, config: Config) -> Self {
    let loading = LoadingIndicator::default();
    let search = SearchController::new(client.clone(), loading.clone(), constants().min_query_chars);
    Self {
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      mode: AppMode::Input,
      theme_index: theme_index(config.theme_name.as_deref()),
      should_quit: false,
      client,
      cache: Arc::new(DetailsCache::new()),
      loading,
      search,
      debouncer: Debouncer::new(Duration::from_millis(settings.debounce_ms)),
      panel: FilterPanel::default(),
      modal: Modal::default(),
      last_results: Vec::new(),
      pane: ResultsPane::Idle,
      list_state: ListState::default(),
      status_message: None,
      alert: None,
      hits: HitAreas::default(),
      tasks: AsyncTasks::default(),
      config,
    }
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index comes from theme_index() or modular arithmetic in next_theme().
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  pub fn cards(&self) -> &[SearchItem] {
    match &self.pane {
      ResultsPane::Cards(items) => items,
      _ => &[],
    }
  }

  pub fn selected_item(&self) -> Option<&SearchItem> {
    self.list_state.selected().and_then(|i| self.cards().get(i))
  }

  pub fn card(&self, item: &SearchItem) -> CardView {
    card_view(item, self.cache.get(&item.id).as_ref())
  }

  // --- Search ---

  /// Record an edit to the search box; the search fires once typing pauses.
  pub fn on_input_changed(&mut self, now: Instant) {
    self.debouncer.input(&self.input, now);
  }

  /// Enter in the search box: skip the remaining debounce window.
  pub fn search_now(&mut self) {
    self.debouncer.flush();
    let query = self.input.clone();
    self.run_search(&query);
  }

  pub fn run_search(&mut self, query: &str) {
    match self.search.search(query) {
      SearchStart::Cleared => {
        self.status_message = None;
        self.pane = ResultsPane::Idle;
        self.list_state.select(None);
      }
      SearchStart::MissingKey => {
        self.status_message = None;
        self.pane = ResultsPane::Notice(Notice::MissingKey);
        self.list_state.select(None);
      }
      SearchStart::Started { generation } => {
        debug!(generation, "search: in flight");
        self.status_message = Some(format!("Searching '{}'…", query.trim()));
      }
    }
  }

  /// Reset the search box and results together, abandoning any pending search.
  pub fn clear_search(&mut self) {
    self.input.clear();
    self.cursor_position = 0;
    self.input_scroll = 0;
    self.debouncer.cancel();
    self.search.cancel();
    self.status_message = None;
    self.pane = ResultsPane::Idle;
    self.list_state.select(None);
    self.mode = AppMode::Input;
  }

  fn on_search_event(&mut self, event: SearchEvent) {
    self.status_message = None;
    match event.outcome {
      SearchOutcome::Found(items) => {
        info!(query = %event.query, count = items.len(), "search: results");
        self.last_results = items;
        self.list_state.select(None);
        self.apply_filters_and_render();
      }
      SearchOutcome::NotFound(message) => {
        self.pane = ResultsPane::Notice(Notice::NoResults(message));
        self.list_state.select(None);
      }
      SearchOutcome::Cancelled => {}
      SearchOutcome::Failed(e) => {
        error!(query = %event.query, err = %e, "search: request failed");
        self.pane = ResultsPane::Notice(Notice::SearchError);
        self.list_state.select(None);
      }
    }
  }

  // --- Filter pipeline ---

  /// Filter and sort `last_results` with the panel's criteria, then render.
  pub fn apply_filters_and_render(&mut self) {
    let criteria = self.panel.criteria();
    let cache = Arc::clone(&self.cache);
    let outcome = filter::apply(&self.last_results, &criteria, |id| cache.get(id));
    for id in &outcome.pending {
      self.request_details(id);
    }
    self.render_results(outcome.items);
  }

  pub fn render_results(&mut self, items: Vec<SearchItem>) {
    if items.is_empty() {
      self.pane = ResultsPane::Notice(Notice::Empty);
      self.list_state.select(None);
      return;
    }

    let selected_id = self.selected_item().map(|i| i.id.clone());
    let selected = selected_id.and_then(|id| items.iter().position(|i| i.id == id)).unwrap_or(0);
    let missing: Vec<String> = items.iter().filter(|i| !self.cache.contains(&i.id)).map(|i| i.id.clone()).collect();

    self.pane = ResultsPane::Cards(items);
    self.list_state.select(Some(selected));
    for id in missing {
      self.request_details(&id);
    }
  }

  /// Spawn a background compact-detail fetch unless one is cached or in flight.
  fn request_details(&mut self, id: &str) {
    if !self.client.has_api_key() || self.cache.contains(id) || self.tasks.pending_details.contains(id) {
      return;
    }
    self.tasks.pending_details.insert(id.to_string());

    let client = self.client.clone();
    let cache = Arc::clone(&self.cache);
    let tx = self.tasks.details_tx.clone();
    let id = id.to_string();
    tokio::spawn(async move {
      let event = match cache.fetch_and_cache(&client, &id).await {
        Some(_) => DetailEvent::Cached(id),
        None => DetailEvent::Missing(id),
      };
      let _ = tx.send(event);
    });
  }

  // --- Filter panel ---

  pub fn panel_event(&mut self, event: PanelEvent) {
    if self.panel.handle(event) == PanelEffect::Rerun {
      self.apply_filters_and_render();
    }
  }

  pub fn panel_activate(&mut self) {
    if self.panel.activate() == PanelEffect::Rerun {
      self.apply_filters_and_render();
    }
  }

  // --- Modal ---

  pub fn open_selected(&mut self) {
    if let Some(id) = self.selected_item().map(|i| i.id.clone()) {
      self.open_details(&id);
    }
  }

  /// Fetch the full-plot record for `id` and open the modal when it lands.
  pub fn open_details(&mut self, id: &str) {
    if !self.client.has_api_key() {
      self.alert = Some("No OMDb API key configured.".to_string());
      return;
    }
    debug!(id, "modal: fetching details");

    let client = self.client.clone();
    let guard = self.loading.begin();
    let owned = id.to_string();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let result = client.details(&owned, PlotLength::Full).await;
      drop(guard);
      let _ = tx.send(result);
    });
    self.tasks.modal_rx = Some((id.to_string(), rx));
  }

  pub fn close_modal(&mut self) {
    self.modal.close();
  }

  pub fn dismiss_alert(&mut self) {
    self.alert = None;
  }

  // --- Results navigation ---

  pub fn select_next(&mut self) {
    let count = self.cards().len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| (i + 1) % count);
      self.list_state.select(Some(i));
    }
  }

  pub fn select_prev(&mut self) {
    let count = self.cards().len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.list_state.select(Some(i));
    }
  }

  // --- Event loop ---

  /// Fire a due debounced search, then drain finished background work.
  pub fn tick(&mut self, now: Instant) {
    if let Some(query) = self.debouncer.poll(now) {
      self.run_search(&query);
    }
    self.check_pending();
  }

  pub fn check_pending(&mut self) {
    if let Some(event) = self.search.drain() {
      self.on_search_event(event);
    }

    if let Some((id, mut rx)) = self.tasks.modal_rx.take() {
      match rx.try_recv() {
        Ok(Ok(record)) => {
          self.modal.open(record);
        }
        Ok(Err(e)) => {
          error!(id = %id, err = %e, "modal: failed to fetch details");
          self.alert = Some("Failed to fetch details — see log.".to_string());
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.modal_rx = Some((id, rx));
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          error!(id = %id, "modal: detail task ended without a result");
          self.alert = Some("Failed to fetch details — see log.".to_string());
        }
      }
    }

    // Coalesce: one pipeline run per drained batch of detail completions.
    let mut rerun = false;
    while let Ok(event) = self.tasks.details_rx.try_recv() {
      match event {
        DetailEvent::Cached(id) => {
          self.tasks.pending_details.remove(&id);
          rerun = true;
        }
        DetailEvent::Missing(id) => {
          self.tasks.pending_details.remove(&id);
        }
      }
    }
    if rerun && self.pane.from_pipeline() {
      self.apply_filters_and_render();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::omdb::Transport;
  use crate::omdb::mock::*;
  use serde_json::json;

  fn settings() -> Settings {
    Settings { api_key: Some("test-key".to_string()), base_url: String::new(), debounce_ms: 350, request_timeout_secs: 5 }
  }

  fn app_with(transport: &Arc<MockTransport>) -> App {
    App::new(client(transport), &settings(), Config::default())
  }

  fn item(id: &str, title: &str, year: &str) -> SearchItem {
    SearchItem { id: id.to_string(), title: title.to_string(), year: year.to_string(), poster: None }
  }

  /// Let spawned tasks run, then drain their results.
  async fn pump(app: &mut App) {
    for _ in 0..20 {
      tokio::time::sleep(Duration::from_millis(2)).await;
      app.check_pending();
    }
  }

  fn titles(app: &App) -> Vec<String> {
    app.cards().iter().map(|i| i.title.clone()).collect()
  }

  #[test]
  fn card_view_uses_placeholders_until_cached() {
    let it = item("tt0372784", "Batman Begins", "2005");
    let view = card_view(&it, None);
    assert_eq!(view.genre, "");
    assert_eq!(view.rating, "");
    assert_eq!(view.year, "2005");
    assert_eq!(view.poster, constants().poster_placeholder);

    let detail = DetailRecord {
      id: "tt0372784".to_string(),
      title: "Batman Begins".to_string(),
      year: "2005".to_string(),
      genre: Some("Action, Crime, Drama".to_string()),
      imdb_rating: Some("8.2".to_string()),
      runtime: None,
      plot: None,
      poster: None,
    };
    let view = card_view(&it, Some(&detail));
    assert_eq!(view.genre, "Action, Crime");
    assert_eq!(view.rating, "★ 8.2");
  }

  #[tokio::test]
  async fn debounce_issues_single_request_for_last_query() {
    let transport = MockTransport::new();
    let mut app = app_with(&transport);
    let t0 = Instant::now();

    app.input = "batman".to_string();
    app.on_input_changed(t0);
    app.input = "batman begins".to_string();
    app.on_input_changed(t0 + Duration::from_millis(100));

    app.tick(t0 + Duration::from_millis(300));
    app.tick(t0 + Duration::from_millis(460));
    pump(&mut app).await;

    let searches: Vec<String> = transport.keys().into_iter().filter(|k| k.starts_with("s:")).collect();
    assert_eq!(searches, vec!["s:batman begins".to_string()]);
  }

  #[tokio::test]
  async fn later_search_wins_even_if_earlier_resolves_last() {
    let transport = MockTransport::new();
    transport.respond("s:alien", search_body(&[("tt0078748", "Alien", "1979")]));
    transport.respond("s:aliens", search_body(&[("tt0090605", "Aliens", "1986")]));
    let gate = transport.gate("s:alien");
    let mut app = app_with(&transport);

    app.run_search("alien");
    app.run_search("aliens");
    pump(&mut app).await;
    assert_eq!(titles(&app), vec!["Aliens"]);

    gate.notify_one();
    pump(&mut app).await;
    assert_eq!(titles(&app), vec!["Aliens"]);
    assert_eq!(app.last_results.len(), 1);
    assert_eq!(app.last_results[0].id, "tt0090605");
  }

  #[tokio::test]
  async fn short_query_clears_without_request() {
    let transport = MockTransport::new();
    let mut app = app_with(&transport);
    app.pane = ResultsPane::Cards(vec![item("a", "A", "2000")]);
    app.run_search("x");
    pump(&mut app).await;
    assert_eq!(app.pane, ResultsPane::Idle);
    assert_eq!(transport.total(), 0);
  }

  #[tokio::test]
  async fn missing_key_shows_notice_without_request() {
    let transport = MockTransport::new();
    let client = OmdbClient::new(Arc::clone(&transport) as Arc<dyn Transport>, None);
    let mut app = App::new(client, &settings(), Config::default());

    app.run_search("alien");
    assert_eq!(app.pane, ResultsPane::Notice(Notice::MissingKey));
    app.open_details("tt0078748");
    assert!(app.alert.is_some());
    pump(&mut app).await;
    assert_eq!(transport.total(), 0);
  }

  #[tokio::test]
  async fn negative_envelope_keeps_last_results() {
    let transport = MockTransport::new();
    transport.respond("s:alien", search_body(&[("tt0078748", "Alien", "1979")]));
    transport.respond("s:qqqq", json!({ "Response": "False", "Error": "Movie not found!" }));
    let mut app = app_with(&transport);

    app.run_search("alien");
    pump(&mut app).await;
    app.run_search("qqqq");
    pump(&mut app).await;

    assert_eq!(app.pane, ResultsPane::Notice(Notice::NoResults("Movie not found!".to_string())));
    assert_eq!(app.last_results.len(), 1);
  }

  #[tokio::test]
  async fn transport_failure_shows_generic_error() {
    let transport = MockTransport::new();
    transport.fail("s:alien", 502);
    let mut app = app_with(&transport);
    app.run_search("alien");
    pump(&mut app).await;
    assert_eq!(app.pane, ResultsPane::Notice(Notice::SearchError));
    assert!(!app.loading.is_active());
  }

  #[tokio::test]
  async fn each_card_detail_is_fetched_once() {
    let transport = MockTransport::new();
    transport.respond("s:batman", search_body(&[("tt0372784", "Batman Begins", "2005"), ("tt0096895", "Batman", "1989")]));
    transport.respond("i:tt0372784:short", detail_body("tt0372784", "Batman Begins", "2005", "Action, Crime, Drama", "8.2"));
    transport.respond("i:tt0096895:short", detail_body("tt0096895", "Batman", "1989", "Action, Adventure", "7.5"));
    let mut app = app_with(&transport);

    app.run_search("batman");
    pump(&mut app).await;
    app.apply_filters_and_render();
    app.apply_filters_and_render();
    pump(&mut app).await;

    assert_eq!(transport.count("i:tt0372784:short"), 1);
    assert_eq!(transport.count("i:tt0096895:short"), 1);
    let first = app.cards()[0].clone();
    assert_eq!(app.card(&first).rating, "★ 7.5");
    assert!(app.tasks.pending_details.is_empty());
  }

  #[tokio::test]
  async fn rating_filter_hides_items_once_details_arrive() {
    let transport = MockTransport::new();
    transport.respond("i:hi:short", detail_body("hi", "High", "2000", "Drama", "8.1"));
    transport.respond("i:lo:short", detail_body("lo", "Low", "2000", "Drama", "5.0"));
    let gate = transport.gate("i:lo:short");
    let mut app = app_with(&transport);
    app.last_results = vec![item("hi", "High", "2000"), item("lo", "Low", "2000")];
    app.panel.form.min_rating = "7".to_string();

    app.apply_filters_and_render();
    assert_eq!(titles(&app), vec!["High", "Low"]);

    pump(&mut app).await;
    assert_eq!(titles(&app), vec!["High", "Low"]);

    gate.notify_one();
    pump(&mut app).await;
    assert_eq!(titles(&app), vec!["High"]);
  }

  #[tokio::test]
  async fn year_filter_and_sort_apply_to_last_results() {
    let transport = MockTransport::new();
    let mut app = app_with(&transport);
    app.last_results =
      vec![item("1", "Aliens", "1986"), item("2", "alien", "1979"), item("3", "Alien: Covenant", "2017")];
    app.panel.form.year_to = "2000".to_string();
    app.panel.form.sort = filter::SortOrder::TitleDesc;

    app.panel_event(PanelEvent::Apply);
    assert_eq!(titles(&app), vec!["Aliens", "alien"]);

    app.panel_event(PanelEvent::Clear);
    assert_eq!(titles(&app), vec!["alien", "Alien: Covenant", "Aliens"]);
  }

  #[tokio::test]
  async fn filters_hiding_everything_show_empty_state() {
    let transport = MockTransport::new();
    let mut app = app_with(&transport);
    app.last_results = vec![item("1", "Metropolis", "1927")];
    app.panel.form.year_from = "2000".to_string();
    app.apply_filters_and_render();
    assert_eq!(app.pane, ResultsPane::Notice(Notice::Empty));
    assert_eq!(Notice::Empty.message(), "No results found.");
  }

  #[tokio::test]
  async fn modal_opens_with_full_plot() {
    let transport = MockTransport::new();
    let mut full = detail_body("tt0078748", "Alien", "1979", "Horror, Sci-Fi", "8.5");
    full["Plot"] = json!("The crew of a commercial spacecraft encounters a deadly lifeform.");
    transport.respond("i:tt0078748:full", full);
    let mut app = app_with(&transport);

    app.open_details("tt0078748");
    pump(&mut app).await;

    assert!(app.modal.is_open());
    assert_eq!(transport.count("i:tt0078748:full"), 1);
    let view = app.modal.view().unwrap();
    assert!(view.plot.starts_with("The crew"));
    app.close_modal();
    app.close_modal();
    assert!(!app.modal.is_open());
    assert!(!app.loading.is_active());
  }

  #[tokio::test]
  async fn modal_failure_raises_alert_and_stays_closed() {
    let transport = MockTransport::new();
    transport.fail("i:tt1:full", 500);
    let mut app = app_with(&transport);
    app.open_details("tt1");
    pump(&mut app).await;
    assert!(!app.modal.is_open());
    assert_eq!(app.alert.as_deref(), Some("Failed to fetch details — see log."));
  }

  #[tokio::test]
  async fn modal_never_consults_cache() {
    let transport = MockTransport::new();
    transport.respond("i:tt1:full", detail_body("tt1", "Cached", "2001", "Drama", "7.0"));
    let mut app = app_with(&transport);
    app.cache.insert(DetailRecord {
      id: "tt1".to_string(),
      title: "Cached".to_string(),
      year: "2001".to_string(),
      genre: None,
      imdb_rating: None,
      runtime: None,
      plot: None,
      poster: None,
    });
    app.open_details("tt1");
    pump(&mut app).await;
    assert_eq!(transport.count("i:tt1:full"), 1);
  }

  #[tokio::test]
  async fn clear_search_drops_pending_debounce_and_results() {
    let transport = MockTransport::new();
    let mut app = app_with(&transport);
    let t0 = Instant::now();
    app.input = "alien".to_string();
    app.cursor_position = 5;
    app.on_input_changed(t0);
    app.pane = ResultsPane::Cards(vec![item("a", "A", "2000")]);

    app.clear_search();
    app.tick(t0 + Duration::from_secs(1));
    pump(&mut app).await;

    assert!(app.input.is_empty());
    assert_eq!(app.cursor_position, 0);
    assert_eq!(app.pane, ResultsPane::Idle);
    assert_eq!(transport.total(), 0);
  }

  #[tokio::test]
  async fn selection_follows_item_across_rerender() {
    let transport = MockTransport::new();
    let mut app = app_with(&transport);
    app.last_results = vec![item("a", "Alpha", "2000"), item("b", "Beta", "2000"), item("c", "Gamma", "2000")];
    app.apply_filters_and_render();
    app.select_next();
    assert_eq!(app.selected_item().map(|i| i.id.as_str()), Some("b"));

    app.panel.form.sort = filter::SortOrder::TitleDesc;
    app.apply_filters_and_render();
    assert_eq!(app.selected_item().map(|i| i.id.as_str()), Some("b"));
    assert_eq!(app.list_state.selected(), Some(1));
  }
}
