mod app;
mod cache;
mod config;
mod constants;
mod filter;
mod input;
mod modal;
mod omdb;
mod oneshot;
mod panel;
mod search;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use ratatui::{
  DefaultTerminal,
  crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
  },
};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use app::App;
use config::{API_KEY_ENV, Config, Overrides, Settings};
use constants::constants;
use filter::{FilterCriteria, SortOrder};
use omdb::{HttpTransport, OmdbClient};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// OMDb API key (overrides OMDB_API_KEY and config.toml)
  #[arg(long, global = true)]
  api_key: Option<String>,

  /// OMDb endpoint (default: https://www.omdbapi.com/)
  #[arg(long, global = true)]
  base_url: Option<String>,

  /// Quiet period after the last keystroke before searching, in milliseconds
  #[arg(long)]
  debounce_ms: Option<u64>,

  /// Search immediately on startup
  query: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Run one search and print the filtered results
  Search {
    query: String,

    /// Title sort order
    #[arg(long, value_enum, default_value = "asc")]
    sort: CliSort,

    /// Earliest release year (inclusive)
    #[arg(long)]
    year_from: Option<i32>,

    /// Latest release year (inclusive)
    #[arg(long)]
    year_to: Option<i32>,

    /// Minimum IMDb rating; 0 disables the rating filter
    #[arg(long, default_value_t = 0.0)]
    min_rating: f64,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
  },
  /// Print shell completions
  Completions { shell: clap_complete::Shell },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSort {
  Asc,
  Desc,
}

impl From<CliSort> for SortOrder {
  fn from(sort: CliSort) -> Self {
    match sort {
      CliSort::Asc => SortOrder::TitleAsc,
      CliSort::Desc => SortOrder::TitleDesc,
    }
  }
}

// --- Logging ---

/// File logging; the terminal belongs to the UI. The guard must outlive the run.
fn init_logging(logs_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
  use tracing_subscriber::{EnvFilter, fmt, prelude::*};

  std::fs::create_dir_all(logs_dir).ok();

  let file_appender = tracing_appender::rolling::daily(logs_dir, &constants().log_file_name);
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,reelscope=debug"));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_writer(non_blocking).with_ansi(false).with_target(true).with_file(true).with_line_number(true))
    .init();

  guard
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(Command::Completions { shell }) = &args.command {
    clap_complete::generate(*shell, &mut Args::command(), "reelscope", &mut std::io::stdout());
    return Ok(());
  }

  let _log_guard = init_logging(&config::log_dir());

  let config = Config::load();
  let overrides = Overrides { api_key: args.api_key.clone(), base_url: args.base_url.clone(), debounce_ms: args.debounce_ms };
  let settings = Settings::resolve(&overrides, std::env::var(API_KEY_ENV).ok(), &config);
  info!(version = env!("CARGO_PKG_VERSION"), base_url = %settings.base_url, has_key = settings.api_key.is_some(), "reelscope starting");

  let transport = HttpTransport::new(&settings.base_url, Duration::from_secs(settings.request_timeout_secs))?;
  let client = OmdbClient::new(Arc::new(transport), settings.api_key.clone());

  match args.command {
    Some(Command::Search { query, sort, year_from, year_to, min_rating, json }) => {
      let criteria = FilterCriteria {
        sort: sort.into(),
        year_from: year_from.filter(|y| *y != 0),
        year_to: year_to.filter(|y| *y != 0),
        min_rating: min_rating.max(0.0),
      };
      oneshot::run(&client, &query, &criteria, json).await
    }
    Some(Command::Completions { .. }) => Ok(()),
    None => {
      let app = App::new(client, &settings, config);
      run_tui(app, args.query)
    }
  }
}

fn run_tui(app: App, query: Option<String>) -> Result<()> {
  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    default_hook(info);
  }));

  let mut terminal = ratatui::init();
  let result = execute!(std::io::stdout(), EnableMouseCapture)
    .context("Failed to enable mouse capture")
    .and_then(|_| run(&mut terminal, app, query));
  let _ = execute!(std::io::stdout(), DisableMouseCapture);
  ratatui::restore();
  result
}

fn run(terminal: &mut DefaultTerminal, mut app: App, query: Option<String>) -> Result<()> {
  if let Some(query) = query {
    app.input = query;
    app.cursor_position = app.input.chars().count();
    app.search_now();
  }

  let tick = Duration::from_millis(constants().tick_ms);
  loop {
    app.tick(Instant::now());

    terminal.draw(|frame| ui::ui(frame, &mut app)).context("Failed to draw frame")?;

    if event::poll(tick)? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key_event(&mut app, key),
        Event::Mouse(mouse) => input::handle_mouse_event(&mut app, mouse),
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }

  info!("reelscope exiting");
  Ok(())
}
