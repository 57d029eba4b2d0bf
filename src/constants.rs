//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  /// OMDb endpoint used when neither the CLI nor the config file override it.
  pub omdb_base_url: String,

  // Search
  pub debounce_ms: u64,
  pub min_query_chars: usize,

  // Event loop
  pub tick_ms: u64,
  pub request_timeout_secs: u64,

  // Rendering
  pub poster_placeholder: String,

  pub log_file_name: String,

  /// Maximum concurrent detail fetches for the non-interactive `search` command.
  pub detail_concurrency: usize,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
