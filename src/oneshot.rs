//! Non-interactive `reelscope search`: one query, filtered and printed.

use anyhow::{Context, Result, bail};
use futures::future::AbortHandle;
use serde::Serialize;
use std::io::Write;
use tracing::info;

use crate::cache::DetailsCache;
use crate::constants::constants;
use crate::filter::{self, FilterCriteria};
use crate::omdb::{OmdbClient, OmdbError};

/// One printed result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
  pub id: String,
  pub title: String,
  pub year: String,
  pub genre: Option<String>,
  pub rating: Option<String>,
  pub poster: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum Lookup {
  Rows(Vec<ResultRow>),
  /// Negative envelope message.
  NotFound(String),
}

/// Search, prefetch every title's details, then filter and sort.
///
/// Unlike the interactive view every rating is known before filtering, so
/// nothing passes provisionally.
pub async fn lookup(client: &OmdbClient, query: &str, criteria: &FilterCriteria) -> Result<Lookup> {
  use futures::stream::{self, StreamExt};

  let query = query.trim();
  if query.chars().count() < constants().min_query_chars {
    bail!("Query must be at least {} characters", constants().min_query_chars);
  }

  let (_abort, registration) = AbortHandle::new_pair();
  let items = match client.search(query, registration).await {
    Ok(items) => items,
    Err(OmdbError::NotFound(message)) => return Ok(Lookup::NotFound(message)),
    Err(OmdbError::MissingApiKey) => {
      bail!("No OMDb API key set. Pass --api-key, export OMDB_API_KEY, or add api_key to config.toml.")
    }
    Err(e) => return Err(e).with_context(|| format!("Search for '{}' failed", query)),
  };
  info!(query, count = items.len(), "oneshot: search results");

  let cache = DetailsCache::new();
  stream::iter(items.iter().map(|item| item.id.as_str()))
    .map(|id| cache.fetch_and_cache(client, id))
    .buffer_unordered(constants().detail_concurrency)
    .collect::<Vec<_>>()
    .await;

  let outcome = filter::apply(&items, criteria, |id| cache.get(id));
  let rows = outcome
    .items
    .into_iter()
    .map(|item| {
      let detail = cache.get(&item.id);
      ResultRow {
        genre: detail.as_ref().and_then(|d| d.short_genre()),
        rating: detail.as_ref().and_then(|d| d.imdb_rating.clone()),
        id: item.id,
        title: item.title,
        year: item.year,
        poster: item.poster,
      }
    })
    .collect();
  Ok(Lookup::Rows(rows))
}

pub fn format_table(rows: &[ResultRow]) -> String {
  let title_w = rows.iter().map(|r| r.title.chars().count()).max().unwrap_or(0).max(5);
  let mut out = format!("{:<10}  {:<title_w$}  {:<9}  {:<6}  {}\n", "ID", "TITLE", "YEAR", "RATING", "GENRE");
  for row in rows {
    out.push_str(&format!(
      "{:<10}  {:<title_w$}  {:<9}  {:<6}  {}\n",
      row.id,
      row.title,
      row.year,
      row.rating.as_deref().unwrap_or("-"),
      row.genre.as_deref().unwrap_or("-"),
    ));
  }
  out
}

pub async fn run(client: &OmdbClient, query: &str, criteria: &FilterCriteria, json: bool) -> Result<()> {
  let result = lookup(client, query, criteria).await?;
  let mut stdout = std::io::stdout().lock();
  match result {
    Lookup::NotFound(message) => {
      if json {
        writeln!(stdout, "[]")?;
      }
      eprintln!("{}", message);
    }
    Lookup::Rows(rows) if json => {
      let body = serde_json::to_string_pretty(&rows).context("Failed to serialise results")?;
      writeln!(stdout, "{}", body)?;
    }
    Lookup::Rows(rows) if rows.is_empty() => {
      eprintln!("No results found.");
    }
    Lookup::Rows(rows) => {
      write!(stdout, "{}", format_table(&rows))?;
    }
  }
  Ok(())
}
