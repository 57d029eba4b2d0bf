use anyhow::Context;
use async_trait::async_trait;
use futures::future::{AbortRegistration, Abortable};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// OMDb's marker for a missing field.
const NOT_AVAILABLE: &str = "N/A";

/// Errors surfaced by the OMDb client.
///
/// Callers branch on the kind: `Cancelled` is silent, `NotFound` is an expected
/// business outcome, everything else is a transport or decoding failure.
#[derive(Debug, Error)]
pub enum OmdbError {
  #[error("request cancelled")]
  Cancelled,

  #[error("no OMDb API key configured")]
  MissingApiKey,

  /// Negative envelope (`"Response": "False"`), carrying the API's message.
  #[error("{0}")]
  NotFound(String),

  #[error("OMDb returned HTTP {0}")]
  Status(u16),

  #[error("HTTP request error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("malformed OMDb response: {0}")]
  Parse(#[from] serde_json::Error),
}

/// Seam between the client and the network. Returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn get(&self, params: &[(&str, String)]) -> Result<String, OmdbError>;
}

/// reqwest-backed transport against the real OMDb endpoint.
pub struct HttpTransport {
  client: Client,
  base_url: Url,
}

impl HttpTransport {
  pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
    let base_url = Url::parse(base_url).with_context(|| format!("Invalid OMDb base URL: {}", base_url))?;
    let client = Client::builder().timeout(timeout).build().context("Failed to build HTTP client")?;
    Ok(Self { client, base_url })
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn get(&self, params: &[(&str, String)]) -> Result<String, OmdbError> {
    let mut url = self.base_url.clone();
    url.query_pairs_mut().extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));

    let response = self.client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
      return Err(OmdbError::Status(status.as_u16()));
    }
    Ok(response.text().await?)
  }
}

// --- Domain types ---

/// One row of a list search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchItem {
  pub id: String,
  pub title: String,
  /// Raw `Year` field; may be a range ("2001–2003") or garbage.
  pub year: String,
  pub poster: Option<String>,
}

/// Full metadata for a single title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRecord {
  pub id: String,
  pub title: String,
  pub year: String,
  /// Comma-separated genre list.
  pub genre: Option<String>,
  pub imdb_rating: Option<String>,
  pub runtime: Option<String>,
  pub plot: Option<String>,
  pub poster: Option<String>,
}

impl DetailRecord {
  /// Numeric IMDb rating, if OMDb has one.
  pub fn rating(&self) -> Option<f64> {
    self.imdb_rating.as_deref().and_then(|r| r.trim().parse().ok())
  }

  /// First two genres, for compact card display.
  pub fn short_genre(&self) -> Option<String> {
    let genre = self.genre.as_deref()?;
    let short = genre.split(',').map(str::trim).filter(|g| !g.is_empty()).take(2).collect::<Vec<_>>().join(", ");
    if short.is_empty() { None } else { Some(short) }
  }
}

/// Plot length requested from the detail endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotLength {
  Short,
  Full,
}

impl PlotLength {
  fn as_param(self) -> &'static str {
    match self {
      PlotLength::Short => "short",
      PlotLength::Full => "full",
    }
  }
}

// --- Wire format ---

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
  #[serde(rename = "Response")]
  response: Option<String>,
  #[serde(rename = "Search", default)]
  search: Vec<WireSearchItem>,
  #[serde(rename = "Error")]
  error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireSearchItem {
  #[serde(rename = "imdbID", default)]
  imdb_id: String,
  #[serde(rename = "Title", default)]
  title: String,
  #[serde(rename = "Year", default)]
  year: String,
  #[serde(rename = "Poster")]
  poster: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
  #[serde(rename = "Response")]
  response: Option<String>,
  #[serde(rename = "Error")]
  error: Option<String>,
  #[serde(rename = "imdbID", default)]
  imdb_id: String,
  #[serde(rename = "Title", default)]
  title: String,
  #[serde(rename = "Year", default)]
  year: String,
  #[serde(rename = "Genre")]
  genre: Option<String>,
  #[serde(rename = "imdbRating")]
  imdb_rating: Option<String>,
  #[serde(rename = "Runtime")]
  runtime: Option<String>,
  #[serde(rename = "Plot")]
  plot: Option<String>,
  #[serde(rename = "Poster")]
  poster: Option<String>,
}

fn is_positive(response: Option<&str>) -> bool {
  response == Some("True")
}

/// Drop empty and "N/A" values.
fn available(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty() && v != NOT_AVAILABLE)
}

impl From<WireSearchItem> for SearchItem {
  fn from(w: WireSearchItem) -> Self {
    SearchItem { id: w.imdb_id, title: w.title, year: w.year, poster: available(w.poster) }
  }
}

// --- Client ---

/// OMDb API client. Cheap to clone; the transport is shared.
#[derive(Clone)]
pub struct OmdbClient {
  transport: Arc<dyn Transport>,
  api_key: Option<String>,
}

impl OmdbClient {
  pub fn new(transport: Arc<dyn Transport>, api_key: Option<String>) -> Self {
    let api_key = api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
    Self { transport, api_key }
  }

  pub fn has_api_key(&self) -> bool {
    self.api_key.is_some()
  }

  fn api_key(&self) -> Result<String, OmdbError> {
    self.api_key.clone().ok_or(OmdbError::MissingApiKey)
  }

  /// List search restricted to movies, first page only.
  ///
  /// The request is abandoned as soon as the paired `AbortHandle` fires, in
  /// which case `OmdbError::Cancelled` is returned.
  pub async fn search(&self, query: &str, abort: AbortRegistration) -> Result<Vec<SearchItem>, OmdbError> {
    let params = [
      ("apikey", self.api_key()?),
      ("s", query.to_string()),
      ("type", "movie".to_string()),
      ("page", "1".to_string()),
    ];

    let body = Abortable::new(self.transport.get(&params), abort).await.map_err(|_| OmdbError::Cancelled)??;
    let envelope: SearchEnvelope = serde_json::from_str(&body)?;
    if !is_positive(envelope.response.as_deref()) {
      let message = envelope.error.unwrap_or_else(|| "No results".to_string());
      debug!(query, message = %message, "omdb: negative search envelope");
      return Err(OmdbError::NotFound(message));
    }
    Ok(envelope.search.into_iter().map(SearchItem::from).collect())
  }

  /// Fetch the detail record for one title.
  pub async fn details(&self, id: &str, plot: PlotLength) -> Result<DetailRecord, OmdbError> {
    let params = [("apikey", self.api_key()?), ("i", id.to_string()), ("plot", plot.as_param().to_string())];

    let body = self.transport.get(&params).await?;
    let envelope: DetailEnvelope = serde_json::from_str(&body)?;
    if !is_positive(envelope.response.as_deref()) {
      return Err(OmdbError::NotFound(envelope.error.unwrap_or_else(|| "Details error".to_string())));
    }

    let id = if envelope.imdb_id.is_empty() { id.to_string() } else { envelope.imdb_id };
    Ok(DetailRecord {
      id,
      title: envelope.title,
      year: envelope.year,
      genre: available(envelope.genre),
      imdb_rating: available(envelope.imdb_rating),
      runtime: available(envelope.runtime),
      plot: available(envelope.plot),
      poster: available(envelope.poster),
    })
  }
}
