//! services/api/src/adapters/partner.rs
//!
//! This module contains the HTTP adapter for partner-university catalogs. It is the
//! concrete implementation of the `ExternalBookSource` port from the `core` crate.
//!
//! One generic adapter serves every partner: the endpoints, query parameter, timeout
//! and field precedence all come from a `PartnerConfig`.

use crate::config::ConfigError;
use async_trait::async_trait;
use catalog_core::domain::Book;
use catalog_core::field_map::FieldMapping;
use catalog_core::ports::ExternalBookSource;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

//=========================================================================================
// Partner Configuration
//=========================================================================================

fn default_search_param() -> String {
    "q".to_string()
}

/// Declarative description of one partner catalog, read from `partners.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerConfig {
    /// Key used in search statistics.
    pub key: String,
    /// Name of the owning institution, used as origin label.
    pub label: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Search endpoint; the query is sent as `?<search_param>=<text>`.
    pub search_url: String,
    #[serde(default = "default_search_param")]
    pub search_param: String,
    /// Endpoint returning the whole catalog, used for empty queries.
    #[serde(default)]
    pub list_url: Option<String>,
    /// Base of the by-id endpoint (`<item_url>/<id>`). Without it, lookups
    /// list the catalog and filter locally.
    #[serde(default)]
    pub item_url: Option<String>,
    /// JSON pointer to the record array when the partner wraps it, e.g. `/data`.
    #[serde(default)]
    pub records_pointer: Option<String>,
    #[serde(default)]
    pub fallback_author: Option<String>,
    /// Overrides the service-wide partner timeout.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub fields: FieldMapping,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payload is not a JSON array")]
    NotAnArray,
}

/// An adapter that implements the `ExternalBookSource` port over a partner's REST API.
#[derive(Clone)]
pub struct HttpPartnerAdapter {
    client: Client,
    config: PartnerConfig,
    search_url: Url,
    list_url: Option<Url>,
    item_url: Option<Url>,
    timeout: Duration,
}

fn parse_url(partner: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| {
        ConfigError::Partners(partner.to_string(), format!("invalid URL '{}': {}", raw, e))
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::Partners(
            partner.to_string(),
            format!("URL '{}' cannot carry a path", raw),
        ));
    }
    Ok(url)
}

impl HttpPartnerAdapter {
    /// Creates a new `HttpPartnerAdapter`.
    ///
    /// Fails only on misconfiguration (an unparseable URL); request-time problems
    /// never surface as errors.
    pub fn new(
        client: Client,
        config: PartnerConfig,
        default_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let search_url = parse_url(&config.key, &config.search_url)?;
        let list_url = config
            .list_url
            .as_deref()
            .map(|raw| parse_url(&config.key, raw))
            .transpose()?;
        let item_url = config
            .item_url
            .as_deref()
            .map(|raw| parse_url(&config.key, raw))
            .transpose()?;
        let timeout = config
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(default_timeout);

        Ok(Self {
            client,
            config,
            search_url,
            list_url,
            item_url,
            timeout,
        })
    }

    fn fallback_author(&self) -> &str {
        self.config.fallback_author.as_deref().unwrap_or(&self.config.label)
    }

    fn to_book(&self, record: &Value) -> Book {
        self.config.fields.to_book(record, self.fallback_author())
    }

    /// GETs `url` and parses the body as JSON, all within the partner timeout.
    async fn fetch_json(&self, url: Url) -> Result<Value, FetchError> {
        debug!(source = %self.config.key, %url, "Querying partner catalog");
        let request = async {
            let response = self.client.get(url).send().await?.error_for_status()?;
            response.json::<Value>().await
        };
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }

    /// Fetches a listing endpoint and maps every record it holds.
    async fn fetch_books(&self, url: Url) -> Result<Vec<Book>, FetchError> {
        let payload = self.fetch_json(url).await?;
        let records = match &self.config.records_pointer {
            Some(pointer) => payload.pointer(pointer),
            None => Some(&payload),
        };
        match records {
            Some(Value::Array(items)) => Ok(items.iter().map(|item| self.to_book(item)).collect()),
            _ => Err(FetchError::NotAnArray),
        }
    }

    fn search_url_for(&self, query: &str) -> Url {
        if query.is_empty() {
            if let Some(list_url) = &self.list_url {
                return list_url.clone();
            }
        }
        let mut url = self.search_url.clone();
        url.query_pairs_mut().append_pair(&self.config.search_param, query);
        url
    }

    fn item_url_for(&self, base: &Url, id: &str) -> Url {
        let mut url = base.clone();
        // `new` rejected cannot-be-a-base URLs, so segments are always editable.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id);
        }
        url
    }

    async fn fetch_item(&self, base: &Url, id: &str) -> Result<Option<Book>, FetchError> {
        let payload = self.fetch_json(self.item_url_for(base, id)).await?;
        let book = match &payload {
            // Some partners answer a by-id request with a one-element array.
            Value::Array(items) => items.iter().map(|item| self.to_book(item)).find(|b| b.id == id),
            Value::Object(_) => Some(self.to_book(&payload)),
            _ => None,
        };
        Ok(book.filter(|b| !b.id.is_empty() || !b.title.is_empty()))
    }
}

//=========================================================================================
// `ExternalBookSource` Trait Implementation
//=========================================================================================

#[async_trait]
impl ExternalBookSource for HttpPartnerAdapter {
    fn key(&self) -> &str {
        &self.config.key
    }

    fn label(&self) -> &str {
        &self.config.label
    }

    fn aliases(&self) -> &[String] {
        &self.config.aliases
    }

    async fn search_by_title(&self, query: &str) -> Vec<Book> {
        let query = query.trim();
        match self.fetch_books(self.search_url_for(query)).await {
            Ok(books) => {
                info!(source = %self.config.key, count = books.len(), "Partner search completed");
                books
            }
            Err(e) => {
                warn!(source = %self.config.key, error = %e, "Partner search failed, contributing no results");
                Vec::new()
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Option<Book> {
        let id = id.trim();
        // Records without a mapped id carry an empty one and must never match.
        if id.is_empty() {
            return None;
        }
        let result = match &self.item_url {
            Some(base) => self.fetch_item(base, id).await,
            None => self
                .fetch_books(self.search_url_for(""))
                .await
                .map(|books| books.into_iter().find(|b| b.id == id)),
        };
        match result {
            Ok(book) => {
                if book.is_none() {
                    info!(source = %self.config.key, id, "Book not found at partner");
                }
                book
            }
            Err(e) => {
                warn!(source = %self.config.key, id, error = %e, "Partner lookup failed");
                None
            }
        }
    }
}
