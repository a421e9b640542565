//! crates/catalog_core/src/aggregation.rs
//!
//! Multi-source search. One query fans out to the home catalog and every partner
//! catalog at once; whatever comes back is projected, tagged with its origin and
//! concatenated in configuration order.

use crate::domain::Book;
use crate::ports::{CatalogStore, ExternalBookSource, PortError, PortResult};
use crate::projection::BookView;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;

/// Origin name that always routes to the home catalog.
pub const INTERNAL_ORIGIN: &str = "interno";

/// Per-source result counts of one aggregated search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SearchStats {
    #[serde(rename = "internos")]
    pub internal: usize,
    /// Count per partner key.
    #[serde(rename = "externos")]
    pub external: BTreeMap<String, usize>,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub books: Vec<BookView>,
    pub stats: SearchStats,
}

/// Combines the home catalog with the configured partner catalogs.
pub struct AggregationService {
    catalog: Arc<dyn CatalogStore>,
    sources: Vec<Arc<dyn ExternalBookSource>>,
    home_label: String,
}

impl AggregationService {
    /// `sources` order is the order partner results appear in every response.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        sources: Vec<Arc<dyn ExternalBookSource>>,
        home_label: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            sources,
            home_label: home_label.into(),
        }
    }

    /// Name of the institution that owns the internal catalog.
    pub fn home_label(&self) -> &str {
        &self.home_label
    }

    pub fn sources(&self) -> &[Arc<dyn ExternalBookSource>] {
        &self.sources
    }

    /// Searches every source by title; an empty query lists everything.
    ///
    /// Partner failures only shrink the result. The call fails only when the
    /// home catalog reports a backend fault and no partner task completed.
    pub async fn search(&self, query: &str) -> PortResult<SearchResults> {
        let query = query.trim().to_string();

        // Every lookup is spawned before anything is awaited.
        let internal_task = {
            let catalog = Arc::clone(&self.catalog);
            let query = query.clone();
            tokio::spawn(async move {
                if query.is_empty() {
                    catalog.list_all().await
                } else {
                    catalog.search_by_title(&query).await
                }
            })
        };
        let external_tasks: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                let query = query.clone();
                tokio::spawn(async move { source.search_by_title(&query).await })
            })
            .collect();

        let (internal_outcome, external_outcomes) =
            futures::join!(internal_task, join_all(external_tasks));

        let internal_books: Option<Vec<Book>> = match internal_outcome {
            Ok(Ok(books)) => Some(books),
            Ok(Err(e)) => {
                error!(error = %e, "Internal catalog search failed");
                None
            }
            Err(e) => {
                error!(error = %e, "Internal catalog task aborted");
                None
            }
        };

        let mut stats = SearchStats::default();
        let mut books = Vec::new();

        if let Some(internal) = &internal_books {
            stats.internal = internal.len();
            books.extend(
                internal
                    .iter()
                    .cloned()
                    .map(|book| BookView::from_internal(book, &self.home_label)),
            );
        }

        let mut completed_sources = 0;
        for (source, outcome) in self.sources.iter().zip(external_outcomes) {
            let count = match outcome {
                Ok(found) => {
                    completed_sources += 1;
                    let count = found.len();
                    books.extend(
                        found
                            .into_iter()
                            .map(|book| BookView::from_external(book, source.label())),
                    );
                    count
                }
                Err(e) => {
                    warn!(source = source.key(), error = %e, "Partner search task failed, skipping");
                    0
                }
            };
            *stats.external.entry(source.key().to_string()).or_insert(0) += count;
        }

        if internal_books.is_none() && completed_sources == 0 {
            return Err(PortError::Unexpected(
                "No catalog source could be searched".to_string(),
            ));
        }

        stats.total = books.len();
        info!(
            query = %query,
            internal = stats.internal,
            total = stats.total,
            "Aggregated search completed"
        );
        Ok(SearchResults { books, stats })
    }

    /// Looks up one book by its source-local id and the name of its owner.
    ///
    /// `origin` is `interno`, the home institution's label, or a partner's key,
    /// label or alias (all compared ignoring case).
    pub async fn find_book(&self, id: &str, origin: &str) -> PortResult<BookView> {
        let origin = origin.trim();
        if origin.eq_ignore_ascii_case(INTERNAL_ORIGIN)
            || origin.to_lowercase() == self.home_label.to_lowercase()
        {
            let book = self
                .catalog
                .get_by_id(id)
                .await?
                .ok_or_else(|| PortError::NotFound(format!("Book {} not found", id)))?;
            return Ok(BookView::from_internal(book, &self.home_label));
        }

        let source = self
            .sources
            .iter()
            .find(|source| source.answers_to(origin))
            .ok_or_else(|| PortError::UnknownOrigin(origin.to_string()))?;

        let book = source.get_by_id(id).await.ok_or_else(|| {
            PortError::NotFound(format!("Book {} not found in {}", id, source.label()))
        })?;
        Ok(BookView::from_external(book, source.label()))
    }
}
