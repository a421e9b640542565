//! crates/catalog_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the catalog's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete database and partner HTTP implementations.

use async_trait::async_trait;
use crate::domain::{Book, BookPatch, User, UserPatch};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unrecognized institution: {0}")]
    UnknownOrigin(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// CRUD access to the home institution's book table.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_all(&self) -> PortResult<Vec<Book>>;

    async fn get_by_id(&self, id: &str) -> PortResult<Option<Book>>;

    /// Case-insensitive, unanchored title match.
    async fn search_by_title(&self, text: &str) -> PortResult<Vec<Book>>;

    async fn insert(&self, book: Book) -> PortResult<()>;

    /// Returns `false` when no row with `id` exists.
    async fn update(&self, id: &str, patch: BookPatch) -> PortResult<bool>;

    /// Returns `false` when no row with `id` exists.
    async fn delete(&self, id: &str) -> PortResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_all(&self) -> PortResult<Vec<User>>;

    async fn get_by_id(&self, id: &str) -> PortResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> PortResult<Option<User>>;

    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn insert(&self, user: User) -> PortResult<()>;

    async fn update(&self, id: &str, patch: UserPatch) -> PortResult<bool>;

    async fn delete(&self, id: &str) -> PortResult<bool>;
}

/// One external partner catalog.
///
/// Implementations never fail for expected conditions: an unreachable partner,
/// a timeout, a non-2xx status or an unreadable body all come back as an empty
/// list or `None`.
#[async_trait]
pub trait ExternalBookSource: Send + Sync {
    /// Stable key used in search statistics, e.g. `utl`.
    fn key(&self) -> &str;

    /// Human-readable name of the owning institution.
    fn label(&self) -> &str;

    /// Additional names the view-one-record route accepts for this source.
    fn aliases(&self) -> &[String] {
        &[]
    }

    /// Searches by title. An empty query lists the whole partner catalog.
    async fn search_by_title(&self, query: &str) -> Vec<Book>;

    async fn get_by_id(&self, id: &str) -> Option<Book>;

    /// Whether `origin` names this source (key, label or alias, ignoring case).
    fn answers_to(&self, origin: &str) -> bool {
        let origin = origin.trim();
        origin.eq_ignore_ascii_case(self.key())
            || origin.to_lowercase() == self.label().to_lowercase()
            || self
                .aliases()
                .iter()
                .any(|alias| alias.to_lowercase() == origin.to_lowercase())
    }
}
