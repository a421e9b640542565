//! crates/catalog_core/src/projection.rs
//!
//! Maps canonical records to the shapes sent over the wire.

use crate::domain::{Book, Role, User};
use serde::Serialize;
use utoipa::ToSchema;

/// A book as the search and catalog endpoints return it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    /// Globally unique: raw id for internal books, `<originLabel>-<rawId>` otherwise.
    pub id: String,
    pub title: String,
    /// Name of the institution that owns the book.
    pub origin_label: String,
    pub cover_url: String,
    pub pdf_url: String,
    pub author: String,
    pub description: String,
    pub publish_date: String,
}

impl BookView {
    /// Projects a book from the home institution's own catalog.
    pub fn from_internal(book: Book, home_label: &str) -> Self {
        Self::project(book.id.clone(), book, home_label)
    }

    /// Projects a partner book, namespacing its id with the origin label.
    pub fn from_external(book: Book, origin_label: &str) -> Self {
        let id = format!("{}-{}", origin_label, book.id);
        Self::project(id, book, origin_label)
    }

    fn project(id: String, book: Book, origin_label: &str) -> Self {
        // Partners report a genre but rarely a description.
        let description = if book.description.trim().is_empty() {
            book.genre
        } else {
            book.description
        };

        Self {
            id,
            title: book.title,
            origin_label: origin_label.to_string(),
            cover_url: book.cover_image,
            pdf_url: book.pdf_document,
            author: book.author,
            description,
            publish_date: book.publish_date,
        }
    }
}

/// A user without any credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}
