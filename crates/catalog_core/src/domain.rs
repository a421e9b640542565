//! crates/catalog_core/src/domain.rs
//!
//! Defines the pure, core data structures for the catalog.
//! These structs are independent of any database, partner API or wire format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// The canonical, source-agnostic book record used for merging.
///
/// Every field is a plain `String`; a value the source did not provide is the
/// empty string, never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Book {
    /// Source-local identifier.
    pub id: String,
    pub title: String,
    /// URL or Base64 payload of the cover image.
    pub cover_image: String,
    /// URL or Base64 payload of the PDF.
    pub pdf_document: String,
    /// Author, or the owning institution when a partner only reports that.
    pub author: String,
    pub genre: String,
    pub description: String,
    /// Best-effort ISO date (`YYYY-MM-DD`).
    pub publish_date: String,
}

/// Fields accepted when registering a new internal book.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default, alias = "imageUrl")]
    pub cover_image: String,
    #[serde(default, alias = "pdfUrl")]
    pub pdf_document: String,
    #[serde(default, alias = "authorName")]
    pub author: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publish_date: String,
}

/// A partial update: only `Some` fields overwrite the stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default, alias = "imageUrl")]
    pub cover_image: Option<String>,
    #[serde(default, alias = "pdfUrl")]
    pub pdf_document: Option<String>,
    #[serde(default, alias = "authorName")]
    pub author: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.cover_image.is_none()
            && self.pdf_document.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.description.is_none()
            && self.publish_date.is_none()
    }

    /// Overwrites the fields of `book` that this patch provides.
    pub fn apply_to(&self, book: &mut Book) {
        let fields = [
            (&self.title, &mut book.title),
            (&self.cover_image, &mut book.cover_image),
            (&self.pdf_document, &mut book.pdf_document),
            (&self.author, &mut book.author),
            (&self.genre, &mut book.genre),
            (&self.description, &mut book.description),
            (&self.publish_date, &mut book.publish_date),
        ];
        for (patch, target) in fields {
            if let Some(value) = patch {
                *target = value.clone();
            }
        }
    }
}

/// The two kinds of library account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "bibliotecario")]
    Librarian,
    #[serde(alias = "alumno")]
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Librarian => "librarian",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "librarian" | "bibliotecario" => Ok(Role::Librarian),
            "student" | "alumno" => Ok(Role::Student),
            other => Err(format!("Invalid role '{}'", other)),
        }
    }
}

// Only used inside the backend - contains the password hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// Fields accepted when registering a new user. The password is plain text
/// here and is hashed before anything reaches a store.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewUser {
    #[serde(default, alias = "nombre")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "rol")]
    pub role: Option<Role>,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct UserPatch {
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "rol")]
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }

    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}
