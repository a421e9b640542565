//! crates/catalog_core/src/commands.rs
//!
//! The write side of the catalog: validation, id generation and defaulting for
//! books and users before they reach a store.

use crate::domain::{Book, BookPatch, NewBook, NewUser, User, UserPatch};
use crate::ports::{CatalogStore, PortError, PortResult, UserStore};
use chrono::Utc;
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

const MAX_DESCRIPTION_CHARS: usize = 1000;

fn base64_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(data:[A-Za-z0-9.+/-]+;base64,)?[A-Za-z0-9+/\r\n]+={0,2}$")
            .expect("static base64 pattern")
    })
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

fn require(value: &str, field: &str) -> PortResult<()> {
    if value.trim().is_empty() {
        return Err(PortError::Validation(format!("Missing required field: {}", field)));
    }
    Ok(())
}

fn check_base64(value: &str, field: &str) -> PortResult<()> {
    if !base64_regex().is_match(value.trim()) {
        return Err(PortError::Validation(format!("{} must be a Base64 payload", field)));
    }
    Ok(())
}

fn check_description(value: &str) -> PortResult<()> {
    if value.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(PortError::Validation(format!(
            "description cannot exceed {} characters",
            MAX_DESCRIPTION_CHARS
        )));
    }
    Ok(())
}

fn check_email(value: &str) -> PortResult<()> {
    if !email_regex().is_match(value.trim()) {
        return Err(PortError::Validation("Invalid email format".to_string()));
    }
    Ok(())
}

//=========================================================================================
// Books
//=========================================================================================

/// Validates and persists a new internal book, returning it with its generated id.
pub async fn create_book(store: &dyn CatalogStore, new_book: NewBook) -> PortResult<Book> {
    require(&new_book.title, "title")?;
    require(&new_book.author, "author")?;
    require(&new_book.cover_image, "coverImage")?;
    require(&new_book.pdf_document, "pdfDocument")?;
    check_base64(&new_book.cover_image, "coverImage")?;
    check_base64(&new_book.pdf_document, "pdfDocument")?;
    check_description(&new_book.description)?;

    let publish_date = if new_book.publish_date.trim().is_empty() {
        today()
    } else {
        new_book.publish_date
    };

    let book = Book {
        id: Uuid::new_v4().to_string(),
        title: new_book.title.trim().to_string(),
        cover_image: new_book.cover_image.trim().to_string(),
        pdf_document: new_book.pdf_document.trim().to_string(),
        author: new_book.author.trim().to_string(),
        genre: new_book.genre,
        description: new_book.description,
        publish_date,
    };
    store.insert(book.clone()).await?;
    Ok(book)
}

/// Applies a partial update. `Ok(false)` means no book has that id.
pub async fn update_book(store: &dyn CatalogStore, id: &str, patch: BookPatch) -> PortResult<bool> {
    if patch.is_empty() {
        return Err(PortError::Validation(
            "Provide at least one field to update".to_string(),
        ));
    }
    if let Some(title) = &patch.title {
        require(title, "title")?;
    }
    if let Some(author) = &patch.author {
        require(author, "author")?;
    }
    if let Some(cover) = &patch.cover_image {
        check_base64(cover, "coverImage")?;
    }
    if let Some(pdf) = &patch.pdf_document {
        check_base64(pdf, "pdfDocument")?;
    }
    if let Some(description) = &patch.description {
        check_description(description)?;
    }
    store.update(id, patch).await
}

//=========================================================================================
// Users
//=========================================================================================

/// Validates and persists a new user.
///
/// `hash_password` turns the plain-text password into the stored hash; it runs
/// only once every other field has passed validation.
pub async fn create_user<F>(
    store: &dyn UserStore,
    new_user: NewUser,
    hash_password: F,
) -> PortResult<User>
where
    F: FnOnce(&str) -> PortResult<String>,
{
    require(&new_user.name, "name")?;
    require(&new_user.email, "email")?;
    require(&new_user.password, "password")?;
    let role = new_user
        .role
        .ok_or_else(|| PortError::Validation("Missing required field: role".to_string()))?;
    check_email(&new_user.email)?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: new_user.name.trim().to_string(),
        email: new_user.email.trim().to_lowercase(),
        role,
        password_hash: hash_password(&new_user.password)?,
    };
    store.insert(user.clone()).await?;
    Ok(user)
}

/// Applies a partial update. `Ok(false)` means no user has that id.
pub async fn update_user(store: &dyn UserStore, id: &str, mut patch: UserPatch) -> PortResult<bool> {
    if patch.is_empty() {
        return Err(PortError::Validation(
            "Provide at least one field to update".to_string(),
        ));
    }
    if let Some(name) = &patch.name {
        require(name, "name")?;
    }
    if let Some(email) = patch.email.as_mut() {
        check_email(email)?;
        *email = email.trim().to_lowercase();
    }
    store.update(id, patch).await
}
