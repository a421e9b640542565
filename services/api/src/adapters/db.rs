//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `CatalogStore` and `UserStore` ports from the `core` crate. It handles all
//! interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use catalog_core::domain::{Book, BookPatch, Role, User, UserPatch};
use catalog_core::ports::{CatalogStore, PortError, PortResult, UserStore};
use sqlx::{FromRow, PgPool};
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the store ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to apply the bootstrap schema at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Escapes LIKE metacharacters so user text is matched literally.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct BookRecord {
    id: String,
    title: String,
    cover_image: String,
    pdf_document: String,
    author: String,
    genre: String,
    description: String,
    publish_date: String,
}
impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            cover_image: self.cover_image,
            pdf_document: self.pdf_document,
            author: self.author,
            genre: self.genre,
            description: self.description,
            publish_date: self.publish_date,
        }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    role: String,
    password_hash: String,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        let role = self.role.parse::<Role>().map_err(|e| {
            PortError::Unexpected(format!("User {} has a corrupt role: {}", self.id, e))
        })?;
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            role,
            password_hash: self.password_hash,
        })
    }
}

const BOOK_COLUMNS: &str =
    "id, title, cover_image, pdf_document, author, genre, description, publish_date";
const USER_COLUMNS: &str = "id, name, email, role, password_hash";

//=========================================================================================
// `CatalogStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogStore for DbAdapter {
    async fn list_all(&self) -> PortResult<Vec<Book>> {
        let records = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books ORDER BY created_at ASC",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_by_id(&self, id: &str) -> PortResult<Option<Book>> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn search_by_title(&self, text: &str) -> PortResult<Vec<Book>> {
        let records = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books WHERE title ILIKE $1 ESCAPE '\\' ORDER BY created_at ASC",
            BOOK_COLUMNS
        ))
        .bind(like_pattern(text))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insert(&self, book: Book) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO books (id, title, cover_image, pdf_document, author, genre, description, publish_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&book.id)
        .bind(&book.title)
        .bind(&book.cover_image)
        .bind(&book.pdf_document)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(&book.description)
        .bind(&book.publish_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!("Book {} already exists", book.id))
            } else {
                unexpected(e)
            }
        })?;
        Ok(())
    }

    async fn update(&self, id: &str, patch: BookPatch) -> PortResult<bool> {
        let result = sqlx::query(
            "UPDATE books SET \
                title = COALESCE($2, title), \
                cover_image = COALESCE($3, cover_image), \
                pdf_document = COALESCE($4, pdf_document), \
                author = COALESCE($5, author), \
                genre = COALESCE($6, genre), \
                description = COALESCE($7, description), \
                publish_date = COALESCE($8, publish_date) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.cover_image)
        .bind(patch.pdf_document)
        .bind(patch.author)
        .bind(patch.genre)
        .bind(patch.description)
        .bind(patch.publish_date)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for DbAdapter {
    async fn list_all(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        // A single corrupt row should not hide every other user.
        Ok(records
            .into_iter()
            .filter_map(|r| match r.to_domain() {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Skipping user row: {}", e);
                    None
                }
            })
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn get_by_email(&self, email: &str) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn insert(&self, user: User) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, role, password_hash) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!("Email {} is already registered", user.email))
            } else {
                unexpected(e)
            }
        })?;
        Ok(())
    }

    async fn update(&self, id: &str, patch: UserPatch) -> PortResult<bool> {
        let email = patch.email.clone();
        let result = sqlx::query(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                role = COALESCE($4, role) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.role.map(|r| r.as_str()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!(
                    "Email {} is already registered",
                    email.unwrap_or_default()
                ))
            } else {
                unexpected(e)
            }
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &str) -> PortResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected() > 0)
    }
}
