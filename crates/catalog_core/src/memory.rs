//! crates/catalog_core/src/memory.rs
//!
//! In-memory implementations of the store ports, used by tests and for running
//! the service without a database.

use crate::domain::{Book, BookPatch, User, UserPatch};
use crate::ports::{CatalogStore, PortError, PortResult, UserStore};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// A `CatalogStore` backed by a vector; insertion order is listing order.
#[derive(Default)]
pub struct InMemoryCatalogStore {
    books: RwLock<Vec<Book>>,
}

impl InMemoryCatalogStore {
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: RwLock::new(books),
        }
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_all(&self) -> PortResult<Vec<Book>> {
        Ok(self.books.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> PortResult<Option<Book>> {
        Ok(self.books.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn search_by_title(&self, text: &str) -> PortResult<Vec<Book>> {
        let needle = text.to_lowercase();
        Ok(self
            .books
            .read()
            .await
            .iter()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn insert(&self, book: Book) -> PortResult<()> {
        let mut books = self.books.write().await;
        if books.iter().any(|b| b.id == book.id) {
            return Err(PortError::Conflict(format!("Book {} already exists", book.id)));
        }
        books.push(book);
        Ok(())
    }

    async fn update(&self, id: &str, patch: BookPatch) -> PortResult<bool> {
        let mut books = self.books.write().await;
        match books.iter_mut().find(|b| b.id == id) {
            Some(book) => {
                patch.apply_to(book);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> PortResult<bool> {
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|b| b.id != id);
        Ok(books.len() != before)
    }
}

/// A `UserStore` backed by a vector. Emails are unique, compared ignoring case.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list_all(&self) -> PortResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> PortResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> PortResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn insert(&self, user: User) -> PortResult<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(PortError::Conflict(format!("Email {} is already registered", user.email)));
        }
        users.push(user);
        Ok(())
    }

    async fn update(&self, id: &str, patch: UserPatch) -> PortResult<bool> {
        let mut users = self.users.write().await;
        if let Some(email) = &patch.email {
            if users
                .iter()
                .any(|u| u.id != id && u.email.eq_ignore_ascii_case(email))
            {
                return Err(PortError::Conflict(format!("Email {} is already registered", email)));
            }
        }
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                patch.apply_to(user);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> PortResult<bool> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str) -> Book {
        Book {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn title_search_is_case_insensitive_and_unanchored() {
        let store = InMemoryCatalogStore::with_books(vec![
            book("1", "Cien Años de Soledad"),
            book("2", "El Amor en los Tiempos del Cólera"),
        ]);

        let hits = store.search_by_title("SOLEDAD").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");

        assert_eq!(store.search_by_title("").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let store = InMemoryCatalogStore::with_books(vec![book("1", "Rayuela")]);
        assert!(store.delete("1").await.unwrap());
        assert!(!store.delete("1").await.unwrap());
    }
}
