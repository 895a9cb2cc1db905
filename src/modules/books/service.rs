use std::sync::Arc;

use thiserror::Error;

use super::models::{Book, BookId, BookInput, BookView};
use super::store::{BookStore, InMemoryBookStore, StoreError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("book {0} not found")]
    NotFound(BookId),

    /// Borrow of a borrowed book or return of an available one.
    #[error("book {0} is not available for this operation")]
    NotAvailable(BookId),

    #[error("missing required fields: {}", .missing.join(", "))]
    InvalidInput { missing: Vec<&'static str> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog operations on top of a [`BookStore`].
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BookStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Service backed by a fresh [`InMemoryBookStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBookStore::new()))
    }

    /// Add a book with the next free identifier. Title and author must be
    /// non-blank; the fields are copied from `input` unchanged.
    pub fn add_book(&self, input: BookInput) -> CatalogResult<Book> {
        let input = validate(input)?;
        let book = self.store.add_with_next_id(input)?;
        tracing::info!(book_id = book.id, title = %book.title, "book added");
        Ok(book)
    }

    pub fn borrow_book(&self, id: BookId) -> CatalogResult<Book> {
        self.transition(id, true)
    }

    pub fn return_book(&self, id: BookId) -> CatalogResult<Book> {
        self.transition(id, false)
    }

    pub fn get_by_id(&self, id: BookId) -> CatalogResult<Book> {
        self.store.get_by_id(id)?.ok_or(CatalogError::NotFound(id))
    }

    pub fn get_all_books(&self) -> CatalogResult<Vec<BookView>> {
        Ok(self
            .store
            .get_all()?
            .into_iter()
            .map(BookView::from)
            .collect())
    }

    pub fn count(&self) -> CatalogResult<usize> {
        Ok(self.store.len()?)
    }

    /// Flip the borrowed flag to `borrowed`, rejecting a flip to the state
    /// the book is already in.
    fn transition(&self, id: BookId, borrowed: bool) -> CatalogResult<Book> {
        let mut book = self.get_by_id(id)?;
        if book.borrowed == borrowed {
            tracing::debug!(book_id = id, borrowed, "book already in requested state");
            return Err(CatalogError::NotAvailable(id));
        }

        book.borrowed = borrowed;
        self.store.update(&book)?;
        tracing::info!(book_id = id, borrowed, "book state changed");
        Ok(book)
    }
}

/// Whitespace-only fields count as missing; accepted input is stored as given.
fn validate(input: BookInput) -> CatalogResult<BookInput> {
    let missing: Vec<&'static str> = [("title", &input.title), ("author", &input.author)]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();
    if !missing.is_empty() {
        return Err(CatalogError::InvalidInput { missing });
    }

    Ok(input)
}
