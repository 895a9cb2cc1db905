use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalog identifier, assigned by the store starting at 1.
pub type BookId = u64;

/// Canonical book record owned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub borrowed: bool,
}

impl Book {
    pub fn is_available(&self) -> bool {
        !self.borrowed
    }
}

/// Request model for adding a book to the catalog.
///
/// Missing fields deserialize as empty strings so that presence is reported
/// as a validation error instead of a body rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookInput {
    /// Title of the book
    #[serde(default)]
    pub title: String,
    /// Author of the book
    #[serde(default)]
    pub author: String,
    /// ISBN, stored as given
    #[serde(default)]
    pub isbn: String,
}

impl BookInput {
    pub fn new(title: impl Into<String>, author: impl Into<String>, isbn: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
        }
    }
}

/// Response model for a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookView {
    /// Unique identifier for the book
    pub id: BookId,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// ISBN of the book
    pub isbn: String,
    /// Whether the book is currently borrowed
    pub borrowed: bool,
}

impl From<Book> for BookView {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            borrowed: book.borrowed,
        }
    }
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        Self::from(book.clone())
    }
}

/// Health payload for the books module.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BooksHealth {
    pub status: String,
    /// Number of books currently in the catalog
    pub books: usize,
}
