//! Book storage.
//!
//! [`BookStore`] is the contract the catalog service talks to;
//! [`InMemoryBookStore`] keeps books in insertion order behind one mutex.

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use super::models::{Book, BookId, BookInput};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("book store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

/// Storage contract for catalog books.
///
/// Every method is atomic with respect to every other method on the same
/// store.
pub trait BookStore: Send + Sync {
    /// Append a fully formed book. The caller guarantees the id is unused.
    fn add(&self, book: Book) -> Result<(), StoreError>;

    /// Assign the next identifier (`max + 1`, or 1 when empty) and append an
    /// available book built from `input`, in a single critical section.
    fn add_with_next_id(&self, input: BookInput) -> Result<Book, StoreError>;

    /// First book with the given id.
    fn get_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError>;

    /// Snapshot of every book in insertion order.
    fn get_all(&self) -> Result<Vec<Book>, StoreError>;

    /// Overwrite title, author, isbn and borrowed flag of the stored book with
    /// the same id. Unknown ids are ignored; the return value tells whether a
    /// record was written.
    fn update(&self, book: &Book) -> Result<bool, StoreError>;

    /// Number of stored books.
    fn len(&self) -> Result<usize, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: Mutex<Vec<Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self, operation: &'static str) -> Result<MutexGuard<'_, Vec<Book>>, StoreError> {
        self.books
            .lock()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }
}

impl BookStore for InMemoryBookStore {
    fn add(&self, book: Book) -> Result<(), StoreError> {
        self.lock("add")?.push(book);
        Ok(())
    }

    fn add_with_next_id(&self, input: BookInput) -> Result<Book, StoreError> {
        let mut books = self.lock("add")?;
        let id = books.iter().map(|book| book.id).max().unwrap_or(0) + 1;
        let book = Book {
            id,
            title: input.title,
            author: input.author,
            isbn: input.isbn,
            borrowed: false,
        };
        books.push(book.clone());
        Ok(book)
    }

    fn get_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        let books = self.lock("get_by_id")?;
        Ok(books.iter().find(|book| book.id == id).cloned())
    }

    fn get_all(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.lock("get_all")?.clone())
    }

    fn update(&self, book: &Book) -> Result<bool, StoreError> {
        let mut books = self.lock("update")?;
        match books.iter_mut().find(|stored| stored.id == book.id) {
            Some(stored) => {
                stored.title.clone_from(&book.title);
                stored.author.clone_from(&book.author);
                stored.isbn.clone_from(&book.isbn);
                stored.borrowed = book.borrowed;
                Ok(true)
            }
            None => {
                tracing::debug!(book_id = book.id, "update skipped: book not in store");
                Ok(false)
            }
        }
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock("len")?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn book(id: BookId, title: &str) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: "Anon".to_string(),
            isbn: String::new(),
            borrowed: false,
        }
    }

    #[test]
    fn next_id_starts_at_one_and_follows_max() {
        let store = InMemoryBookStore::new();
        let first = store
            .add_with_next_id(BookInput::new("A", "Anon", ""))
            .unwrap();
        assert_eq!(first.id, 1);
        assert!(!first.borrowed);

        store.add(book(10, "B")).unwrap();
        let next = store
            .add_with_next_id(BookInput::new("C", "Anon", ""))
            .unwrap();
        assert_eq!(next.id, 11);
    }

    #[test]
    fn get_all_keeps_insertion_order() {
        let store = InMemoryBookStore::new();
        store.add(book(5, "A")).unwrap();
        store.add(book(2, "B")).unwrap();
        store.add(book(9, "C")).unwrap();

        let titles: Vec<_> = store
            .get_all()
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn get_by_id_returns_first_match() {
        let store = InMemoryBookStore::new();
        store.add(book(1, "first")).unwrap();
        store.add(book(1, "shadow")).unwrap();

        assert_eq!(store.get_by_id(1).unwrap().unwrap().title, "first");
        assert!(store.get_by_id(2).unwrap().is_none());
    }

    #[test]
    fn update_overwrites_mutable_fields() {
        let store = InMemoryBookStore::new();
        store.add(book(1, "Old")).unwrap();

        let mut changed = book(1, "New");
        changed.author = "Someone".to_string();
        changed.isbn = "123".to_string();
        changed.borrowed = true;
        assert!(store.update(&changed).unwrap());

        assert_eq!(store.get_by_id(1).unwrap().unwrap(), changed);
    }

    #[test]
    fn update_of_unknown_id_is_a_silent_no_op() {
        let store = InMemoryBookStore::new();
        store.add(book(1, "Only")).unwrap();

        assert!(!store.update(&book(2, "Ghost")).unwrap());
        assert_eq!(store.get_all().unwrap(), vec![book(1, "Only")]);
    }

    #[test]
    fn concurrent_adds_assign_distinct_ids() {
        let store = Arc::new(InMemoryBookStore::new());

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for n in 0..50 {
                        store
                            .add_with_next_id(BookInput::new(format!("{worker}-{n}"), "Anon", ""))
                            .unwrap();
                    }
                });
            }
        });

        let mut ids: Vec<_> = store.get_all().unwrap().iter().map(|b| b.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=400).collect::<Vec<_>>());
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let store = Arc::new(InMemoryBookStore::new());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.books.lock().unwrap();
            panic!("poison the store");
        })
        .join();

        assert!(matches!(
            store.get_all(),
            Err(StoreError::LockPoisoned("get_all"))
        ));
    }
}
