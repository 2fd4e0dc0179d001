//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with filters
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    /// Get book by ID
    pub async fn get(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Register a new book. ISBNs are unique; a duplicate is rejected
    /// before touching the insert.
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        if self.repository.books.exists_by_isbn(&book.isbn).await? {
            return Err(AppError::BusinessRule("Isbn already registered.".to_string()));
        }
        self.repository.books.create(&book).await
    }

    /// Update title and author of a book. The stored ISBN is kept.
    pub async fn update(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        self.repository
            .books
            .update(id, &update.title, &update.author)
            .await
    }

    /// Delete a book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
