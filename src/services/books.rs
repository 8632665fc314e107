//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        enums::BookStatus,
        loan::LoanDetails,
    },
    repository::Repository,
};

use super::validation;

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books with optional filters
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        if let Some(id) = query.id {
            // An explicit id behaves like a lookup: unknown ids are a 404, not an empty list
            self.repository.books.get_by_id(id).await?;
        }
        self.repository.books.list(query).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book, AVAILABLE unless a status is given
    pub async fn create(&self, data: CreateBook) -> AppResult<Book> {
        let status = data.status.unwrap_or_default();
        let data = validation::validate_new_book(data)?;
        let book = self.repository.books.create(&data, status).await?;
        tracing::info!("Created book id={} isbn={}", book.id, book.isbn);
        Ok(book)
    }

    /// Update title, author, ISBN and publication date of a book
    pub async fn update(&self, id: i64, data: UpdateBook) -> AppResult<Book> {
        let data = validation::validate_book_update(data)?;
        self.repository.books.update(id, &data).await
    }

    pub async fn update_status(&self, id: i64, status: BookStatus) -> AppResult<Book> {
        let book = self.repository.books.update_status(id, status).await?;
        tracing::info!("Book id={} status set to {}", id, status);
        Ok(book)
    }

    /// Delete a book that is neither borrowed nor part of an unreturned loan
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        match self.repository.books.delete(id).await {
            Ok(()) => {
                tracing::info!("Deleted book id={}", id);
                Ok(())
            }
            Err(e @ AppError::BusinessRule(_)) => {
                tracing::warn!("Refused to delete book id={}: {}", id, e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Loans that include the book
    pub async fn get_loans(&self, id: i64) -> AppResult<Vec<LoanDetails>> {
        self.repository.books.get_by_id(id).await?;
        self.repository.loans.get_book_loans(id).await
    }
}
