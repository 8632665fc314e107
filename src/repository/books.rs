//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookData, BookQuery},
        enums::{BookStatus, LoanStatus},
    },
    services::validation,
};

/// `%term%` with the LIKE wildcards of the term escaped, so they match literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// ISBNs are unique: report a clash as bad input rather than a database failure
fn isbn_conflict(e: sqlx::Error, isbn: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Validation(format!("A book with ISBN {} already exists", isbn))
        }
        _ => AppError::Database(e),
    }
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List books, optionally filtered
    pub async fn list(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.id.is_some() {
            conditions.push(format!("id = ${}", idx));
            idx += 1;
        }
        if query.title.is_some() {
            conditions.push(format!("title ILIKE ${} ESCAPE '\\'", idx));
            idx += 1;
        }
        if query.author.is_some() {
            conditions.push(format!("author ILIKE ${} ESCAPE '\\'", idx));
            idx += 1;
        }
        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("SELECT * FROM books {} ORDER BY id", where_clause);

        let mut builder = sqlx::query_as::<_, Book>(&sql);
        if let Some(id) = query.id {
            builder = builder.bind(id);
        }
        if let Some(ref title) = query.title {
            builder = builder.bind(contains_pattern(title));
        }
        if let Some(ref author) = query.author {
            builder = builder.bind(contains_pattern(author));
        }
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Create a book
    pub async fn create(&self, data: &BookData, status: BookStatus) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, published_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.isbn)
        .bind(data.published_date)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| isbn_conflict(e, &data.isbn))?;
        Ok(book)
    }

    /// Replace the descriptive fields of a book, leaving its status alone
    pub async fn update(&self, id: i64, data: &BookData) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1, author = $2, isbn = $3, published_date = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.isbn)
        .bind(data.published_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| isbn_conflict(e, &data.isbn))?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Set the status of a book
    pub async fn update_status(&self, id: i64, status: BookStatus) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("UPDATE books SET status = $1 WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Count loans including this book that have not been returned
    async fn count_open_loans(conn: &mut PgConnection, id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM loan_books lb
            JOIN loans l ON l.id = lb.loan_id
            WHERE lb.book_id = $1 AND l.status <> $2
            "#,
        )
        .bind(id)
        .bind(LoanStatus::Returned)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    /// Delete a book that is neither borrowed nor part of an unreturned loan.
    ///
    /// The row stays locked from the check to the delete, so a loan created
    /// concurrently either sees the book gone or blocks the delete.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let open_loans = Self::count_open_loans(&mut tx, id).await?;
        validation::ensure_book_deletable(&book, open_loans)?;

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
