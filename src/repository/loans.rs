//! Loans repository for database operations

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::{FromRow, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        customer::Customer,
        enums::{BookStatus, LoanStatus},
        loan::{Loan, LoanDetails, NewLoan},
    },
    services::validation,
};

/// A book joined with the loan it belongs to
#[derive(FromRow)]
struct LoanBookRow {
    loan_id: i64,
    #[sqlx(flatten)]
    book: Book,
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan by ID with customer and books
    pub async fn get_details(&self, id: i64) -> AppResult<LoanDetails> {
        let loan = self.get_by_id(id).await?;
        self.details(loan).await
    }

    /// List all loans
    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans ORDER BY loan_date, id")
            .fetch_all(&self.pool)
            .await?;
        self.with_details(loans).await
    }

    /// Loans of a customer
    pub async fn get_customer_loans(&self, customer_id: i64) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE customer_id = $1 ORDER BY loan_date, id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        self.with_details(loans).await
    }

    /// Loans that include a book
    pub async fn get_book_loans(&self, book_id: i64) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, Loan>(
            r#"
            SELECT l.*
            FROM loans l
            JOIN loan_books lb ON lb.loan_id = l.id
            WHERE lb.book_id = $1
            ORDER BY l.loan_date, l.id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        self.with_details(loans).await
    }

    /// Loans whose loan date falls in the inclusive range
    pub async fn get_by_date_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE loan_date BETWEEN $1 AND $2 ORDER BY loan_date, id",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;
        self.with_details(loans).await
    }

    /// Create a loan and mark its books as borrowed
    pub async fn create(&self, loan: &NewLoan) -> AppResult<LoanDetails> {
        let mut tx = self.pool.begin().await?;

        // Held until commit: a concurrent customer delete waits and then sees this loan
        let customer =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1 FOR SHARE")
                .bind(loan.customer_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::Validation(format!("Customer {} does not exist", loan.customer_id))
                })?;

        // Lock the requested books so a concurrent loan cannot take them too
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(&loan.book_ids)
        .fetch_all(&mut *tx)
        .await?;

        validation::ensure_loanable(&loan.book_ids, &books)?;

        let created = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (customer_id, loan_date, return_date, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(loan.customer_id)
        .bind(loan.loan_date)
        .bind(loan.return_date)
        .bind(LoanStatus::Active)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO loan_books (loan_id, book_id) SELECT $1, UNNEST($2::bigint[])")
            .bind(created.id)
            .bind(&loan.book_ids)
            .execute(&mut *tx)
            .await?;

        let mut books = sqlx::query_as::<_, Book>(
            "UPDATE books SET status = $1 WHERE id = ANY($2) RETURNING *",
        )
        .bind(BookStatus::Borrowed)
        .bind(&loan.book_ids)
        .fetch_all(&mut *tx)
        .await?;
        books.sort_by_key(|b| b.id);

        tx.commit().await?;

        Ok(LoanDetails::new(created, customer, books))
    }

    /// Move the return date of a loan
    pub async fn update_return_date(&self, id: i64, return_date: NaiveDate) -> AppResult<LoanDetails> {
        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET return_date = $1 WHERE id = $2 RETURNING *",
        )
        .bind(return_date)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;
        self.details(loan).await
    }

    /// Mark a loan as returned and its books as available again
    pub async fn finish(&self, id: i64) -> AppResult<LoanDetails> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        validation::ensure_returnable(&loan)?;

        let loan = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET status = $1 WHERE id = $2 RETURNING *",
        )
        .bind(LoanStatus::Returned)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        Self::release_books(&mut tx, id).await?;

        tx.commit().await?;

        self.details(loan).await
    }

    /// Delete a loan, releasing its books if it was still active
    pub async fn delete(&self, id: i64) -> AppResult<Loan> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        if loan.status == LoanStatus::Active {
            Self::release_books(&mut tx, id).await?;
        }

        sqlx::query("DELETE FROM loans WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(loan)
    }

    async fn release_books(tx: &mut sqlx::Transaction<'_, Postgres>, loan_id: i64) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE books SET status = $1
            WHERE id IN (SELECT book_id FROM loan_books WHERE loan_id = $2)
            "#,
        )
        .bind(BookStatus::Available)
        .bind(loan_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn details(&self, loan: Loan) -> AppResult<LoanDetails> {
        let id = loan.id;
        self.with_details(vec![loan])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("Loan {} vanished while loading details", id)))
    }

    /// Attach customers and books to loans with two batched queries
    async fn with_details(&self, loans: Vec<Loan>) -> AppResult<Vec<LoanDetails>> {
        if loans.is_empty() {
            return Ok(Vec::new());
        }

        let loan_ids: Vec<i64> = loans.iter().map(|l| l.id).collect();
        let mut customer_ids: Vec<i64> = loans.iter().map(|l| l.customer_id).collect();
        customer_ids.sort_unstable();
        customer_ids.dedup();

        let customers: HashMap<i64, Customer> =
            sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = ANY($1)")
                .bind(&customer_ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect();

        let rows = sqlx::query_as::<_, LoanBookRow>(
            r#"
            SELECT lb.loan_id, b.*
            FROM loan_books lb
            JOIN books b ON b.id = lb.book_id
            WHERE lb.loan_id = ANY($1)
            ORDER BY b.id
            "#,
        )
        .bind(&loan_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut books: HashMap<i64, Vec<Book>> = HashMap::new();
        for row in rows {
            books.entry(row.loan_id).or_default().push(row.book);
        }

        loans
            .into_iter()
            .map(|loan| {
                let customer = customers.get(&loan.customer_id).cloned().ok_or_else(|| {
                    AppError::Internal(format!(
                        "Customer {} of loan {} not found",
                        loan.customer_id, loan.id
                    ))
                })?;
                let loan_books = books.remove(&loan.id).unwrap_or_default();
                Ok(LoanDetails::new(loan, customer, loan_books))
            })
            .collect()
    }
}
