//! Loan management service

use chrono::{NaiveDate, Utc};

use crate::{
    config::LoansConfig,
    error::AppResult,
    models::loan::{CreateLoan, LoanDateRange, LoanDetails},
    repository::Repository,
};

use super::validation;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(id).await
    }

    /// Loans started within the inclusive date range
    pub async fn get_by_date_range(&self, range: &LoanDateRange) -> AppResult<Vec<LoanDetails>> {
        validation::validate_date_range(range)?;
        self.repository
            .loans
            .get_by_date_range(range.start_date, range.end_date)
            .await
    }

    /// Create a new loan (borrow one or more books)
    pub async fn create(&self, data: CreateLoan) -> AppResult<LoanDetails> {
        let new_loan = validation::validate_loan(
            &data,
            self.config.max_books,
            self.config.default_duration_days,
            Utc::now().date_naive(),
        )?;

        let loan = self.repository.loans.create(&new_loan).await?;
        tracing::info!(
            "Created loan id={} customer={} books={:?} due={:?}",
            loan.id,
            loan.customer.id,
            new_loan.book_ids,
            loan.return_date
        );
        Ok(loan)
    }

    /// Move the return date of an active loan
    pub async fn extend(&self, id: i64, return_date: NaiveDate) -> AppResult<LoanDetails> {
        let loan = self.repository.loans.get_by_id(id).await?;
        validation::ensure_extendable(&loan, return_date)?;

        let loan = self.repository.loans.update_return_date(id, return_date).await?;
        tracing::info!("Extended loan id={} until {}", id, return_date);
        Ok(loan)
    }

    /// Finish a loan: RETURNED, and its books AVAILABLE again
    pub async fn finish(&self, id: i64) -> AppResult<LoanDetails> {
        let loan = self.repository.loans.finish(id).await?;
        tracing::info!("Loan id={} returned", id);
        Ok(loan)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let loan = self.repository.loans.delete(id).await?;
        tracing::info!("Deleted loan id={} (was {})", id, loan.status);
        Ok(())
    }
}
