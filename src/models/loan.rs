//! Loan model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{book::Book, customer::Customer, enums::LoanStatus};

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i64,
    pub customer_id: i64,
    pub loan_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
}

/// Loan with its customer and books, as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub customer: Customer,
    pub books: Vec<Book>,
    pub loan_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
}

impl LoanDetails {
    pub fn new(loan: Loan, customer: Customer, books: Vec<Book>) -> Self {
        Self {
            id: loan.id,
            customer,
            books,
            loan_date: loan.loan_date,
            return_date: loan.return_date,
            status: loan.status,
        }
    }
}

/// Create loan request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    #[validate(required(message = "Customer is required"))]
    pub customer_id: Option<i64>,
    #[serde(default)]
    #[validate(length(min = 1, message = "A loan must include at least one book"))]
    pub book_ids: Vec<i64>,
    #[validate(required(message = "Loan date is required"))]
    pub loan_date: Option<NaiveDate>,
    /// Defaults to the loan date plus the configured loan duration
    pub return_date: Option<NaiveDate>,
}

/// Validated loan creation, ready to be written
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub customer_id: i64,
    pub book_ids: Vec<i64>,
    pub loan_date: NaiveDate,
    pub return_date: NaiveDate,
}

/// Extend loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExtendLoan {
    /// New return date, not earlier than the loan date
    pub return_date: NaiveDate,
}

/// Loan date range query
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanDateRange {
    /// First loan date included (YYYY-MM-DD)
    pub start_date: NaiveDate,
    /// Last loan date included (YYYY-MM-DD)
    pub end_date: NaiveDate,
}
