//! Request validation and consistency guards
//!
//! Everything here is pure: the services fetch what a rule needs and pass it
//! in, which keeps the rules testable without a database.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookData, CreateBook, UpdateBook},
        customer::{CustomerData, CustomerRequest},
        enums::{BookStatus, LoanStatus},
        loan::{CreateLoan, Loan, LoanDateRange, NewLoan},
    },
};

fn require_not_blank(fields: &[(&str, Option<&str>)]) -> AppResult<()> {
    for (label, value) in fields {
        if let Some(value) = value {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{} cannot be blank", label)));
            }
        }
    }
    Ok(())
}

fn not_in_future(label: &str, date: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if date > today {
        return Err(AppError::Validation(format!("{} cannot be in the future", label)));
    }
    Ok(())
}

/// Trim and validate a new book
pub fn validate_new_book(data: CreateBook) -> AppResult<BookData> {
    let data = data.normalized();
    require_not_blank(&[
        ("Book title", data.title.as_deref()),
        ("Book author", data.author.as_deref()),
    ])?;
    data.validate()?;
    Ok(BookData::from(data))
}

/// Trim and validate a book update
pub fn validate_book_update(data: UpdateBook) -> AppResult<BookData> {
    let data = data.normalized();
    require_not_blank(&[
        ("Book title", data.title.as_deref()),
        ("Book author", data.author.as_deref()),
    ])?;
    data.validate()?;
    Ok(BookData::from(data))
}

/// Trim and validate a customer; the length and format rules apply to the stored values
pub fn validate_customer(data: CustomerRequest, today: NaiveDate) -> AppResult<CustomerData> {
    let data = data.normalized();
    require_not_blank(&[
        ("Name", data.name.as_deref()),
        ("Last name", data.lastname.as_deref()),
        ("Address", data.address.as_deref()),
        ("City", data.city.as_deref()),
        ("State", data.state.as_deref()),
        ("Country", data.country.as_deref()),
    ])?;
    data.validate()?;

    let birth_date = data
        .birth_date
        .ok_or_else(|| AppError::Validation("Birth date is required".to_string()))?;
    not_in_future("Birth date", birth_date, today)?;
    Ok(CustomerData::from_validated(data, birth_date))
}

/// Validate a loan request on its own (references are checked by [`ensure_loanable`])
pub fn validate_loan(
    data: &CreateLoan,
    max_books: usize,
    default_duration_days: i64,
    today: NaiveDate,
) -> AppResult<NewLoan> {
    data.validate()?;

    let loan_date = data
        .loan_date
        .ok_or_else(|| AppError::Validation("Loan date is required".to_string()))?;
    let customer_id = data
        .customer_id
        .ok_or_else(|| AppError::Validation("Customer is required".to_string()))?;

    not_in_future("Loan date", loan_date, today)?;

    if data.book_ids.len() > max_books {
        return Err(AppError::Validation(format!(
            "A loan cannot include more than {} books",
            max_books
        )));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = data.book_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(AppError::Validation(format!("Book {} is listed more than once", dup)));
    }

    let return_date = match data.return_date {
        Some(date) if date < loan_date => {
            return Err(AppError::Validation(
                "Return date cannot be earlier than the loan date".to_string(),
            ))
        }
        Some(date) => date,
        None => loan_date + Duration::days(default_duration_days),
    };

    Ok(NewLoan {
        customer_id,
        book_ids: data.book_ids.clone(),
        loan_date,
        return_date,
    })
}

/// Every requested book must exist and be available
pub fn ensure_loanable(requested: &[i64], books: &[Book]) -> AppResult<()> {
    let missing: Vec<String> = requested
        .iter()
        .filter(|id| !books.iter().any(|b| b.id == **id))
        .map(|id| id.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Books not found: {}",
            missing.join(", ")
        )));
    }

    let borrowed: Vec<String> = books
        .iter()
        .filter(|b| b.status == BookStatus::Borrowed)
        .map(|b| b.id.to_string())
        .collect();
    if !borrowed.is_empty() {
        return Err(AppError::Validation(format!(
            "Books already borrowed: {}",
            borrowed.join(", ")
        )));
    }

    Ok(())
}

pub fn ensure_book_deletable(book: &Book, open_loans: i64) -> AppResult<()> {
    if book.status == BookStatus::Borrowed {
        return Err(AppError::BusinessRule(format!(
            "Book {} is currently borrowed",
            book.id
        )));
    }
    if open_loans > 0 {
        return Err(AppError::BusinessRule(format!(
            "Book {} is part of {} unreturned loan(s)",
            book.id, open_loans
        )));
    }
    Ok(())
}

pub fn ensure_customer_deletable(customer_id: i64, open_loans: i64) -> AppResult<()> {
    if open_loans > 0 {
        return Err(AppError::BusinessRule(format!(
            "Customer {} has {} unreturned loan(s)",
            customer_id, open_loans
        )));
    }
    Ok(())
}

pub fn ensure_extendable(loan: &Loan, new_return_date: NaiveDate) -> AppResult<()> {
    if loan.status == LoanStatus::Returned {
        return Err(AppError::BusinessRule(format!(
            "Loan {} has already been returned",
            loan.id
        )));
    }
    if new_return_date < loan.loan_date {
        return Err(AppError::Validation(
            "The new return date cannot be earlier than the loan date".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_returnable(loan: &Loan) -> AppResult<()> {
    if loan.status == LoanStatus::Returned {
        return Err(AppError::BusinessRule(format!(
            "Loan {} has already been returned",
            loan.id
        )));
    }
    Ok(())
}

pub fn validate_date_range(range: &LoanDateRange) -> AppResult<()> {
    if range.start_date > range.end_date {
        return Err(AppError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }
    Ok(())
}
