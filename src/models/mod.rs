//! Data models for Biblioteca

pub mod book;
pub mod customer;
pub mod enums;
pub mod loan;

use once_cell::sync::Lazy;
use regex::Regex;

// Re-export commonly used types
pub use book::Book;
pub use customer::Customer;
pub use enums::{BookStatus, CustomerStatus, LoanStatus};
pub use loan::{Loan, LoanDetails};

/// `978-0261103573`: 3 digits, a hyphen, 10 digits
pub static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}-[0-9]{10}$").expect("valid ISBN regex"));

/// Letters (including Latin-1 accents), digits, spaces, hyphens and dots
pub static AUTHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-zÀ-ÿ0-9\s.\-]+$").expect("valid author regex"));

/// Letters (including Latin-1 accents) and spaces
pub static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-zÀ-ÿ\s]+$").expect("valid name regex"));

/// Trim an optional text field
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string())
}
