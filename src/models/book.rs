//! Book model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{enums::BookStatus, trimmed, AUTHOR_RE, ISBN_RE};

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// ISBN in the `978-0261103573` form
    pub isbn: String,
    pub published_date: Option<NaiveDate>,
    pub status: BookStatus,
}

/// Book list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Return only this book (404 if it does not exist)
    pub id: Option<i64>,
    /// Case-insensitive search in title
    pub title: Option<String>,
    /// Case-insensitive search in author
    pub author: Option<String>,
    pub status: Option<BookStatus>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(
        required(message = "Book title is required"),
        length(max = 255, message = "Book title cannot exceed 255 characters")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Book author is required"),
        length(max = 255, message = "Book author cannot exceed 255 characters"),
        regex(path = *AUTHOR_RE, message = "Author name cannot contain special characters")
    )]
    pub author: Option<String>,
    #[validate(
        required(message = "ISBN is required"),
        regex(path = *ISBN_RE, message = "ISBN must match xxx-xxxxxxxxxx (3 digits, hyphen, 10 digits)")
    )]
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
    /// Defaults to AVAILABLE
    pub status: Option<BookStatus>,
}

/// Update book request (status is changed through the status endpoint)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(
        required(message = "Book title is required"),
        length(max = 255, message = "Book title cannot exceed 255 characters")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Book author is required"),
        length(max = 255, message = "Book author cannot exceed 255 characters"),
        regex(path = *AUTHOR_RE, message = "Author name cannot contain special characters")
    )]
    pub author: Option<String>,
    #[validate(
        required(message = "ISBN is required"),
        regex(path = *ISBN_RE, message = "ISBN must match xxx-xxxxxxxxxx (3 digits, hyphen, 10 digits)")
    )]
    pub isbn: Option<String>,
    pub published_date: Option<NaiveDate>,
}

/// Validated book fields, ready to be written
#[derive(Debug, Clone)]
pub struct BookData {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub published_date: Option<NaiveDate>,
}

impl CreateBook {
    /// Trim the text fields; validation runs on the result
    pub fn normalized(self) -> Self {
        Self {
            title: trimmed(self.title),
            author: trimmed(self.author),
            isbn: trimmed(self.isbn),
            ..self
        }
    }
}

impl UpdateBook {
    /// Trim the text fields; validation runs on the result
    pub fn normalized(self) -> Self {
        Self {
            title: trimmed(self.title),
            author: trimmed(self.author),
            isbn: trimmed(self.isbn),
            ..self
        }
    }
}

impl From<CreateBook> for BookData {
    fn from(data: CreateBook) -> Self {
        Self {
            title: data.title.unwrap_or_default(),
            author: data.author.unwrap_or_default(),
            isbn: data.isbn.unwrap_or_default(),
            published_date: data.published_date,
        }
    }
}

impl From<UpdateBook> for BookData {
    fn from(data: UpdateBook) -> Self {
        Self {
            title: data.title.unwrap_or_default(),
            author: data.author.unwrap_or_default(),
            isbn: data.isbn.unwrap_or_default(),
            published_date: data.published_date,
        }
    }
}
