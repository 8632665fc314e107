//! Customer model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{enums::CustomerStatus, trimmed, NAME_RE};

/// Customer model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub lastname: String,
    pub address: String,
    pub city: String,
    /// Two-letter state code
    pub state: String,
    pub country: String,
    pub birth_date: NaiveDate,
    pub status: CustomerStatus,
}

/// Customer list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct CustomerQuery {
    /// Case-insensitive search in first name
    pub name: Option<String>,
}

/// Create or update customer request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CustomerRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 3, max = 50, message = "Name must be between 3 and 50 characters"),
        regex(path = *NAME_RE, message = "Name can only contain letters and spaces")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Last name is required"),
        length(min = 3, max = 50, message = "Last name must be between 3 and 50 characters")
    )]
    pub lastname: Option<String>,
    #[validate(
        required(message = "Address is required"),
        length(min = 5, max = 100, message = "Address must be between 5 and 100 characters")
    )]
    pub address: Option<String>,
    #[validate(
        required(message = "City is required"),
        length(min = 3, max = 50, message = "City must be between 3 and 50 characters")
    )]
    pub city: Option<String>,
    #[validate(
        required(message = "State is required"),
        length(equal = 2, message = "State must be exactly 2 characters")
    )]
    pub state: Option<String>,
    #[validate(
        required(message = "Country is required"),
        length(min = 3, max = 50, message = "Country must be between 3 and 50 characters")
    )]
    pub country: Option<String>,
    #[validate(required(message = "Birth date is required"))]
    pub birth_date: Option<NaiveDate>,
    /// Defaults to ACTIVE on create, ignored on update
    pub status: Option<CustomerStatus>,
}

/// Validated customer fields, ready to be written
#[derive(Debug, Clone)]
pub struct CustomerData {
    pub name: String,
    pub lastname: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub birth_date: NaiveDate,
}

impl CustomerRequest {
    /// Trim every text field and upper-case the state code; validation runs on the result
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            lastname: trimmed(self.lastname),
            address: trimmed(self.address),
            city: trimmed(self.city),
            state: trimmed(self.state).map(|s| s.to_uppercase()),
            country: trimmed(self.country),
            ..self
        }
    }
}

impl CustomerData {
    /// Build from a normalized request that already passed validation
    pub(crate) fn from_validated(data: CustomerRequest, birth_date: NaiveDate) -> Self {
        Self {
            name: data.name.unwrap_or_default(),
            lastname: data.lastname.unwrap_or_default(),
            address: data.address.unwrap_or_default(),
            city: data.city.unwrap_or_default(),
            state: data.state.unwrap_or_default(),
            country: data.country.unwrap_or_default(),
            birth_date,
        }
    }
}
