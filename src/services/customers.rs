//! Customer management service

use chrono::{NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        customer::{Customer, CustomerRequest},
        enums::CustomerStatus,
        loan::LoanDetails,
    },
    repository::Repository,
};

use super::validation;

#[derive(Clone)]
pub struct CustomersService {
    repository: Repository,
}

impl CustomersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List customers; a name filter that matches nobody is a 404
    pub async fn list(&self, name: Option<&str>) -> AppResult<Vec<Customer>> {
        let name = name.filter(|n| !n.trim().is_empty());
        let customers = self.repository.customers.list(name).await?;

        match name {
            Some(name) if customers.is_empty() => Err(AppError::NotFound(format!(
                "No customer named {}",
                name
            ))),
            _ => Ok(customers),
        }
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Customer> {
        self.repository.customers.get_by_id(id).await
    }

    pub async fn get_by_birth_date(&self, birth_date: NaiveDate) -> AppResult<Vec<Customer>> {
        let customers = self.repository.customers.get_by_birth_date(birth_date).await?;
        if customers.is_empty() {
            return Err(AppError::NotFound(format!(
                "No customer born on {}",
                birth_date
            )));
        }
        Ok(customers)
    }

    /// Create a customer, ACTIVE unless a status is given
    pub async fn create(&self, data: CustomerRequest) -> AppResult<Customer> {
        let status = data.status.unwrap_or_default();
        let data = validation::validate_customer(data, Utc::now().date_naive())?;
        let customer = self.repository.customers.create(&data, status).await?;
        tracing::info!("Created customer id={}", customer.id);
        Ok(customer)
    }

    /// Replace every field except the status
    pub async fn update(&self, id: i64, data: CustomerRequest) -> AppResult<Customer> {
        let data = validation::validate_customer(data, Utc::now().date_naive())?;
        self.repository.customers.update(id, &data).await
    }

    pub async fn update_status(&self, id: i64, status: CustomerStatus) -> AppResult<Customer> {
        let customer = self.repository.customers.update_status(id, status).await?;
        tracing::info!("Customer id={} status set to {}", id, status);
        Ok(customer)
    }

    /// Delete a customer whose loans have all been returned
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        match self.repository.customers.delete(id).await {
            Ok(()) => {
                tracing::info!("Deleted customer id={}", id);
                Ok(())
            }
            Err(e @ AppError::BusinessRule(_)) => {
                tracing::warn!("Refused to delete customer id={}: {}", id, e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Loans of a customer
    pub async fn get_loans(&self, id: i64) -> AppResult<Vec<LoanDetails>> {
        self.repository.customers.get_by_id(id).await?;
        self.repository.loans.get_customer_loans(id).await
    }
}
