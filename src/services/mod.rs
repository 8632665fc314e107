//! Business logic services

pub mod books;
pub mod customers;
pub mod loans;
pub mod validation;

use crate::{config::LoansConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub books: books::BooksService,
    pub customers: customers::CustomersService,
    pub loans: loans::LoansService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, loans_config: LoansConfig) -> Self {
        Self {
            books: books::BooksService::new(repository.clone()),
            customers: customers::CustomersService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), loans_config),
            repository,
        }
    }
}
