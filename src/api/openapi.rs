//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, customers, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteca API",
        version = "1.0.0",
        description = "Library lending REST API: books, customers and loans"
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::update_book_status,
        books::delete_book,
        books::get_book_loans,
        // Customers
        customers::list_customers,
        customers::get_customer,
        customers::get_customers_by_birth_date,
        customers::create_customer,
        customers::update_customer,
        customers::update_customer_status,
        customers::delete_customer,
        customers::get_customer_loans,
        // Loans
        loans::list_loans,
        loans::get_loans_by_date_range,
        loans::get_loan,
        loans::create_loan,
        loans::extend_loan,
        loans::finish_loan,
        loans::delete_loan,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::enums::BookStatus,
            // Customers
            crate::models::customer::Customer,
            crate::models::customer::CustomerRequest,
            crate::models::enums::CustomerStatus,
            // Loans
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            crate::models::loan::ExtendLoan,
            crate::models::enums::LoanStatus,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "customers", description = "Customer management"),
        (name = "loans", description = "Loan management")
    )
)]
pub struct ApiDoc;

/// Create OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
