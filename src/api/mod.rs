//! API handlers for Biblioteca REST endpoints

pub mod books;
pub mod customers;
pub mod health;
pub mod loans;
pub mod openapi;

use axum::{
    extract::{FromRequest, FromRequestParts},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::IntoParams;

use crate::{error::AppError, AppState};

/// JSON body extractor whose rejections use the application error body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Path extractor whose rejections use the application error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// Query extractor whose rejections use the application error body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// `?status=` parameter of the status endpoints
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusParams {
    /// New status (case-insensitive)
    pub status: String,
}

impl StatusParams {
    pub fn parse<T>(&self) -> Result<T, AppError>
    where
        T: std::str::FromStr<Err = String>,
    {
        self.status.parse().map_err(AppError::BadRequest)
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/status", patch(books::update_book_status))
        .route("/books/:id/loans", get(books::get_book_loans))
        // Customers
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/birthdate/:birth_date",
            get(customers::get_customers_by_birth_date),
        )
        .route(
            "/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route("/customers/:id/status", patch(customers::update_customer_status))
        .route("/customers/:id/loans", get(customers::get_customer_loans))
        // Loans
        .route("/loans", get(loans::list_loans).post(loans::create_loan))
        .route("/loans/date", get(loans::get_loans_by_date_range))
        .route(
            "/loans/:id",
            get(loans::get_loan)
                .patch(loans::extend_loan)
                .put(loans::finish_loan)
                .delete(loans::delete_loan),
        )
        .route("/loans/:id/return", post(loans::finish_loan))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
