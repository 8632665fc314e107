//! Customer endpoints

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::{
        customer::{Customer, CustomerQuery, CustomerRequest},
        enums::CustomerStatus,
        loan::LoanDetails,
    },
    AppState,
};

use super::{JsonBody, PathParam, QueryParams, StatusParams};

/// List customers, or search them by name
#[utoipa::path(
    get,
    path = "/customers",
    tag = "customers",
    params(CustomerQuery),
    responses(
        (status = 200, description = "List of customers", body = Vec<Customer>),
        (status = 404, description = "No customer matches the name")
    )
)]
pub async fn list_customers(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CustomerQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let customers = state.services.customers.list(query.name.as_deref()).await?;
    Ok(Json(customers))
}

/// Get customer by ID
#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer details", body = Customer),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Customer>> {
    let customer = state.services.customers.get_by_id(id).await?;
    Ok(Json(customer))
}

/// Customers born on a given date
#[utoipa::path(
    get,
    path = "/customers/birthdate/{birth_date}",
    tag = "customers",
    params(("birth_date" = String, Path, description = "Birth date (YYYY-MM-DD)")),
    responses(
        (status = 200, description = "Matching customers", body = Vec<Customer>),
        (status = 400, description = "Malformed date"),
        (status = 404, description = "No customer born on that date")
    )
)]
pub async fn get_customers_by_birth_date(
    State(state): State<AppState>,
    PathParam(birth_date): PathParam<NaiveDate>,
) -> AppResult<Json<Vec<Customer>>> {
    let customers = state.services.customers.get_by_birth_date(birth_date).await?;
    Ok(Json(customers))
}

/// Create a new customer
#[utoipa::path(
    post,
    path = "/customers",
    tag = "customers",
    request_body = CustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    JsonBody(data): JsonBody<CustomerRequest>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let customer = state.services.customers.create(data).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Update a customer (all fields except status)
#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = i64, Path, description = "Customer ID")),
    request_body = CustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn update_customer(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(data): JsonBody<CustomerRequest>,
) -> AppResult<Json<Customer>> {
    let customer = state.services.customers.update(id, data).await?;
    Ok(Json(customer))
}

/// Change the status of a customer
#[utoipa::path(
    patch,
    path = "/customers/{id}/status",
    tag = "customers",
    params(
        ("id" = i64, Path, description = "Customer ID"),
        StatusParams
    ),
    responses(
        (status = 200, description = "Status updated", body = Customer),
        (status = 400, description = "Unknown status", body = crate::error::ErrorResponse),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn update_customer_status(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    QueryParams(params): QueryParams<StatusParams>,
) -> AppResult<Json<Customer>> {
    let status: CustomerStatus = params.parse()?;
    let customer = state.services.customers.update_status(id, status).await?;
    Ok(Json(customer))
}

/// Delete a customer
#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 400, description = "Customer has unreturned loans", body = crate::error::ErrorResponse),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<StatusCode> {
    state.services.customers.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Loans of a customer
#[utoipa::path(
    get,
    path = "/customers/{id}/loans",
    tag = "customers",
    params(("id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer's loans", body = Vec<LoanDetails>),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn get_customer_loans(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.customers.get_loans(id).await?;
    Ok(Json(loans))
}
