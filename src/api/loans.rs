//! Loan management endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, ExtendLoan, LoanDateRange, LoanDetails},
    AppState,
};

use super::{JsonBody, PathParam, QueryParams};

/// List all loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    responses(
        (status = 200, description = "List of loans", body = Vec<LoanDetails>)
    )
)]
pub async fn list_loans(State(state): State<AppState>) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list().await?;
    Ok(Json(loans))
}

/// Loans started within a date range
#[utoipa::path(
    get,
    path = "/loans/date",
    tag = "loans",
    params(LoanDateRange),
    responses(
        (status = 200, description = "Loans in the period", body = Vec<LoanDetails>),
        (status = 400, description = "Invalid range", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loans_by_date_range(
    State(state): State<AppState>,
    QueryParams(range): QueryParams<LoanDateRange>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.get_by_date_range(&range).await?;
    Ok(Json(loans))
}

/// Get loan by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = i64, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan found", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get_by_id(id).await?;
    Ok(Json(loan))
}

/// Create a new loan
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 400, description = "Validation error", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    JsonBody(data): JsonBody<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let loan = state.services.loans.create(data).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Extend a loan
#[utoipa::path(
    patch,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = i64, Path, description = "Loan ID")),
    request_body = ExtendLoan,
    responses(
        (status = 200, description = "Loan extended", body = LoanDetails),
        (status = 400, description = "Invalid new return date", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn extend_loan(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(data): JsonBody<ExtendLoan>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.extend(id, data.return_date).await?;
    Ok(Json(loan))
}

/// Finish a loan, making its books available again
#[utoipa::path(
    put,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = i64, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan finished", body = LoanDetails),
        (status = 400, description = "Loan already returned", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn finish_loan(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.finish(id).await?;
    Ok(Json(loan))
}

/// Delete a loan
#[utoipa::path(
    delete,
    path = "/loans/{id}",
    tag = "loans",
    params(("id" = i64, Path, description = "Loan ID")),
    responses(
        (status = 204, description = "Loan deleted"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn delete_loan(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<StatusCode> {
    state.services.loans.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
