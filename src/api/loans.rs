//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, LoanDetails, LoanQuery},
};

use super::PaginatedResponse;

/// Loan response with the server-assigned loan date
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    /// Loan ID
    pub id: i32,
    /// Date the loan was recorded
    pub loan_date: NaiveDate,
    /// Status message
    pub message: String,
}

/// Create a new loan (borrow a book by ISBN)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanResponse),
        (status = 400, description = "Unknown ISBN or book already loaned")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(payload): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    payload.validate()?;

    let loan = state.services.loans.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            id: loan.id,
            loan_date: loan.loan_date,
            message: "Book loaned successfully".to_string(),
        }),
    ))
}

/// Get loan details by ID
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get(id).await?;
    Ok(Json(loan))
}

/// Search loans by book ISBN or customer name
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(
        ("isbn" = Option<String>, Query, description = "Exact book ISBN"),
        ("customer" = Option<String>, Query, description = "Exact customer name"),
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<i64>, Query, description = "Items per page (default: 20)")
    ),
    responses(
        (status = 200, description = "Matching loans", body = PaginatedResponse<LoanDetails>)
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    let (items, total) = state.services.loans.search(&query).await?;

    Ok(Json(PaginatedResponse {
        items,
        total,
        page: query.page(),
        per_page: query.per_page(),
    }))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = LoanResponse),
        (status = 400, description = "Already returned"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanResponse>> {
    let loan = state.services.loans.return_loan(id).await?;

    Ok(Json(LoanResponse {
        id: loan.id,
        loan_date: loan.loan_date,
        message: "Book returned successfully".to_string(),
    }))
}
