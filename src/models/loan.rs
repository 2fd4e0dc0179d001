//! Loan (borrow) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::book::Book;

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub customer: String,
    pub customer_email: String,
    pub loan_date: NaiveDate,
    pub returned: bool,
}

/// Loan with the borrowed book embedded, for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub customer: String,
    pub customer_email: String,
    pub loan_date: NaiveDate,
    pub returned: bool,
    pub book: Book,
}

/// Create loan request. The book is resolved by ISBN; the loan date is
/// always set server-side to the current day.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLoan {
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "customer must not be empty"))]
    pub customer: String,
    #[validate(email(message = "customer_email must be a valid email address"))]
    pub customer_email: String,
}

/// Loan query parameters (API). `isbn` and `customer` are exact matches,
/// combined with OR when both are given.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub isbn: Option<String>,
    pub customer: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl LoanQuery {
    /// Effective 1-based page number, never below 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to 1..=100
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(20).clamp(1, 100)
    }
}
