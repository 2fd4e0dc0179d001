//! API handlers for Libris REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;

use serde::Serialize;
use utoipa::ToSchema;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// List of items
    pub items: Vec<T>,
    /// Total number of items
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Items per page
    pub per_page: i64,
}
