//! Loans repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        loan::{Loan, LoanDetails, LoanQuery},
    },
};

fn escape(s: &str) -> String {
    s.replace('\'', "''")
}

/// Columns for a loan row joined with its book
const LOAN_WITH_BOOK: &str = r#"
    l.id, l.customer, l.customer_email, l.loan_date, l.returned,
    b.id as book_id, b.title, b.author, b.isbn,
    b.created_at as book_created_at, b.updated_at as book_updated_at
"#;

fn details_from_row(row: &sqlx::postgres::PgRow) -> LoanDetails {
    LoanDetails {
        id: row.get("id"),
        customer: row.get("customer"),
        customer_email: row.get("customer_email"),
        loan_date: row.get("loan_date"),
        returned: row.get("returned"),
        book: Book {
            id: row.get("book_id"),
            title: row.get("title"),
            author: row.get("author"),
            isbn: row.get("isbn"),
            created_at: row.get("book_created_at"),
            updated_at: row.get("book_updated_at"),
        },
    }
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan details (with the borrowed book) by ID
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM loans l JOIN books b ON l.book_id = b.id WHERE l.id = $1",
            LOAN_WITH_BOOK
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        Ok(details_from_row(&row))
    }

    /// Check whether the book has an active (not returned) loan
    pub async fn exists_active_for_book(&self, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1 AND returned = FALSE)",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a new loan
    pub async fn create(
        &self,
        book_id: i32,
        customer: &str,
        customer_email: &str,
        loan_date: NaiveDate,
    ) -> AppResult<Loan> {
        // The partial unique index on active loans backs up the service-level
        // check when two requests race for the same book.
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (book_id, customer, customer_email, loan_date, returned)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(customer)
        .bind(customer_email)
        .bind(loan_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::BusinessRule("Book already loaned".to_string())
            }
            _ => AppError::from(e),
        })?;
        Ok(loan)
    }

    /// Mark a loan as returned
    pub async fn mark_returned(&self, id: i32) -> AppResult<Loan> {
        let loan = self.get_by_id(id).await?;

        if loan.returned {
            return Err(AppError::BusinessRule("Loan already returned".to_string()));
        }

        let updated = sqlx::query_as::<_, Loan>(
            "UPDATE loans SET returned = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    /// Search loans by book ISBN or customer name, paginated.
    /// Both filters are exact matches, combined with OR.
    pub async fn search(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let page = query.page();
        let per_page = query.per_page();
        let offset = (page - 1) * per_page;

        let mut matches = Vec::new();

        if let Some(ref isbn) = query.isbn {
            matches.push(format!("b.isbn = '{}'", escape(isbn)));
        }

        if let Some(ref customer) = query.customer {
            matches.push(format!("l.customer = '{}'", escape(customer)));
        }

        let where_clause = if matches.is_empty() {
            "1=1".to_string()
        } else {
            matches.join(" OR ")
        };

        let count_query = format!(
            "SELECT COUNT(*) FROM loans l JOIN books b ON l.book_id = b.id WHERE {}",
            where_clause
        );
        let total: i64 = sqlx::query_scalar(&count_query)
            .fetch_one(&self.pool)
            .await?;

        let select_query = format!(
            r#"
            SELECT {}
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE {}
            ORDER BY l.loan_date DESC, l.id DESC
            LIMIT {} OFFSET {}
            "#,
            LOAN_WITH_BOOK, where_clause, per_page, offset
        );

        let rows = sqlx::query(&select_query).fetch_all(&self.pool).await?;
        let loans = rows.iter().map(details_from_row).collect();

        Ok((loans, total))
    }

    /// Get loans of a book, paginated
    pub async fn get_by_book(
        &self,
        book_id: i32,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        let page = page.max(1);
        let per_page = per_page.clamp(1, 100);
        let offset = (page - 1) * per_page;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.book_id = $1
            ORDER BY l.loan_date DESC, l.id DESC
            LIMIT $2 OFFSET $3
            "#,
            LOAN_WITH_BOOK
        ))
        .bind(book_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let loans = rows.iter().map(details_from_row).collect();
        Ok((loans, total))
    }

    /// All loans made on or before the cutoff date and not yet returned
    pub async fn find_overdue(&self, cutoff: NaiveDate) -> AppResult<Vec<LoanDetails>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.loan_date <= $1 AND l.returned = FALSE
            ORDER BY l.loan_date
            "#,
            LOAN_WITH_BOOK
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }
}
