//! Loan management service

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan, LoanDetails, LoanQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new loan. The book is resolved by ISBN and must not have
    /// an active loan; the loan date is the current day.
    pub async fn create(&self, request: CreateLoan) -> AppResult<Loan> {
        let book = self
            .repository
            .books
            .get_by_isbn(&request.isbn)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("Book not found for entered isbn".to_string())
            })?;

        if self.repository.loans.exists_active_for_book(book.id).await? {
            return Err(AppError::BusinessRule("Book already loaned".to_string()));
        }

        let today = Utc::now().date_naive();
        self.repository
            .loans
            .create(book.id, &request.customer, &request.customer_email, today)
            .await
    }

    /// Get loan details by ID
    pub async fn get(&self, id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(id).await
    }

    /// Search loans by book ISBN or customer
    pub async fn search(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        self.repository.loans.search(query).await
    }

    /// Get loans of a book, paginated
    pub async fn get_by_book(
        &self,
        book_id: i32,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        // Verify book exists
        self.repository.books.get_by_id(book_id).await?;
        self.repository.loans.get_by_book(book_id, page, per_page).await
    }

    /// Return a borrowed book
    pub async fn return_loan(&self, id: i32) -> AppResult<Loan> {
        self.repository.loans.mark_returned(id).await
    }
}
