//! Data models for Libris

pub mod book;
pub mod loan;

// Re-export commonly used types
pub use book::Book;
pub use loan::{Loan, LoanDetails};
