//! Business logic services

pub mod books;
pub mod email;
pub mod loans;
pub mod notifier;

use crate::{
    config::{EmailConfig, LoansConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub loans: loans::LoansService,
    pub email: email::EmailService,
    pub notifier: notifier::OverdueNotifier,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, email_config: EmailConfig, loans_config: LoansConfig) -> Self {
        let email = email::EmailService::new(email_config);
        Self {
            books: books::BooksService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            notifier: notifier::OverdueNotifier::new(repository.clone(), email.clone(), loans_config),
            email,
            repository,
        }
    }
}
