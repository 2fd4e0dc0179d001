//! Scheduled overdue-loan notifier.
//!
//! Runs as a background task: on each tick it collects every loan past the
//! configured overdue window and mails the customer. A failed send for one
//! recipient is logged and the sweep continues.

use chrono::{Duration, NaiveDate, Utc};
use std::future::Future;
use std::time::Duration as StdDuration;

use crate::{
    config::LoansConfig, error::AppResult, models::loan::LoanDetails, repository::Repository,
};

use super::email::EmailService;

/// Date at or before which an unreturned loan counts as overdue
fn overdue_cutoff(today: NaiveDate, overdue_after_days: i64) -> NaiveDate {
    today - Duration::days(overdue_after_days)
}

/// Send one notice per loan. A failed send is logged and the remaining
/// recipients are still attempted; returns how many went out.
async fn notify_each<'a, F, Fut>(loans: &'a [LoanDetails], mut send: F) -> usize
where
    F: FnMut(&'a LoanDetails) -> Fut,
    Fut: Future<Output = AppResult<()>>,
{
    let mut notified = 0;
    for loan in loans {
        match send(loan).await {
            Ok(()) => notified += 1,
            Err(e) => tracing::warn!(
                "Failed to notify {} about loan {}: {}",
                loan.customer_email,
                loan.id,
                e
            ),
        }
    }
    notified
}

#[derive(Clone)]
pub struct OverdueNotifier {
    repository: Repository,
    email: EmailService,
    config: LoansConfig,
}

impl OverdueNotifier {
    pub fn new(repository: Repository, email: EmailService, config: LoansConfig) -> Self {
        Self {
            repository,
            email,
            config,
        }
    }

    /// Run the sweep loop forever. Intended to be spawned at startup.
    pub async fn run(self) {
        let period = StdDuration::from_secs(self.config.sweep_interval_hours * 3600);
        let mut ticker = tokio::time::interval(period);
        // The first tick fires immediately; skip it so a restart does not
        // re-notify everyone right away.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if let Err(e) = self.sweep().await {
                tracing::error!("Overdue sweep failed: {}", e);
            }
        }
    }

    /// One pass: find overdue loans and notify each customer
    pub async fn sweep(&self) -> AppResult<usize> {
        let cutoff = overdue_cutoff(Utc::now().date_naive(), self.config.overdue_after_days);
        let overdue = self.repository.loans.find_overdue(cutoff).await?;

        tracing::info!("Overdue sweep: {} loan(s) past {}", overdue.len(), cutoff);

        let email = &self.email;
        let notified = notify_each(&overdue, |loan| async move {
            email
                .send_overdue_notice(
                    &loan.customer_email,
                    &loan.customer,
                    &loan.book.title,
                    &loan.loan_date.to_string(),
                )
                .await
        })
        .await;

        Ok(notified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::book::Book;

    fn overdue_loan(id: i32, email: &str) -> LoanDetails {
        LoanDetails {
            id,
            customer: "Edson".to_string(),
            customer_email: email.to_string(),
            loan_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            returned: false,
            book: Book {
                id,
                title: "My Incredible Life".to_string(),
                author: "Edson".to_string(),
                isbn: format!("isbn-{}", id),
                created_at: None,
                updated_at: None,
            },
        }
    }

    #[test]
    fn cutoff_is_window_days_back() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert_eq!(
            overdue_cutoff(today, 4),
            NaiveDate::from_ymd_opt(2026, 3, 6).unwrap()
        );
    }

    #[test]
    fn cutoff_crosses_month_boundary() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(
            overdue_cutoff(today, 4),
            NaiveDate::from_ymd_opt(2026, 2, 26).unwrap()
        );
    }

    #[tokio::test]
    async fn failed_send_does_not_abort_the_sweep() {
        let loans = vec![
            overdue_loan(1, "a@example.org"),
            overdue_loan(2, "b@example.org"),
            overdue_loan(3, "c@example.org"),
        ];

        let mut attempted = Vec::new();
        let notified = notify_each(&loans, |loan| {
            attempted.push(loan.id);
            let fail = loan.id == 2;
            async move {
                if fail {
                    Err(AppError::Internal("smtp down".to_string()))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(attempted, vec![1, 2, 3]);
        assert_eq!(notified, 2);
    }

    #[tokio::test]
    async fn empty_sweep_sends_nothing() {
        let notified = notify_each(&[], |_| async { Ok(()) }).await;
        assert_eq!(notified, 0);
    }
}
