//! Testing utilities and mock implementations.
//!
//! Mocks for every collaborator of the ticket processor, so pipeline tests
//! run without a messaging API or a dead-letter directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use triage_core::testing::{MockClassifier, MockDeadLetterSink, MockNotifier};
//!
//! let notifier = Arc::new(MockNotifier::new());
//! let sink = Arc::new(MockDeadLetterSink::new());
//!
//! notifier.set_fail_always(3).await;
//! // ... process a P1 ticket ...
//! assert_eq!(sink.write_count().await, 1);
//! ```

mod mock_classifier;
mod mock_dead_letter;
mod mock_notifier;

pub use mock_classifier::MockClassifier;
pub use mock_dead_letter::{MockDeadLetterSink, RecordedWrite};
pub use mock_notifier::MockNotifier;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::ticket::Ticket;

    /// Fixed reference time so ordering assertions are stable.
    pub fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// A P1 login ticket.
    pub fn urgent_ticket(id: &str) -> Ticket {
        Ticket::new(id, "URGENT login outage", "cannot log in, 500 errors")
            .with_channel("email")
            .with_created_at(base_time())
    }

    /// A P3 info ticket.
    pub fn routine_ticket(id: &str) -> Ticket {
        Ticket::new(id, "Pricing question", "thanks, great service")
            .with_channel("chat")
            .with_created_at(base_time())
    }

    /// A P2 billing ticket.
    pub fn billing_ticket(id: &str) -> Ticket {
        Ticket::new(id, "Invoice mismatch", "I was charged twice this month")
            .with_channel("email")
            .with_created_at(base_time())
    }

    /// A ticket created `hours` after [`base_time`].
    pub fn at_hour(mut ticket: Ticket, hours: i64) -> Ticket {
        ticket.created_at = Some(base_time() + chrono::Duration::hours(hours));
        ticket
    }
}
