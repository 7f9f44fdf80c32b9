//! Urgent-ticket notifications.
//!
//! [`Notifier`] delivers a formatted message and reports how many retries it
//! took. [`TelegramNotifier`] is the production implementation; it retries
//! transient failures with linear backoff up to a configured attempt cap and
//! makes no request at all when credentials are missing.

mod config;
mod error;
mod format;
mod telegram;
mod traits;

pub use config::{NotifierConfig, RetryPolicy, TelegramConfig};
pub use error::{AttemptError, NotifyError};
pub use format::format_p1_alert;
pub use telegram::TelegramNotifier;
pub use traits::{Delivery, Notifier};
