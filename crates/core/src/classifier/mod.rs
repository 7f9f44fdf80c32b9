//! Ticket classification.
//!
//! The [`Classifier`] trait is the pluggable seam; [`RuleClassifier`] is the
//! built-in keyword implementation. Classification never performs I/O.
//!
//! # Example
//!
//! ```ignore
//! use triage_core::classifier::{Classifier, RuleClassifier};
//!
//! let c = RuleClassifier.classify("URGENT login outage cannot log in")?;
//! assert_eq!(c.priority, Priority::P1);
//! ```

mod rules;
mod traits;

pub use rules::{
    owner_for_topic, priority_of, sentiment_of, topic_of, RuleClassifier, TopicRule, TOPIC_RULES,
};
pub use traits::{Classification, Classifier, ClassifyError};
