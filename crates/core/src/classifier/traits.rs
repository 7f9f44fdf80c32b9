//! Trait definitions for ticket classification.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ticket::{ClassifiedTicket, Priority, Sentiment, Ticket, Topic};

/// Errors a classifier may raise.
///
/// The rule classifier is total and never returns one; pluggable
/// implementations (remote models, plugins) can.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("Classification failed: {0}")]
    Failed(String),
}

/// Labels derived from ticket text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub topic: Topic,
    pub priority: Priority,
    pub sentiment: Sentiment,
}

/// Maps ticket text to a [`Classification`] and topics to owners.
pub trait Classifier: Send + Sync {
    /// Name of this classifier for logging.
    fn name(&self) -> &str;

    /// Derive topic, priority and sentiment from free text.
    fn classify(&self, text: &str) -> Result<Classification, ClassifyError>;

    /// Suggested owning team for a topic.
    fn owner_for(&self, topic: Topic) -> String;

    /// Classify a whole ticket, producing the next stage type.
    fn classify_ticket(&self, ticket: Ticket) -> Result<ClassifiedTicket, (Ticket, ClassifyError)> {
        match self.classify(&ticket.text()) {
            Ok(classification) => {
                let owner_suggested = self.owner_for(classification.topic);
                Ok(ClassifiedTicket {
                    ticket,
                    topic: classification.topic,
                    priority: classification.priority,
                    sentiment: classification.sentiment,
                    owner_suggested,
                })
            }
            Err(e) => Err((ticket, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClassifier;

    impl Classifier for FixedClassifier {
        fn name(&self) -> &str {
            "fixed"
        }

        fn classify(&self, _text: &str) -> Result<Classification, ClassifyError> {
            Ok(Classification {
                topic: Topic::Mobile,
                priority: Priority::P2,
                sentiment: Sentiment::Neutral,
            })
        }

        fn owner_for(&self, _topic: Topic) -> String {
            "Mobile Squad".to_string()
        }
    }

    struct BrokenClassifier;

    impl Classifier for BrokenClassifier {
        fn name(&self) -> &str {
            "broken"
        }

        fn classify(&self, _text: &str) -> Result<Classification, ClassifyError> {
            Err(ClassifyError::Failed("boom".to_string()))
        }

        fn owner_for(&self, _topic: Topic) -> String {
            String::new()
        }
    }

    #[test]
    fn test_classify_ticket_builds_classified_ticket() {
        let classified = FixedClassifier
            .classify_ticket(Ticket::new("m1", "App crashes", ""))
            .unwrap();
        assert_eq!(classified.id(), "m1");
        assert_eq!(classified.topic, Topic::Mobile);
        assert_eq!(classified.owner_suggested, "Mobile Squad");
    }

    #[test]
    fn test_classify_ticket_returns_ticket_on_error() {
        let (ticket, err) = BrokenClassifier
            .classify_ticket(Ticket::new("b1", "x", "y"))
            .unwrap_err();
        assert_eq!(ticket.id, "b1");
        assert_eq!(err.to_string(), "Classification failed: boom");
    }

    #[test]
    fn test_default_classification() {
        let c = Classification::default();
        assert_eq!(c.topic, Topic::Other);
        assert_eq!(c.priority, Priority::P3);
        assert_eq!(c.sentiment, Sentiment::Neutral);
    }
}
