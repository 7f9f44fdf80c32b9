//! Mock classifier for testing.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::classifier::{owner_for_topic, Classification, Classifier, ClassifyError, RuleClassifier};
use crate::ticket::Topic;

#[derive(Debug)]
enum Behavior {
    Rules,
    Fixed(Classification),
    Fail(String),
    FailWhenContains { needle: String, message: String },
}

/// Mock implementation of the Classifier trait.
///
/// Delegates to the keyword rules unless told to return a fixed result or
/// to fail.
#[derive(Debug)]
pub struct MockClassifier {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClassifier {
    /// Behaves like the rule classifier.
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Rules)
    }

    /// Always returns `classification`.
    pub fn fixed(classification: Classification) -> Self {
        Self::with_behavior(Behavior::Fixed(classification))
    }

    /// Always fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// Fails for texts containing `needle` (case-insensitive), rules otherwise.
    pub fn failing_when_contains(needle: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::FailWhenContains {
            needle: needle.into().to_lowercase(),
            message: message.into(),
        })
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Rules => RuleClassifier.classify(text),
            Behavior::Fixed(classification) => Ok(*classification),
            Behavior::Fail(message) => Err(ClassifyError::Failed(message.clone())),
            Behavior::FailWhenContains { needle, message } => {
                if text.to_lowercase().contains(needle.as_str()) {
                    Err(ClassifyError::Failed(message.clone()))
                } else {
                    RuleClassifier.classify(text)
                }
            }
        }
    }

    fn owner_for(&self, topic: Topic) -> String {
        owner_for_topic(topic).to_string()
    }
}
