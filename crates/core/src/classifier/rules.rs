//! Keyword rule classifier.
//!
//! Deterministic: every decision is a case-insensitive substring test against
//! static keyword tables, evaluated in declaration order. English keywords
//! come first with Spanish fallbacks.

use crate::ticket::{Priority, Sentiment, Topic};

use super::traits::{Classification, Classifier, ClassifyError};

/// One row of the topic table.
#[derive(Debug, Clone, Copy)]
pub struct TopicRule {
    pub topic: Topic,
    pub keywords: &'static [&'static str],
}

impl TopicRule {
    /// `text` must already be lowercased.
    pub fn matches(&self, text: &str) -> bool {
        contains_any(text, self.keywords)
    }
}

const LOGIN_KEYWORDS: &[&str] = &[
    "login",
    "sign in",
    "password",
    "credentials",
    "cannot log in",
    "can't log in",
    "contraseña",
    "credenciales",
    "entrar",
];

const BILLING_KEYWORDS: &[&str] = &[
    "billing",
    "charge",
    "charged",
    "invoice",
    "credit note",
    "refund",
    "facturación",
    "cobro",
    "nota de crédito",
    "reembolso",
];

const MOBILE_KEYWORDS: &[&str] = &["app", "mobile", "android", "ios", "móvil"];

const SECURITY_KEYWORDS: &[&str] = &[
    "security",
    "suspicious",
    "unauthorized",
    "breach",
    "fraud",
    "seguridad",
    "acceso raro",
    "fraude",
];

const INFO_KEYWORDS: &[&str] = &[
    "info",
    "information",
    "plan",
    "price",
    "pricing",
    "discount",
    "información",
    "precio",
    "descuento",
];

/// Topic table. First matching row wins.
pub const TOPIC_RULES: &[TopicRule] = &[
    TopicRule {
        topic: Topic::Login,
        keywords: LOGIN_KEYWORDS,
    },
    TopicRule {
        topic: Topic::Billing,
        keywords: BILLING_KEYWORDS,
    },
    TopicRule {
        topic: Topic::Mobile,
        keywords: MOBILE_KEYWORDS,
    },
    TopicRule {
        topic: Topic::Security,
        keywords: SECURITY_KEYWORDS,
    },
    TopicRule {
        topic: Topic::Info,
        keywords: INFO_KEYWORDS,
    },
];

/// Phrases meaning the customer is blocked; escalate to P1.
const BLOCKER_PHRASES: &[&str] = &[
    "cannot",
    "can't",
    "no puedo",
    "unauthorized",
    "breach",
    "fraud",
    "acceso raro",
];

const NEGATIVE_LEXICON: &[&str] = &[
    "cannot",
    "can't",
    "error",
    "crash",
    "crashes",
    "overcharged",
    "fraud",
    "no puedo",
    "se cierra",
    "cobraron de más",
];

const POSITIVE_LEXICON: &[&str] = &[
    "thanks",
    "thank you",
    "excellent",
    "great",
    "fast",
    "gracias",
    "excelente",
    "rápido",
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Topic of `text`; [`Topic::Other`] when no rule matches.
pub fn topic_of(text: &str) -> Topic {
    let text = text.to_lowercase();
    TOPIC_RULES
        .iter()
        .find(|rule| rule.matches(&text))
        .map(|rule| rule.topic)
        .unwrap_or_default()
}

/// Priority of `text`.
///
/// The security keyword list is shared with topic detection. The P1 check runs
/// before billing/mobile, so text matching both is P1.
pub fn priority_of(text: &str) -> Priority {
    let text = text.to_lowercase();
    if contains_any(&text, SECURITY_KEYWORDS) || contains_any(&text, BLOCKER_PHRASES) {
        Priority::P1
    } else if contains_any(&text, BILLING_KEYWORDS) || contains_any(&text, MOBILE_KEYWORDS) {
        Priority::P2
    } else {
        Priority::P3
    }
}

/// Sentiment of `text`. Negative wins over positive.
pub fn sentiment_of(text: &str) -> Sentiment {
    let text = text.to_lowercase();
    if contains_any(&text, NEGATIVE_LEXICON) {
        Sentiment::Negative
    } else if contains_any(&text, POSITIVE_LEXICON) {
        Sentiment::Positive
    } else {
        Sentiment::Neutral
    }
}

/// Owning team for a topic.
pub fn owner_for_topic(topic: Topic) -> &'static str {
    match topic {
        Topic::Login => "L1 Support",
        Topic::Billing => "Finance Ops",
        Topic::Mobile => "Mobile Squad",
        Topic::Security => "SecOps",
        Topic::Info => "Sales",
        Topic::Other => "L1 Support",
    }
}

/// Classifier backed by the static keyword tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for RuleClassifier {
    fn name(&self) -> &str {
        "rules"
    }

    fn classify(&self, text: &str) -> Result<Classification, ClassifyError> {
        Ok(Classification {
            topic: topic_of(text),
            priority: priority_of(text),
            sentiment: sentiment_of(text),
        })
    }

    fn owner_for(&self, topic: Topic) -> String {
        owner_for_topic(topic).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Classification {
        RuleClassifier.classify(text).unwrap()
    }

    #[test]
    fn test_login_outage_is_p1_negative() {
        let c = classify("URGENT login outage cannot log in, 500 errors");
        assert_eq!(c.topic, Topic::Login);
        assert_eq!(c.priority, Priority::P1);
        assert_eq!(c.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_pricing_question_is_info_p3_positive() {
        let c = classify("Pricing question thanks, great service");
        assert_eq!(c.topic, Topic::Info);
        assert_eq!(c.priority, Priority::P3);
        assert_eq!(c.sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_empty_text_defaults() {
        let c = classify("");
        assert_eq!(c.topic, Topic::Other);
        assert_eq!(c.priority, Priority::P3);
        assert_eq!(c.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_topic_table_order_breaks_ties() {
        // Matches both login ("password") and security ("suspicious").
        assert_eq!(topic_of("Suspicious password reset email"), Topic::Login);
        // Matches both billing ("refund") and mobile ("android").
        assert_eq!(topic_of("Refund for android purchase"), Topic::Billing);
    }

    #[test]
    fn test_case_insensitive_matching() {
        assert_eq!(topic_of("INVOICE MISSING"), Topic::Billing);
        assert_eq!(priority_of("SECURITY concern"), Priority::P1);
    }

    #[test]
    fn test_security_keywords_escalate_priority() {
        assert_eq!(topic_of("possible breach on my account"), Topic::Security);
        assert_eq!(priority_of("possible breach on my account"), Priority::P1);
    }

    #[test]
    fn test_p1_check_precedes_billing() {
        // "charged" is billing (P2) but "fraud" escalates first.
        assert_eq!(priority_of("I was charged twice, looks like fraud"), Priority::P1);
    }

    #[test]
    fn test_blocker_phrase_is_p1() {
        assert_eq!(priority_of("I can't export my report"), Priority::P1);
        assert_eq!(priority_of("no puedo entrar"), Priority::P1);
    }

    #[test]
    fn test_billing_and_mobile_are_p2() {
        assert_eq!(priority_of("Need a copy of my invoice"), Priority::P2);
        assert_eq!(priority_of("Mobile layout looks odd"), Priority::P2);
    }

    #[test]
    fn test_negative_sentiment_checked_first() {
        assert_eq!(sentiment_of("thanks, but the app crashes"), Sentiment::Negative);
        assert_eq!(sentiment_of("gracias, excelente"), Sentiment::Positive);
        assert_eq!(sentiment_of("How do I change plan"), Sentiment::Neutral);
    }

    #[test]
    fn test_spanish_fallbacks() {
        assert_eq!(topic_of("Problema con la facturación"), Topic::Billing);
        assert_eq!(topic_of("La aplicación móvil se cierra"), Topic::Mobile);
        assert_eq!(sentiment_of("La aplicación móvil se cierra"), Sentiment::Negative);
    }

    #[test]
    fn test_owner_table() {
        assert_eq!(RuleClassifier.owner_for(Topic::Login), "L1 Support");
        assert_eq!(RuleClassifier.owner_for(Topic::Billing), "Finance Ops");
        assert_eq!(RuleClassifier.owner_for(Topic::Mobile), "Mobile Squad");
        assert_eq!(RuleClassifier.owner_for(Topic::Security), "SecOps");
        assert_eq!(RuleClassifier.owner_for(Topic::Info), "Sales");
        assert_eq!(RuleClassifier.owner_for(Topic::Other), "L1 Support");
    }

    #[test]
    fn test_rule_table_covers_every_topic_but_other() {
        for topic in Topic::ALL {
            let in_table = TOPIC_RULES.iter().any(|r| r.topic == topic);
            assert_eq!(in_table, topic != Topic::Other, "topic {}", topic);
        }
    }
}
