//! Output dataset rows.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::types::{
    ClassifiedTicket, OutcomeStatus, Priority, ProcessingOutcome, Sentiment, Ticket, TicketPayload,
    Topic,
};

/// One row of the merged output dataset.
///
/// Classification fields are absent when classification itself failed; the
/// row is still kept so a later run recognises the identity as handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    #[serde(flatten)]
    pub ticket: Ticket,
    #[serde(default)]
    pub topic: Option<Topic>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub owner_suggested: Option<String>,
    #[serde(default)]
    pub status: Option<OutcomeStatus>,
    #[serde(default)]
    pub dead_letter_path: Option<PathBuf>,
    /// Set when the pipeline classified the row. Later runs carry it forward
    /// unchanged; rows imported from older datasets default to false.
    #[serde(default)]
    pub is_new: bool,
}

impl TicketRecord {
    /// Build a fresh row from a processed ticket.
    pub fn from_processed(payload: TicketPayload, outcome: &ProcessingOutcome) -> Self {
        let mut record = match payload {
            TicketPayload::Classified(classified) => Self::from_classified(classified),
            TicketPayload::Raw(ticket) => Self::unclassified(ticket),
        };
        record.status = Some(outcome.status);
        record.dead_letter_path = outcome.dead_letter_path.clone();
        record.is_new = true;
        record
    }

    fn from_classified(classified: ClassifiedTicket) -> Self {
        let ClassifiedTicket {
            ticket,
            topic,
            priority,
            sentiment,
            owner_suggested,
        } = classified;
        Self {
            ticket,
            topic: Some(topic),
            priority: Some(priority),
            sentiment: Some(sentiment),
            owner_suggested: Some(owner_suggested),
            status: None,
            dead_letter_path: None,
            is_new: false,
        }
    }

    fn unclassified(ticket: Ticket) -> Self {
        Self {
            ticket,
            topic: None,
            priority: None,
            sentiment: None,
            owner_suggested: None,
            status: None,
            dead_letter_path: None,
            is_new: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.ticket.id
    }

    pub fn is_p1(&self) -> bool {
        self.priority == Some(Priority::P1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_processed_classified() {
        let classified = ClassifiedTicket {
            ticket: Ticket::new("t1", "URGENT login outage", "cannot log in"),
            topic: Topic::Login,
            priority: Priority::P1,
            sentiment: Sentiment::Negative,
            owner_suggested: "L1 Support".to_string(),
        };
        let record = TicketRecord::from_processed(classified.into(), &ProcessingOutcome::ok("t1"));
        assert_eq!(record.id(), "t1");
        assert_eq!(record.topic, Some(Topic::Login));
        assert_eq!(record.status, Some(OutcomeStatus::Ok));
        assert!(record.is_new);
        assert!(record.is_p1());
    }

    #[test]
    fn test_from_processed_unclassified_keeps_dead_letter_path() {
        let outcome = ProcessingOutcome::dead_lettered("t3", PathBuf::from("dlq/a.json"));
        let record = TicketRecord::from_processed(Ticket::new("t3", "s", "d").into(), &outcome);
        assert!(record.topic.is_none());
        assert_eq!(record.status, Some(OutcomeStatus::DeadLettered));
        assert_eq!(record.dead_letter_path, Some(PathBuf::from("dlq/a.json")));
    }

    #[test]
    fn test_legacy_row_without_status_columns() {
        let record: TicketRecord = serde_json::from_value(json!({
            "id": 55,
            "created_at": "2024-01-02 09:00:00",
            "subject": "Invoice copy",
            "description": "",
            "topic": "billing",
            "priority": "P2",
            "sentiment": "neutral",
            "owner_suggested": "Finance Ops"
        }))
        .unwrap();
        assert_eq!(record.id(), "55");
        assert_eq!(record.priority, Some(Priority::P2));
        assert!(record.status.is_none());
        assert!(!record.is_new);
    }
}
