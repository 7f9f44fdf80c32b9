//! Core ticket data types.
//!
//! Each pipeline stage has its own fixed-shape type:
//! [`Ticket`] → [`ClassifiedTicket`] → [`ProcessingOutcome`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

use super::normalize::{deserialize_id, deserialize_text, parse_timestamp};

// ============================================================================
// Labels
// ============================================================================

/// Coarse ticket category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Login,
    Billing,
    Mobile,
    Security,
    Info,
    #[default]
    Other,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Login,
        Topic::Billing,
        Topic::Mobile,
        Topic::Security,
        Topic::Info,
        Topic::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Login => "login",
            Topic::Billing => "billing",
            Topic::Mobile => "mobile",
            Topic::Security => "security",
            Topic::Info => "info",
            Topic::Other => "other",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency tier. P1 is the only tier that pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    #[default]
    P3,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Negative,
    #[default]
    Neutral,
    Positive,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Stage Types
// ============================================================================

/// An input support ticket. Immutable once read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TicketRow", into = "TicketRow")]
pub struct Ticket {
    /// Identity, normalized to a string.
    pub id: String,
    /// Creation time; `None` when missing or unparseable.
    pub created_at: Option<DateTime<Utc>>,
    /// The `created_at` value as read, kept only when it did not parse so
    /// that writing the ticket back preserves it.
    pub created_at_raw: Option<Value>,
    /// Intake channel (email, chat, app, ...).
    pub channel: String,
    pub subject: String,
    pub description: String,
    /// Optional link back to the ticket in the helpdesk.
    pub url: Option<String>,
}

/// Serialized form of [`Ticket`].
#[derive(Serialize, Deserialize)]
struct TicketRow {
    #[serde(deserialize_with = "deserialize_id")]
    id: String,
    #[serde(default)]
    created_at: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_text")]
    channel: String,
    #[serde(default, alias = "title", deserialize_with = "deserialize_text")]
    subject: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        let (created_at, created_at_raw) = match row.created_at {
            None | Some(Value::Null) => (None, None),
            Some(Value::String(raw)) => match parse_timestamp(&raw) {
                Some(ts) => (Some(ts), None),
                None => (None, Some(Value::String(raw))),
            },
            Some(other) => (None, Some(other)),
        };
        Self {
            id: row.id,
            created_at,
            created_at_raw,
            channel: row.channel,
            subject: row.subject,
            description: row.description,
            url: row.url,
        }
    }
}

impl From<Ticket> for TicketRow {
    fn from(ticket: Ticket) -> Self {
        let created_at = match ticket.created_at {
            Some(ts) => Some(Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
            None => ticket.created_at_raw,
        };
        Self {
            id: ticket.id,
            created_at,
            channel: ticket.channel,
            subject: ticket.subject,
            description: ticket.description,
            url: ticket.url,
        }
    }
}

impl Ticket {
    pub fn new(id: impl Into<String>, subject: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            created_at_raw: None,
            channel: String::new(),
            subject: subject.into(),
            description: description.into(),
            url: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self.created_at_raw = None;
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Text the classifier sees: subject and description joined by a space.
    pub fn text(&self) -> String {
        format!("{} {}", self.subject, self.description).trim().to_string()
    }
}

/// A ticket enriched with its derived classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub topic: Topic,
    pub priority: Priority,
    pub sentiment: Sentiment,
    pub owner_suggested: String,
}

impl ClassifiedTicket {
    /// Whether this ticket goes through the notification path.
    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::P1
    }

    pub fn id(&self) -> &str {
        &self.ticket.id
    }
}

/// Either stage of a ticket, as stored in dead-letter records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TicketPayload {
    Classified(ClassifiedTicket),
    Raw(Ticket),
}

impl TicketPayload {
    pub fn ticket(&self) -> &Ticket {
        match self {
            TicketPayload::Classified(c) => &c.ticket,
            TicketPayload::Raw(t) => t,
        }
    }

    pub fn ticket_id(&self) -> &str {
        &self.ticket().id
    }

    pub fn classified(&self) -> Option<&ClassifiedTicket> {
        match self {
            TicketPayload::Classified(c) => Some(c),
            TicketPayload::Raw(_) => None,
        }
    }
}

impl From<Ticket> for TicketPayload {
    fn from(ticket: Ticket) -> Self {
        TicketPayload::Raw(ticket)
    }
}

impl From<ClassifiedTicket> for TicketPayload {
    fn from(ticket: ClassifiedTicket) -> Self {
        TicketPayload::Classified(ticket)
    }
}

/// Terminal state of one ticket in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "DEAD_LETTERED")]
    DeadLettered,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Ok => "OK",
            OutcomeStatus::DeadLettered => "DEAD_LETTERED",
        }
    }
}

/// Result of processing one ticket; produced exactly once per ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    pub ticket_id: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dead_letter_path: Option<PathBuf>,
}

impl ProcessingOutcome {
    pub fn ok(ticket_id: impl Into<String>) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            status: OutcomeStatus::Ok,
            dead_letter_path: None,
        }
    }

    pub fn dead_lettered(ticket_id: impl Into<String>, path: PathBuf) -> Self {
        Self {
            ticket_id: ticket_id.into(),
            status: OutcomeStatus::DeadLettered,
            dead_letter_path: Some(path),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == OutcomeStatus::Ok
    }
}
