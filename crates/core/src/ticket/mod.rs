//! Ticket data model: input tickets, classified tickets, outcomes and output rows.

mod normalize;
mod record;
mod types;

pub use normalize::{normalize_id, parse_timestamp};
pub use record::TicketRecord;
pub use types::{
    ClassifiedTicket, OutcomeStatus, Priority, ProcessingOutcome, Sentiment, Ticket,
    TicketPayload, Topic,
};
