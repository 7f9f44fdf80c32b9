//! Identity partitioning and merge ordering.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::ticket::{Ticket, TicketRecord};

/// A batch split by identity.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Tickets already handled (or repeated within this batch).
    pub seen: Vec<Ticket>,
    /// Tickets to classify.
    pub new: Vec<Ticket>,
}

/// Identities present in a previous output dataset.
pub fn known_ids(records: &[TicketRecord]) -> HashSet<String> {
    records.iter().map(|r| r.id().to_string()).collect()
}

/// Split `batch` into already-seen and new tickets.
///
/// Ids are compared in their normalized string form. When an id repeats
/// within the batch, the first occurrence is new and the rest are seen.
pub fn partition(known: &HashSet<String>, batch: Vec<Ticket>) -> Partition {
    let mut claimed: HashSet<String> = HashSet::new();
    let mut result = Partition::default();
    for ticket in batch {
        if known.contains(&ticket.id) || !claimed.insert(ticket.id.clone()) {
            result.seen.push(ticket);
        } else {
            result.new.push(ticket);
        }
    }
    result
}

/// Previous rows followed by fresh rows, sorted newest first.
///
/// Rows without a timestamp go last. The sort is stable, so ties keep their
/// input order.
pub fn merge(previous: Vec<TicketRecord>, fresh: Vec<TicketRecord>) -> Vec<TicketRecord> {
    let mut merged = previous;
    merged.extend(fresh);
    merged.sort_by(newest_first);
    merged
}

fn newest_first(a: &TicketRecord, b: &TicketRecord) -> Ordering {
    match (a.ticket.created_at, b.ticket.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
