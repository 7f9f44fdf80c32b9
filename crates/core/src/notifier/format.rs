//! Alert message formatting.

use crate::ticket::ClassifiedTicket;

/// Human-readable alert for an urgent ticket.
///
/// Lines: header, id, subject, the ticket link when one exists, owner.
pub fn format_p1_alert(ticket: &ClassifiedTicket) -> String {
    let subject = ticket.ticket.subject.trim();
    let title = if subject.is_empty() { "P1 Ticket" } else { subject };

    let mut lines = vec![
        "🚨 P1 Ticket Alert".to_string(),
        format!("ID: {}", ticket.id()),
        format!("Title: {}", title),
    ];
    if let Some(url) = ticket.ticket.url.as_deref().filter(|u| !u.trim().is_empty()) {
        lines.push(url.to_string());
    }
    lines.push(format!("Owner: {}", ticket.owner_suggested));
    lines.join("\n")
}
