use std::fmt;

use crate::scraper::TicketSnapshot;

/// List-view sentinel meaning "no assignee".
pub const UNASSIGNED_SENTINEL: &str = "(empty)";

/// The three resolutions an operator can pick, with their fixed portal
/// state codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChoice {
    WorkInProgress,
    PendingTasks,
    PendingVendor,
}

impl StateChoice {
    /// Portal state code written into the form.
    pub fn value(&self) -> &'static str {
        match self {
            StateChoice::WorkInProgress => "4",
            StateChoice::PendingTasks => "22",
            StateChoice::PendingVendor => "21",
        }
    }

    /// Human label, also persisted to the decision memory.
    pub fn name(&self) -> &'static str {
        match self {
            StateChoice::WorkInProgress => "Work in Progress",
            StateChoice::PendingTasks => "Pending Tasks",
            StateChoice::PendingVendor => "Pending Vendor",
        }
    }

    /// Parse a menu entry ("1", "2", "3").
    pub fn from_menu(entry: &str) -> Option<Self> {
        match entry {
            "1" => Some(StateChoice::WorkInProgress),
            "2" => Some(StateChoice::PendingTasks),
            "3" => Some(StateChoice::PendingVendor),
            _ => None,
        }
    }

    /// Menu lines as presented to the operator.
    pub fn menu_lines() -> [String; 3] {
        [
            StateChoice::WorkInProgress,
            StateChoice::PendingTasks,
            StateChoice::PendingVendor,
        ]
        .map(|c| {
            let number = match c {
                StateChoice::WorkInProgress => 1,
                StateChoice::PendingTasks => 2,
                StateChoice::PendingVendor => 3,
            };
            format!("[{number}] {} ({})", c.name(), c.value())
        })
    }
}

/// How one ticket's triage ended, as reported to the supervisor. Only
/// `Applied` is written back to the decision memory, by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Remembered resolution re-applied without human interaction.
    Replayed,
    /// Nothing to do; no interaction, no memory write.
    SkippedSilent,
    /// Ticket already in a closed state; left untouched.
    SkippedClosed,
    /// Operator skipped, or the ticket was abandoned after a failure.
    SkippedByOperator,
    /// The countdown elapsed with no submission.
    SkippedTimeout,
    /// A fresh resolution was applied to the portal.
    Applied {
        choice: StateChoice,
        assignee: Option<String>,
    },
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Replayed => write!(f, "replayed from memory"),
            Resolution::SkippedSilent => write!(f, "no attention needed"),
            Resolution::SkippedClosed => write!(f, "skipped (closed)"),
            Resolution::SkippedByOperator => write!(f, "skipped by operator"),
            Resolution::SkippedTimeout => write!(f, "skipped (timeout)"),
            Resolution::Applied { choice, .. } => write!(f, "applied {}", choice.name()),
        }
    }
}

/// Why a ticket needs a human, captured for the alert banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttentionReason {
    Unassigned,
    Reopened(u32),
}

impl fmt::Display for AttentionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttentionReason::Unassigned => write!(f, "Assigned To is Empty"),
            AttentionReason::Reopened(count) => write!(f, "Reopen Count is {count}"),
        }
    }
}

/// The attention predicate: a ticket is routed to the operator iff its
/// assignee is empty (or the unassigned sentinel) or it has been reopened.
pub fn needs_attention(ticket: &TicketSnapshot) -> Option<AttentionReason> {
    if ticket.assignee.trim().is_empty() || ticket.assignee.contains(UNASSIGNED_SENTINEL) {
        Some(AttentionReason::Unassigned)
    } else if ticket.reopen_count > 0 {
        Some(AttentionReason::Reopened(ticket.reopen_count))
    } else {
        None
    }
}
