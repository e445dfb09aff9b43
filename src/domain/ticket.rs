use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{AppError, AppResult};

/// Shared handle to a ticket record. The active queue and derived views
/// (sorted, filtered, combined sequences) alias records of the primary
/// collection through this handle, so a field update is observable from
/// every sequence holding the same record.
pub type TicketRef = Rc<RefCell<Ticket>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub category: TicketCategory,
    pub priority: Priority,
    pub status: TicketStatus,
}

impl Ticket {
    pub fn into_ref(self) -> TicketRef {
        Rc::new(RefCell::new(self))
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | Priority: {} ({}) | Status: {}",
            self.id,
            self.title,
            self.category.as_str(),
            self.priority.label(),
            self.priority.value(),
            self.status.as_str().to_uppercase()
        )
    }
}

/// Raw field values collected by the console before validation. The store
/// reports the first missing field by name, so every field is optional here.
#[derive(Debug, Clone, Default)]
pub struct TicketDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub priority: Option<i64>,
    pub status: Option<String>,
}

/// Ticket category, called "type" everywhere the user sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketCategory {
    Technical,
    Billing,
    General,
    Account,
    Feature,
}

impl TicketCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketCategory::Technical => "technical",
            TicketCategory::Billing => "billing",
            TicketCategory::General => "general",
            TicketCategory::Account => "account",
            TicketCategory::Feature => "feature",
        }
    }

    // Exact match: category values are stored and compared lower-case.
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "technical" => Some(TicketCategory::Technical),
            "billing" => Some(TicketCategory::Billing),
            "general" => Some(TicketCategory::General),
            "account" => Some(TicketCategory::Account),
            "feature" => Some(TicketCategory::Feature),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        Self::from_str(value).ok_or_else(|| {
            AppError::Validation(
                "Invalid ticket type. Must be one of: technical, billing, general, account, feature"
                    .to_string(),
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    New,
    Open,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::New => "new",
            TicketStatus::Open => "open",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "new" => Some(TicketStatus::New),
            "open" => Some(TicketStatus::Open),
            "resolved" => Some(TicketStatus::Resolved),
            "closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> AppResult<Self> {
        Self::from_str(value).ok_or_else(|| {
            AppError::Validation(
                "Invalid status. Must be one of: new, open, resolved, closed".to_string(),
            )
        })
    }
}

/// Urgency level, 1 (critical) to 4 (low). Ordering follows the numeric
/// value, so an ascending sort puts critical tickets first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Critical = 1,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Priority::Critical),
            2 => Some(Priority::High),
            3 => Some(Priority::Medium),
            4 => Some(Priority::Low),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ticket_category() {
        assert_eq!(
            TicketCategory::from_str("billing"),
            Some(TicketCategory::Billing)
        );
        assert_eq!(TicketCategory::from_str("Billing"), None);
        assert_eq!(TicketCategory::from_str("unknown"), None);
    }

    #[test]
    fn parses_ticket_status() {
        assert_eq!(TicketStatus::from_str("open"), Some(TicketStatus::Open));
        assert_eq!(TicketStatus::from_str("reopened"), None);
    }

    #[test]
    fn priority_values_and_labels_line_up() {
        assert_eq!(Priority::Critical.value(), 1);
        assert_eq!(Priority::Low.value(), 4);
        assert_eq!(Priority::from_value(3), Some(Priority::Medium));
        assert_eq!(Priority::from_value(0), None);
        assert_eq!(Priority::from_value(5), None);
        assert_eq!(Priority::High.label(), "HIGH");
    }

    #[test]
    fn priority_orders_critical_first() {
        assert!(Priority::Critical < Priority::High);
        assert!(Priority::Medium < Priority::Low);
    }

    #[test]
    fn formats_ticket_line() {
        let ticket = Ticket {
            id: "T001".to_string(),
            title: "Payment not processing".to_string(),
            category: TicketCategory::Billing,
            priority: Priority::High,
            status: TicketStatus::Open,
        };
        assert_eq!(
            ticket.to_string(),
            "T001 | Payment not processing | billing | Priority: HIGH (2) | Status: OPEN"
        );
    }
}
