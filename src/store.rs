use tracing::debug;

use crate::domain::ticket::{
    Priority, Ticket, TicketCategory, TicketDraft, TicketRef, TicketStatus,
};
use crate::error::{AppError, AppResult};

/// Hard capacity of the active work queue.
pub const QUEUE_CAPACITY: usize = 5;

/// In-memory ticket store. All three collections are insertion-ordered and
/// may hold duplicate ids; the active queue aliases records of `tickets`.
///
/// Fields are public so the console can perform the caller-side escalated
/// merge (assign the combined list, then clear `escalated`); the store
/// itself has no clear-escalated operation.
#[derive(Debug, Default)]
pub struct TicketStore {
    pub tickets: Vec<TicketRef>,
    pub escalated: Vec<TicketRef>,
    pub active_queue: Vec<TicketRef>,
}

impl TicketStore {
    /// Fresh store with empty collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with the support team's starting dataset.
    pub fn seeded() -> Self {
        let tickets = vec![
            seed_ticket(
                "T001",
                "Payment not processing",
                TicketCategory::Billing,
                Priority::High,
                TicketStatus::Open,
            ),
            seed_ticket(
                "T002",
                "Reset password",
                TicketCategory::Account,
                Priority::Medium,
                TicketStatus::New,
            ),
            seed_ticket(
                "T003",
                "Application crashes",
                TicketCategory::Technical,
                Priority::Critical,
                TicketStatus::Open,
            ),
            seed_ticket(
                "T004",
                "Add dark mode",
                TicketCategory::Feature,
                Priority::Low,
                TicketStatus::New,
            ),
            seed_ticket(
                "T005",
                "Renewal failed",
                TicketCategory::Billing,
                Priority::High,
                TicketStatus::Open,
            ),
        ];

        let escalated = vec![
            seed_ticket(
                "E001",
                "Security breach",
                TicketCategory::Technical,
                Priority::Critical,
                TicketStatus::New,
            ),
            seed_ticket(
                "E002",
                "Double-charged",
                TicketCategory::Billing,
                Priority::Critical,
                TicketStatus::New,
            ),
        ];

        Self {
            tickets,
            escalated,
            active_queue: Vec::new(),
        }
    }

    /// Validate a draft and append the resulting ticket to the primary
    /// collection. Field checks run in draft order, then each enum domain.
    pub fn add_ticket(&mut self, draft: TicketDraft) -> AppResult<TicketRef> {
        let id = require_field("id", draft.id)?;
        let title = require_field("title", draft.title)?;
        let category = require_field("type", draft.category)?;
        let priority = require_field("priority", draft.priority)?;
        let status = require_field("status", draft.status)?;

        let category = TicketCategory::parse(&category)?;
        let priority = Priority::from_value(priority).ok_or_else(|| {
            AppError::Validation("Priority must be an integer between 1 and 4".to_string())
        })?;
        let status = TicketStatus::parse(&status)?;

        let ticket = Ticket {
            id,
            title,
            category,
            priority,
            status,
        }
        .into_ref();

        debug!(id = %ticket.borrow().id, "ticket added");
        self.tickets.push(ticket.clone());
        Ok(ticket)
    }

    /// Remove and return the ticket at `index`; later tickets shift down.
    pub fn remove_ticket(&mut self, index: usize) -> AppResult<TicketRef> {
        if index >= self.tickets.len() {
            return Err(AppError::IndexOutOfRange("Index out of range".to_string()));
        }
        debug!(index, "ticket removed");
        Ok(self.tickets.remove(index))
    }

    /// New sequence sorted ascending by `key`; the store is untouched.
    /// String-valued fields compare on their display form, priority
    /// numerically. Stable for equal keys.
    pub fn sort_tickets(&self, key: &str) -> AppResult<Vec<TicketRef>> {
        let key = SortKey::parse(key)?;
        let mut sorted = self.tickets.clone();
        sorted.sort_by(|a, b| {
            let a = a.borrow();
            let b = b.borrow();
            match key {
                SortKey::Id => a.id.cmp(&b.id),
                SortKey::Priority => a.priority.cmp(&b.priority),
                SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
                SortKey::Category => a.category.as_str().cmp(b.category.as_str()),
            }
        });
        Ok(sorted)
    }

    /// New sequence of tickets matching the criterion, order preserved.
    ///
    /// `type` and `status` values are matched by plain string equality with
    /// no domain check (an unknown value yields an empty result), while a
    /// non-numeric `priority` value is an error.
    pub fn filter_tickets(&self, filter_type: &str, value: &str) -> AppResult<Vec<TicketRef>> {
        match FilterKind::parse(filter_type)? {
            FilterKind::Keyword => {
                let needle = value.to_lowercase();
                Ok(self
                    .tickets
                    .iter()
                    .filter(|t| t.borrow().title.to_lowercase().contains(&needle))
                    .cloned()
                    .collect())
            }
            FilterKind::Priority => {
                let wanted: i64 = value.trim().parse().map_err(|_| {
                    AppError::Validation(
                        "Priority value must be a number between 1 and 4".to_string(),
                    )
                })?;
                // No range check: an out-of-range number matches nothing.
                Ok(self
                    .tickets
                    .iter()
                    .filter(|t| i64::from(t.borrow().priority.value()) == wanted)
                    .cloned()
                    .collect())
            }
            FilterKind::Category => Ok(self
                .tickets
                .iter()
                .filter(|t| t.borrow().category.as_str() == value)
                .cloned()
                .collect()),
            FilterKind::Status => Ok(self
                .tickets
                .iter()
                .filter(|t| t.borrow().status.as_str() == value)
                .cloned()
                .collect()),
        }
    }

    /// All tickets with exactly the given priority, order preserved.
    pub fn priority_tickets(&self, level: i64) -> AppResult<Vec<TicketRef>> {
        let level = Priority::from_value(level).ok_or_else(|| {
            AppError::Validation("Priority level must be between 1 and 4".to_string())
        })?;
        Ok(self
            .tickets
            .iter()
            .filter(|t| t.borrow().priority == level)
            .cloned()
            .collect())
    }

    /// Apply a queue operation. `add` aliases `tickets[index]` into the
    /// queue (capacity permitting), `remove` takes an entry out, `clear`
    /// empties the queue.
    pub fn manage_queue(
        &mut self,
        operation: &str,
        index: Option<usize>,
    ) -> AppResult<QueueOutcome> {
        match QueueOp::parse(operation)? {
            QueueOp::Add => {
                let index = index.ok_or_else(|| {
                    AppError::Validation("Index is required for add operation".to_string())
                })?;
                if index >= self.tickets.len() {
                    return Err(AppError::IndexOutOfRange(
                        "Ticket index out of range".to_string(),
                    ));
                }
                if self.active_queue.len() >= QUEUE_CAPACITY {
                    return Err(AppError::Validation(
                        "Active queue is at maximum capacity (5 tickets)".to_string(),
                    ));
                }
                debug!(index, "ticket queued");
                self.active_queue.push(self.tickets[index].clone());
                Ok(QueueOutcome::Queue(self.active_queue.clone()))
            }
            QueueOp::Remove => {
                let index = index.ok_or_else(|| {
                    AppError::Validation("Index is required for remove operation".to_string())
                })?;
                if index >= self.active_queue.len() {
                    return Err(AppError::IndexOutOfRange(
                        "Queue index out of range".to_string(),
                    ));
                }
                debug!(index, "ticket dequeued");
                Ok(QueueOutcome::Removed(self.active_queue.remove(index)))
            }
            QueueOp::Clear => {
                debug!("queue cleared");
                self.active_queue.clear();
                Ok(QueueOutcome::Queue(self.active_queue.clone()))
            }
        }
    }

    /// Update one field of the ticket at `index` in place. Every sequence
    /// aliasing the record observes the change.
    pub fn update_ticket(
        &mut self,
        index: usize,
        field: &str,
        value: &str,
    ) -> AppResult<TicketRef> {
        if index >= self.tickets.len() {
            return Err(AppError::IndexOutOfRange(
                "Ticket index out of range".to_string(),
            ));
        }
        let field = UpdateField::parse(field)?;
        let ticket = self.tickets[index].clone();

        match field {
            UpdateField::Status => {
                let status = TicketStatus::parse(value)?;
                ticket.borrow_mut().status = status;
            }
            UpdateField::Priority => {
                let priority = value
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(Priority::from_value)
                    .ok_or_else(|| {
                        AppError::Validation(
                            "Priority must be an integer between 1 and 4".to_string(),
                        )
                    })?;
                ticket.borrow_mut().priority = priority;
            }
            UpdateField::Category => {
                let category = TicketCategory::parse(value)?;
                ticket.borrow_mut().category = category;
            }
        }

        debug!(index, "ticket updated");
        Ok(ticket)
    }
}

/// Concatenate two ticket sequences into a new one, first then second.
/// No dedup, no validation, neither input mutated.
pub fn combine_queues(first: &[TicketRef], second: &[TicketRef]) -> Vec<TicketRef> {
    let mut combined = Vec::with_capacity(first.len() + second.len());
    combined.extend_from_slice(first);
    combined.extend_from_slice(second);
    combined
}

fn require_field<T>(name: &str, value: Option<T>) -> AppResult<T> {
    value.ok_or_else(|| AppError::Validation(format!("Ticket is missing required field: {name}")))
}

fn seed_ticket(
    id: &str,
    title: &str,
    category: TicketCategory,
    priority: Priority,
    status: TicketStatus,
) -> TicketRef {
    Ticket {
        id: id.to_string(),
        title: title.to_string(),
        category,
        priority,
        status,
    }
    .into_ref()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Priority,
    Status,
    Category,
}

impl SortKey {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "id" => Ok(SortKey::Id),
            "priority" => Ok(SortKey::Priority),
            "status" => Ok(SortKey::Status),
            "type" => Ok(SortKey::Category),
            _ => Err(AppError::Validation(
                "Invalid sort key. Must be one of: id, priority, status, type".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Category,
    Status,
    Priority,
    Keyword,
}

impl FilterKind {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "type" => Ok(FilterKind::Category),
            "status" => Ok(FilterKind::Status),
            "priority" => Ok(FilterKind::Priority),
            "keyword" => Ok(FilterKind::Keyword),
            _ => Err(AppError::Validation(
                "Invalid filter type. Must be one of: type, status, priority, keyword".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOp {
    Add,
    Remove,
    Clear,
}

impl QueueOp {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            "add" => Ok(QueueOp::Add),
            "remove" => Ok(QueueOp::Remove),
            "clear" => Ok(QueueOp::Clear),
            _ => Err(AppError::Validation(
                "Invalid operation. Must be one of: add, remove, clear".to_string(),
            )),
        }
    }
}

/// `remove` hands back the ticket taken out of the queue; `add` and `clear`
/// hand back the queue itself.
#[derive(Debug)]
pub enum QueueOutcome {
    Queue(Vec<TicketRef>),
    Removed(TicketRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateField {
    Status,
    Priority,
    Category,
}

impl UpdateField {
    fn parse(value: &str) -> AppResult<Self> {
        match value {
            "status" => Ok(UpdateField::Status),
            "priority" => Ok(UpdateField::Priority),
            "type" => Ok(UpdateField::Category),
            _ => Err(AppError::Validation(
                "Invalid field. Must be one of: status, priority, type".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    fn draft(id: &str, title: &str, category: &str, priority: i64, status: &str) -> TicketDraft {
        TicketDraft {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            category: Some(category.to_string()),
            priority: Some(priority),
            status: Some(status.to_string()),
        }
    }

    fn ids(tickets: &[TicketRef]) -> Vec<String> {
        tickets.iter().map(|t| t.borrow().id.clone()).collect()
    }

    #[test]
    fn adds_valid_ticket_to_empty_store() {
        let mut store = TicketStore::new();
        let added = store
            .add_ticket(draft("T100", "Printer on fire", "technical", 1, "new"))
            .unwrap();

        assert_eq!(store.tickets.len(), 1);
        assert!(Rc::ptr_eq(&store.tickets[0], &added));
        assert_eq!(added.borrow().priority, Priority::Critical);
    }

    #[test]
    fn add_reports_first_missing_field() {
        let mut store = TicketStore::new();
        let mut incomplete = draft("T100", "No status", "technical", 1, "new");
        incomplete.title = None;
        incomplete.status = None;

        let err = store.add_ticket(incomplete).unwrap_err();
        assert_eq!(err.to_string(), "Ticket is missing required field: title");
        assert!(store.tickets.is_empty());
    }

    #[test]
    fn add_rejects_unknown_category() {
        let mut store = TicketStore::new();
        let err = store
            .add_ticket(draft("T100", "Bad", "sales", 1, "new"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid ticket type. Must be one of: technical, billing, general, account, feature"
        );
    }

    #[test]
    fn add_rejects_out_of_range_priority() {
        let mut store = TicketStore::new();
        let err = store
            .add_ticket(draft("T100", "Bad", "technical", 9, "new"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Priority must be an integer between 1 and 4"
        );
    }

    #[test]
    fn add_rejects_unknown_status() {
        let mut store = TicketStore::new();
        let err = store
            .add_ticket(draft("T100", "Bad", "technical", 1, "pending"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid status. Must be one of: new, open, resolved, closed"
        );
        assert!(store.tickets.is_empty());
    }

    #[test]
    fn duplicate_ids_are_permitted() {
        let mut store = TicketStore::new();
        store
            .add_ticket(draft("T100", "First", "general", 3, "new"))
            .unwrap();
        store
            .add_ticket(draft("T100", "Second", "general", 3, "new"))
            .unwrap();
        assert_eq!(store.tickets.len(), 2);
    }

    #[test]
    fn remove_returns_the_indexed_ticket_and_shifts() {
        let mut store = TicketStore::seeded();
        let expected = store.tickets[1].clone();

        let removed = store.remove_ticket(1).unwrap();
        assert!(Rc::ptr_eq(&removed, &expected));
        assert_eq!(store.tickets.len(), 4);
        assert_eq!(ids(&store.tickets), ["T001", "T003", "T004", "T005"]);
    }

    #[test]
    fn remove_rejects_out_of_range_index() {
        let mut store = TicketStore::seeded();
        let err = store.remove_ticket(5).unwrap_err();
        assert_eq!(err.to_string(), "Index out of range");
        assert_eq!(store.tickets.len(), 5);
    }

    #[test]
    fn sort_by_priority_is_ascending_and_stable() {
        let store = TicketStore::seeded();
        let sorted = store.sort_tickets("priority").unwrap();
        // T001 and T005 share priority 2 and keep their seeded order.
        assert_eq!(ids(&sorted), ["T003", "T001", "T005", "T002", "T004"]);
        // Source order untouched.
        assert_eq!(
            ids(&store.tickets),
            ["T001", "T002", "T003", "T004", "T005"]
        );
    }

    #[test]
    fn sort_by_status_compares_display_form() {
        let store = TicketStore::seeded();
        let sorted = store.sort_tickets("status").unwrap();
        // "new" sorts before "open".
        assert_eq!(ids(&sorted), ["T002", "T004", "T001", "T003", "T005"]);
    }

    #[test]
    fn sort_by_category_compares_display_form() {
        let store = TicketStore::seeded();
        let sorted = store.sort_tickets("type").unwrap();
        // account < billing < feature < technical.
        assert_eq!(ids(&sorted), ["T002", "T001", "T005", "T004", "T003"]);
    }

    #[test]
    fn sort_rejects_unknown_key() {
        let store = TicketStore::seeded();
        let err = store.sort_tickets("title").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid sort key. Must be one of: id, priority, status, type"
        );
    }

    #[test]
    fn filter_keyword_matches_case_insensitively() {
        let store = TicketStore::seeded();
        let filtered = store.filter_tickets("keyword", "CRASH").unwrap();
        assert_eq!(ids(&filtered), ["T003"]);
    }

    #[test]
    fn filter_priority_parses_string_values() {
        let store = TicketStore::seeded();
        let filtered = store.filter_tickets("priority", "2").unwrap();
        assert_eq!(ids(&filtered), ["T001", "T005"]);
    }

    #[test]
    fn filter_priority_rejects_non_numeric_values() {
        let store = TicketStore::seeded();
        let err = store.filter_tickets("priority", "high").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Priority value must be a number between 1 and 4"
        );
    }

    #[test]
    fn filter_priority_out_of_range_yields_empty_not_error() {
        let store = TicketStore::seeded();
        let filtered = store.filter_tickets("priority", "7").unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn filter_status_does_not_validate_the_value() {
        let store = TicketStore::seeded();
        // Unknown status values silently match nothing.
        let filtered = store.filter_tickets("status", "reopened").unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn filter_rejects_unknown_filter_type() {
        let store = TicketStore::seeded();
        let err = store.filter_tickets("title", "x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid filter type. Must be one of: type, status, priority, keyword"
        );
    }

    #[test]
    fn combine_queues_concatenates_in_order() {
        let store = TicketStore::seeded();
        let combined = combine_queues(&store.tickets, &store.escalated);

        assert_eq!(combined.len(), 7);
        assert_eq!(
            ids(&combined),
            ["T001", "T002", "T003", "T004", "T005", "E001", "E002"]
        );
        for (a, b) in combined.iter().zip(store.tickets.iter()) {
            assert!(Rc::ptr_eq(a, b));
        }
        assert_eq!(store.escalated.len(), 2);
    }

    #[test]
    fn priority_tickets_validates_the_level() {
        let store = TicketStore::seeded();
        assert_eq!(ids(&store.priority_tickets(1).unwrap()), ["T003"]);

        let err = store.priority_tickets(0).unwrap_err();
        assert_eq!(err.to_string(), "Priority level must be between 1 and 4");
    }

    #[test]
    fn queue_add_enforces_capacity_and_clear_recovers() {
        let mut store = TicketStore::seeded();
        store
            .add_ticket(draft("T006", "Sixth", "general", 3, "new"))
            .unwrap();

        for index in 0..QUEUE_CAPACITY {
            store.manage_queue("add", Some(index)).unwrap();
        }
        assert_eq!(store.active_queue.len(), 5);

        let err = store.manage_queue("add", Some(5)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Active queue is at maximum capacity (5 tickets)"
        );

        match store.manage_queue("clear", None).unwrap() {
            QueueOutcome::Queue(queue) => assert!(queue.is_empty()),
            QueueOutcome::Removed(_) => panic!("clear yields the queue"),
        }
        assert!(store.active_queue.is_empty());

        store.manage_queue("add", Some(0)).unwrap();
        assert_eq!(store.active_queue.len(), 1);
    }

    #[test]
    fn queue_add_requires_an_index() {
        let mut store = TicketStore::seeded();
        let err = store.manage_queue("add", None).unwrap_err();
        assert_eq!(err.to_string(), "Index is required for add operation");
    }

    #[test]
    fn queue_add_rejects_bad_ticket_index() {
        let mut store = TicketStore::seeded();
        let err = store.manage_queue("add", Some(9)).unwrap_err();
        assert_eq!(err.to_string(), "Ticket index out of range");
    }

    #[test]
    fn queue_remove_returns_the_removed_ticket() {
        let mut store = TicketStore::seeded();
        store.manage_queue("add", Some(0)).unwrap();
        store.manage_queue("add", Some(2)).unwrap();

        let removed = match store.manage_queue("remove", Some(0)).unwrap() {
            QueueOutcome::Removed(ticket) => ticket,
            QueueOutcome::Queue(_) => panic!("remove yields the removed ticket"),
        };
        assert_eq!(removed.borrow().id, "T001");
        assert_eq!(store.active_queue.len(), 1);

        let err = store.manage_queue("remove", Some(3)).unwrap_err();
        assert_eq!(err.to_string(), "Queue index out of range");

        let err = store.manage_queue("remove", None).unwrap_err();
        assert_eq!(err.to_string(), "Index is required for remove operation");
    }

    #[test]
    fn queue_rejects_unknown_operation() {
        let mut store = TicketStore::seeded();
        let err = store.manage_queue("push", Some(0)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid operation. Must be one of: add, remove, clear"
        );
    }

    #[test]
    fn update_mutates_in_place_and_queue_entries_observe_it() {
        let mut store = TicketStore::seeded();
        store.manage_queue("add", Some(0)).unwrap();

        let updated = store.update_ticket(0, "status", "resolved").unwrap();
        assert_eq!(updated.borrow().status, TicketStatus::Resolved);
        assert_eq!(store.tickets[0].borrow().status, TicketStatus::Resolved);
        assert_eq!(
            store.active_queue[0].borrow().status,
            TicketStatus::Resolved
        );
        assert!(Rc::ptr_eq(&store.tickets[0], &store.active_queue[0]));
    }

    #[test]
    fn update_parses_priority_strings() {
        let mut store = TicketStore::seeded();
        let updated = store.update_ticket(3, "priority", "1").unwrap();
        assert_eq!(updated.borrow().priority, Priority::Critical);
    }

    #[test]
    fn update_collapses_priority_failures_into_one_message() {
        let mut store = TicketStore::seeded();
        for bad in ["soon", "0", "5"] {
            let err = store.update_ticket(0, "priority", bad).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Priority must be an integer between 1 and 4"
            );
        }
    }

    #[test]
    fn update_rejects_unknown_field_and_bad_index() {
        let mut store = TicketStore::seeded();

        let err = store.update_ticket(0, "title", "New title").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid field. Must be one of: status, priority, type"
        );

        let err = store.update_ticket(9, "status", "open").unwrap_err();
        assert_eq!(err.to_string(), "Ticket index out of range");
    }

    #[test]
    fn update_changes_category() {
        let mut store = TicketStore::seeded();
        let updated = store.update_ticket(1, "type", "general").unwrap();
        assert_eq!(updated.borrow().category, TicketCategory::General);

        let err = store.update_ticket(1, "type", "sales").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid ticket type. Must be one of: technical, billing, general, account, feature"
        );
    }
}
