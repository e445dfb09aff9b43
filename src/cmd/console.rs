use std::io::{self, Write};

use tracing::info;

use crate::context::AppContext;
use crate::domain::ticket::{TicketDraft, TicketRef};
use crate::error::AppResult;
use crate::store::{QueueOutcome, combine_queues};

/// Run the interactive menu loop until the user exits or stdin closes.
/// Store errors are printed and the session continues; only real I/O
/// failures propagate.
pub fn run(ctx: &mut AppContext) -> AppResult<()> {
    info!("console session started");

    if ctx.config.show_banner {
        println!("===== TICKET TRACKING SYSTEM =====");
        println!("Total Tickets: {}", ctx.store.tickets.len());
        let critical = ctx.store.priority_tickets(1)?;
        println!("Critical Tickets: {}", critical.len());
    }

    loop {
        print_menu();
        let Some(choice) = read_choice("Enter your choice")? else {
            break;
        };

        match choice.as_str() {
            "1" => display_tickets(&ctx.store.tickets, "Current Ticket List:"),
            "2" => add_or_remove(ctx)?,
            "3" => sort_menu(ctx)?,
            "4" => filter_menu(ctx)?,
            "5" => queue_menu(ctx)?,
            "6" => process_escalated(ctx)?,
            "7" => update_menu(ctx)?,
            "0" => {
                println!("Exiting system. Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }

    info!("console session ended");
    Ok(())
}

fn print_menu() {
    println!("\nMenu Options:");
    println!("1. View Tickets");
    println!("2. Add/Remove Ticket");
    println!("3. Sort Tickets");
    println!("4. Filter Tickets");
    println!("5. Queue Operations");
    println!("6. Process Escalated");
    println!("7. Update Ticket");
    println!("0. Exit");
}

fn add_or_remove(ctx: &mut AppContext) -> AppResult<()> {
    let op = prompt("Enter 'add' or 'remove'")?.to_lowercase();
    match op.as_str() {
        "add" => add_flow(ctx),
        "remove" => remove_flow(ctx),
        _ => {
            println!("Invalid choice. Please try again.");
            Ok(())
        }
    }
}

fn add_flow(ctx: &mut AppContext) -> AppResult<()> {
    let id = prompt("Enter ticket ID")?;
    let title = prompt("Enter title")?;
    let category = prompt("Enter type (technical, billing, general, account, feature)")?;
    let priority = prompt("Enter priority (1-4)")?;
    let status = prompt("Enter status (new, open, resolved, closed)")?;

    // The console owns numeric coercion; the store only sees integers.
    let priority = match priority.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            println!("Error: Priority must be an integer between 1 and 4");
            return Ok(());
        }
    };

    let draft = TicketDraft {
        id: Some(id),
        title: Some(title),
        category: Some(category),
        priority: Some(priority),
        status: Some(status),
    };

    match ctx.store.add_ticket(draft) {
        Ok(_) => println!("Ticket added successfully."),
        Err(err) => println!("Error: {err}"),
    }
    Ok(())
}

fn remove_flow(ctx: &mut AppContext) -> AppResult<()> {
    list_with_indexes(&ctx.store.tickets);
    let Some(index) = prompt_index("Enter index to remove")? else {
        return Ok(());
    };

    match ctx.store.remove_ticket(index) {
        Ok(removed) => {
            let ticket = removed.borrow();
            println!("Removed ticket: {} - {}", ticket.id, ticket.title);
        }
        Err(err) => println!("Error: {err}"),
    }
    Ok(())
}

fn sort_menu(ctx: &AppContext) -> AppResult<()> {
    let mut key = prompt("Sort by (id, priority, status, type)")?;
    if key.is_empty() {
        key = ctx.config.default_sort_key.clone();
    }

    match ctx.store.sort_tickets(&key) {
        Ok(sorted) => display_tickets(&sorted, "Current Ticket List:"),
        Err(err) => println!("Error: {err}"),
    }
    Ok(())
}

fn filter_menu(ctx: &AppContext) -> AppResult<()> {
    let filter_type = prompt("Filter by (type, status, priority, keyword)")?;
    let value = prompt("Enter value")?;

    match ctx.store.filter_tickets(&filter_type, &value) {
        Ok(filtered) => display_tickets(&filtered, "Filtered Results:"),
        Err(err) => println!("Error: {err}"),
    }
    Ok(())
}

fn queue_menu(ctx: &mut AppContext) -> AppResult<()> {
    println!("Active Queue Operations:");
    println!("1. Add ticket to queue");
    println!("2. Remove ticket from queue");
    println!("3. View queue");
    println!("4. Clear queue");

    let choice = prompt("Enter choice")?;
    match choice.as_str() {
        "1" => {
            list_with_indexes(&ctx.store.tickets);
            let Some(index) = prompt_index("Enter index to add")? else {
                return Ok(());
            };
            match ctx.store.manage_queue("add", Some(index)) {
                Ok(_) => println!("Ticket added to queue."),
                Err(err) => println!("Error: {err}"),
            }
        }
        "2" => {
            if ctx.store.active_queue.is_empty() {
                println!("Queue is empty.");
                return Ok(());
            }
            list_with_indexes(&ctx.store.active_queue);
            let Some(index) = prompt_index("Enter index to remove")? else {
                return Ok(());
            };
            match ctx.store.manage_queue("remove", Some(index)) {
                Ok(QueueOutcome::Removed(removed)) => {
                    let ticket = removed.borrow();
                    println!("Removed from queue: {} - {}", ticket.id, ticket.title);
                }
                Ok(QueueOutcome::Queue(_)) => {}
                Err(err) => println!("Error: {err}"),
            }
        }
        "3" => display_tickets(&ctx.store.active_queue, "Active Queue:"),
        "4" => {
            if let Err(err) = ctx.store.manage_queue("clear", None) {
                println!("Error: {err}");
            } else {
                println!("Queue cleared.");
            }
        }
        _ => println!("Invalid choice. Please try again."),
    }
    Ok(())
}

fn process_escalated(ctx: &mut AppContext) -> AppResult<()> {
    println!(
        "Processing {} escalated tickets...",
        ctx.store.escalated.len()
    );
    let combined = combine_queues(&ctx.store.tickets, &ctx.store.escalated);
    println!("Combined ticket count: {}", combined.len());
    display_tickets(&combined, "Current Ticket List:");

    let confirm = prompt("Update main ticket list to include escalated? (y/n)")?;
    if confirm.eq_ignore_ascii_case("y") {
        // Merge is caller-side: adopt the combined list, then clear.
        ctx.store.tickets = combined;
        ctx.store.escalated.clear();
        println!("Main ticket list updated.");
    }
    Ok(())
}

fn update_menu(ctx: &mut AppContext) -> AppResult<()> {
    list_with_indexes(&ctx.store.tickets);
    let Some(index) = prompt_index("Enter index to update")? else {
        return Ok(());
    };
    let field = prompt("Enter field to update (status, priority, type)")?;
    let value = prompt("Enter new value")?;

    match ctx.store.update_ticket(index, &field, &value) {
        Ok(updated) => {
            let ticket = updated.borrow();
            println!("Updated ticket: {} - {}", ticket.id, ticket.title);
            println!("{ticket}");
        }
        Err(err) => println!("Error: {err}"),
    }
    Ok(())
}

fn display_tickets(data: &[TicketRef], header: &str) {
    if data.is_empty() {
        println!("No tickets to display.");
        return;
    }
    println!("{header}");
    for ticket in data {
        println!("{}", ticket.borrow());
    }
}

fn list_with_indexes(data: &[TicketRef]) {
    for (i, ticket) in data.iter().enumerate() {
        let ticket = ticket.borrow();
        println!("{}: {} - {}", i, ticket.id, ticket.title);
    }
}

fn prompt_index(label: &str) -> AppResult<Option<usize>> {
    let input = prompt(label)?;
    match input.parse::<usize>() {
        Ok(index) => Ok(Some(index)),
        Err(_) => {
            println!("Error: Invalid index.");
            Ok(None)
        }
    }
}

fn prompt(label: &str) -> AppResult<String> {
    Ok(read_choice(label)?.unwrap_or_default())
}

// None means stdin reached end of input.
fn read_choice(label: &str) -> AppResult<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}: ")?;
    stdout.flush()?;

    let mut input = String::new();
    let bytes = io::stdin().read_line(&mut input)?;
    if bytes == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
