//! Ticket discovery: turns the rendered incident list into a deduplicated
//! sequence of [`TicketSnapshot`]s.
//!
//! Extraction is split in two: [`extract`] is a pure function over a
//! [`RawTable`] snapshot (testable without a browser), and [`scrape`] reads
//! that snapshot through the WebDriver session. The scrape fails soft: a
//! missing identifier column or an unreadable page means "no tickets this
//! cycle", a row going stale mid-read keeps the partial result. Only
//! session loss propagates, so the supervisor can rebuild the session.

use std::collections::HashSet;
use std::time::Duration;

use crate::livelog::LiveLog;
use crate::webdriver::{DriverError, ElementRef, Session};

/// Sentinel for tickets whose list row carries no description.
pub const NO_DESCRIPTION: &str = "No Description";

const LIST_BODY: &str = ".list2_body";
const HEADER_CELLS: &str = "table thead th";
const ROW_CELLS: &str = ".list2_body tr";
const LIST_WAIT: Duration = Duration::from_secs(20);

/// One ticket as seen on the list view. Produced fresh each poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketSnapshot {
    pub id: String,
    pub short_description: String,
    /// May be empty or the "(empty)" sentinel, both meaning unassigned.
    pub assignee: String,
    pub reopen_count: u32,
}

/// Opaque snapshot of the listing table as read off the page.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Column roles resolved by case-insensitive substring match on header text.
#[derive(Debug, Default)]
struct ColumnMap {
    number: Option<usize>,
    short_description: Option<usize>,
    reopen_count: Option<usize>,
    assigned_to: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Self {
        let mut map = Self::default();
        for (i, header) in headers.iter().enumerate() {
            let text = header.trim().to_lowercase();
            if text.contains("number") {
                map.number = Some(i);
            } else if text.contains("short description") {
                map.short_description = Some(i);
            } else if text.contains("reopen count") {
                map.reopen_count = Some(i);
            } else if text.contains("assigned to") {
                map.assigned_to = Some(i);
            }
        }
        map
    }
}

/// Pure extraction: prefix filter, per-field defaults, first-wins dedup in
/// table order. An unresolvable identifier column yields an empty list.
pub fn extract(table: &RawTable, ticket_prefix: &str) -> Vec<TicketSnapshot> {
    let columns = ColumnMap::resolve(&table.headers);
    let Some(number_col) = columns.number else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut tickets = Vec::new();
    for row in &table.rows {
        let Some(id) = row.get(number_col).map(|cell| cell.trim()) else {
            continue;
        };
        if !id.starts_with(ticket_prefix) {
            continue;
        }
        if !seen.insert(id.to_string()) {
            continue;
        }

        let short_description = columns
            .short_description
            .and_then(|i| row.get(i))
            .map(|cell| cell.trim())
            .filter(|cell| !cell.is_empty())
            .unwrap_or(NO_DESCRIPTION)
            .to_string();
        let assignee = columns
            .assigned_to
            .and_then(|i| row.get(i))
            .map(|cell| cell.trim().to_string())
            .unwrap_or_default();
        let reopen_count = columns
            .reopen_count
            .and_then(|i| row.get(i))
            .and_then(|cell| cell.trim().parse().ok())
            .unwrap_or(0);

        tickets.push(TicketSnapshot {
            id: id.to_string(),
            short_description,
            assignee,
            reopen_count,
        });
    }
    tickets
}

/// One discovery pass: switch to the listing window, load the list, read
/// the table, extract. Returns `Err` only on session loss.
pub async fn scrape(
    session: &Session,
    list_url: &str,
    ticket_prefix: &str,
    log: &LiveLog,
) -> Result<Vec<TicketSnapshot>, DriverError> {
    let handles = session.window_handles().await?;
    if let Some(first) = handles.first() {
        session.switch_window(first).await?;
    }
    session.navigate(list_url).await?;

    match session.wait_for(LIST_BODY, LIST_WAIT).await {
        Ok(_) => {}
        Err(e) if e.is_session_loss() => return Err(e),
        Err(_) => return Ok(Vec::new()),
    }

    let table = read_table(session, log).await?;
    Ok(extract(&table, ticket_prefix))
}

async fn read_table(session: &Session, log: &LiveLog) -> Result<RawTable, DriverError> {
    let mut table = RawTable::default();

    let headers = match session.find_all(HEADER_CELLS).await {
        Ok(headers) => headers,
        Err(e) if e.is_session_loss() => return Err(e),
        Err(e) => {
            log.add(&format!("    scrape error reading headers: {e}"));
            return Ok(table);
        }
    };
    for header in &headers {
        table.headers.push(session.text(header).await.unwrap_or_default());
    }

    let rows = match session.find_all(ROW_CELLS).await {
        Ok(rows) => rows,
        Err(e) if e.is_session_loss() => return Err(e),
        Err(e) => {
            log.add(&format!("    scrape error reading rows: {e}"));
            return Ok(table);
        }
    };
    for row in &rows {
        match read_row(session, row).await {
            Ok(cells) => table.rows.push(cells),
            Err(DriverError::StaleElement) => {
                log.add("    listing went stale mid-read, keeping partial result");
                break;
            }
            Err(e) if e.is_session_loss() => return Err(e),
            Err(_) => {} // row skipped
        }
    }

    Ok(table)
}

async fn read_row(session: &Session, row: &ElementRef) -> Result<Vec<String>, DriverError> {
    let cells = session.find_within(row, "td").await?;
    let mut texts = Vec::with_capacity(cells.len());
    for cell in &cells {
        texts.push(session.text(cell).await?);
    }
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    const HEADERS: &[&str] = &["Number", "Short description", "Reopen count", "Assigned to"];

    #[test]
    fn extracts_ordered_unique_tickets() {
        let t = table(
            HEADERS,
            &[
                &["INC002", "printer", "0", "Bob"],
                &["INC001", "vpn down", "1", ""],
                &["INC002", "duplicate row", "0", ""],
            ],
        );
        let tickets = extract(&t, "INC");
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].id, "INC002");
        assert_eq!(tickets[0].short_description, "printer");
        assert_eq!(tickets[1].id, "INC001");
        assert_eq!(tickets[1].reopen_count, 1);
    }

    #[test]
    fn rows_without_the_prefix_are_discarded() {
        let t = table(
            HEADERS,
            &[
                &["CHG100", "a change", "0", ""],
                &["INC010", "real one", "0", ""],
                &["", "blank id", "0", ""],
            ],
        );
        let tickets = extract(&t, "INC");
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id, "INC010");
    }

    #[test]
    fn missing_identifier_column_yields_empty() {
        let t = table(
            &["Priority", "Short description"],
            &[&["1 - Critical", "whatever"]],
        );
        assert!(extract(&t, "INC").is_empty());
    }

    #[test]
    fn field_defaults_apply() {
        let t = table(
            HEADERS,
            &[
                &["INC005", "", "not-a-number", ""],
                &["INC006"], // short row: only the number cell present
            ],
        );
        let tickets = extract(&t, "INC");
        assert_eq!(tickets[0].short_description, NO_DESCRIPTION);
        assert_eq!(tickets[0].reopen_count, 0);
        assert_eq!(tickets[0].assignee, "");
        assert_eq!(tickets[1].short_description, NO_DESCRIPTION);
    }

    #[test]
    fn header_match_is_case_insensitive_substring() {
        let t = table(
            &["  NUMBER  ", "SHORT DESCRIPTION text", "Reopen Count", "assigned to user"],
            &[&["INC001", "desc", "2", "Alice"]],
        );
        let tickets = extract(&t, "INC");
        assert_eq!(tickets[0].short_description, "desc");
        assert_eq!(tickets[0].reopen_count, 2);
        assert_eq!(tickets[0].assignee, "Alice");
    }

    #[test]
    fn first_occurrence_wins_on_duplicates() {
        let t = table(
            HEADERS,
            &[
                &["INC001", "first", "0", "Alice"],
                &["INC001", "second", "3", "Bob"],
            ],
        );
        let tickets = extract(&t, "INC");
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].short_description, "first");
        assert_eq!(tickets[0].assignee, "Alice");
    }
}
