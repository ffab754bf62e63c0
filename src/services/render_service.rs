//! Display fragments for each region.
//!
//! Everything here is a pure function of its input: the same records always
//! render to the same bytes, so re-rendering a region never accumulates rows.

use chrono::{DateTime, NaiveDateTime};

use crate::api::NetworkFailure;
use crate::models::{
    ClassTally, Connectivity, MessageClass, PageWindow, PaginationState, StatusSnapshot,
    TransactionRecord,
};
use crate::services::decoder::{
    classify_response, decode_amount, decode_taxonomy, describe_response_code,
};
use crate::utils::table::{Align, Table};

const NO_MTI: &str = "----";
const NO_ID: &str = "---";
const NO_TERMINAL: &str = "--------";
const NO_CODE: &str = "------";
const NO_REFERENCE: &str = "------------";
const NO_RESPONSE: &str = "--";

const TALLY_BAR_WIDTH: usize = 20;

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parse the timestamp formats the processor emits
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Display a timestamp; unparseable values are shown verbatim
pub fn format_timestamp(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => "Unknown".to_string(),
        Some(raw) => parse_timestamp(raw)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| raw.to_string()),
    }
}

/// "{d}d {h}h {m}m {s}s" since `start`
pub fn format_uptime(start: Option<&str>, now: NaiveDateTime) -> String {
    let Some(start) = start.and_then(parse_timestamp) else {
        return "N/A".to_string();
    };

    let secs = (now - start).num_seconds().max(0);
    format!(
        "{}d {}h {}m {}s",
        secs / 86_400,
        (secs / 3_600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

pub fn render_badge(connectivity: Connectivity) -> String {
    format!("[ {} ]\n", connectivity.label())
}

/// System status panel
pub fn render_status(snapshot: &StatusSnapshot, now: NaiveDateTime) -> String {
    let connectivity = Connectivity::from(snapshot.status);
    let mut out = String::new();

    out.push_str(&format!(
        "Status:                 {} {}",
        snapshot.status.as_str(),
        render_badge(connectivity)
    ));
    out.push_str(&format!(
        "Start Time:             {}\n",
        format_timestamp(snapshot.start_time.as_deref())
    ));
    out.push_str(&format!(
        "Uptime:                 {}\n",
        format_uptime(snapshot.start_time.as_deref(), now)
    ));
    out.push_str(&format!(
        "Last Updated:           {}\n",
        format_timestamp(snapshot.last_updated.as_deref())
    ));
    out.push_str(&format!(
        "Transactions Processed: {}\n",
        snapshot.transactions_processed
    ));

    if let Some(error) = &snapshot.error {
        out.push_str(&format!("Processor Error:        {}\n", error));
    }

    out
}

fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(placeholder)
}

/// Transaction table, or the empty indication when there is nothing to show
pub fn render_transactions(records: &[TransactionRecord]) -> String {
    if records.is_empty() {
        return "No transactions found\n".to_string();
    }

    let mut table = Table::new(vec![
        "Type",
        "MTI",
        "Transaction ID",
        "Time",
        "Amount",
        "Terminal ID",
        "Status",
    ])
    .align(4, Align::Right);

    for record in records {
        let taxonomy = decode_taxonomy(record.mti.as_deref());
        let status = classify_response(record.response_code.as_deref());

        table.add_row(vec![
            taxonomy.class.tag().to_string(),
            or_placeholder(record.mti.as_deref(), NO_MTI).to_string(),
            or_placeholder(record.id.as_deref(), NO_ID).to_string(),
            format_timestamp(record.transmission_datetime.as_deref()),
            decode_amount(record.amount.as_deref()).to_string(),
            or_placeholder(record.terminal_id.as_deref(), NO_TERMINAL).to_string(),
            status.label(),
        ]);
    }

    table.render()
}

/// Page links with the current page bracketed and disabled edges in parentheses
pub fn render_pagination(window: &PageWindow, state: &PaginationState) -> String {
    let mut parts = Vec::with_capacity(window.pages.len() + 2);

    parts.push(if window.prev_enabled { "«".to_string() } else { "(«)".to_string() });
    for &page in &window.pages {
        if page == window.current_page {
            parts.push(format!("[{}]", page));
        } else {
            parts.push(page.to_string());
        }
    }
    parts.push(if window.next_enabled { "»".to_string() } else { "(»)".to_string() });

    format!(
        "{}   page {} of {}, {} per page\n",
        parts.join(" "),
        state.current_page,
        state.total_pages,
        state.page_size
    )
}

/// Full detail panel for one transaction, raw wire message included verbatim
pub fn render_detail(record: &TransactionRecord) -> String {
    let taxonomy = decode_taxonomy(record.mti.as_deref());
    let status = classify_response(record.response_code.as_deref());
    let response_code = or_placeholder(record.response_code.as_deref(), NO_RESPONSE);

    let mut out = format!(
        "{} Transaction [{}] ({})\n",
        taxonomy.class.label(),
        or_placeholder(record.mti.as_deref(), NO_MTI),
        taxonomy.direction.label()
    );
    out.push_str(&format!("Transaction ID: {}\n", or_placeholder(record.id.as_deref(), NO_ID)));
    out.push_str(&format!(
        "Time:           {}\n\n",
        format_timestamp(record.transmission_datetime.as_deref())
    ));

    let mut response = format!("{} {}", response_code, status.label());
    if let Some(description) = describe_response_code(record.response_code.as_deref()) {
        response.push_str(&format!(" ({})", description));
    }

    let mut details = Table::new(vec!["Transaction Details", ""]);
    details.add_row(vec![
        "Amount".into(),
        decode_amount(record.amount.as_deref()).to_string(),
    ]);
    details.add_row(vec![
        "Processing Code".into(),
        or_placeholder(record.processing_code.as_deref(), NO_CODE).into(),
    ]);
    details.add_row(vec!["Response Code".into(), response]);
    details.add_row(vec!["STAN".into(), or_placeholder(record.stan.as_deref(), NO_CODE).into()]);
    details.add_row(vec!["RRN".into(), or_placeholder(record.rrn.as_deref(), NO_REFERENCE).into()]);
    out.push_str(&details.render());
    out.push('\n');

    let mut terminal = Table::new(vec!["Terminal Information", ""]);
    terminal.add_row(vec![
        "Terminal ID".into(),
        or_placeholder(record.terminal_id.as_deref(), NO_TERMINAL).into(),
    ]);
    terminal.add_row(vec![
        "Merchant ID".into(),
        or_placeholder(record.merchant_id.as_deref(), NO_REFERENCE).into(),
    ]);
    terminal.add_row(vec![
        "Direction".into(),
        or_placeholder(record.direction.as_deref(), NO_CODE).into(),
    ]);
    terminal.add_row(vec![
        "Timestamp".into(),
        format_timestamp(record.timestamp.as_deref()),
    ]);
    terminal.add_row(vec![
        "Access Count".into(),
        record.access_count.unwrap_or(0).to_string(),
    ]);
    out.push_str(&terminal.render());
    out.push('\n');

    out.push_str("Raw Message\n");
    match record.raw_message.as_deref().filter(|m| !m.is_empty()) {
        Some(raw) => out.push_str(raw),
        None => out.push_str("No raw message available"),
    }
    out.push('\n');

    out
}

/// Message class breakdown of a transaction sample
pub fn render_class_tally(tally: &ClassTally) -> String {
    let primary = [
        MessageClass::Authorization,
        MessageClass::Financial,
        MessageClass::Reversal,
        MessageClass::NetworkManagement,
    ];
    let other = tally.total() - primary.iter().map(|c| tally.count(*c)).sum::<u64>();

    let mut rows: Vec<(&str, u64, f64)> = primary
        .iter()
        .map(|c| (c.label(), tally.count(*c), tally.percent(*c)))
        .collect();
    let other_percent = if tally.total() == 0 {
        0.0
    } else {
        other as f64 * 100.0 / tally.total() as f64
    };
    rows.push(("Other", other, other_percent));

    let mut out = format!("Transaction Metrics ({} sampled)\n", tally.total());
    for (label, count, percent) in rows {
        let filled = ((percent / 100.0) * TALLY_BAR_WIDTH as f64).round() as usize;
        out.push_str(&format!(
            "{:<20} {:>6}  [{}{}] {:>5.1}%\n",
            label,
            count,
            "#".repeat(filled),
            ".".repeat(TALLY_BAR_WIDTH - filled.min(TALLY_BAR_WIDTH)),
            percent
        ));
    }
    out
}

/// Inline error shown in place of a region's content
pub fn render_error(what: &str, failure: &NetworkFailure) -> String {
    format!("! Failed to load {}: {}\n", what, failure)
}
