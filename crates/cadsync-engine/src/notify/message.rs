//! Notification composition.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cadsync_core::diff::{render_human_summary, ChangeReport, SummaryOptions};
use std::path::Path;

/// Longest UTF-8 run per encoded word: 45 bytes give 60 base64 characters,
/// 72 with the `=?UTF-8?B?` and `?=` delimiters.
const ENCODED_WORD_BYTES: usize = 45;

/// A composed notification, independent of how it is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
}

impl Notification {
    pub fn with_recipients(mut self, recipients: &[String]) -> Self {
        self.recipients = recipients.to_vec();
        self
    }

    /// RFC 5322 text form for an outbox relay.
    ///
    /// Line breaks inside header values are flattened to spaces. Non-ASCII
    /// subjects and display names are written as RFC 2047 encoded words.
    pub fn to_eml(&self, sender: &str, date: chrono::DateTime<chrono::Local>) -> String {
        let recipients: Vec<String> = self.recipients.iter().map(|r| address_header(r)).collect();
        let mut out = String::new();
        out.push_str(&format!("From: {}\r\n", address_header(sender)));
        out.push_str(&format!("To: {}\r\n", recipients.join(", ")));
        out.push_str(&format!("Subject: {}\r\n", text_header(&self.subject)));
        out.push_str(&format!("Date: {}\r\n", date.to_rfc2822()));
        out.push_str("MIME-Version: 1.0\r\n");
        out.push_str("Content-Type: text/plain; charset=utf-8\r\n");
        out.push_str("Content-Transfer-Encoding: 8bit\r\n");
        out.push_str("\r\n");
        out.push_str(&self.body.replace('\n', "\r\n"));
        out
    }
}

fn flatten_line_breaks(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect()
}

/// Unstructured header text; non-ASCII becomes folded encoded words.
fn text_header(raw: &str) -> String {
    let flat = flatten_line_breaks(raw);
    if flat.is_ascii() {
        return flat;
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for c in flat.chars() {
        if chunk.len() + c.len_utf8() > ENCODED_WORD_BYTES {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }
    words.join("\r\n ")
}

/// Mailbox header (`addr` or `Name <addr>`); only the display name is encoded.
fn address_header(raw: &str) -> String {
    let flat = flatten_line_breaks(raw);
    match flat.rfind('<') {
        Some(start) if !flat[..start].trim().is_empty() && !flat[..start].is_ascii() => {
            format!(
                "{} {}",
                text_header(flat[..start].trim()),
                flat[start..].trim()
            )
        }
        _ => flat.trim().to_string(),
    }
}

fn encoded_word(text: &str) -> String {
    format!("=?UTF-8?B?{}?=", STANDARD.encode(text.as_bytes()))
}

fn log_pointer(log_path: Option<&Path>) -> String {
    match log_path {
        Some(path) => format!("To see the full log file, please open: {}", path.display()),
        None => "No log file was written for this run.".to_string(),
    }
}

/// Notification for a run that found changes.
///
/// Subject is `Update in {table} - changes detected`; the body carries the
/// counts, the Markdown summary (limited to `detail_limit` feature lines),
/// the export location and a pointer to the run log.
pub fn compose_notification(
    table: &str,
    report: &ChangeReport,
    export_path: &Path,
    log_path: Option<&Path>,
    detail_limit: usize,
) -> Notification {
    let summary = render_human_summary(
        report,
        &SummaryOptions {
            table: Some(table.to_string()),
            detail_limit,
        },
    );

    let mut body = String::new();
    body.push_str(&format!(
        "Changes were detected in {}: {} new, {} removed, {} with attribute changes, {} with geometry changes.\n\n",
        table,
        report.added_keys.len(),
        report.removed_keys.len(),
        report.attribute_changes.len(),
        report.geometry_changes.len()
    ));
    body.push_str(&summary);
    body.push_str(&format!("\nUpdated export: {}\n\n", export_path.display()));
    body.push_str(&log_pointer(log_path));
    body.push('\n');

    Notification {
        subject: format!("Update in {} - changes detected", table),
        body,
        recipients: Vec::new(),
    }
}

/// Notification for the first export of a table.
pub fn compose_creation_notification(
    table: &str,
    record_count: usize,
    export_path: &Path,
    log_path: Option<&Path>,
) -> Notification {
    let body = format!(
        "A new export of {} was created with {} records: {}\n\n{}\n",
        table,
        record_count,
        export_path.display(),
        log_pointer(log_path)
    );
    Notification {
        subject: format!("Update in {} - new export created", table),
        body,
        recipients: Vec::new(),
    }
}

/// Notification for a run whose previous export could not be used.
///
/// Without a usable baseline no change report exists; the current extract
/// was exported in full and the body names why.
pub fn compose_replacement_notification(
    table: &str,
    reason: &str,
    record_count: usize,
    export_path: &Path,
    log_path: Option<&Path>,
) -> Notification {
    let body = format!(
        "The previous export of {} could not be read: {}\n\n\
         A full export with {} records replaced it: {}\n\n{}\n",
        table,
        reason,
        record_count,
        export_path.display(),
        log_pointer(log_path)
    );
    Notification {
        subject: format!("Update in {} - changes detected", table),
        body,
        recipients: Vec::new(),
    }
}
