//! CSV rendering of result rows.
//!
//! RFC 4180: CRLF line endings, fields quoted only when they contain a
//! comma, quote or line break, embedded quotes doubled.

use crate::models::ResultRow;
use crate::utils::time::{Timestamp, format_timestamp};

/// UTF-8 byte order mark, for spreadsheet applications.
pub const UTF8_BOM: &str = "\u{feff}";

pub const HEADER: [&str; 11] = [
    "title",
    "handle",
    "channel_url",
    "handle_url",
    "subscribers",
    "latest_video_published_at",
    "video_count",
    "channel_id",
    "channel_started_at",
    "description",
    "resolved_via",
];

/// Columns shown in the console listing.
const TABLE_COLUMNS: usize = 7;

/// Render rows, header first.
pub fn render(rows: &[ResultRow], with_bom: bool) -> String {
    let mut out = String::new();
    if with_bom {
        out.push_str(UTF8_BOM);
    }

    write_record(&mut out, HEADER.iter().copied());
    for row in rows {
        let fields = record(row);
        write_record(&mut out, fields.iter().map(String::as_str));
    }
    out
}

/// Console listing: the leading export columns, one line per row.
///
/// Not quoted. Commas inside titles become full-width commas so each line
/// still splits into the same columns.
pub fn render_table(rows: &[ResultRow]) -> String {
    let mut out = HEADER[..TABLE_COLUMNS].join(",");
    out.push('\n');
    for row in rows {
        let mut fields = record(row);
        fields[0] = fields[0].replace(',', "，");
        out.push_str(&fields[..TABLE_COLUMNS].join(","));
        out.push('\n');
    }
    out
}

fn record(row: &ResultRow) -> [String; 11] {
    let optional = |value: Option<u64>| value.map(|v| v.to_string()).unwrap_or_default();
    let timestamp = |at: Option<&Timestamp>| at.map(format_timestamp).unwrap_or_default();

    [
        row.title.clone(),
        row.handle.clone(),
        row.channel_url.clone(),
        row.handle_url.clone(),
        optional(row.subscribers),
        timestamp(row.latest_video_published_at.as_ref()),
        optional(row.video_count),
        row.channel_id.to_string(),
        timestamp(row.channel_started_at.as_ref()),
        row.description.clone(),
        row.resolved_via.as_str().to_string(),
    ]
}

fn write_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
