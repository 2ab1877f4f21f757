//! Common utilities for document rendering.
//!
//! Shared helpers for escaping, date formatting, filenames and the page
//! fragments every printable document starts with.

use chrono::{DateTime, FixedOffset, Utc};

use super::Letterhead;

/// Printed when a bill has no exam start time.
pub const DATE_NOT_SPECIFIED: &str = "Not specified";

/// Escape text for interpolation into HTML element content or attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Format an exam timestamp as `dd Month yyyy, hh:mm AM` in the given offset.
pub fn format_exam_date(time: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    match time {
        Some(t) => t
            .with_timezone(&offset)
            .format("%d %B %Y, %I:%M %p")
            .to_string(),
        None => DATE_NOT_SPECIFIED.to_string(),
    }
}

/// Amounts print without a trailing `.0` for whole values (`1850`, `12.5`).
pub fn format_amount(value: f64) -> String {
    format!("{}", value)
}

/// Sanitize a string for use in filenames. Runs of anything other than
/// ASCII letters, digits, `-` and `.` collapse to a single `_`; case is kept.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_sep = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '.' {
            result.push(ch);
            last_sep = false;
        } else if !last_sep && !result.is_empty() {
            result.push('_');
            last_sep = true;
        }
    }

    let result = result.trim_matches('_');
    if result.is_empty() {
        return fallback.to_string();
    }
    result.to_string()
}

pub(super) const BASE_STYLE: &str = r#"body { font-family: "Times New Roman", serif; margin: 20px; line-height: 1.5; }
h2, h3 { text-align: center; margin: 10px 0; }
h3 { text-decoration: underline; margin-top: 20px; }
table { width: 100%; border-collapse: collapse; margin-top: 15px; }
table, th, td { border: 1px solid black; }
th, td { padding: 8px; text-align: center; font-size: 14px; }
th { background-color: #f2f2f2; }
.header { text-align: center; margin-bottom: 20px; border-bottom: 2px solid #000; padding-bottom: 15px; }
.header img { height: 80px; display: block; margin: 0 auto 10px; }
.society { font-size: 18px; font-weight: bold; margin-bottom: 5px; }
.college { font-size: 16px; font-weight: bold; margin: 3px 0; }
.college-address { font-size: 14px; margin-top: 3px; }
.signature { margin-top: 50px; display: flex; justify-content: space-between; }
.signature div { text-align: center; width: 30%; border-top: 1px solid black; padding-top: 5px; }
.info-section { margin: 15px 0; }
.info-section p { margin: 8px 0; }
.total-row { font-weight: bold; }
.amount-section { margin-top: 20px; padding: 10px; border: 1px solid #000; }
"#;

pub(super) const BANK_FORM_STYLE: &str = r#".bank-form h1 { text-align: center; text-decoration: underline; margin-bottom: 40px; font-size: 22px; font-weight: bold; letter-spacing: 2px; }
.form-row { display: flex; align-items: center; margin-bottom: 25px; min-height: 30px; page-break-inside: avoid; }
.form-row .label { font-size: 16px; min-width: 200px; flex-shrink: 0; }
.form-row .line { flex: 1; border-bottom: 1px solid black; height: 1px; margin-left: 10px; }
.signature-row { margin-top: 50px; display: flex; align-items: flex-end; }
.signature-row .signature-line { width: 300px; border-bottom: 1px solid black; height: 40px; margin-left: 10px; }
"#;

/// `<html><head>` with the given stylesheets, up to and including `<body>`.
pub(super) fn open_page(out: &mut String, title: &str, styles: &[&str]) {
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    out.push_str(&format!("<title>{}</title>\n<style>\n", escape_html(title)));
    for style in styles {
        out.push_str(style);
    }
    out.push_str("</style>\n</head>\n<body>\n");
}

pub(super) fn close_page(out: &mut String) {
    out.push_str("</body>\n</html>\n");
}

pub(super) fn push_letterhead(out: &mut String, letterhead: &Letterhead) {
    out.push_str("<div class=\"header\">\n");
    out.push_str(&format!(
        "<div class=\"society\">{}</div>\n",
        escape_html(&letterhead.society)
    ));
    out.push_str(&format!(
        "<img src=\"{}\" alt=\"College Logo\" />\n",
        escape_html(&letterhead.logo_url)
    ));
    out.push_str(&format!(
        "<div class=\"college\">{}</div>\n",
        escape_html(&letterhead.college)
    ));
    out.push_str(&format!(
        "<div class=\"college-address\">{}</div>\n",
        escape_html(&letterhead.address)
    ));
    out.push_str("</div>\n");
}

pub(super) fn push_signatures(out: &mut String, roles: &[&str]) {
    out.push_str("<div class=\"signature\">\n");
    for role in roles {
        out.push_str(&format!("<div>{}</div>\n", role));
    }
    out.push_str("</div>\n");
}
