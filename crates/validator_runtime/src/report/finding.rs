//! Report findings and their source locations.

use validator_host::{LineWidget, ReportItemRecord, Severity};

/// Class of the widget container rendered above an annotated line.
pub const WIDGET_CLASS: &str = "indicator-editor-widget";

/// One report entry anchored to a zero-based viewer line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFinding {
    /// Zero-based target line.
    pub line: usize,
    /// Severity.
    pub severity: Severity,
    /// Message shown in the marker.
    pub message: String,
}

impl ReportFinding {
    /// Parses the location of a scraped report item.
    pub fn from_record(record: &ReportItemRecord) -> Self {
        Self {
            line: parse_location_line(&record.location),
            severity: record.severity,
            message: record.message.trim().to_string(),
        }
    }

    /// Inline marker for this finding.
    pub fn widget(&self) -> LineWidget {
        LineWidget {
            class_name: format!("{WIDGET_CLASS} indicator-{}", self.severity.token()),
            icon_class: self.severity.icon_class().to_string(),
            text: self.message.clone(),
        }
    }
}

/// Zero-based line of a `"<label>:<line>"` position string.
///
/// The number after the first `:` is read like a leading integer (trailing text is
/// ignored) and made zero-based. Missing or unparseable numbers and results below zero
/// give line 0.
pub fn parse_location_line(position: &str) -> usize {
    position
        .trim()
        .split(':')
        .nth(1)
        .and_then(leading_integer)
        .map(|line| usize::try_from(line.saturating_sub(1)).unwrap_or(0))
        .unwrap_or(0)
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let unsigned = text.trim_start_matches(&['+', '-'][..]);
    let sign_len = text.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }
    let digits = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}
