//! Reads the report items rendered on the results page.

use serde::Deserialize;
use validator_host::{ReportItemRecord, Severity};

use crate::bridge;

#[derive(Debug, Deserialize)]
struct RawReportItem {
    location: String,
    message: String,
    error: bool,
    warning: bool,
}

impl From<RawReportItem> for ReportItemRecord {
    fn from(raw: RawReportItem) -> Self {
        let severity = if raw.error {
            Severity::Error
        } else if raw.warning {
            Severity::Warning
        } else {
            Severity::Info
        };
        Self {
            location: raw.location,
            message: raw.message,
            severity,
        }
    }
}

fn parse_items(raw: &str) -> Result<Vec<ReportItemRecord>, String> {
    let items: Vec<RawReportItem> = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    Ok(items.into_iter().map(ReportItemRecord::from).collect())
}

/// Collects every `.item-info` entry of the page, in document order.
///
/// # Errors
///
/// Fails outside the browser or when the page glue returns malformed data.
pub fn scrape_report_items() -> Result<Vec<ReportItemRecord>, String> {
    parse_items(&bridge::scrape_report_items()?)
}

/// Calls `on_click` with the index of a report item whenever it is clicked.
pub fn on_report_item_click(mut on_click: impl FnMut(usize) + 'static) {
    bridge::watch_report_items(Box::new(move |index: u32| {
        on_click(usize::try_from(index).unwrap_or(usize::MAX));
    }));
}
