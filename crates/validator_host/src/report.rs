//! Shared report-item records scraped from the results page.

use serde::{Deserialize, Serialize};

/// Severity of a report finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

impl Severity {
    /// Stable lowercase token used in CSS class names.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Icon classes rendered in the inline marker.
    pub const fn icon_class(self) -> &'static str {
        match self {
            Self::Info => "fa fa-info-circle report-item-icon info-icon",
            Self::Warning => "fa fa-exclamation-triangle report-item-icon warning-icon",
            Self::Error => "fa fa-times-circle report-item-icon error-icon",
        }
    }
}

/// One report entry as rendered on the results page, before location parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItemRecord {
    /// Raw location text (for example `"Line 12:4"` or `"12:4"`).
    pub location: String,
    /// Message text.
    pub message: String,
    /// Severity derived from the item's markers.
    pub severity: Severity,
}
