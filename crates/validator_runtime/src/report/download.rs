//! Export requests: menu choices, request URLs, file naming, and the busy-button guard.

use std::rc::Rc;

use validator_host::{FormSurface, SelectOption};

use crate::config::ResultsConfig;

/// Syntax token of the PDF rendering of a report.
pub const PDF_SYNTAX: &str = "pdfType";

/// MIME type used when saving PDF exports.
pub const PDF_MIME_TYPE: &str = "application/octet-stream";

/// What is being exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadKind {
    /// The validated content.
    Content,
    /// The shapes used for validation.
    Shapes,
    /// The validation report.
    Report,
}

impl DownloadKind {
    /// Value of the `type` request parameter.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Content => "contentType",
            Self::Shapes => "shapesType",
            Self::Report => "reportType",
        }
    }

    /// Id of the button that opens this kind's export menu.
    pub const fn button_id(self) -> &'static str {
        match self {
            Self::Content => "downloadInputButton",
            Self::Shapes => "downloadShapesButton",
            Self::Report => "downloadReportButton",
        }
    }

    /// Id of the busy indicator next to the button.
    pub fn spinner_id(self) -> String {
        format!("{}Spinner", self.button_id())
    }

    /// Base name used when the server supplies no file name.
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Shapes => "shapes",
            Self::Report => "report",
        }
    }
}

/// Entry of an export menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadChoice {
    /// A selectable syntax.
    Syntax(SelectOption),
    /// Visual separator.
    Divider,
}

/// Builds the export menu for `kind`.
///
/// Report exports lead with PDF (and a divider) while the finding count stays within the
/// configured rendering limit.
pub fn download_choices(kind: DownloadKind, config: &ResultsConfig) -> Vec<DownloadChoice> {
    let syntaxes = match kind {
        DownloadKind::Report => &config.report_syntaxes,
        DownloadKind::Content | DownloadKind::Shapes => &config.content_syntaxes,
    };
    let mut choices = Vec::with_capacity(syntaxes.len() + 2);
    if kind == DownloadKind::Report && config.report_item_count <= config.report_item_detail_max
    {
        choices.push(DownloadChoice::Syntax(SelectOption::new(
            PDF_SYNTAX,
            config.labels.pdf.clone(),
        )));
        choices.push(DownloadChoice::Divider);
    }
    choices.extend(syntaxes.iter().cloned().map(DownloadChoice::Syntax));
    choices
}

/// One export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Report identifier.
    pub report_id: String,
    /// Content identifier when the content is stored separately.
    pub content_id: Option<String>,
    /// Exported artifact.
    pub kind: DownloadKind,
    /// Requested syntax (a MIME type or [`PDF_SYNTAX`]).
    pub syntax: String,
}

impl DownloadRequest {
    /// Page-relative request URL.
    pub fn url(&self) -> String {
        let mut url = format!(
            "report?id={}&type={}&syntax={}",
            encode_uri_component(&self.report_id),
            encode_uri_component(self.kind.token()),
            encode_uri_component(&self.syntax)
        );
        if let Some(content_id) = &self.content_id {
            url.push_str("&contentId=");
            url.push_str(&encode_uri_component(content_id));
        }
        url
    }

    /// MIME type of the saved file.
    pub fn mime_type(&self) -> &str {
        if self.syntax == PDF_SYNTAX {
            PDF_MIME_TYPE
        } else {
            &self.syntax
        }
    }

    /// `<kind>.<ext>` name used when the response names no file.
    pub fn fallback_file_name(&self) -> String {
        format!("{}.{}", self.kind.file_stem(), extension_for(&self.syntax))
    }
}

fn extension_for(syntax: &str) -> &str {
    match syntax {
        PDF_SYNTAX => "pdf",
        "text/turtle" => "ttl",
        "application/rdf+xml" => "rdf",
        "application/ld+json" => "jsonld",
        "application/n-triples" => "nt",
        "application/n-quads" => "nq",
        "application/trig" => "trig",
        "text/n3" => "n3",
        other => {
            let subtype = other.rsplit('/').next().unwrap_or(other);
            subtype.rsplit('+').next().unwrap_or(subtype)
        }
    }
}

/// File name carried by a `Content-Disposition` header value.
pub fn file_name_from_disposition(header: &str) -> Option<String> {
    let (_, rest) = header.split_once("filename=")?;
    let name = rest.split(';').next().unwrap_or(rest).trim().trim_matches('"');
    (!name.is_empty()).then(|| name.to_string())
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
pub fn encode_uri_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(char::from(byte)),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

/// Disables a download button and shows its spinner until dropped.
pub struct BusyControl {
    surface: Rc<dyn FormSurface>,
    kind: DownloadKind,
}

impl BusyControl {
    /// Marks the control of `kind` busy.
    pub fn engage(surface: Rc<dyn FormSurface>, kind: DownloadKind) -> Self {
        surface.set_disabled(kind.button_id(), true);
        surface.set_hidden(&kind.spinner_id(), false);
        Self { surface, kind }
    }
}

impl Drop for BusyControl {
    fn drop(&mut self) {
        self.surface.set_disabled(self.kind.button_id(), false);
        self.surface.set_hidden(&self.kind.spinner_id(), true);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use validator_host::MemoryFormSurface;

    use super::*;

    fn results(count: usize) -> ResultsConfig {
        ResultsConfig {
            report_item_count: count,
            report_item_detail_max: 10,
            report_syntaxes: vec![SelectOption::new("text/turtle", "Turtle")],
            content_syntaxes: vec![SelectOption::new("application/rdf+xml", "RDF/XML")],
            ..ResultsConfig::default()
        }
    }

    #[test]
    fn pdf_is_offered_only_within_the_detail_limit() {
        let small = download_choices(DownloadKind::Report, &results(5));
        assert_eq!(
            small,
            vec![
                DownloadChoice::Syntax(SelectOption::new(PDF_SYNTAX, "PDF")),
                DownloadChoice::Divider,
                DownloadChoice::Syntax(SelectOption::new("text/turtle", "Turtle")),
            ]
        );
        assert_eq!(download_choices(DownloadKind::Report, &results(10)).len(), 3);

        let large = download_choices(DownloadKind::Report, &results(20));
        assert!(!large.contains(&DownloadChoice::Divider));
        assert!(large
            .iter()
            .all(|choice| !matches!(choice, DownloadChoice::Syntax(o) if o.value == PDF_SYNTAX)));
    }

    #[test]
    fn content_exports_never_offer_pdf() {
        assert_eq!(
            download_choices(DownloadKind::Shapes, &results(0)),
            vec![DownloadChoice::Syntax(SelectOption::new(
                "application/rdf+xml",
                "RDF/XML"
            ))]
        );
    }

    #[test]
    fn request_url_encodes_parameters() {
        let mut request = DownloadRequest {
            report_id: "a b/c".to_string(),
            content_id: None,
            kind: DownloadKind::Report,
            syntax: "application/ld+json".to_string(),
        };
        assert_eq!(
            request.url(),
            "report?id=a%20b%2Fc&type=reportType&syntax=application%2Fld%2Bjson"
        );
        request.content_id = Some("c-1".to_string());
        assert!(request.url().ends_with("&contentId=c-1"));
        assert_eq!(encode_uri_component("é!*'()~"), "%C3%A9!*'()~");
    }

    #[test]
    fn file_names_and_mime_types() {
        assert_eq!(
            file_name_from_disposition("attachment; filename=report.ttl").as_deref(),
            Some("report.ttl")
        );
        assert_eq!(
            file_name_from_disposition("attachment; filename=\"report.pdf\"; size=10").as_deref(),
            Some("report.pdf")
        );
        assert_eq!(file_name_from_disposition("attachment"), None);

        let request = DownloadRequest {
            report_id: "r".to_string(),
            content_id: None,
            kind: DownloadKind::Report,
            syntax: PDF_SYNTAX.to_string(),
        };
        assert_eq!(request.mime_type(), PDF_MIME_TYPE);
        assert_eq!(request.fallback_file_name(), "report.pdf");

        let request = DownloadRequest {
            kind: DownloadKind::Content,
            syntax: "application/rdf+xml".to_string(),
            ..request
        };
        assert_eq!(request.mime_type(), "application/rdf+xml");
        assert_eq!(request.fallback_file_name(), "content.rdf");
        assert_eq!(extension_for("application/xml"), "xml");
        assert_eq!(extension_for("application/vnd.custom+json"), "json");
    }

    #[test]
    fn busy_control_restores_on_drop() {
        let kind = DownloadKind::Report;
        let spinner = kind.spinner_id();
        let surface =
            MemoryFormSurface::default().with_elements(&[kind.button_id(), spinner.as_str()]);
        surface.set_hidden(&spinner, true);
        {
            let _busy = BusyControl::engage(Rc::new(surface.clone()), kind);
            assert_eq!(surface.is_disabled(kind.button_id()), Some(true));
            assert_eq!(surface.is_hidden(&spinner), Some(false));
        }
        assert_eq!(surface.is_disabled(kind.button_id()), Some(false));
        assert_eq!(surface.is_hidden(&spinner), Some(true));
    }
}
