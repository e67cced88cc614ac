//! Results page: single-use content loading, the annotated source view, exports, and
//! unload cleanup.

pub mod download;
pub mod finding;

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use futures::future::join;
use leptos::logging;
use thiserror::Error;
use validator_host::{
    AlertBanner, CodeViewer, CodeViewerFactory, FileSaver, FormSurface, HostServices,
    HttpTransport, LineLayer, ReleaseBeacon, TextMark, TextPosition,
};

use crate::{
    config::ResultsConfig,
    events::{FormEvents, ResultsLoaded},
    session::SessionState,
};

pub use download::{
    download_choices, encode_uri_component, file_name_from_disposition, BusyControl,
    DownloadChoice, DownloadKind, DownloadRequest, PDF_MIME_TYPE, PDF_SYNTAX,
};
pub use finding::{parse_location_line, ReportFinding};

/// Button that opens the source view; enabled once the content is in memory.
pub const VIEW_INPUT_BUTTON: &str = "viewInputButton";
/// Wrapper of the shapes export menu.
pub const SHAPES_DOWNLOAD_DIV: &str = "downloadShapesButtonDiv";
/// Container the source viewer is mounted in.
pub const SOURCE_PANE: &str = "xml-content-pane";
/// Modal wrapping the source viewer.
pub const SOURCE_MODAL: &str = "xml-content-modal";
/// Background class of every annotated line.
pub const ANNOTATED_LINE_CLASS: &str = "indicator-line-widget";
/// Background class of the focused line.
pub const SELECTED_LINE_CLASS: &str = "selected-editor-line";
/// Text class of the focused line.
pub const SELECTED_TEXT_CLASS: &str = "selected-editor-line-text";

const SCROLL_MARGIN: f64 = 5.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures of annotator operations.
pub enum AnnotatorError {
    /// No report id is known yet.
    #[error("no report is loaded")]
    NoActiveReport,
    /// The content was already fetched; its resource no longer exists.
    #[error("validated content was already loaded")]
    ContentAlreadyLoaded,
    /// A content fetch is in progress.
    #[error("validated content is still loading")]
    ContentLoadInFlight,
    /// The content has not been fetched.
    #[error("validated content is not available")]
    ContentNotLoaded,
    /// No viewer has been rendered.
    #[error("the source view has not been rendered")]
    ViewerNotRendered,
    /// The request produced no response.
    #[error("request failed: {0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("`{url}` answered with status {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Response status.
        status: u16,
    },
    /// The viewer could not be created.
    #[error("source viewer failed: {0}")]
    Viewer(String),
    /// The browser refused to save the file.
    #[error("saving the download failed: {0}")]
    Save(String),
}

/// Lifecycle of the single-use content fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentLoad {
    /// Not fetched yet.
    #[default]
    NotRequested,
    /// Fetch in progress.
    Loading,
    /// Fetched; this is the only copy.
    Loaded(String),
    /// The last fetch failed; a new attempt is allowed.
    Failed,
}

struct Selection {
    line: usize,
    mark: TextMark,
}

#[derive(Default)]
struct AnnotatorState {
    content: ContentLoad,
    serialized_reports: BTreeMap<String, String>,
    viewer: Option<Box<dyn CodeViewer>>,
    selection: Option<Selection>,
    pending_views: Vec<PendingView>,
}

type PendingView = Box<dyn FnOnce(&ReportAnnotator)>;

/// Host services the annotator talks to.
#[derive(Clone)]
pub struct AnnotatorServices {
    /// HTTP requests.
    pub transport: Rc<dyn HttpTransport>,
    /// Source viewer construction.
    pub viewers: Rc<dyn CodeViewerFactory>,
    /// Buttons and wrappers by id.
    pub surface: Rc<dyn FormSurface>,
    /// The page banner.
    pub banner: Rc<dyn AlertBanner>,
    /// Browser downloads.
    pub saver: Rc<dyn FileSaver>,
    /// Unload notification.
    pub beacon: Rc<dyn ReleaseBeacon>,
}

impl From<&HostServices> for AnnotatorServices {
    fn from(host: &HostServices) -> Self {
        Self {
            transport: Rc::clone(&host.transport),
            viewers: Rc::clone(&host.viewers),
            surface: Rc::clone(&host.surface),
            banner: Rc::clone(&host.banner),
            saver: Rc::clone(&host.saver),
            beacon: Rc::clone(&host.beacon),
        }
    }
}

/// Correlates report findings with the validated content.
///
/// Clones share state, so a clone can be moved into each event handler.
#[derive(Clone)]
pub struct ReportAnnotator {
    config: Rc<ResultsConfig>,
    session: SessionState,
    events: FormEvents,
    services: AnnotatorServices,
    state: Rc<RefCell<AnnotatorState>>,
}

impl ReportAnnotator {
    /// Creates an annotator for one results page.
    pub fn new(
        config: ResultsConfig,
        session: SessionState,
        events: FormEvents,
        services: AnnotatorServices,
    ) -> Self {
        Self {
            config: Rc::new(config),
            session,
            events,
            services,
            state: Rc::new(RefCell::new(AnnotatorState::default())),
        }
    }

    /// Results page configuration.
    pub fn config(&self) -> &ResultsConfig {
        &self.config
    }

    /// Records the report ids, registers the unload release, and announces the results.
    pub fn on_results_loaded(&self, report_id: &str, content_id: Option<String>) {
        self.session.set_report(report_id, content_id.clone());
        self.services
            .beacon
            .release_on_unload(&format!("delete/{report_id}"));
        if self.config.hide_download_shapes {
            self.services.surface.set_hidden(SHAPES_DOWNLOAD_DIV, true);
        }
        logging::log!("validation report {report_id} loaded");
        self.events.results_loaded.publish(&ResultsLoaded {
            report_id: report_id.to_string(),
            content_id,
        });
    }

    /// State of the content fetch.
    pub fn content_load(&self) -> ContentLoad {
        self.state.borrow().content.clone()
    }

    /// Fetches the validated content once.
    ///
    /// The server deletes the resource when it is read, so a second request is never made
    /// after success; after a failure the fetch may be retried.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotatorError::ContentAlreadyLoaded`] or
    /// [`AnnotatorError::ContentLoadInFlight`] without issuing a request, or the request
    /// failure (also shown in the banner).
    pub async fn load_original_content(&self) -> Result<(), AnnotatorError> {
        let url = self.content_url()?;
        {
            let mut state = self.state.borrow_mut();
            match state.content {
                ContentLoad::Loading => return Err(AnnotatorError::ContentLoadInFlight),
                ContentLoad::Loaded(_) => return Err(AnnotatorError::ContentAlreadyLoaded),
                ContentLoad::NotRequested | ContentLoad::Failed => {
                    state.content = ContentLoad::Loading;
                }
            }
        }

        match self.fetch_text(&url).await {
            Ok(content) => {
                let pending = {
                    let mut state = self.state.borrow_mut();
                    state.content = ContentLoad::Loaded(content);
                    std::mem::take(&mut state.pending_views)
                };
                self.services.surface.set_disabled(VIEW_INPUT_BUTTON, false);
                for view in pending {
                    view(self);
                }
                Ok(())
            }
            Err(err) => {
                {
                    let mut state = self.state.borrow_mut();
                    state.content = ContentLoad::Failed;
                    state.pending_views.clear();
                }
                logging::warn!("validated content load failed: {err}");
                self.services
                    .banner
                    .show_error(&self.config.labels.content_error);
                Err(err)
            }
        }
    }

    /// Runs `view` once the content is in memory: right away when it already is, otherwise
    /// after the next successful load. Requests queued before a failed load are dropped.
    pub fn when_content_loaded(&self, view: impl FnOnce(&ReportAnnotator) + 'static) {
        let loaded = matches!(self.state.borrow().content, ContentLoad::Loaded(_));
        if loaded {
            view(self);
        } else {
            self.state.borrow_mut().pending_views.push(Box::new(view));
        }
    }

    /// Loads the content and the report serialized as `format` side by side.
    ///
    /// Content that is already in memory counts as loaded.
    ///
    /// # Errors
    ///
    /// Returns the first failure of either request.
    pub async fn prefetch(&self, format: &str) -> Result<(), AnnotatorError> {
        let report_id = self
            .session
            .report_id()
            .ok_or(AnnotatorError::NoActiveReport)?;
        let report_url = format!("report/{report_id}/{format}");
        let (content, report) = join(
            self.load_original_content(),
            self.fetch_text(&report_url),
        )
        .await;
        let report = match report {
            Ok(body) => {
                self.state
                    .borrow_mut()
                    .serialized_reports
                    .insert(format.to_string(), body);
                Ok(())
            }
            Err(err) => {
                logging::warn!("serialized report load failed: {err}");
                self.services
                    .banner
                    .show_error(&self.config.labels.report_error);
                Err(err)
            }
        };
        match content {
            Ok(()) | Err(AnnotatorError::ContentAlreadyLoaded) => report,
            Err(err) => Err(err),
        }
    }

    /// Report serialization cached by [`ReportAnnotator::prefetch`].
    pub fn serialized_report(&self, format: &str) -> Option<String> {
        self.state.borrow().serialized_reports.get(format).cloned()
    }

    /// Mounts the source viewer in `container_id` and anchors one marker per finding.
    ///
    /// Markers follow `findings` order; findings on the same line stack.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotatorError::ContentNotLoaded`] before the content is in memory and
    /// [`AnnotatorError::Viewer`] when the viewer cannot be created.
    pub fn render_annotated_view(
        &self,
        container_id: &str,
        findings: &[ReportFinding],
    ) -> Result<(), AnnotatorError> {
        let mut state = self.state.borrow_mut();
        let ContentLoad::Loaded(content) = &state.content else {
            return Err(AnnotatorError::ContentNotLoaded);
        };
        let viewer = self
            .services
            .viewers
            .open(container_id, content, &self.config.viewer_mode)
            .map_err(AnnotatorError::Viewer)?;
        for finding in findings {
            viewer.add_line_widget(finding.line, &finding.widget());
            viewer.add_line_class(finding.line, LineLayer::Background, ANNOTATED_LINE_CLASS);
        }
        state.viewer = Some(viewer);
        state.selection = None;
        Ok(())
    }

    /// Highlights the line of `finding` and centres it in the viewport.
    ///
    /// The previously focused line loses its highlight first, so at most one line is
    /// selected.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotatorError::ViewerNotRendered`] before
    /// [`ReportAnnotator::render_annotated_view`].
    pub fn focus_finding(&self, finding: &ReportFinding) -> Result<(), AnnotatorError> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let viewer = state
            .viewer
            .as_ref()
            .ok_or(AnnotatorError::ViewerNotRendered)?;
        if let Some(previous) = state.selection.take() {
            viewer.remove_line_class(previous.line, LineLayer::Background, SELECTED_LINE_CLASS);
            viewer.clear_mark(previous.mark);
        }

        viewer.refresh();
        let line = finding.line;
        viewer.add_line_class(line, LineLayer::Background, SELECTED_LINE_CLASS);
        let mark = viewer.mark_text(
            TextPosition { line, ch: 0 },
            TextPosition {
                line: line + 1,
                ch: 0,
            },
            SELECTED_TEXT_CLASS,
        );
        let top = viewer.line_top(line);
        viewer.scroll_to_y((top - viewer.viewport_height() / 2.0 - SCROLL_MARGIN).max(0.0));
        state.selection = Some(Selection { line, mark });
        Ok(())
    }

    /// Export menu for `kind`.
    pub fn download_choices(&self, kind: DownloadKind) -> Vec<DownloadChoice> {
        download_choices(kind, &self.config)
    }

    /// Requests an export and saves it under the server-supplied file name.
    ///
    /// The triggering button is disabled and its spinner shown until the request settles,
    /// whatever the outcome. Failures replace the banner with the download error.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotatorError::NoActiveReport`] before results are loaded, or the request
    /// or save failure.
    pub async fn request_download(
        &self,
        kind: DownloadKind,
        syntax: &str,
    ) -> Result<(), AnnotatorError> {
        let report_id = self
            .session
            .report_id()
            .ok_or(AnnotatorError::NoActiveReport)?;
        let request = DownloadRequest {
            report_id,
            content_id: self.session.content_id(),
            kind,
            syntax: syntax.to_string(),
        };
        let _busy = BusyControl::engage(Rc::clone(&self.services.surface), kind);
        let outcome = self.fetch_download(&request).await;
        if let Err(err) = &outcome {
            logging::warn!("{} download failed: {err}", kind.token());
            self.services
                .banner
                .show_error(&self.config.labels.download_error);
        }
        outcome
    }

    async fn fetch_download(&self, request: &DownloadRequest) -> Result<(), AnnotatorError> {
        let url = request.url();
        let response = self
            .services
            .transport
            .get(&url)
            .await
            .map_err(AnnotatorError::Transport)?;
        if !response.is_success() {
            return Err(AnnotatorError::HttpStatus {
                url,
                status: response.status,
            });
        }
        self.services.banner.clear();
        let file_name = response
            .content_disposition
            .as_deref()
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| request.fallback_file_name());
        self.services
            .saver
            .save(&response.body, &file_name, request.mime_type())
            .map_err(AnnotatorError::Save)
    }

    fn content_url(&self) -> Result<String, AnnotatorError> {
        let id = self
            .session
            .content_id()
            .or_else(|| self.session.report_id())
            .ok_or(AnnotatorError::NoActiveReport)?;
        Ok(format!("{}/{id}", self.config.content_path))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, AnnotatorError> {
        let response = self
            .services
            .transport
            .get(url)
            .await
            .map_err(AnnotatorError::Transport)?;
        if response.is_success() {
            Ok(response.text())
        } else {
            Err(AnnotatorError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use validator_host::{
        HttpResponse, MemoryAlertBanner, MemoryCodeViewer, MemoryCodeViewerFactory,
        MemoryFileSaver, MemoryFormSurface, MemoryHttpTransport, MemoryReleaseBeacon,
        SavedFile, SelectOption, Severity,
    };

    use super::*;

    struct Page {
        annotator: ReportAnnotator,
        transport: MemoryHttpTransport,
        viewers: MemoryCodeViewerFactory,
        surface: MemoryFormSurface,
        banner: MemoryAlertBanner,
        saver: MemoryFileSaver,
        beacon: MemoryReleaseBeacon,
        events: FormEvents,
    }

    fn page(config: ResultsConfig) -> Page {
        let transport = MemoryHttpTransport::default();
        let viewers = MemoryCodeViewerFactory::new(MemoryCodeViewer::new(20.0, 300.0));
        let surface = MemoryFormSurface::default().with_elements(&[
            VIEW_INPUT_BUTTON,
            SHAPES_DOWNLOAD_DIV,
            "downloadReportButton",
            "downloadReportButtonSpinner",
        ]);
        surface.set_disabled(VIEW_INPUT_BUTTON, true);
        let banner = MemoryAlertBanner::default();
        let saver = MemoryFileSaver::default();
        let beacon = MemoryReleaseBeacon::default();
        let events = FormEvents::default();
        let annotator = ReportAnnotator::new(
            config,
            SessionState::default(),
            events.clone(),
            AnnotatorServices {
                transport: Rc::new(transport.clone()),
                viewers: Rc::new(viewers.clone()),
                surface: Rc::new(surface.clone()),
                banner: Rc::new(banner.clone()),
                saver: Rc::new(saver.clone()),
                beacon: Rc::new(beacon.clone()),
            },
        );
        Page {
            annotator,
            transport,
            viewers,
            surface,
            banner,
            saver,
            beacon,
            events,
        }
    }

    fn finding(line: usize, severity: Severity, message: &str) -> ReportFinding {
        ReportFinding {
            line,
            severity,
            message: message.to_string(),
        }
    }

    #[test]
    fn results_loaded_registers_release_and_publishes() {
        let page = page(ResultsConfig {
            hide_download_shapes: true,
            ..ResultsConfig::default()
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = page
            .events
            .results_loaded
            .subscribe(move |loaded| sink.borrow_mut().push(loaded.clone()));

        page.annotator
            .on_results_loaded("r-42", Some("c-7".to_string()));

        assert_eq!(page.beacon.registered(), vec!["delete/r-42"]);
        assert_eq!(page.surface.is_hidden(SHAPES_DOWNLOAD_DIV), Some(true));
        assert_eq!(
            *seen.borrow(),
            vec![ResultsLoaded {
                report_id: "r-42".to_string(),
                content_id: Some("c-7".to_string()),
            }]
        );
    }

    #[test]
    fn content_is_fetched_exactly_once() {
        let page = page(ResultsConfig::default());
        page.annotator.on_results_loaded("r1", None);
        page.transport.respond("input/r1", HttpResponse::ok("<a/>"));

        block_on(page.annotator.load_original_content()).expect("first load");
        assert_eq!(page.surface.is_disabled(VIEW_INPUT_BUTTON), Some(false));
        assert_eq!(
            block_on(page.annotator.load_original_content()),
            Err(AnnotatorError::ContentAlreadyLoaded)
        );
        assert_eq!(page.transport.requests(), vec!["input/r1"]);
        assert_eq!(
            page.annotator.content_load(),
            ContentLoad::Loaded("<a/>".to_string())
        );
    }

    #[test]
    fn failed_content_load_can_be_retried() {
        let page = page(ResultsConfig::default());
        page.annotator.on_results_loaded("r1", Some("c1".to_string()));
        page.transport.fail("input/c1", "offline");
        page.transport.respond("input/c1", HttpResponse::ok("<a/>"));

        let err = block_on(page.annotator.load_original_content()).expect_err("offline");
        assert_eq!(err, AnnotatorError::Transport("offline".to_string()));
        assert_eq!(page.annotator.content_load(), ContentLoad::Failed);
        assert_eq!(
            page.banner.message().as_deref(),
            Some(ResultsConfig::default().labels.content_error.as_str())
        );
        assert_eq!(page.surface.is_disabled(VIEW_INPUT_BUTTON), Some(true));

        block_on(page.annotator.load_original_content()).expect("retry");
        assert_eq!(page.transport.requests(), vec!["input/c1", "input/c1"]);
    }

    #[test]
    fn content_requires_a_report() {
        let page = page(ResultsConfig::default());
        assert_eq!(
            block_on(page.annotator.load_original_content()),
            Err(AnnotatorError::NoActiveReport)
        );
        assert!(page.transport.requests().is_empty());
    }

    #[test]
    fn prefetch_joins_content_and_report() {
        let page = page(ResultsConfig::default());
        page.annotator.on_results_loaded("r1", None);
        page.transport.respond("input/r1", HttpResponse::ok("<a/>"));
        page.transport
            .respond("report/r1/rdf", HttpResponse::ok("<rdf:RDF/>"));

        block_on(page.annotator.prefetch("rdf")).expect("prefetch");
        assert_eq!(
            page.annotator.serialized_report("rdf").as_deref(),
            Some("<rdf:RDF/>")
        );

        page.transport
            .respond("report/r1/ttl", HttpResponse::ok("@prefix sh: <x> ."));
        block_on(page.annotator.prefetch("ttl")).expect("content already in memory");
        let content_requests = page
            .transport
            .requests()
            .into_iter()
            .filter(|url| url == "input/r1")
            .count();
        assert_eq!(content_requests, 1);
    }

    #[test]
    fn failed_report_prefetch_shows_the_banner() {
        let page = page(ResultsConfig::default());
        page.annotator.on_results_loaded("r1", None);
        page.transport.respond("input/r1", HttpResponse::ok("<a/>"));
        page.transport.fail("report/r1/rdf", "offline");

        assert_eq!(
            block_on(page.annotator.prefetch("rdf")),
            Err(AnnotatorError::Transport("offline".to_string()))
        );
        assert_eq!(
            page.banner.message().as_deref(),
            Some(ResultsConfig::default().labels.report_error.as_str())
        );
        assert_eq!(
            page.annotator.content_load(),
            ContentLoad::Loaded("<a/>".to_string())
        );
        assert_eq!(page.annotator.serialized_report("rdf"), None);
    }

    #[test]
    fn views_requested_before_the_load_run_after_it() {
        let page = page(ResultsConfig::default());
        page.annotator.on_results_loaded("r1", None);
        page.transport.respond("input/r1", HttpResponse::ok("<a/>"));
        let opened = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&opened);
        page.annotator.when_content_loaded(move |annotator| {
            sink.borrow_mut().push(annotator.render_annotated_view(SOURCE_PANE, &[]).is_ok());
        });
        assert!(opened.borrow().is_empty());

        block_on(page.annotator.load_original_content()).expect("load");
        assert_eq!(*opened.borrow(), vec![true]);

        let sink = Rc::clone(&opened);
        page.annotator
            .when_content_loaded(move |_| sink.borrow_mut().push(true));
        assert_eq!(*opened.borrow(), vec![true, true]);
    }

    #[test]
    fn failed_load_drops_waiting_views() {
        let page = page(ResultsConfig::default());
        page.annotator.on_results_loaded("r1", None);
        page.transport.fail("input/r1", "offline");
        page.transport.respond("input/r1", HttpResponse::ok("<a/>"));
        let opened = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&opened);
        page.annotator
            .when_content_loaded(move |_| *sink.borrow_mut() += 1);
        block_on(page.annotator.load_original_content()).expect_err("offline");
        block_on(page.annotator.load_original_content()).expect("retry");
        assert_eq!(*opened.borrow(), 0);
    }

    #[test]
    fn markers_follow_findings_and_stack_per_line() {
        let page = page(ResultsConfig::default());
        page.annotator.on_results_loaded("r1", None);
        page.transport
            .respond("input/r1", HttpResponse::ok("<a>\n<b/>\n</a>"));
        assert_eq!(
            page.annotator.render_annotated_view(SOURCE_PANE, &[]),
            Err(AnnotatorError::ContentNotLoaded)
        );
        block_on(page.annotator.load_original_content()).expect("load");

        let findings = [
            finding(1, Severity::Error, "first"),
            finding(1, Severity::Warning, "second"),
            finding(0, Severity::Info, "third"),
        ];
        page.annotator
            .render_annotated_view(SOURCE_PANE, &findings)
            .expect("render");

        let viewer = page.viewers.viewer();
        assert_eq!(page.viewers.opened(), vec![SOURCE_PANE]);
        assert_eq!(viewer.content(), "<a>\n<b/>\n</a>");
        assert_eq!(viewer.mode(), "xml");
        let widgets: Vec<_> = viewer
            .widgets()
            .into_iter()
            .map(|(line, widget)| (line, widget.class_name, widget.text))
            .collect();
        assert_eq!(
            widgets,
            vec![
                (1, "indicator-editor-widget indicator-error".to_string(), "first".to_string()),
                (1, "indicator-editor-widget indicator-warning".to_string(), "second".to_string()),
                (0, "indicator-editor-widget indicator-info".to_string(), "third".to_string()),
            ]
        );
        assert_eq!(
            viewer.lines_with_class(LineLayer::Background, ANNOTATED_LINE_CLASS),
            vec![0, 1]
        );
    }

    #[test]
    fn focusing_moves_the_single_highlight_and_centres_the_line() {
        let page = page(ResultsConfig::default());
        page.annotator.on_results_loaded("r1", None);
        page.transport
            .respond("input/r1", HttpResponse::ok("a\nb\nc\nd\ne\nf\ng\nh\ni\nj\nk\nl\nm"));
        block_on(page.annotator.load_original_content()).expect("load");
        let first = finding(2, Severity::Error, "first");
        let second = finding(12, Severity::Warning, "second");
        assert_eq!(
            page.annotator.focus_finding(&first),
            Err(AnnotatorError::ViewerNotRendered)
        );
        page.annotator
            .render_annotated_view(SOURCE_PANE, &[first.clone(), second.clone()])
            .expect("render");

        page.annotator.focus_finding(&first).expect("focus first");
        page.annotator.focus_finding(&second).expect("focus second");

        let viewer = page.viewers.viewer();
        assert_eq!(
            viewer.lines_with_class(LineLayer::Background, SELECTED_LINE_CLASS),
            vec![12]
        );
        assert_eq!(
            viewer.marks(),
            vec![(
                TextPosition { line: 12, ch: 0 },
                TextPosition { line: 13, ch: 0 },
                SELECTED_TEXT_CLASS.to_string()
            )]
        );
        // 12 * 20 - 300 / 2 - 5
        assert_eq!(viewer.scroll_top(), Some(85.0));
        assert_eq!(viewer.refresh_count(), 2);
    }

    #[test]
    fn download_saves_with_server_file_name() {
        let page = page(ResultsConfig::default());
        page.annotator
            .on_results_loaded("r1", Some("c1".to_string()));
        let url = "report?id=r1&type=reportType&syntax=pdfType&contentId=c1";
        page.transport.respond(
            url,
            HttpResponse::ok(b"%PDF".to_vec())
                .with_content_disposition("attachment; filename=report.pdf"),
        );
        page.banner.show_error("stale");

        block_on(page.annotator.request_download(DownloadKind::Report, PDF_SYNTAX))
            .expect("download");

        assert_eq!(
            page.saver.saved(),
            vec![SavedFile {
                file_name: "report.pdf".to_string(),
                mime_type: PDF_MIME_TYPE.to_string(),
                bytes: b"%PDF".to_vec(),
            }]
        );
        assert_eq!(page.banner.message(), None);
        assert_eq!(page.surface.is_disabled("downloadReportButton"), Some(false));
        assert_eq!(
            page.surface.is_hidden("downloadReportButtonSpinner"),
            Some(true)
        );
    }

    #[test]
    fn failed_downloads_show_one_banner_and_restore_the_button() {
        let page = page(ResultsConfig::default());
        page.annotator.on_results_loaded("r1", None);
        let url = "report?id=r1&type=reportType&syntax=text%2Fturtle";
        page.transport.respond(url, HttpResponse::status(500));
        page.transport.fail(url, "connection reset");

        let first = block_on(page.annotator.request_download(DownloadKind::Report, "text/turtle"));
        assert_eq!(
            first,
            Err(AnnotatorError::HttpStatus {
                url: url.to_string(),
                status: 500
            })
        );
        let second = block_on(page.annotator.request_download(DownloadKind::Report, "text/turtle"));
        assert_eq!(
            second,
            Err(AnnotatorError::Transport("connection reset".to_string()))
        );

        assert_eq!(
            page.banner.message().as_deref(),
            Some(ResultsConfig::default().labels.download_error.as_str())
        );
        assert_eq!(page.banner.shown_count(), 2);
        assert!(page.saver.saved().is_empty());
        assert_eq!(page.surface.is_disabled("downloadReportButton"), Some(false));
        assert_eq!(
            page.surface.is_hidden("downloadReportButtonSpinner"),
            Some(true)
        );
    }

    #[test]
    fn save_failures_are_reported() {
        let page = page(ResultsConfig::default());
        page.annotator.on_results_loaded("r1", None);
        let url = "report?id=r1&type=contentType&syntax=text%2Fturtle";
        page.transport.respond(url, HttpResponse::ok("@prefix ex: <x> ."));
        page.saver.fail_with("blocked");

        assert_eq!(
            block_on(page.annotator.request_download(DownloadKind::Content, "text/turtle")),
            Err(AnnotatorError::Save("blocked".to_string()))
        );
        assert!(page.banner.message().is_some());
    }

    #[test]
    fn download_menu_uses_configured_limit() {
        let page = page(ResultsConfig {
            report_item_count: 20,
            report_item_detail_max: 10,
            report_syntaxes: vec![SelectOption::new("text/turtle", "Turtle")],
            ..ResultsConfig::default()
        });
        assert_eq!(
            page.annotator.download_choices(DownloadKind::Report),
            vec![DownloadChoice::Syntax(SelectOption::new("text/turtle", "Turtle"))]
        );
    }

    #[test]
    fn noop_host_bundle_has_no_active_report() {
        let annotator = ReportAnnotator::new(
            ResultsConfig::default(),
            SessionState::default(),
            FormEvents::default(),
            AnnotatorServices::from(&HostServices::noop()),
        );
        assert_eq!(
            block_on(annotator.load_original_content()),
            Err(AnnotatorError::NoActiveReport)
        );
    }
}
