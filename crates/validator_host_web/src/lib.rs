//! Browser (`wasm32`) implementations of [`validator_host`] service contracts.
//!
//! This crate wires the validator runtime to the page: element access by id, `fetch`,
//! Blob downloads, the unload beacon, and CodeMirror editors and viewers. Pieces that only
//! exist in page script go through the private `bridge` module, which also supplies the
//! inert non-`wasm32` fallback used by host-side builds and tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Concrete adapter factories for runtime wiring.
pub mod adapters;
mod bridge;
pub mod dom;
pub mod page;
pub mod report;
pub mod transport;
pub mod viewer;

pub use adapters::{
    alert_banner, build_host_services, code_viewer_factory, file_saver, form_surface,
    http_transport, release_beacon,
};
pub use dom::{element_text, watch_editor, WebFormSurface};
pub use page::{WebAlertBanner, WebFileSaver, WebReleaseBeacon};
pub use report::{on_report_item_click, scrape_report_items};
pub use transport::WebHttpTransport;
pub use viewer::{WebCodeViewer, WebCodeViewerFactory};

/// Shows the modal `id` and calls `on_shown` once it is visible.
///
/// Uses the Bootstrap modal plugin when loaded; otherwise the `hidden` class is removed and
/// `on_shown` runs immediately.
pub fn show_modal(id: &str, on_shown: impl FnOnce() + 'static) {
    bridge::show_modal(id, Box::new(on_shown));
}
