//! Typed host-service contracts shared by the validator runtime and its browser adapters.
//!
//! This crate is the boundary between the form/report logic and the page it runs in. It
//! exposes element-id DOM access, the read-only code viewer, HTTP transport, and the
//! page-level services (alert banner, file download, unload beacon). Concrete browser
//! adapters live in `validator_host_web`; the `Memory*` adapters here back the tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod dom;
pub mod host;
pub mod page;
pub mod report;
pub mod transport;
pub mod viewer;

pub use dom::{ElementState, FormSurface, MemoryFormSurface, NoopFormSurface, SelectOption};
pub use host::{HostServices, NoopCodeViewerFactory};
pub use page::{
    AlertBanner, FileSaver, MemoryAlertBanner, MemoryFileSaver, MemoryReleaseBeacon,
    NoopAlertBanner, NoopFileSaver, NoopReleaseBeacon, ReleaseBeacon, SavedFile,
};
pub use report::{ReportItemRecord, Severity};
pub use transport::{
    HttpResponse, HttpTransport, MemoryHttpTransport, NoopHttpTransport, TransportFuture,
};
pub use viewer::{
    CodeViewer, CodeViewerFactory, LineLayer, LineWidget, MemoryCodeViewer,
    MemoryCodeViewerFactory, TextMark, TextPosition,
};
