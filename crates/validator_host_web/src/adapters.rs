use std::rc::Rc;

use validator_host::{
    AlertBanner, CodeViewerFactory, FileSaver, FormSurface, HostServices, HttpTransport,
    ReleaseBeacon,
};

use crate::{
    WebAlertBanner, WebCodeViewerFactory, WebFileSaver, WebFormSurface, WebHttpTransport,
    WebReleaseBeacon,
};

/// Browser form surface.
pub fn form_surface() -> Rc<dyn FormSurface> {
    Rc::new(WebFormSurface)
}

/// CodeMirror viewer factory.
pub fn code_viewer_factory() -> Rc<dyn CodeViewerFactory> {
    Rc::new(WebCodeViewerFactory)
}

/// `fetch` transport.
pub fn http_transport() -> Rc<dyn HttpTransport> {
    Rc::new(WebHttpTransport)
}

/// Alert banner rendering into `container_id` when the page has no alert helpers.
pub fn alert_banner(container_id: &str) -> Rc<dyn AlertBanner> {
    Rc::new(WebAlertBanner::new(container_id))
}

/// Blob download saver.
pub fn file_saver() -> Rc<dyn FileSaver> {
    Rc::new(WebFileSaver)
}

/// `sendBeacon` unload notifier.
pub fn release_beacon() -> Rc<dyn ReleaseBeacon> {
    Rc::new(WebReleaseBeacon)
}

/// Builds the browser service bundle injected into the validator runtime.
pub fn build_host_services(alert_container_id: &str) -> HostServices {
    HostServices {
        surface: form_surface(),
        viewers: code_viewer_factory(),
        transport: http_transport(),
        banner: alert_banner(alert_container_id),
        saver: file_saver(),
        beacon: release_beacon(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn bundle_builds_outside_the_browser() {
        let services = build_host_services(crate::page::DEFAULT_ALERT_CONTAINER);
        assert!(!services.surface.contains("contentType"));
        assert!(services.saver.save(b"x", "content.xml", "text/xml").is_err());
        services.beacon.release_on_unload("delete/r-1");
        services.banner.show_error("ignored");
    }
}
