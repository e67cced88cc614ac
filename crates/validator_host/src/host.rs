//! Host service bundle injected into the runtime.

use std::rc::Rc;

use crate::{
    AlertBanner, CodeViewerFactory, FileSaver, FormSurface, HttpTransport, NoopAlertBanner,
    NoopFileSaver, NoopFormSurface, NoopHttpTransport, NoopReleaseBeacon, ReleaseBeacon,
};

/// Every host service a validator page needs, selected before the runtime is built.
///
/// Keeping selection outside the runtime lets the same controller and annotator run against
/// the browser adapters or the in-memory ones.
#[derive(Clone)]
pub struct HostServices {
    /// Form elements by id.
    pub surface: Rc<dyn FormSurface>,
    /// Source viewer construction.
    pub viewers: Rc<dyn CodeViewerFactory>,
    /// Page-relative HTTP requests.
    pub transport: Rc<dyn HttpTransport>,
    /// The page alert banner.
    pub banner: Rc<dyn AlertBanner>,
    /// Browser downloads.
    pub saver: Rc<dyn FileSaver>,
    /// Unload notification.
    pub beacon: Rc<dyn ReleaseBeacon>,
}

impl HostServices {
    /// Bundle where every service is inert; viewers cannot be opened.
    pub fn noop() -> Self {
        Self {
            surface: Rc::new(NoopFormSurface),
            viewers: Rc::new(NoopCodeViewerFactory),
            transport: Rc::new(NoopHttpTransport),
            banner: Rc::new(NoopAlertBanner),
            saver: Rc::new(NoopFileSaver),
            beacon: Rc::new(NoopReleaseBeacon),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Factory that refuses to open viewers.
pub struct NoopCodeViewerFactory;

impl CodeViewerFactory for NoopCodeViewerFactory {
    fn open(
        &self,
        container_id: &str,
        _content: &str,
        _mode: &str,
    ) -> Result<Box<dyn crate::CodeViewer>, String> {
        Err(format!("no code viewer is available for `{container_id}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_bundle_refuses_viewers() {
        let services = HostServices::noop();
        assert!(!services.surface.contains("contentType"));
        let err = services
            .viewers
            .open("xml-content-pane", "<a/>", "xml")
            .err()
            .expect("viewer should be refused");
        assert_eq!(err, "no code viewer is available for `xml-content-pane`");
    }
}
