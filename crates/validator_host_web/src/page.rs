//! Page-level services: alert banner, Blob downloads, and the unload beacon.

use validator_host::{AlertBanner, FileSaver, ReleaseBeacon};

use crate::bridge;

/// Element the banner falls back to when the page has no alert helpers.
pub const DEFAULT_ALERT_CONTAINER: &str = "itb-alerts";

#[derive(Debug, Clone)]
/// Alert banner using the page's `raiseAlert`/`clearMessages` helpers when present.
///
/// Without them a single `alert-danger` block replaces the contents of the container.
pub struct WebAlertBanner {
    container_id: String,
}

impl WebAlertBanner {
    /// Banner rendering into `container_id` when the page helpers are missing.
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
        }
    }
}

impl Default for WebAlertBanner {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_CONTAINER)
    }
}

impl AlertBanner for WebAlertBanner {
    fn show_error(&self, message: &str) {
        bridge::show_alert(&self.container_id, message);
    }

    fn clear(&self) {
        bridge::clear_alerts(&self.container_id);
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Saves bytes through a temporary object URL and a synthetic anchor click.
pub struct WebFileSaver;

impl FileSaver for WebFileSaver {
    fn save(&self, bytes: &[u8], file_name: &str, mime_type: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            return save_blob(bytes, file_name, mime_type);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (bytes, mime_type);
            Err(format!(
                "cannot save `{file_name}`: downloads are only available when compiled for wasm32"
            ))
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn save_blob(bytes: &[u8], file_name: &str, mime_type: &str) -> Result<(), String> {
    use js_sys::{Array, Uint8Array};
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

    let describe = |err: JsValue| format!("saving `{file_name}` failed: {err:?}");

    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes).buffer());
    let options = BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = Blob::new_with_buffer_source_sequence_and_options(&parts, &options)
        .map_err(describe)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(describe)?;

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| "document is unavailable".to_string())?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(describe)?
        .dyn_into()
        .map_err(|_| "anchor element could not be created".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    Url::revoke_object_url(&url).map_err(describe)
}

#[derive(Debug, Clone, Copy, Default)]
/// Sends a `navigator.sendBeacon` request when the page unloads.
pub struct WebReleaseBeacon;

impl ReleaseBeacon for WebReleaseBeacon {
    fn release_on_unload(&self, url: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::{closure::Closure, JsCast};
            use web_sys::Event;

            let Some(window) = web_sys::window() else {
                return;
            };
            let target = url.to_string();
            let navigator = window.navigator();
            let listener = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                let _ = navigator.send_beacon(&target);
            });
            let _ = window
                .add_event_listener_with_callback("beforeunload", listener.as_ref().unchecked_ref());
            // Registered for the lifetime of the page.
            listener.forget();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn downloads_fail_outside_the_browser() {
        let err = WebFileSaver
            .save(b"@prefix ex: <http://example.org/> .", "report.ttl", "text/turtle")
            .expect_err("no document");
        assert!(err.contains("report.ttl"));
    }

    #[test]
    fn banner_defaults_to_the_alert_container() {
        assert_eq!(WebAlertBanner::default().container_id, DEFAULT_ALERT_CONTAINER);
    }
}
