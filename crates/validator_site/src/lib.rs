//! Browser entry point for validator upload and results pages.
//!
//! The server renders the markup and embeds a JSON configuration document; this crate reads
//! it, builds the browser host services, and routes page events into the runtime.

pub mod routing;
#[cfg(target_arch = "wasm32")]
mod wiring;

/// Element the alert banner renders into when the page has no alert helpers.
pub const ALERT_CONTAINER_ID: &str = validator_host_web::page::DEFAULT_ALERT_CONTAINER;

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
pub fn mount() {
    console_error_panic_hook::set_once();
    wiring::mount_page();
}
