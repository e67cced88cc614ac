//! Binary entrypoint for the browser-hosted validator page script.

#[cfg(all(target_arch = "wasm32", feature = "csr"))]
fn main() {
    validator_site::mount();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!(
        "This binary is intended for the browser/WASM workflow. Build `validator_site_app` for wasm32 with the `csr` feature and load it from the validator pages."
    );
}
