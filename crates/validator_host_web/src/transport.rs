//! `fetch`-based HTTP transport.

use validator_host::{HttpResponse, HttpTransport, TransportFuture};

/// Header the server uses to tell script requests from page navigations.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";
/// Value sent in [`REQUESTED_WITH_HEADER`].
pub const REQUESTED_WITH_VALUE: &str = "XmlHttpRequest";

#[derive(Debug, Clone, Copy, Default)]
/// Browser transport issuing page-relative `GET` requests with `window.fetch`.
///
/// Any HTTP status resolves to `Ok`; only network-level failures are errors.
pub struct WebHttpTransport;

impl HttpTransport for WebHttpTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a, Result<HttpResponse, String>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                return fetch(url).await;
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                Err(format!(
                    "cannot request `{url}`: fetch is only available when compiled for wasm32"
                ))
            }
        })
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch(url: &str) -> Result<HttpResponse, String> {
    use js_sys::{ArrayBuffer, Uint8Array};
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, Response};

    let describe = |err: JsValue| format!("request to `{url}` failed: {err:?}");

    let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
    let init = RequestInit::new();
    init.set_method("GET");
    let request = Request::new_with_str_and_init(url, &init).map_err(describe)?;
    request
        .headers()
        .set(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE)
        .map_err(describe)?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(describe)?
        .dyn_into()
        .map_err(describe)?;
    let content_disposition = response
        .headers()
        .get("Content-Disposition")
        .map_err(describe)?;
    let buffer: ArrayBuffer = JsFuture::from(response.array_buffer().map_err(describe)?)
        .await
        .map_err(describe)?
        .dyn_into()
        .map_err(describe)?;

    Ok(HttpResponse {
        status: response.status(),
        content_disposition,
        body: Uint8Array::new(&buffer).to_vec(),
    })
}
