//! HTTP transport contract for report, content, and export requests.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
    future::Future,
    pin::Pin,
    rc::Rc,
};

/// Object-safe boxed future used by [`HttpTransport`].
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Response of a completed request, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw `Content-Disposition` header when present.
    pub content_disposition: Option<String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// `200 OK` with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_disposition: None,
            body: body.into(),
        }
    }

    /// Response with the given status and empty body.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Attaches a `Content-Disposition` header.
    pub fn with_content_disposition(mut self, value: impl Into<String>) -> Self {
        self.content_disposition = Some(value.into());
        self
    }

    /// Returns whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8 text (lossy).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Host service issuing `GET` requests relative to the page.
///
/// Transport failures (no response at all) are `Err`; non-2xx responses are `Ok` and left to
/// the caller.
pub trait HttpTransport {
    /// Issues a `GET` for `url`.
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a, Result<HttpResponse, String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Transport for targets without network access.
pub struct NoopHttpTransport;

impl HttpTransport for NoopHttpTransport {
    fn get<'a>(&'a self, _url: &'a str) -> TransportFuture<'a, Result<HttpResponse, String>> {
        Box::pin(async { Err("network transport unavailable".to_string()) })
    }
}

#[derive(Debug, Default)]
struct MemoryRoutes {
    queued: HashMap<String, VecDeque<Result<HttpResponse, String>>>,
    requests: Vec<String>,
}

#[derive(Debug, Clone, Default)]
/// In-memory transport with per-URL queued responses.
///
/// Each queued response is consumed by one request; unknown URLs answer `404`.
pub struct MemoryHttpTransport {
    inner: Rc<RefCell<MemoryRoutes>>,
}

impl MemoryHttpTransport {
    /// Queues a response for the next request to `url`.
    pub fn respond(&self, url: &str, response: HttpResponse) {
        self.queue(url, Ok(response));
    }

    /// Queues a transport failure for the next request to `url`.
    pub fn fail(&self, url: &str, message: &str) {
        self.queue(url, Err(message.to_string()));
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.inner.borrow().requests.clone()
    }

    fn queue(&self, url: &str, response: Result<HttpResponse, String>) {
        self.inner
            .borrow_mut()
            .queued
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }
}

impl HttpTransport for MemoryHttpTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a, Result<HttpResponse, String>> {
        Box::pin(async move {
            let mut routes = self.inner.borrow_mut();
            routes.requests.push(url.to_string());
            routes
                .queued
                .get_mut(url)
                .and_then(VecDeque::pop_front)
                .unwrap_or_else(|| Ok(HttpResponse::status(404)))
        })
    }
}
