//! HTTP transport abstraction.
//!
//! The resolvers and the fetcher only see [`HttpTransport`]; the production
//! implementation is [`CurlTransport`] (libcurl, one easy handle per request,
//! run on tokio's blocking pool).

mod libcurl;
mod request;

pub use libcurl::CurlTransport;
pub use request::{HttpRequest, HttpResponse, Method, ProgressFn};

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

/// Failure below the HTTP status level. Non-2xx responses are not errors here.
#[derive(Debug, Error)]
pub enum TransportError {
    /// libcurl reported an error (connect, DNS, timeout, redirect cap, ...).
    #[error("{0}")]
    Curl(#[from] ::curl::Error),
    /// The request's cancellation token fired.
    #[error("transfer cancelled")]
    Cancelled,
    /// The blocking transfer task panicked or was dropped by the runtime.
    #[error("transfer task failed: {0}")]
    Task(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Curl(e) if e.is_operation_timedout())
    }

    pub fn is_too_many_redirects(&self) -> bool {
        matches!(self, TransportError::Curl(e) if e.is_too_many_redirects())
    }
}

/// Minimal asynchronous HTTP client used by every network step.
///
/// Implementations apply their own per-request timeout and User-Agent, follow
/// redirects only when [`HttpRequest::max_redirects`] is set, report download
/// progress through [`HttpRequest::on_progress`], and return
/// [`TransportError::Cancelled`] once [`HttpRequest::cancel`] fires.
pub trait HttpTransport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

impl<T: HttpTransport> HttpTransport for Arc<T> {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).send(request)
    }
}
