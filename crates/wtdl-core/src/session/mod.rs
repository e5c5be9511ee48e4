//! Session token fetch: scrape the landing page for the anti-forgery token.

mod extract;

pub use extract::{MetaTagExtractor, TokenExtractor};

use crate::error::{Error, ErrorKind, Result};
use crate::service;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use tokio_util::sync::CancellationToken;

/// Short-lived anti-forgery token plus the session cookies it is bound to.
///
/// Fetched fresh for every resolution and used for exactly one exchange loop.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
    cookies: Vec<String>,
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &"<redacted>")
            .field("cookies", &self.cookies.len())
            .finish()
    }
}

impl SessionToken {
    pub fn new(value: impl Into<String>, cookies: Vec<String>) -> Self {
        Self {
            value: value.into(),
            cookies,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `name=value` pairs from the landing page's `Set-Cookie` headers.
    pub fn cookies(&self) -> &[String] {
        &self.cookies
    }

    /// Value for a `Cookie` request header, if the page set any cookies.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            None
        } else {
            Some(self.cookies.join("; "))
        }
    }
}

/// Fetches the landing page and extracts a fresh session token.
///
/// Transport failures and non-2xx statuses are [`ErrorKind::Network`]; a page
/// without a token is [`ErrorKind::Protocol`]. Neither is retried.
pub async fn fetch_session_token<T, X>(
    transport: &T,
    extractor: &X,
    cancel: Option<&CancellationToken>,
) -> Result<SessionToken>
where
    T: HttpTransport,
    X: TokenExtractor + ?Sized,
{
    let request = HttpRequest::get(service::ROOT_PAGE_URL).cancel_with(cancel.cloned());
    let response = transport.send(request).await.map_err(|e| {
        Error::from_transport(
            ErrorKind::Network,
            &format!("GET {}", service::ROOT_PAGE_URL),
            e,
        )
    })?;

    if !response.is_success() {
        return Err(Error::network(format!(
            "GET {} returned HTTP {}",
            service::ROOT_PAGE_URL,
            response.status
        )));
    }

    let value = extractor.extract(&response.text()).ok_or_else(|| {
        Error::protocol("session token not found in landing page markup")
    })?;

    let cookies = session_cookies(&response);
    tracing::debug!(cookies = cookies.len(), "session token acquired");
    Ok(SessionToken::new(value, cookies))
}

/// `name=value` part of every `Set-Cookie` header; attributes are dropped.
fn session_cookies(response: &HttpResponse) -> Vec<String> {
    response
        .header_values("set-cookie")
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.split_once('=').is_some_and(|(name, _)| !name.trim().is_empty()))
        .map(str::to_string)
        .collect()
}
