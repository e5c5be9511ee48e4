//! Short-link expansion by redirect-following HEAD.

use tokio_util::sync::CancellationToken;

use crate::error::{Error, ErrorKind, Result};
use crate::service::SHORT_LINK_MAX_REDIRECTS;
use crate::transport::{HttpRequest, HttpTransport};

/// Follows the redirects of a short link and returns the URL it lands on.
///
/// Redirect statuses are followed by the transport (at most
/// [`SHORT_LINK_MAX_REDIRECTS`] hops) and never count as success; the final
/// response must be 2xx. Everything else is [`ErrorKind::Network`]: an expired
/// link and one that never existed look the same.
pub async fn resolve_short_link<T: HttpTransport>(
    transport: &T,
    url: &str,
    cancel: Option<&CancellationToken>,
) -> Result<String> {
    let request = HttpRequest::head(url)
        .follow_redirects(SHORT_LINK_MAX_REDIRECTS)
        .cancel_with(cancel.cloned());

    let response = transport.send(request).await.map_err(|e| {
        let context = if e.is_too_many_redirects() {
            format!("HEAD {}: more than {} redirects", url, SHORT_LINK_MAX_REDIRECTS)
        } else {
            format!("HEAD {}", url)
        };
        Error::from_transport(ErrorKind::Network, &context, e)
    })?;

    if response.is_redirect() {
        return Err(Error::network(format!(
            "HEAD {} stopped at HTTP {} without a followable Location",
            url, response.status
        )));
    }
    if !response.is_success() {
        return Err(Error::network(format!(
            "HEAD {} returned HTTP {}",
            url, response.status
        )));
    }

    tracing::info!("short link {} resolved to {}", url, response.effective_url);
    Ok(response.effective_url)
}
