//! Direct-link exchange: signed POST, retried with exponential backoff.

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::short_link::resolve_short_link;
use crate::error::{Error, ErrorKind, Result};
use crate::link::{self, TransferReference};
use crate::retry::{run_with_retry, RetryError, RetryPolicy};
use crate::service;
use crate::session::{self, SessionToken, TokenExtractor};
use crate::transport::{HttpRequest, HttpTransport};

const INTENT_ENTIRE_TRANSFER: &str = "entire_transfer";

#[derive(Debug, Serialize)]
struct ExchangePayload<'a> {
    intent: &'static str,
    security_hash: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    #[serde(default)]
    direct_link: Option<String>,
}

/// JSON body of the exchange request for `reference`.
pub fn exchange_payload(reference: &TransferReference) -> Result<Vec<u8>> {
    let payload = ExchangePayload {
        intent: INTENT_ENTIRE_TRANSFER,
        security_hash: reference.security_hash(),
        recipient_id: reference.recipient_id(),
    };
    serde_json::to_vec(&payload).map_err(Error::base)
}

/// Resolves any accepted share link to a direct download URL.
///
/// Short-link expansion, parsing and the token fetch each run once and fail
/// fast. Only the exchange POST is retried, for `policy.max_retries` retries.
pub async fn resolve_direct_url<T, X>(
    transport: &T,
    extractor: &X,
    policy: &RetryPolicy,
    url: &str,
    cancel: Option<&CancellationToken>,
) -> Result<String>
where
    T: HttpTransport,
    X: TokenExtractor + ?Sized,
{
    let long_url = if link::is_short_link(url) {
        resolve_short_link(transport, url, cancel).await?
    } else {
        url.to_string()
    };

    let reference = link::parse_transfer_url(&long_url)?;
    let session = session::fetch_session_token(transport, extractor, cancel).await?;
    let payload = exchange_payload(&reference)?;
    let endpoint = service::exchange_url(reference.transfer_id());

    let result = run_with_retry(policy, cancel, |attempt| {
        let request = exchange_request(&endpoint, &payload, &session, cancel);
        async move { exchange_once(transport, request, attempt).await }
    })
    .await;

    match result {
        Ok(direct_link) => {
            tracing::info!(
                transfer_id = reference.transfer_id(),
                "direct link obtained"
            );
            Ok(direct_link)
        }
        Err(RetryError::Cancelled) => Err(Error::cancelled()),
        Err(RetryError::Exhausted { retries, last }) => Err(Error::download(format!(
            "failed to get download URL after {} retries: {}",
            retries, last
        ))
        .with_retries(retries)
        .with_source(last)),
    }
}

fn exchange_request(
    endpoint: &str,
    payload: &[u8],
    session: &SessionToken,
    cancel: Option<&CancellationToken>,
) -> HttpRequest {
    let mut request = HttpRequest::post(endpoint, payload.to_vec())
        .header(service::TOKEN_HEADER, session.value())
        .header("x-requested-with", "XMLHttpRequest")
        .header("content-type", "application/json")
        .header("accept", "application/json")
        .cancel_with(cancel.cloned());
    if let Some(cookie) = session.cookie_header() {
        request = request.header("cookie", cookie);
    }
    request
}

/// One exchange attempt. Every failure here feeds the retry loop.
async fn exchange_once<T: HttpTransport>(
    transport: &T,
    request: HttpRequest,
    attempt: u32,
) -> Result<String> {
    tracing::debug!(attempt, url = %request.url, "exchange attempt");
    let url = request.url.clone();
    let response = transport
        .send(request)
        .await
        .map_err(|e| Error::from_transport(ErrorKind::Download, &format!("POST {}", url), e))?;

    if !response.is_success() {
        return Err(Error::download(format!(
            "POST {} returned HTTP {}",
            url, response.status
        )));
    }

    let parsed: ExchangeResponse = serde_json::from_slice(&response.body).map_err(|e| {
        Error::protocol(format!("exchange response is not valid JSON: {}", e)).with_source(e)
    })?;

    parsed
        .direct_link
        .filter(|l| !l.is_empty())
        .ok_or_else(|| Error::protocol("exchange response has no direct_link"))
}
