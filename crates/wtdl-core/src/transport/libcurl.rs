//! libcurl-backed transport.
//!
//! Each request gets a fresh `Easy` handle and runs in `spawn_blocking`, so a
//! slow transfer never stalls the async executor.

use std::str;
use std::time::Duration;

use curl::easy::{Easy, List};

use super::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
use crate::config::DownloaderConfig;

/// Production transport. Cheap to clone; holds only the request settings.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    timeout: Duration,
    user_agent: String,
}

impl CurlTransport {
    pub fn new(cfg: &DownloaderConfig) -> Self {
        Self {
            timeout: cfg.timeout(),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

impl HttpTransport for CurlTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = self.timeout;
        let user_agent = self.user_agent.clone();
        tracing::debug!(method = %request.method, url = %request.url, "http request");
        tokio::task::spawn_blocking(move || perform(&request, timeout, &user_agent))
            .await
            .map_err(|e| TransportError::Task(e.to_string()))?
    }
}

/// Runs one request to completion on the current thread.
fn perform(
    request: &HttpRequest,
    timeout: Duration,
    user_agent: &str,
) -> Result<HttpResponse, TransportError> {
    let mut easy = Easy::new();
    easy.url(&request.url)?;
    easy.useragent(user_agent)?;
    easy.timeout(timeout)?;

    match request.method {
        Method::Get => easy.get(true)?,
        Method::Head => easy.nobody(true)?,
        Method::Post => {
            easy.post(true)?;
            easy.post_fields_copy(request.body.as_deref().unwrap_or(&[]))?;
        }
    }

    if let Some(max) = request.max_redirects {
        easy.follow_location(true)?;
        easy.max_redirections(max)?;
    }

    // Build curl list for custom headers (e.g. "Name: value").
    let mut list = List::new();
    for (k, v) in &request.headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !request.headers.is_empty() {
        easy.http_headers(list)?;
    }

    let watch_progress = request.on_progress.is_some() || request.cancel.is_some();
    if watch_progress {
        easy.progress(true)?;
    }

    let mut headers: Vec<(String, String)> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(line) = str::from_utf8(data) {
                let line = line.trim_end();
                // Every hop of a redirect chain starts a new header block.
                if line.starts_with("HTTP/") {
                    headers.clear();
                } else if let Some((name, value)) = line.split_once(':') {
                    headers.push((name.trim().to_string(), value.trim().to_string()));
                }
            }
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        if watch_progress {
            transfer.progress_function(|dltotal, dlnow, _ultotal, _ulnow| {
                if request.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                    return false; // abort transfer
                }
                if let Some(cb) = &request.on_progress {
                    let total = (dltotal > 0.0).then_some(dltotal as u64);
                    cb(dlnow as u64, total);
                }
                true
            })?;
        }
        transfer.perform().map_err(|e| {
            if e.is_aborted_by_callback() {
                TransportError::Cancelled
            } else {
                TransportError::Curl(e)
            }
        })?;
    }

    let status = easy.response_code()?;
    let effective_url = easy
        .effective_url()?
        .map(str::to_string)
        .unwrap_or_else(|| request.url.clone());

    tracing::debug!(
        status,
        url = %effective_url,
        bytes = body.len(),
        "http response"
    );

    Ok(HttpResponse {
        status,
        effective_url,
        headers,
        body,
    })
}
