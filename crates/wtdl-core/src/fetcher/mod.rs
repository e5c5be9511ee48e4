//! Byte transfer against a direct link.
//!
//! A single GET, no retry: only the exchange step retries. The body is kept
//! in memory and optionally written to disk by [`output::save`].

mod filename;
mod output;

pub use filename::{derive_filename, filename_from_content_disposition, sanitize_filename};
pub use output::{save, temp_path};

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, ErrorKind, Result};
use crate::transport::{HttpRequest, HttpTransport, ProgressFn};

/// Redirect cap for the direct link (signed URLs may bounce to a CDN).
const DIRECT_LINK_MAX_REDIRECTS: u32 = 10;

/// Byte counts reported to [`DownloadOptions::on_progress`]. The total is always known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub loaded: u64,
    pub total: u64,
}

impl Progress {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.loaded as f64 / self.total as f64) * 100.0
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

#[derive(Clone, Default)]
pub struct DownloadOptions {
    /// Invoked on every transport progress tick whose total size is known.
    pub on_progress: Option<ProgressCallback>,
    /// Also write the file here. An existing directory gets a derived file name.
    pub output_path: Option<PathBuf>,
    /// Abandon the download (including retry backoff) when cancelled.
    pub cancel: Option<CancellationToken>,
}

impl fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("on_progress", &self.on_progress.as_ref().map(|_| "{ ... }"))
            .field("output_path", &self.output_path)
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

impl DownloadOptions {
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(Progress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Body of a completed transfer plus what is needed to name it on disk.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    /// URL the body was finally served from.
    pub final_url: String,
    pub content_disposition: Option<String>,
}

/// Adapts a caller callback to raw transport ticks: drops ticks with unknown
/// total and never lets `loaded` go backwards.
fn progress_sink(callback: ProgressCallback) -> ProgressFn {
    let high_water = Arc::new(AtomicU64::new(0));
    Arc::new(move |loaded, total| {
        let Some(total) = total else {
            return;
        };
        let loaded = high_water.fetch_max(loaded, Ordering::Relaxed).max(loaded);
        callback(Progress { loaded, total });
    })
}

/// GETs `direct_url` in full. Transport failures and non-2xx statuses are
/// [`ErrorKind::Download`].
pub async fn fetch_file<T: HttpTransport>(
    transport: &T,
    direct_url: &str,
    options: &DownloadOptions,
) -> Result<FetchedFile> {
    let mut request = HttpRequest::get(direct_url)
        .follow_redirects(DIRECT_LINK_MAX_REDIRECTS)
        .cancel_with(options.cancel.clone());
    if let Some(cb) = &options.on_progress {
        request = request.on_progress(progress_sink(Arc::clone(cb)));
    }

    let response = transport
        .send(request)
        .await
        .map_err(|e| Error::from_transport(ErrorKind::Download, "GET direct link", e))?;

    if !response.is_success() {
        return Err(Error::download(format!(
            "GET direct link returned HTTP {}",
            response.status
        )));
    }

    tracing::info!(bytes = response.body.len(), "download complete");
    Ok(FetchedFile {
        content_disposition: response.header("content-disposition").map(str::to_string),
        final_url: response.effective_url,
        bytes: response.body,
    })
}
