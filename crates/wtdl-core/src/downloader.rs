//! Public entry point: share link in, direct URL or file bytes out.

use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;

use crate::config::DownloaderConfig;
use crate::error::Result;
use crate::fetcher::{self, DownloadOptions};
use crate::resolve;
use crate::retry::RetryPolicy;
use crate::session::{MetaTagExtractor, TokenExtractor};
use crate::transport::{CurlTransport, HttpTransport};

/// Resolves share links and downloads transfers.
///
/// Holds no per-download state; one instance can serve concurrent calls.
pub struct Downloader<T = CurlTransport> {
    config: DownloaderConfig,
    policy: RetryPolicy,
    transport: T,
    extractor: Box<dyn TokenExtractor>,
}

impl<T> std::fmt::Debug for Downloader<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Downloader<CurlTransport> {
    /// Downloader backed by libcurl, with `config`'s timeout and User-Agent.
    pub fn new(config: DownloaderConfig) -> Self {
        let transport = CurlTransport::new(&config);
        Self::with_transport(config, transport)
    }
}

impl Default for Downloader<CurlTransport> {
    fn default() -> Self {
        Self::new(DownloaderConfig::default())
    }
}

impl<T: HttpTransport> Downloader<T> {
    /// Downloader over a caller-supplied transport. The transport is expected
    /// to apply `config.timeout_ms` and `config.user_agent` itself.
    pub fn with_transport(config: DownloaderConfig, transport: T) -> Self {
        Self {
            policy: RetryPolicy::from_config(&config),
            config,
            transport,
            extractor: Box::new(MetaTagExtractor),
        }
    }

    /// Replaces the landing-page token scraper.
    pub fn with_token_extractor(mut self, extractor: impl TokenExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Resolves `url` (short or long form) to a direct, time-limited download URL.
    pub async fn get_download_url(&self, url: &str) -> Result<String> {
        self.resolve(url, None).await
    }

    /// Like [`get_download_url`](Self::get_download_url), abandoning in-flight
    /// requests and backoff sleeps once `cancel` fires.
    pub async fn get_download_url_cancellable(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.resolve(url, Some(cancel)).await
    }

    /// Resolves `url` and fetches the whole file into memory.
    ///
    /// With `options.output_path` set, the bytes are also written to disk.
    pub async fn download(&self, url: &str, options: DownloadOptions) -> Result<Vec<u8>> {
        let (bytes, _) = self.download_inner(url, &options).await?;
        Ok(bytes)
    }

    /// Resolves `url` and saves the file under `path`, returning where it
    /// landed. A directory `path` gets a name derived from the response.
    pub async fn download_to(
        &self,
        url: &str,
        path: impl AsRef<Path>,
        options: DownloadOptions,
    ) -> Result<PathBuf> {
        let options = options.with_output_path(path.as_ref());
        let (_, saved) = self.download_inner(url, &options).await?;
        Ok(saved.unwrap_or_else(|| path.as_ref().to_path_buf()))
    }

    async fn resolve(&self, url: &str, cancel: Option<&CancellationToken>) -> Result<String> {
        tracing::info!(url, "resolving share link");
        resolve::resolve_direct_url(
            &self.transport,
            self.extractor.as_ref(),
            &self.policy,
            url,
            cancel,
        )
        .await
    }

    async fn download_inner(
        &self,
        url: &str,
        options: &DownloadOptions,
    ) -> Result<(Vec<u8>, Option<PathBuf>)> {
        let direct_url = self.resolve(url, options.cancel.as_ref()).await?;
        let file = fetcher::fetch_file(&self.transport, &direct_url, options).await?;
        let saved = match &options.output_path {
            Some(target) => Some(fetcher::save(target, &file).await?),
            None => None,
        };
        Ok((file.bytes, saved))
    }
}
