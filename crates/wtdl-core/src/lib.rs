//! Resolve file-sharing share links (short `we.tl` or long
//! `wetransfer.com/downloads/...` form) to direct download URLs and fetch the
//! files behind them.
//!
//! ```no_run
//! # async fn run() -> wtdl_core::Result<()> {
//! use wtdl_core::{DownloadOptions, Downloader, DownloaderConfig};
//!
//! let downloader = Downloader::new(DownloaderConfig::default());
//! let link = "https://we.tl/t-abc123";
//! let direct = downloader.get_download_url(link).await?;
//! println!("direct link: {}", direct);
//!
//! let bytes = downloader
//!     .download(link, DownloadOptions::default().with_progress(|p| {
//!         println!("{:.1}%", p.percentage());
//!     }))
//!     .await?;
//! println!("{} bytes", bytes.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod downloader;
pub mod error;
pub mod fetcher;
pub mod link;
pub mod logging;
pub mod resolve;
pub mod retry;
pub mod service;
pub mod session;
pub mod transport;

pub use config::DownloaderConfig;
pub use downloader::Downloader;
pub use error::{Error, ErrorKind, Result};
pub use fetcher::{DownloadOptions, Progress};
pub use link::{is_short_link, parse_transfer_url, TransferReference};
pub use session::{MetaTagExtractor, SessionToken, TokenExtractor};
pub use tokio_util::sync::CancellationToken;
pub use transport::{CurlTransport, HttpRequest, HttpResponse, HttpTransport, TransportError};
