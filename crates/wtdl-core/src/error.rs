//! Library error type: one struct carrying an explicit kind tag.
//!
//! Callers dispatch on [`Error::kind`] instead of downcasting. Every failure
//! the crate surfaces is one of these kinds; foreign errors that reach the
//! public surface unclassified are wrapped as [`ErrorKind::Base`].

use std::fmt;

use thiserror::Error;

use crate::transport::TransportError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong, at the granularity callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input URL matches none of the recognized link shapes.
    InvalidLink,
    /// Transport failure (connect, DNS, timeout, redirect cap, error status)
    /// while expanding a short link or fetching the session token.
    Network,
    /// A successful response lacked the structure the client expects.
    Protocol,
    /// Byte transfer failed, or the exchange retry loop was exhausted.
    Download,
    /// The caller cancelled the operation.
    Cancelled,
    /// Anything not covered above; the original message is preserved.
    Base,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidLink => "invalid link",
            ErrorKind::Network => "network error",
            ErrorKind::Protocol => "protocol error",
            ErrorKind::Download => "download error",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Base => "error",
        };
        f.write_str(s)
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    retries: Option<u32>,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retries: None,
            source: None,
        }
    }

    pub fn invalid_link(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidLink, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Download, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled")
    }

    /// Wraps an arbitrary error as [`ErrorKind::Base`], keeping its message.
    pub fn base<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(ErrorKind::Base, err.to_string()).with_source(err)
    }

    /// Maps a transport failure into `kind`. Cancellation and runtime task
    /// failures keep their own kinds regardless of the layer.
    pub fn from_transport(kind: ErrorKind, context: &str, err: TransportError) -> Self {
        match err {
            TransportError::Cancelled => Self::cancelled(),
            TransportError::Task(_) => {
                Self::new(ErrorKind::Base, format!("{}: {}", context, err)).with_source(err)
            }
            TransportError::Curl(_) => {
                Self::new(kind, format!("{}: {}", context, err)).with_source(err)
            }
        }
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub(crate) fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Message without the kind prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Number of retries performed before giving up, for exhausted exchange loops.
    pub fn retries(&self) -> Option<u32> {
        self.retries
    }

    pub fn is_retry_exhausted(&self) -> bool {
        self.kind == ErrorKind::Download && self.retries.is_some()
    }
}
