//! Share-link modeling: short-link detection and long-link parsing.
//!
//! A long link carries the identifiers the exchange endpoint needs; a short
//! link (`https://we.tl/t-…`) carries nothing usable and must be expanded by
//! following its redirects first (see [`crate::resolve::resolve_short_link`]).

mod parse;

pub use parse::parse_transfer_url;

use crate::service;

/// Identifiers of one shared transfer, extracted from a long link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReference {
    transfer_id: String,
    security_hash: String,
    recipient_id: Option<String>,
}

impl TransferReference {
    /// Returns `None` if either required identifier is empty.
    pub fn new(
        transfer_id: impl Into<String>,
        security_hash: impl Into<String>,
        recipient_id: Option<String>,
    ) -> Option<Self> {
        let transfer_id = transfer_id.into();
        let security_hash = security_hash.into();
        if transfer_id.is_empty() || security_hash.is_empty() {
            return None;
        }
        Some(Self {
            transfer_id,
            security_hash,
            recipient_id: recipient_id.filter(|r| !r.is_empty()),
        })
    }

    pub fn transfer_id(&self) -> &str {
        &self.transfer_id
    }

    pub fn security_hash(&self) -> &str {
        &self.security_hash
    }

    /// Present only for links shared by email.
    pub fn recipient_id(&self) -> Option<&str> {
        self.recipient_id.as_deref()
    }
}

/// True if `url` points at the short-link host and needs redirect expansion.
pub fn is_short_link(url: &str) -> bool {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(service::SHORT_LINK_HOST)))
        .unwrap_or(false)
}
