//! Long-link path parsing into a [`TransferReference`].

use super::TransferReference;
use crate::error::{Error, Result};

/// First path segment of every long link.
const PATH_MARKER: &str = "downloads";

/// Parses a long share link.
///
/// Accepted paths (empty segments, query and fragment ignored):
/// - `/downloads/{transfer_id}/{security_hash}`
/// - `/downloads/{transfer_id}/{recipient_id}/{security_hash}`
///
/// Anything else is an [`ErrorKind::InvalidLink`](crate::ErrorKind::InvalidLink).
pub fn parse_transfer_url(url: &str) -> Result<TransferReference> {
    let parsed = url::Url::parse(url)
        .map_err(|e| Error::invalid_link(format!("not a URL: {}: {}", url, e)).with_source(e))?;

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let ids = match segments.split_first() {
        Some((&marker, rest)) if marker == PATH_MARKER => rest,
        _ => {
            return Err(Error::invalid_link(format!(
                "path of {} does not start with /{}/",
                url, PATH_MARKER
            )))
        }
    };

    let reference = match *ids {
        [transfer_id, security_hash] => TransferReference::new(transfer_id, security_hash, None),
        [transfer_id, recipient_id, security_hash] => TransferReference::new(
            transfer_id,
            security_hash,
            Some(recipient_id.to_string()),
        ),
        _ => {
            return Err(Error::invalid_link(format!(
                "expected 2 or 3 path segments after /{}/, got {}",
                PATH_MARKER,
                ids.len()
            )))
        }
    };

    reference.ok_or_else(|| Error::invalid_link(format!("empty identifier in {}", url)))
}
