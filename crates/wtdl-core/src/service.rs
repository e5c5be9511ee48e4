//! Fixed backend endpoints and protocol constants of the file-sharing service.

/// Host of share short links (`https://we.tl/t-…`).
pub const SHORT_LINK_HOST: &str = "we.tl";

/// Landing page scraped for the session (anti-forgery) token.
pub const ROOT_PAGE_URL: &str = "https://wetransfer.com/";

/// Prefix of the per-transfer exchange endpoint.
const EXCHANGE_BASE_URL: &str = "https://wetransfer.com/api/v4/transfers";

/// Redirect cap when expanding short links.
pub const SHORT_LINK_MAX_REDIRECTS: u32 = 5;

/// Header carrying the session token on the exchange request.
pub const TOKEN_HEADER: &str = "x-csrf-token";

/// Exchange endpoint for one transfer.
pub fn exchange_url(transfer_id: &str) -> String {
    format!("{}/{}/download", EXCHANGE_BASE_URL, transfer_id)
}
