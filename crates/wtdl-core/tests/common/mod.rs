#![allow(dead_code)]

pub mod http_server;
pub mod scripted;

pub const LONG_LINK: &str = "https://wetransfer.com/downloads/abc123/def456";
pub const LONG_LINK_WITH_RECIPIENT: &str = "https://wetransfer.com/downloads/abc123/rcp789/def456";
pub const SHORT_LINK: &str = "https://we.tl/t-XyZ";
pub const EXCHANGE_URL: &str = "https://wetransfer.com/api/v4/transfers/abc123/download";
pub const DIRECT_URL: &str = "https://download.wetransfer.com/eu/abc123/photos.zip?sig=1";

/// Landing page markup carrying `token` the way the real page does.
pub fn landing_page(token: &str) -> String {
    format!(
        "<!doctype html><html><head><meta name=\"csrf-param\" content=\"authenticity_token\">\
<meta name=\"csrf-token\" content=\"{}\"></head><body></body></html>",
        token
    )
}
