//! Link resolution: short link → long link → direct, time-limited download URL.

mod direct;
mod short_link;

pub use direct::{exchange_payload, resolve_direct_url};
pub use short_link::resolve_short_link;
