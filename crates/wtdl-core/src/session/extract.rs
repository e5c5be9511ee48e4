//! Token extraction strategies for the landing page markup.

use regex::Regex;
use std::sync::OnceLock;

/// Finds the anti-forgery token in a page body.
///
/// Kept behind a trait so the scan (regex today) can become a structured
/// HTML parse without touching the session fetcher.
pub trait TokenExtractor: Send + Sync {
    fn extract(&self, page: &str) -> Option<String>;
}

/// Scans for `<meta name="csrf-token" content="…">`, in either attribute order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaTagExtractor;

fn meta_token_re() -> &'static Regex {
    static RE_META: OnceLock<Regex> = OnceLock::new();
    RE_META.get_or_init(|| {
        Regex::new(
            r#"(?is)<meta\b[^>]*?\bname\s*=\s*["']csrf-token["'][^>]*?\bcontent\s*=\s*["']([^"']+)["']|<meta\b[^>]*?\bcontent\s*=\s*["']([^"']+)["'][^>]*?\bname\s*=\s*["']csrf-token["']"#,
        )
        .expect("compile RE_META")
    })
}

impl TokenExtractor for MetaTagExtractor {
    fn extract(&self, page: &str) -> Option<String> {
        let caps = meta_token_re().captures(page)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty())
    }
}
