//! Naming a downloaded file when the caller only gave a directory.

/// Used when neither the response headers nor the URL yield a usable name.
pub const FALLBACK_FILENAME: &str = "download.bin";

/// Longest file name most Linux filesystems accept, in bytes.
const NAME_MAX: usize = 255;

/// Picks a file name from `Content-Disposition`, then from the last segment of
/// the served URL, then [`FALLBACK_FILENAME`]. Always sanitized.
pub fn derive_filename(final_url: &str, content_disposition: Option<&str>) -> String {
    content_disposition
        .and_then(filename_from_content_disposition)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty())
        .or_else(|| {
            filename_from_url(final_url)
                .map(|name| sanitize_filename(&name))
                .filter(|name| !name.is_empty())
        })
        .unwrap_or_else(|| FALLBACK_FILENAME.to_string())
}

/// Reads `filename*=UTF-8''…` (preferred) or `filename=…` from a
/// `Content-Disposition` value.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    let mut plain = None;
    for param in value.split(';').map(str::trim) {
        let Some((key, raw)) = param.split_once('=') else {
            continue;
        };
        let raw = raw.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let encoded = raw
                    .get(..7)
                    .filter(|p| p.eq_ignore_ascii_case("utf-8''"))
                    .map(|_| &raw[7..]);
                if let Some(name) = encoded.and_then(percent_decode).filter(|n| !n.is_empty()) {
                    return Some(name);
                }
            }
            "filename" => {
                let name = unquote(raw);
                if !name.is_empty() {
                    plain = Some(name);
                }
            }
            _ => {}
        }
    }
    plain
}

fn filename_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let last = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    percent_decode(last)
}

fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) else {
        return raw.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut escaped = false;
    for c in inner.chars() {
        if escaped || c != '\\' {
            out.push(c);
            escaped = false;
        } else {
            escaped = true;
        }
    }
    out
}

/// Decodes `%XX` escapes; `None` if the result is not UTF-8. Malformed
/// escapes are kept literally.
fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let hex = bytes
            .get(i + 1..i + 3)
            .and_then(|h| std::str::from_utf8(h).ok())
            .and_then(|h| u8::from_str_radix(h, 16).ok());
        match (bytes[i], hex) {
            (b'%', Some(b)) => {
                out.push(b);
                i += 3;
            }
            (b, _) => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).ok()
}

/// Makes `name` safe as a single path component: separators, control
/// characters and whitespace become `_` (runs collapsed), leading/trailing
/// dots and underscores are trimmed, and the result is capped at 255 bytes.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let bad = matches!(c, '/' | '\\' | '\0') || c.is_control() || c.is_whitespace();
        if !bad {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_disposition_forms() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=\"a \\\"b\\\".zip\""),
            Some("a \"b\".zip".to_string())
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=plain.txt"),
            Some("plain.txt".to_string())
        );
        assert_eq!(
            filename_from_content_disposition(
                "attachment; filename=\"fallback.zip\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"
            ),
            Some("résumé.pdf".to_string())
        );
        assert_eq!(filename_from_content_disposition("inline"), None);
    }

    #[test]
    fn url_segment_is_decoded() {
        assert_eq!(
            derive_filename("https://download.example/x/My%20Files.zip?token=abc", None),
            "My_Files.zip"
        );
    }

    #[test]
    fn header_wins_over_url() {
        assert_eq!(
            derive_filename("https://cdn.example/blob", Some("attachment; filename=real.mov")),
            "real.mov"
        );
    }

    #[test]
    fn falls_back_when_nothing_usable() {
        assert_eq!(derive_filename("https://cdn.example/", None), FALLBACK_FILENAME);
        assert_eq!(derive_filename("not a url", Some("attachment; filename=\"..\"")), FALLBACK_FILENAME);
    }

    #[test]
    fn sanitize_strips_traversal_and_separators() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("a\\b\tc"), "a_b_c");
        assert_eq!(sanitize_filename("..."), "");
    }

    #[test]
    fn sanitize_caps_length_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_filename(&long);
        assert!(out.len() <= 255);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn malformed_escape_kept() {
        assert_eq!(percent_decode("100%zz"), Some("100%zz".to_string()));
    }
}
