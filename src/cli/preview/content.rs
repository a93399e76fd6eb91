//! Client script injection for served HTML.

use crate::embed::preview::script_tag;

/// Inject the preview client if the response is HTML.
pub fn maybe_inject_client(body: Vec<u8>, content_type: &str) -> Vec<u8> {
    if crate::utils::mime::is_html(content_type) {
        inject_client_script(&body)
    } else {
        body
    }
}

/// Insert the client `<script>` before the last `</body>`, or append it.
fn inject_client_script(content: &[u8]) -> Vec<u8> {
    const PATTERN: &[u8] = b"</body>";

    let script = script_tag();
    let script_bytes = script.as_bytes();
    let mut result = Vec::with_capacity(content.len() + script_bytes.len());

    match content
        .windows(PATTERN.len())
        .rposition(|w| w.eq_ignore_ascii_case(PATTERN))
    {
        Some(pos) => {
            result.extend_from_slice(&content[..pos]);
            result.extend_from_slice(script_bytes);
            result.extend_from_slice(&content[pos..]);
        }
        None => {
            result.extend_from_slice(content);
            result.extend_from_slice(script_bytes);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types::{CSS, HTML};

    #[test]
    fn test_inject_before_body_close() {
        let html = b"<html><body><p>x</p></BODY></html>".to_vec();
        let out = String::from_utf8(maybe_inject_client(html, HTML)).unwrap();
        let script = script_tag();
        assert_eq!(out, format!("<html><body><p>x</p>{script}</BODY></html>"));
    }

    #[test]
    fn test_append_without_body() {
        let out = String::from_utf8(maybe_inject_client(b"<p>x</p>".to_vec(), HTML)).unwrap();
        assert!(out.starts_with("<p>x</p>") && out.ends_with("</script>"));
    }

    #[test]
    fn test_non_html_untouched() {
        let css = b"body{}".to_vec();
        assert_eq!(maybe_inject_client(css.clone(), CSS), css);
    }
}
