//! Helpers for keeping studio paths and farm credentials out of span fields.

use std::path::Path;

/// Returns only the file name of a path.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Masks the userinfo part of a web service URL:
/// `http://user:pw@farm:8082` → `http://****@farm:8082`.
pub fn redact_url(url: &str) -> String {
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        let authority_end = rest.find('/').unwrap_or(rest.len());
        if let Some(at) = rest[..authority_end].rfind('@') {
            return format!("{}****@{}", &url[..scheme_end + 3], &rest[at + 1..]);
        }
    }
    url.to_string()
}
