//! Helpers for scrubbing values before they are written to logs.
//!
//! The shared key and staff PINs travel in query strings and request bodies;
//! neither should appear verbatim in log output.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Replaces the value of the `key` query parameter with `****`.
///
/// - `https://host/exec?key=abc&path=history` → `https://host/exec?key=****&path=history`
/// - `https://host/exec` → unchanged
pub fn redact_key_param(url: &str) -> String {
    let Some(query_start) = url.find('?') else {
        return url.to_string();
    };

    let (base, query) = url.split_at(query_start + 1);
    let redacted: Vec<String> = query
        .split('&')
        .map(|pair| {
            if pair == "key" || pair.starts_with("key=") {
                "key=****".to_string()
            } else {
                pair.to_string()
            }
        })
        .collect();

    format!("{}{}", base, redacted.join("&"))
}

/// Masks all but the last two characters of a PIN.
///
/// - `4471` → `**71`
/// - `7` → `*`
pub fn mask_pin(pin: &str) -> String {
    let chars: Vec<char> = pin.chars().collect();
    if chars.len() <= 2 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 2..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 2), visible)
}
