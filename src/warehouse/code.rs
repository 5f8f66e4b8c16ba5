use once_cell::sync::Lazy;
use regex::Regex;

static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{1,4}-[0-9]{1,3}$").expect("code pattern compiles"));

/// Normalize a human-assigned code and check its shape.
///
/// Spaces become hyphens, then the result must be 1-4 uppercase ASCII letters,
/// a hyphen and 1-3 digits (`AB-12`, `WHSE-007`). Returns the normalized code,
/// or `None` when it does not match. Shared by locations, storages and
/// containers.
pub fn validate_code(raw: &str) -> Option<String> {
    let code = raw.replace(' ', "-");
    if CODE_PATTERN.is_match(&code) {
        Some(code)
    } else {
        None
    }
}
