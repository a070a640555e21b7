//! Link target validation

use url::Url;

/// Schemes a rendered link may point at
const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Validate an untrusted link target
///
/// Returns the parsed URL when it is absolute and uses an allowed scheme.
/// Relative targets and schemes such as `javascript:` or `data:` are
/// rejected.
#[must_use]
pub fn safe_link_target(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    if ALLOWED_SCHEMES.contains(&url.scheme()) {
        Some(url)
    } else {
        tracing::debug!(scheme = url.scheme(), "rejected link target");
        None
    }
}
