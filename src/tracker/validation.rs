//! Submitted URL checks

use crate::error::{Error, Result};

/// Check a submitted URL and return it trimmed
///
/// The URL must be non-empty, parse as an absolute `http`/`https` URL, and
/// contain `source_marker` when one is configured.
pub(crate) fn validate_url(raw: &str, source_marker: Option<&str>) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("url is required".into()));
    }

    let parsed = url::Url::parse(trimmed)
        .map_err(|e| Error::InvalidInput(format!("url is not valid: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidInput(format!(
            "url scheme {:?} is not supported, use http or https",
            parsed.scheme()
        )));
    }

    if let Some(marker) = source_marker
        && !trimmed.contains(marker)
    {
        return Err(Error::InvalidInput(format!("url must point to {marker}")));
    }

    Ok(trimmed.to_string())
}
