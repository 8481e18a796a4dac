// Source locator classification and format hints

use musicplayer_core::{AudioError, Result};
use std::path::{Path, PathBuf};
use symphonia::core::probe::Hint;

/// Where a track is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Http(String),
    File(PathBuf),
}

impl Locator {
    /// Classify a locator string. Unknown schemes are source errors.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AudioError::InvalidUrl("empty locator".to_string()));
        }

        let lower = url.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Locator::Http(url.to_string()));
        }
        if lower.starts_with("file://") {
            let path = &url["file://".len()..];
            if path.is_empty() {
                return Err(AudioError::InvalidUrl(format!("no path in {}", url)));
            }
            return Ok(Locator::File(PathBuf::from(path)));
        }
        if url.contains("://") {
            let scheme = url.split("://").next().unwrap_or_default();
            return Err(AudioError::Source(format!("unsupported scheme '{}'", scheme)));
        }

        Ok(Locator::File(PathBuf::from(url)))
    }

    /// File extension of the resource, ignoring any query string or fragment
    pub fn extension(&self) -> Option<String> {
        let path = match self {
            Locator::Http(url) => {
                let without_query = url.split(['?', '#']).next().unwrap_or(url);
                let after_scheme = without_query.split("://").nth(1).unwrap_or(without_query);
                // Only the path component can carry an extension
                match after_scheme.find('/') {
                    Some(idx) => PathBuf::from(&after_scheme[idx..]),
                    None => return None,
                }
            }
            Locator::File(path) => path.clone(),
        };
        Path::new(&path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }
}

/// Build a probe hint from the locator extension and an optional MIME type
pub fn format_hint(locator: &Locator, content_type: Option<&str>) -> Hint {
    let mut hint = Hint::new();
    if let Some(extension) = locator.extension() {
        hint.with_extension(&extension);
    }
    if let Some(mime) = content_type {
        let mime = mime.split(';').next().unwrap_or(mime).trim();
        if mime.starts_with("audio/") {
            hint.mime_type(mime);
        }
    }
    hint
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_http() {
        let locator = Locator::parse("http://www.dre.vanderbilt.edu/~schmidt/braincandy.m4a").unwrap();
        assert!(matches!(locator, Locator::Http(_)));
        assert_eq!(locator.extension().as_deref(), Some("m4a"));
    }

    #[test]
    fn test_parse_file_forms() {
        assert_eq!(
            Locator::parse("file:///sdcard/song.mp3").unwrap(),
            Locator::File(PathBuf::from("/sdcard/song.mp3"))
        );
        assert_eq!(
            Locator::parse("/tmp/song.flac").unwrap(),
            Locator::File(PathBuf::from("/tmp/song.flac"))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_scheme() {
        let err = Locator::parse("bad://url").unwrap_err();
        assert!(matches!(err, AudioError::Source(_)));
        assert!(matches!(Locator::parse("  "), Err(AudioError::InvalidUrl(_))));
        assert!(matches!(Locator::parse("file://"), Err(AudioError::InvalidUrl(_))));
    }

    #[test]
    fn test_extension_ignores_query_and_host() {
        let locator = Locator::parse("https://cdn.example.com/a/b.MP3?token=1.2").unwrap();
        assert_eq!(locator.extension().as_deref(), Some("mp3"));

        let bare_host = Locator::parse("http://radio.example.com").unwrap();
        assert_eq!(bare_host.extension(), None);
    }
}
