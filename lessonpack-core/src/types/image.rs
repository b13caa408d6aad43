//! Image references used by the gallery and visual-aid tracks

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to an image, as stored by the viewer.
///
/// Uploaded images are kept as `data:` URLs; anything else (remote URLs,
/// relative paths) is an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Build a `data:` URL reference from raw image bytes
    pub fn from_bytes(mime_type: &str, data: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", mime_type, STANDARD.encode(data)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse this reference as a canonical base64 `data:` URL.
    ///
    /// Returns `None` for anything that would not re-encode to exactly the
    /// same string, so callers can always fall back to the raw reference.
    pub fn as_data_url(&self) -> Option<DataUrl> {
        let rest = self.0.strip_prefix("data:")?;
        let (mime_type, payload) = rest.split_once(";base64,")?;

        if mime_type.is_empty()
            || !mime_type.contains('/')
            || mime_type.contains(|c| matches!(c, ';' | ',' | ' '))
        {
            return None;
        }

        let data = STANDARD.decode(payload).ok()?;
        if STANDARD.encode(&data) != payload {
            return None;
        }

        Some(DataUrl {
            mime_type: mime_type.to_string(),
            data,
        })
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.starts_with("data:") {
            let head = self.0.split(',').next().unwrap_or_default();
            write!(f, "{},<{} bytes>", head, self.0.len())
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for ImageRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ImageRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Decoded `data:` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl DataUrl {
    /// File extension to use when the image is stored as a file
    pub fn extension(&self) -> &'static str {
        extension_for_mime(&self.mime_type)
    }
}

/// Map a MIME type to a file extension
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        "image/avif" => "avif",
        _ => "bin",
    }
}

/// Guess an image MIME type from a file extension
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_parse() {
        let image = ImageRef::from_bytes("image/png", &[1, 2, 3, 4]);
        let parsed = image.as_data_url().unwrap();
        assert_eq!(parsed.mime_type, "image/png");
        assert_eq!(parsed.data, vec![1, 2, 3, 4]);
        assert_eq!(parsed.extension(), "png");
    }

    #[test]
    fn test_non_canonical_data_url_is_opaque() {
        // Missing padding would not re-encode to the same text
        assert!(ImageRef::new("data:image/png;base64,AQID").as_data_url().is_some());
        assert!(ImageRef::new("data:image/png;base64,AQIDBA").as_data_url().is_none());
        assert!(ImageRef::new("data:image/png;charset=x;base64,AQID").as_data_url().is_none());
        assert!(ImageRef::new("data:text,hello").as_data_url().is_none());
        assert!(ImageRef::new("https://example.com/a.png").as_data_url().is_none());
    }

    #[test]
    fn test_display_truncates_data_urls() {
        let image = ImageRef::from_bytes("image/gif", &[0u8; 64]);
        let shown = image.to_string();
        assert!(shown.starts_with("data:image/gif;base64,<"));
        assert_eq!(ImageRef::new("a.png").to_string(), "a.png");
    }

    #[test]
    fn test_mime_mapping() {
        assert_eq!(mime_for_extension("JPEG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("txt"), None);
        assert_eq!(extension_for_mime("image/svg+xml"), "svg");
        assert_eq!(extension_for_mime("application/x-unknown"), "bin");
    }
}
