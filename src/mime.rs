//! MIME type inference for inlined assets.
//!
//! Detection is by file extension only; content is never sniffed.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

/// MIME type used when the extension is not a known image type.
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Image formats recognized by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Portable Network Graphics with transparency
    Png,
    /// JPEG compressed image (no transparency)
    Jpeg,
    /// Graphics Interchange Format with animation support
    Gif,
    /// Scalable Vector Graphics (XML based)
    Svg,
    /// WebP format with transparency and animation
    Webp,
    /// AV1 image file format
    Avif,
    /// Bitmap image (uncompressed)
    Bmp,
    /// Icon format (multiple resolutions)
    Ico,
    /// Tagged image file format
    Tiff,
}

impl ImageFormat {
    /// MIME type for data URLs
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Svg => "image/svg+xml",
            Self::Webp => "image/webp",
            Self::Avif => "image/avif",
            Self::Bmp => "image/bmp",
            Self::Ico => "image/x-icon",
            Self::Tiff => "image/tiff",
        }
    }

    /// Detects image format by file extension (case insensitive)
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension()?.to_str()?.to_lowercase();

        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "svg" => Some(Self::Svg),
            "webp" => Some(Self::Webp),
            "avif" => Some(Self::Avif),
            "bmp" => Some(Self::Bmp),
            "ico" => Some(Self::Ico),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }
}

/// Returns MIME type for a repository path, defaulting to a generic binary type.
pub fn mime_for_path(path: &str) -> &'static str {
    ImageFormat::from_path(path)
        .map(|f| f.mime_type())
        .unwrap_or(DEFAULT_MIME)
}

/// Encodes bytes as a `data:<mime>;base64,<payload>` URI.
///
/// # Examples
///
/// ```
/// use gitdocs::data_uri;
///
/// assert_eq!(data_uri("img/dot.png", b"hi"), "data:image/png;base64,aGk=");
/// ```
pub fn data_uri(path: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for_path(path), STANDARD.encode(bytes))
}
