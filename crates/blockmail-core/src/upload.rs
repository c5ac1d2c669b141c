//! Image upload: local files become inline data URLs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{CoreError, CoreResult};

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Encodes an uploaded image as a `data:` URL for an image-source field.
pub fn image_data_url(mime: &str, bytes: &[u8]) -> CoreResult<String> {
    let mime = mime.trim().to_ascii_lowercase();
    if !mime.starts_with("image/") || mime.len() == "image/".len() {
        return Err(CoreError::validation("Please choose an image file"));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(CoreError::validation("Image must be 5MB or smaller"));
    }
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Guesses an image MIME type from a file extension.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::is_valid_image_source;

    #[test]
    fn test_encodes_data_url() {
        let url = image_data_url("image/png", b"abc").unwrap();
        assert_eq!(url, "data:image/png;base64,YWJj");
        assert!(is_valid_image_source(&url));
    }

    #[test]
    fn test_rejects_non_images() {
        assert!(image_data_url("application/pdf", b"%PDF").is_err());
        assert!(image_data_url("image/", b"x").is_err());
    }

    #[test]
    fn test_rejects_oversized() {
        let bytes = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(image_data_url("image/jpeg", &bytes).is_err());
        assert!(image_data_url("image/jpeg", &bytes[..MAX_IMAGE_BYTES]).is_ok());
    }

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_for_extension("JPG"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("txt"), None);
    }
}
