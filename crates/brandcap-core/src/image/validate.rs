//! Input validation before decoding.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::ImageError;

/// Validates image inputs before decoding.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation of a local file before full decode.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - File has valid image magic bytes
    pub fn validate(&self, path: &Path) -> Result<(), ImageError> {
        if !path.exists() {
            return Err(ImageError::FileNotFound(path.to_path_buf()));
        }

        let origin = path.display().to_string();
        let metadata = std::fs::metadata(path).map_err(|e| ImageError::Decode {
            origin: origin.clone(),
            message: format!("Cannot read metadata: {e}"),
        })?;
        self.check_size(metadata.len(), &origin)?;

        let mut file = std::fs::File::open(path).map_err(|e| ImageError::Decode {
            origin: origin.clone(),
            message: format!("Cannot open file: {e}"),
        })?;
        let mut header = [0u8; 12];
        let bytes_read = file.read(&mut header).unwrap_or(0);
        Self::check_header(&header, bytes_read, &origin)
    }

    /// Validate an in-memory image (e.g. one downloaded from a website).
    pub fn validate_bytes(&self, bytes: &[u8], origin: &str) -> Result<(), ImageError> {
        self.check_size(bytes.len() as u64, origin)?;
        let mut header = [0u8; 12];
        let n = bytes.len().min(12);
        header[..n].copy_from_slice(&bytes[..n]);
        Self::check_header(&header, n, origin)
    }

    pub(crate) fn check_size(&self, len: u64, origin: &str) -> Result<(), ImageError> {
        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if len > max_bytes {
            return Err(ImageError::FileTooLarge {
                origin: origin.to_string(),
                size_mb: len / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }
        Ok(())
    }

    fn check_header(header: &[u8; 12], bytes_read: usize, origin: &str) -> Result<(), ImageError> {
        if bytes_read < 4 {
            return Err(ImageError::Decode {
                origin: origin.to_string(),
                message: "File too small to be a valid image".to_string(),
            });
        }
        if !Self::is_valid_image_header(header, bytes_read) {
            return Err(ImageError::UnsupportedFormat {
                origin: origin.to_string(),
                message: "unrecognized image format (invalid magic bytes)".to_string(),
            });
        }
        Ok(())
    }

    /// Check if the header bytes match a supported image format.
    fn is_valid_image_header(header: &[u8; 12], bytes_read: usize) -> bool {
        if bytes_read < 4 {
            return false;
        }

        // JPEG: FF D8 FF
        if header[..3] == [0xFF, 0xD8, 0xFF] {
            return true;
        }

        // PNG: 89 50 4E 47
        if header[..4] == [0x89, b'P', b'N', b'G'] {
            return true;
        }

        // GIF: GIF8
        if &header[..4] == b"GIF8" {
            return true;
        }

        // WebP: RIFF....WEBP
        if &header[..4] == b"RIFF" {
            if bytes_read >= 12 {
                return &header[8..12] == b"WEBP";
            }
            return true;
        }

        // BMP: BM
        if &header[..2] == b"BM" {
            return true;
        }

        // TIFF: II*\0 or MM\0*
        if header[..4] == [b'I', b'I', 0x2A, 0x00] || header[..4] == [b'M', b'M', 0x00, 0x2A] {
            return true;
        }

        // HEIC/HEIF/AVIF: ftyp box at offset 4
        bytes_read >= 12 && &header[4..8] == b"ftyp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator::new(LimitsConfig::default())
    }

    #[test]
    fn test_magic_bytes_jpeg() {
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(Validator::is_valid_image_header(&header, 12));
    }

    #[test]
    fn test_magic_bytes_png() {
        let header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert!(Validator::is_valid_image_header(&header, 12));
    }

    #[test]
    fn test_magic_bytes_webp() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert!(Validator::is_valid_image_header(&header, 12));
        let wave = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'A', b'V', b'E'];
        assert!(!Validator::is_valid_image_header(&wave, 12));
    }

    #[test]
    fn test_magic_bytes_tiff() {
        let le = [b'I', b'I', 0x2A, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];
        let be = [b'M', b'M', 0x00, 0x2A, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(Validator::is_valid_image_header(&le, 12));
        assert!(Validator::is_valid_image_header(&be, 12));
        // Bare "II" without the version bytes is not TIFF
        let bare = [b'I', b'I', 0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(!Validator::is_valid_image_header(&bare, 12));
    }

    #[test]
    fn test_magic_bytes_invalid() {
        let header = *b"%PDF-1.7\n\0\0\0";
        assert!(!Validator::is_valid_image_header(&header, 12));
    }

    #[test]
    fn test_validate_missing_file() {
        let err = validator()
            .validate(Path::new("/definitely/not/here.jpg"))
            .unwrap_err();
        assert!(matches!(err, ImageError::FileNotFound(_)));
    }

    #[test]
    fn test_validate_rejects_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.jpg");
        std::fs::write(&path, "this is not an image").unwrap();
        let err = validator().validate(&path).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_validate_bytes_too_large() {
        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let mut bytes = vec![0u8; 2 * 1024 * 1024];
        bytes[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        let err = Validator::new(limits)
            .validate_bytes(&bytes, "https://example.com/a.jpg")
            .unwrap_err();
        assert!(matches!(err, ImageError::FileTooLarge { size_mb: 2, max_mb: 1, .. }));
    }

    #[test]
    fn test_validate_bytes_too_short() {
        let err = validator().validate_bytes(&[0xFF], "tiny").unwrap_err();
        assert!(err.to_string().contains("too small"));
    }
}
