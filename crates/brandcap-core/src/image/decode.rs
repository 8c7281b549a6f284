//! Image loading: decode, orient, downscale, and re-encode for the model.

use futures_util::StreamExt;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use super::validate::Validator;
use crate::config::LimitsConfig;
use crate::error::ImageError;
use crate::llm::ImageInput;

/// An image ready to be sent to a vision model and saved alongside the captions.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// PNG-encoded pixels after orientation and downscaling
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Format the source was decoded from ("jpeg", "png", ...)
    pub source_format: String,
    /// Path or URL the image came from
    pub origin: String,
}

impl PreparedImage {
    /// Base64 payload for the LLM request.
    pub fn to_input(&self) -> ImageInput {
        ImageInput::from_bytes(&self.png, "png")
    }
}

/// Loads images from disk or the network with size limits and a decode timeout.
pub struct ImageLoader {
    limits: LimitsConfig,
    validator: Validator,
    client: reqwest::Client,
    fetch_timeout: Duration,
}

impl ImageLoader {
    pub fn new(limits: LimitsConfig, client: reqwest::Client, fetch_timeout: Duration) -> Self {
        Self {
            validator: Validator::new(limits.clone()),
            limits,
            client,
            fetch_timeout,
        }
    }

    /// Validate and load a local image file.
    pub async fn load_path(&self, path: &Path) -> Result<PreparedImage, ImageError> {
        self.validator.validate(path)?;
        let bytes = tokio::fs::read(path).await.map_err(|e| ImageError::Decode {
            origin: path.display().to_string(),
            message: format!("Cannot read file: {e}"),
        })?;
        self.load_bytes(bytes, &path.display().to_string()).await
    }

    /// Decode an in-memory image on a blocking task, bounded by the decode timeout.
    pub async fn load_bytes(&self, bytes: Vec<u8>, origin: &str) -> Result<PreparedImage, ImageError> {
        self.validator.validate_bytes(&bytes, origin)?;

        let max_dim = self.limits.max_image_dimension;
        let origin_owned = origin.to_string();
        let timeout_duration = Duration::from_millis(self.limits.decode_timeout_ms);

        let result = timeout(timeout_duration, async move {
            tokio::task::spawn_blocking(move || prepare_sync(bytes, &origin_owned, max_dim)).await
        })
        .await;

        match result {
            Ok(Ok(prepared)) => prepared,
            Ok(Err(e)) => Err(ImageError::Decode {
                origin: origin.to_string(),
                message: format!("Task join error: {e}"),
            }),
            Err(_) => Err(ImageError::Timeout {
                origin: origin.to_string(),
                timeout_ms: self.limits.decode_timeout_ms,
            }),
        }
    }

    /// Download an image found on a website, then load it.
    pub async fn fetch_remote(&self, url: &str) -> Result<PreparedImage, ImageError> {
        tracing::debug!("Downloading website image {url}");
        let download_err = |message: String| ImageError::Download {
            url: url.to_string(),
            message,
        };

        let resp = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| download_err(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(download_err(format!("HTTP {status}")));
        }

        // Reject on the declared length, then enforce the cap while streaming
        if let Some(len) = resp.content_length() {
            self.validator.check_size(len, url)?;
        }

        let mut bytes = Vec::new();
        let mut body = resp.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| download_err(e.to_string()))?;
            bytes.extend_from_slice(&chunk);
            self.validator.check_size(bytes.len() as u64, url)?;
        }
        self.load_bytes(bytes, url).await
    }
}

/// Synchronous decode pipeline (runs in spawn_blocking).
fn prepare_sync(bytes: Vec<u8>, origin: &str, max_dim: u32) -> Result<PreparedImage, ImageError> {
    let orientation = exif_orientation(&bytes);

    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode {
            origin: origin.to_string(),
            message: format!("Cannot detect image format: {e}"),
        })?;
    let format = reader.format().ok_or_else(|| ImageError::UnsupportedFormat {
        origin: origin.to_string(),
        message: "format could not be detected".to_string(),
    })?;
    let image = reader.decode().map_err(|e| ImageError::Decode {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;

    let image = apply_orientation(image, orientation);
    let image = downscale(image, max_dim);
    let (width, height) = image.dimensions();

    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| ImageError::Decode {
            origin: origin.to_string(),
            message: format!("PNG encode failed: {e}"),
        })?;

    Ok(PreparedImage {
        png: png.into_inner(),
        width,
        height,
        source_format: format_to_string(format),
        origin: origin.to_string(),
    })
}

/// Read the EXIF orientation tag (1-8). Missing or unreadable EXIF means 1.
fn exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    exif::Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
                .and_then(|f| f.value.get_uint(0))
        })
        .unwrap_or(1)
}

fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

/// Shrink so the longest edge is at most `max_dim`, keeping aspect ratio.
fn downscale(image: DynamicImage, max_dim: u32) -> DynamicImage {
    let (w, h) = image.dimensions();
    if w <= max_dim && h <= max_dim {
        return image;
    }
    image.resize(max_dim, max_dim, image::imageops::FilterType::Lanczos3)
}

/// Convert an ImageFormat to a string representation.
pub fn format_to_string(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Tiff => "tiff",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Avif => "avif",
        _ => "unknown",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn loader(limits: LimitsConfig) -> ImageLoader {
        ImageLoader::new(limits, reqwest::Client::new(), Duration::from_secs(5))
    }

    #[test]
    fn test_format_to_string() {
        assert_eq!(format_to_string(ImageFormat::Jpeg), "jpeg");
        assert_eq!(format_to_string(ImageFormat::WebP), "webp");
    }

    #[test]
    fn test_orientation_rotates_dimensions() {
        let img = DynamicImage::new_rgb8(40, 10);
        assert_eq!(apply_orientation(img.clone(), 6).dimensions(), (10, 40));
        assert_eq!(apply_orientation(img.clone(), 8).dimensions(), (10, 40));
        assert_eq!(apply_orientation(img.clone(), 3).dimensions(), (40, 10));
        assert_eq!(apply_orientation(img, 1).dimensions(), (40, 10));
    }

    #[test]
    fn test_downscale_keeps_aspect() {
        let img = DynamicImage::new_rgb8(400, 100);
        assert_eq!(downscale(img, 200).dimensions(), (200, 50));
        let small = DynamicImage::new_rgb8(50, 50);
        assert_eq!(downscale(small, 200).dimensions(), (50, 50));
    }

    #[test]
    fn test_exif_orientation_defaults_without_exif() {
        let png = encode(&DynamicImage::new_rgb8(4, 4), ImageFormat::Png);
        assert_eq!(exif_orientation(&png), 1);
    }

    #[tokio::test]
    async fn test_load_bytes_reencodes_as_png() {
        let jpeg = encode(&DynamicImage::new_rgb8(64, 32), ImageFormat::Jpeg);
        let prepared = loader(LimitsConfig::default())
            .load_bytes(jpeg, "memory.jpg")
            .await
            .unwrap();
        assert_eq!(prepared.source_format, "jpeg");
        assert_eq!((prepared.width, prepared.height), (64, 32));
        assert_eq!(&prepared.png[..4], &[0x89, b'P', b'N', b'G']);
        assert_eq!(prepared.to_input().media_type, "image/png");
    }

    #[tokio::test]
    async fn test_load_bytes_downscales_large_images() {
        let limits = LimitsConfig {
            max_image_dimension: 100,
            ..LimitsConfig::default()
        };
        let png = encode(&DynamicImage::new_rgb8(300, 150), ImageFormat::Png);
        let prepared = loader(limits).load_bytes(png, "big.png").await.unwrap();
        assert_eq!((prepared.width, prepared.height), (100, 50));
    }

    #[tokio::test]
    async fn test_load_path_detects_format_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let misnamed = dir.path().join("photo.jpg");
        std::fs::write(&misnamed, encode(&DynamicImage::new_rgb8(8, 8), ImageFormat::Png)).unwrap();

        let prepared = loader(LimitsConfig::default())
            .load_path(&misnamed)
            .await
            .unwrap();
        assert_eq!(prepared.source_format, "png");
        assert!(prepared.origin.ends_with("photo.jpg"));
    }

    #[tokio::test]
    async fn test_load_bytes_corrupt_png_fails() {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0u8; 32]);
        let err = loader(LimitsConfig::default())
            .load_bytes(bytes, "broken.png")
            .await
            .unwrap_err();
        assert!(matches!(err, ImageError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_fetch_remote_rejects_oversize_download() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let mut body = vec![0u8; 2 * 1024 * 1024 + 512];
        body[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(body),
            )
            .mount(&server)
            .await;

        let limits = LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        };
        let url = format!("{}/huge.jpg", server.uri());
        let err = loader(limits).fetch_remote(&url).await.unwrap_err();
        assert!(matches!(err, ImageError::FileTooLarge { size_mb: 2, max_mb: 1, .. }));
    }

    #[tokio::test]
    async fn test_fetch_remote_loads_small_download() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let png = encode(&DynamicImage::new_rgb8(12, 6), ImageFormat::Png);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png))
            .mount(&server)
            .await;

        let url = format!("{}/small.png", server.uri());
        let prepared = loader(LimitsConfig::default()).fetch_remote(&url).await.unwrap();
        assert_eq!((prepared.width, prepared.height), (12, 6));
        assert_eq!(prepared.origin, url);
    }
}
