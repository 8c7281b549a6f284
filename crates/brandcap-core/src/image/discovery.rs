//! Finding images in a directory for batch captioning.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions accepted in batch mode.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff"];

/// Discovers image files under a path.
pub struct ImageDiscovery {
    limit: usize,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredImage {
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl DiscoveredImage {
    /// File name for display and export naming.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Result of a discovery pass.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Images to process, sorted by path and capped at the limit
    pub images: Vec<DiscoveredImage>,
    /// Supported images found beyond the limit
    pub skipped: usize,
}

impl ImageDiscovery {
    /// `limit` is the maximum number of images returned.
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Discover supported images at a path.
    ///
    /// A file is returned as-is if supported; a directory is walked recursively.
    pub fn discover(&self, path: &Path) -> Discovery {
        let mut files = Vec::new();

        if path.is_file() {
            if is_supported(path) {
                if let Ok(meta) = std::fs::metadata(path) {
                    files.push(DiscoveredImage {
                        path: path.to_path_buf(),
                        size: meta.len(),
                    });
                }
            }
        } else {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && is_supported(entry_path) {
                    if let Ok(meta) = entry.metadata() {
                        files.push(DiscoveredImage {
                            path: entry_path.to_path_buf(),
                            size: meta.len(),
                        });
                    }
                }
            }
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let skipped = files.len().saturating_sub(self.limit);
        if skipped > 0 {
            tracing::warn!(
                "Found {} images, processing only the first {}",
                files.len(),
                self.limit
            );
            files.truncate(self.limit);
        }

        Discovery {
            images: files,
            skipped,
        }
    }
}

/// Check if a file has a supported extension.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("test.jpg")));
        assert!(is_supported(Path::new("test.JPG")));
        assert!(is_supported(Path::new("test.webp")));
        assert!(!is_supported(Path::new("test.txt")));
        assert!(!is_supported(Path::new("noext")));
    }

    #[test]
    fn test_discover_sorts_filters_and_caps() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.png", "a.jpg", "b.jpeg", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/d.gif"), b"x").unwrap();

        let found = ImageDiscovery::new(3).discover(dir.path());
        let names: Vec<_> = found.images.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpeg", "c.png"]);
        assert_eq!(found.skipped, 1);
    }

    #[test]
    fn test_discover_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.png");
        std::fs::write(&path, b"abc").unwrap();

        let found = ImageDiscovery::new(10).discover(&path);
        assert_eq!(found.images.len(), 1);
        assert_eq!(found.images[0].size, 3);
        assert_eq!(found.skipped, 0);
    }
}
