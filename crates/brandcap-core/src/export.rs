//! Plain-text downloads: caption files, caption packages, the prepared
//! image, and combined batch files.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::image::PreparedImage;
use crate::types::CaptionSet;

const PACKAGE_RULE: usize = 50;
const BATCH_RULE: usize = 60;
const BATCH_ITEM_RULE: usize = 40;

/// Make a business name safe for file names: spaces and path separators become `_`.
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "business".to_string()
    } else {
        cleaned
    }
}

/// The caption package: a short header followed by the captions.
pub fn package_text(set: &CaptionSet) -> String {
    format!(
        "Social Media Captions for {business}\n\
         Generated on: {generated}\n\
         Style: {style}\n\
         Length: {length}\n\
         Mode: {mode}\n\n\
         {rule}\n\n\
         {captions}",
        business = set.business,
        generated = set.generated_at.format("%Y-%m-%d %H:%M"),
        style = set.options.style,
        length = set.options.length,
        mode = set.options.mode_label(),
        rule = "=".repeat(PACKAGE_RULE),
        captions = set.captions_text(),
    )
}

/// One image's captions in a batch run.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub file_name: String,
    pub captions: CaptionSet,
}

impl BatchItem {
    /// File stem plus extension, so `a.jpg` and `a.png` get separate outputs.
    fn output_name(&self) -> String {
        let path = Path::new(&self.file_name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_name.clone());
        match path.extension() {
            Some(ext) => format!("{stem}_{}", ext.to_string_lossy().to_lowercase()),
            None => stem,
        }
    }
}

/// All batch results in one file, separated by rules.
pub fn batch_combined_text(business: &str, items: &[BatchItem], generated: DateTime<Local>) -> String {
    let style = items
        .first()
        .map(|item| item.captions.options.style.label())
        .unwrap_or_default();
    let rule = "=".repeat(BATCH_RULE);

    let mut out = format!(
        "Batch Social Media Captions\n\
         Generated: {}\n\
         Business: {business}\n\
         Style: {style}\n\
         Images Processed: {}\n\
         {rule}\n\n",
        generated.format("%Y-%m-%d %H:%M"),
        items.len(),
    );
    for (i, item) in items.iter().enumerate() {
        out.push_str(&format!("IMAGE {}: {}\n", i + 1, item.file_name));
        out.push_str(&"-".repeat(BATCH_ITEM_RULE));
        out.push('\n');
        out.push_str(&item.captions.captions_text());
        out.push_str(&format!("\n\n{rule}\n\n"));
    }
    out
}

/// Writes downloads into one directory, creating it on first use.
pub struct Exporter {
    dir: PathBuf,
}

impl Exporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_file(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        fs::write(&path, contents)?;
        tracing::debug!("Wrote {:?}", path);
        Ok(path)
    }

    /// `social_captions_<business>.txt` with the caption text only.
    pub fn write_captions(&self, set: &CaptionSet) -> Result<PathBuf> {
        let name = format!("social_captions_{}.txt", sanitize_name(&set.business));
        self.write_file(&name, set.captions_text().as_bytes())
    }

    /// `caption_package_<business>_<YYYYmmdd_HHMM>.txt`.
    pub fn write_package(&self, set: &CaptionSet) -> Result<PathBuf> {
        let name = format!(
            "caption_package_{}_{}.txt",
            sanitize_name(&set.business),
            set.generated_at.format("%Y%m%d_%H%M")
        );
        self.write_file(&name, package_text(set).as_bytes())
    }

    /// `<business>_<YYYYmmdd>.png`: the image exactly as sent to the model.
    pub fn write_image(&self, set: &CaptionSet, image: &PreparedImage) -> Result<PathBuf> {
        let name = format!(
            "{}_{}.png",
            sanitize_name(&set.business),
            set.generated_at.format("%Y%m%d")
        );
        self.write_file(&name, &image.png)
    }

    /// Every download for a single generation. The image is skipped in text-only mode.
    pub fn save_all(&self, set: &CaptionSet, image: Option<&PreparedImage>) -> Result<Vec<PathBuf>> {
        let mut written = vec![self.write_captions(set)?, self.write_package(set)?];
        if let Some(image) = image.filter(|_| !set.options.text_only) {
            written.push(self.write_image(set, image)?);
        }
        Ok(written)
    }

    /// `captions_<stem>_<ext>.txt` per image plus `batch_captions_combined_<ts>.txt`.
    pub fn write_batch(&self, business: &str, items: &[BatchItem]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(items.len() + 1);
        for item in items {
            let name = format!("captions_{}.txt", item.output_name());
            written.push(self.write_file(&name, item.captions.captions_text().as_bytes())?);
        }

        let now = Local::now();
        let name = format!("batch_captions_combined_{}.txt", now.format("%Y%m%d_%H%M"));
        written.push(self.write_file(&name, batch_combined_text(business, items, now).as_bytes())?);
        Ok(written)
    }
}
