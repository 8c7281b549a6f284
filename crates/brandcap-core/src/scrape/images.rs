//! Candidate images from a page that could accompany a post.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::types::WebsiteImage;

static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

/// `<img>` tags examined per page.
const MAX_TAGS: usize = 10;

/// Smallest declared width/height kept.
const MIN_DIMENSION: u32 = 200;

const SKIP_PATTERNS: &[&str] = &["logo", "icon", "favicon", "avatar", "thumb", "badge", "button"];

/// Collect up to `max_images` post-worthy images from the first ten `<img>` tags.
pub fn extract_images(base: &Url, doc: &Html, max_images: usize) -> Vec<WebsiteImage> {
    doc.select(&IMG)
        .take(MAX_TAGS)
        .filter_map(|img| candidate(base, img))
        .take(max_images)
        .collect()
}

fn candidate(base: &Url, img: ElementRef<'_>) -> Option<WebsiteImage> {
    let attr = |name: &str| img.value().attr(name).map(str::trim).unwrap_or_default();

    let src = Some(attr("src"))
        .filter(|s| !s.is_empty())
        .or_else(|| Some(attr("data-src")).filter(|s| !s.is_empty()))?;
    let url = absolute_image_url(base, src)?;

    let lower = url.to_lowercase();
    if SKIP_PATTERNS.iter().any(|p| lower.contains(p)) {
        return None;
    }
    if !has_suitable_dimensions(attr("width"), attr("height")) {
        return None;
    }

    let alt = attr("alt").to_string();
    let title = attr("title").to_string();
    let description = if !alt.is_empty() {
        alt.clone()
    } else if !title.is_empty() {
        title.clone()
    } else {
        "Website image".to_string()
    };

    Some(WebsiteImage {
        url,
        alt,
        title,
        description,
    })
}

/// `//cdn/x.jpg` becomes `https://cdn/x.jpg`; relative paths join against the page.
pub fn absolute_image_url(base: &Url, src: &str) -> Option<String> {
    if let Some(rest) = src.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    base.join(src).ok().map(String::from)
}

/// Images declaring both dimensions must be at least 200x200.
/// Missing or non-numeric dimensions are allowed through.
fn has_suitable_dimensions(width: &str, height: &str) -> bool {
    match (width.parse::<u32>(), height.parse::<u32>()) {
        (Ok(w), Ok(h)) => w >= MIN_DIMENSION && h >= MIN_DIMENSION,
        _ => true,
    }
}
