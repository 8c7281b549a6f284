//! Website analysis: fetch a company site and extract brand context.
//!
//! ```text
//! URL → main page → priority links → secondary pages → about text, services, images
//! ```

mod analyzer;
pub mod cache;
mod discover;
mod extract;
mod fetch;
mod images;

pub use analyzer::WebsiteAnalyzer;
pub use discover::{discover_priority_pages, score_link};
pub use extract::{
    element_text, extract_meta, extract_page_content, merge_about_text, merge_services,
    PageContent, PageMeta,
};
pub use fetch::{normalize_url, FetchedPage, PageFetcher};
pub use images::{absolute_image_url, extract_images};
