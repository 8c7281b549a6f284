//! Text extraction from fetched pages: meta tags, about text, and services.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static META_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="description"]"#).unwrap());
static META_KEYWORDS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[name="keywords"]"#).unwrap());
static ABOUT_BY_CLASS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div, section, p, h1, h2, h3, article").unwrap());
static ABOUT_BY_ID: Lazy<Selector> = Lazy::new(|| Selector::parse("div, section").unwrap());
static MAIN_CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse("main, article").unwrap());
static SERVICE_BLOCKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div, section, li, h2, h3, h4, article").unwrap());
static SERVICE_LISTS: Lazy<Selector> = Lazy::new(|| Selector::parse("ul, ol").unwrap());

const ABOUT_CLASS_WORDS: &[&str] = &[
    "about", "mission", "vision", "story", "who-we-are", "company", "intro", "overview",
];
const ABOUT_ID_WORDS: &[&str] = &["about", "mission", "vision", "story", "company"];
const ABOUT_NOISE: &[&str] = &["cookie", "privacy", "terms", "menu", "navigation"];
const SERVICE_CLASS_WORDS: &[&str] = &[
    "service", "product", "offering", "solution", "feature", "specialty", "expertise",
];
const SERVICE_NOISE: &[&str] = &["read more", "learn more", "contact", "click here", "view all"];

const ABOUT_SECTIONS_PER_PAGE: usize = 8;
const SERVICE_SECTIONS_PER_PAGE: usize = 12;
const MAX_ABOUT_CHARS: usize = 1200;
const MAX_SERVICES: usize = 15;

/// Title and meta tags from a page's head.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub keywords: String,
}

/// Brand text found on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// Combined about text, if the page had enough of it
    pub about_text: Option<String>,
    pub services: Vec<String>,
}

pub fn extract_meta(doc: &Html) -> PageMeta {
    let meta_content = |selector: &Selector| {
        doc.select(selector)
            .next()
            .and_then(|m| m.value().attr("content"))
            .map(|c| c.trim().to_string())
            .unwrap_or_default()
    };

    PageMeta {
        title: doc
            .select(&TITLE)
            .next()
            .map(|t| t.text().collect::<String>().trim().to_string())
            .unwrap_or_default(),
        description: meta_content(&META_DESCRIPTION),
        keywords: meta_content(&META_KEYWORDS),
    }
}

/// Visible text of an element: trimmed fragments joined with single spaces.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn class_matches(el: &ElementRef<'_>, words: &[&str]) -> bool {
    el.value().classes().any(|class| {
        let class = class.to_lowercase();
        words.iter().any(|w| class.contains(w))
    })
}

fn id_matches(el: &ElementRef<'_>, words: &[&str]) -> bool {
    el.value()
        .id()
        .map(|id| {
            let id = id.to_lowercase();
            words.iter().any(|w| id.contains(w))
        })
        .unwrap_or(false)
}

/// Pull about text and service snippets from one page.
pub fn extract_page_content(doc: &Html) -> PageContent {
    PageContent {
        about_text: page_about_text(doc),
        services: page_services(doc),
    }
}

fn page_about_text(doc: &Html) -> Option<String> {
    let sections = doc
        .select(&ABOUT_BY_CLASS)
        .filter(|el| class_matches(el, ABOUT_CLASS_WORDS))
        .chain(
            doc.select(&ABOUT_BY_ID)
                .filter(|el| id_matches(el, ABOUT_ID_WORDS)),
        )
        .chain(doc.select(&MAIN_CONTENT))
        .take(ABOUT_SECTIONS_PER_PAGE);

    let texts: Vec<String> = sections
        .map(element_text)
        .filter(|text| {
            let lower = text.to_lowercase();
            text.chars().count() > 50 && !ABOUT_NOISE.iter().any(|n| lower.contains(n))
        })
        .collect();

    let combined = texts.join(" ");
    (combined.chars().count() > 30).then_some(combined)
}

fn page_services(doc: &Html) -> Vec<String> {
    doc.select(&SERVICE_BLOCKS)
        .filter(|el| class_matches(el, SERVICE_CLASS_WORDS))
        .chain(
            doc.select(&SERVICE_LISTS)
                .filter(|el| class_matches(el, &["service"])),
        )
        .take(SERVICE_SECTIONS_PER_PAGE)
        .map(element_text)
        .filter(|text| {
            let len = text.chars().count();
            len > 15 && len < 200
        })
        .collect()
}

/// Merge about text from several pages, dropping near-duplicates.
///
/// Texts of ten words or fewer are ignored. A text is dropped when more
/// than 70% of its distinct words appear in any single text already kept.
pub fn merge_about_text(texts: &[String]) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut seen: Vec<HashSet<String>> = Vec::new();

    for text in texts {
        let words: Vec<String> = text.to_lowercase().split_whitespace().map(String::from).collect();
        if words.len() <= 10 {
            continue;
        }
        let distinct: HashSet<String> = words.into_iter().collect();
        let overlaps = seen.iter().any(|prior| {
            let shared = distinct.intersection(prior).count();
            shared as f64 / distinct.len() as f64 > 0.7
        });
        if !overlaps {
            kept.push(text);
            seen.push(distinct);
        }
    }

    kept.join(" ").chars().take(MAX_ABOUT_CHARS).collect()
}

/// Drop link-like noise, dedupe case-insensitively (first wins), cap at 15.
pub fn merge_services(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|s| {
            let lower = s.to_lowercase();
            !SERVICE_NOISE.iter().any(|n| lower.contains(n))
        })
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(MAX_SERVICES)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_ABOUT: &str = "Founded in 1998, Rosie's Bakery has baked sourdough \
        and pastries for our neighbourhood every single morning.";

    #[test]
    fn test_extract_meta() {
        let doc = Html::parse_document(
            r#"<html><head><title> Rosie's Bakery | Fresh bread </title>
               <meta name="description" content="Neighbourhood bakery">
               <meta name="keywords" content="bread, cakes"></head></html>"#,
        );
        let meta = extract_meta(&doc);
        assert_eq!(meta.title, "Rosie's Bakery | Fresh bread");
        assert_eq!(meta.description, "Neighbourhood bakery");
        assert_eq!(meta.keywords, "bread, cakes");
    }

    #[test]
    fn test_extract_meta_missing_tags() {
        let meta = extract_meta(&Html::parse_document("<p>hi</p>"));
        assert_eq!(meta, PageMeta::default());
    }

    #[test]
    fn test_about_text_from_class_id_and_main() {
        let html = format!(
            r#"<div class="hero about-section"><p>{LONG_ABOUT}</p></div>
               <section id="mission">Our mission is simple: honest bread made slowly with care.</section>
               <div class="about-short">Too short</div>"#
        );
        let content = extract_page_content(&Html::parse_document(&html));
        let about = content.about_text.unwrap();
        assert!(about.starts_with("Founded in 1998"));
        assert!(about.contains("Our mission is simple"));
        assert!(!about.contains("Too short"));
    }

    #[test]
    fn test_about_text_skips_noise() {
        let html = r#"<div class="company-footer">We use cookies to improve your experience on this website, see our policy.</div>"#;
        let content = extract_page_content(&Html::parse_document(html));
        assert!(content.about_text.is_none());
    }

    #[test]
    fn test_services_length_window() {
        let html = r#"
            <ul class="services-list">
              <li class="service-item">Custom wedding cakes</li>
              <li class="service-item">Bread</li>
            </ul>
            <div class="product-card">Daily sourdough loaves baked before dawn</div>"#;
        let content = extract_page_content(&Html::parse_document(html));
        assert!(content.services.contains(&"Custom wedding cakes".to_string()));
        assert!(content
            .services
            .contains(&"Daily sourdough loaves baked before dawn".to_string()));
        assert!(!content.services.contains(&"Bread".to_string()));
    }

    #[test]
    fn test_merge_about_text_drops_overlap_and_short() {
        let a = "we bake fresh bread every morning for the whole neighbourhood with love".to_string();
        let b = "We bake fresh bread every morning for the whole neighbourhood with care".to_string();
        let c = "short text only".to_string();
        let d = "our catering team serves weddings birthdays and office parties across the city".to_string();
        let merged = merge_about_text(&[a.clone(), b, c, d.clone()]);
        assert_eq!(merged, format!("{a} {d}"));
    }

    #[test]
    fn test_merge_about_text_truncates() {
        let long = "word ".repeat(400);
        assert_eq!(merge_about_text(&[long]).chars().count(), 1200);
    }

    #[test]
    fn test_merge_services_filters_and_dedupes() {
        let items: Vec<String> = [
            "Wedding Cakes",
            "wedding cakes",
            "Read more about us",
            "Contact our team",
            "Catering",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(merge_services(&items), vec!["Wedding Cakes", "Catering"]);
    }

    #[test]
    fn test_merge_services_caps_at_fifteen() {
        let items: Vec<String> = (0..30).map(|i| format!("Service number {i}")).collect();
        assert_eq!(merge_services(&items).len(), 15);
    }
}
