//! Priority page discovery: which internal links are worth fetching.
//!
//! Links on the main page are scored by how likely they are to describe the
//! company (about, services, team pages) using keywords in the URL and link
//! text, navigation phrases, and a bonus for shallow paths.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

const HIGH_PRIORITY: &[&str] = &[
    "about", "company", "mission", "vision", "story", "history", "who-we-are", "our-team",
    "leadership", "founders", "values", "culture",
];

const MEDIUM_PRIORITY: &[&str] = &[
    "service", "product", "offering", "solution", "what-we-do", "expertise", "specialties",
    "capabilities", "features", "portfolio", "work",
];

const LOW_PRIORITY: &[&str] = &[
    "team", "staff", "experience", "case-studies", "testimonials", "reviews", "clients",
    "projects", "gallery", "showcase",
];

const NAV_PHRASES: &[&str] = &[
    "about us", "our services", "what we do", "our company", "our story", "meet the team",
    "our mission", "company info", "get to know us", "our expertise", "why choose us",
    "our approach", "company profile",
];

const SKIP_PATTERNS: &[&str] = &[
    "#", "mailto:", "tel:", "javascript:", ".pdf", ".jpg", ".png", ".gif", ".doc", ".docx",
    ".zip", ".csv", "login", "register", "cart", "checkout", "privacy", "terms", "cookie",
    "sitemap.xml", ".xml", "feed", "rss",
];

/// Score a link by its lowercased href and link text. Zero means "not interesting".
pub fn score_link(href: &str, text: &str) -> u32 {
    let count = |haystack: &str, words: &[&str]| {
        words.iter().filter(|w| haystack.contains(*w)).count() as u32
    };

    let mut score = count(href, HIGH_PRIORITY) * 15
        + count(href, MEDIUM_PRIORITY) * 10
        + count(href, LOW_PRIORITY) * 7
        + count(text, HIGH_PRIORITY) * 12
        + count(text, MEDIUM_PRIORITY) * 8
        + count(text, LOW_PRIORITY) * 5
        + count(text, NAV_PHRASES) * 20;

    match href.matches('/').count() {
        0..=3 => score += 5,
        4..=5 => score += 2,
        _ => {}
    }
    score
}

/// Resolve a link against the page if it stays on the same site.
///
/// Only root-relative and absolute links are followed.
fn resolve_same_site(base: &Url, href: &str) -> Option<Url> {
    let lower = href.to_lowercase();
    if !(lower.starts_with('/') || lower.starts_with("http")) {
        return None;
    }
    let url = base.join(href).ok()?;
    let host = url.host_str()?;
    (same_host(host, base.host_str()?)).then_some(url)
}

fn same_host(a: &str, b: &str) -> bool {
    let strip = |h: &str| h.to_lowercase().trim_start_matches("www.").to_string();
    strip(a) == strip(b)
}

fn without_trailing_slash(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

/// Pick the most promising internal pages to analyze after the main page.
///
/// Examines the first `max_links` links and returns at most `max_pages`
/// URLs, highest score first. Ties keep document order; the first score
/// seen for a URL wins. The main page itself is never returned.
pub fn discover_priority_pages(
    base: &Url,
    doc: &Html,
    max_links: usize,
    max_pages: usize,
) -> Vec<Url> {
    let base_key = without_trailing_slash(base);
    let mut scored: Vec<(Url, u32)> = Vec::new();

    for link in doc.select(&LINK_SELECTOR).take(max_links) {
        let Some(raw_href) = link.value().attr("href") else {
            continue;
        };
        let href = raw_href.trim().to_lowercase();
        if SKIP_PATTERNS.iter().any(|p| href.contains(p)) {
            continue;
        }
        let Some(url) = resolve_same_site(base, raw_href.trim()) else {
            continue;
        };

        let text = link
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let score = score_link(&href, &text);
        let key = without_trailing_slash(&url);
        if score == 0 || key == base_key || scored.iter().any(|(u, _)| without_trailing_slash(u) == key) {
            continue;
        }
        scored.push((url, score));
    }

    // sort_by is stable, so equal scores keep document order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(max_pages);
    scored.into_iter().map(|(url, _)| url).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.acme.com/").unwrap()
    }

    fn discover(html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);
        discover_priority_pages(&base(), &doc, 150, 10)
            .into_iter()
            .map(|u| u.to_string())
            .collect()
    }

    #[test]
    fn test_score_link_weights() {
        // "about" in href (15) + "about" in text (12) + "about us" phrase (20) + depth 1 (5)
        assert_eq!(score_link("/about", "about us"), 52);
        // medium in href only, shallow
        assert_eq!(score_link("/services", ""), 15);
        // nothing interesting but shallow still earns the depth bonus
        assert_eq!(score_link("/blog", "blog"), 5);
        // deep paths lose the bonus
        assert_eq!(score_link("/a/b/c/d/e/f", ""), 0);
    }

    #[test]
    fn test_discover_orders_by_score() {
        let pages = discover(
            r#"<a href="/gallery">Gallery</a>
               <a href="/services">Our Services</a>
               <a href="/about-us">About Us</a>"#,
        );
        assert_eq!(
            pages,
            vec![
                "https://www.acme.com/about-us",
                "https://www.acme.com/services",
                "https://www.acme.com/gallery",
            ]
        );
    }

    #[test]
    fn test_discover_skips_unwanted_links() {
        let pages = discover(
            r##"<a href="#top">Top</a>
               <a href="mailto:hi@acme.com">Email</a>
               <a href="/brochure.pdf">About brochure</a>
               <a href="/privacy-policy">Privacy</a>
               <a href="/login">Log in</a>
               <a href="https://other.com/about">Partner</a>
               <a href="team.html">Team</a>
               <a href="/">Home</a>"##,
        );
        assert!(pages.is_empty(), "unexpected pages: {pages:?}");
    }

    #[test]
    fn test_discover_accepts_same_host_absolute_links() {
        let pages = discover(r#"<a href="https://acme.com/company">Company</a>"#);
        assert_eq!(pages, vec!["https://acme.com/company"]);
    }

    #[test]
    fn test_discover_first_score_wins_and_caps() {
        let mut html = String::from(r#"<a href="/about">x</a><a href="/about/">About Us</a>"#);
        for i in 0..20 {
            html.push_str(&format!(r#"<a href="/blog-{i}">Blog</a>"#));
        }
        let doc = Html::parse_document(&html);
        let pages = discover_priority_pages(&base(), &doc, 150, 10);
        assert_eq!(pages.len(), 10);
        assert_eq!(pages[0].path(), "/about");
        assert_eq!(
            pages.iter().filter(|u| u.path().starts_with("/about")).count(),
            1
        );
    }

    #[test]
    fn test_discover_respects_link_scan_limit() {
        let html = r#"<a href="/blog">Blog</a><a href="/about">About</a>"#;
        let doc = Html::parse_document(html);
        let pages = discover_priority_pages(&base(), &doc, 1, 10);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].path(), "/blog");
    }
}
