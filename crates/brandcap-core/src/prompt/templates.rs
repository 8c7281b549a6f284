//! Predefined business category templates.
//!
//! A template supplies a sensible default tone for common kinds of business,
//! plus the keywords and CTA phrasing that usually suit them.

use super::options::CaptionStyle;

#[derive(Debug, Clone, Copy)]
pub struct BusinessTemplate {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub style: CaptionStyle,
    pub cta: &'static str,
}

pub const TEMPLATES: &[BusinessTemplate] = &[
    BusinessTemplate {
        name: "Restaurant/Food Service",
        keywords: &["cuisine", "dining", "menu", "chef", "fresh", "local"],
        style: CaptionStyle::Casual,
        cta: "Visit us today",
    },
    BusinessTemplate {
        name: "Fitness/Health",
        keywords: &["fitness", "health", "training", "wellness", "strength"],
        style: CaptionStyle::Inspirational,
        cta: "Start your journey",
    },
    BusinessTemplate {
        name: "Professional Services",
        keywords: &["expertise", "solutions", "consulting", "professional"],
        style: CaptionStyle::Professional,
        cta: "Contact us today",
    },
    BusinessTemplate {
        name: "Retail/E-commerce",
        keywords: &["products", "quality", "shopping", "collection"],
        style: CaptionStyle::Promotional,
        cta: "Shop now",
    },
    BusinessTemplate {
        name: "Tech/Software",
        keywords: &["innovation", "technology", "solutions", "digital"],
        style: CaptionStyle::Educational,
        cta: "Learn more",
    },
];

/// Find a template by case-insensitive name or prefix ("fitness", "tech").
pub fn find_template(query: &str) -> Option<&'static BusinessTemplate> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    TEMPLATES
        .iter()
        .find(|t| t.name.to_lowercase() == query)
        .or_else(|| {
            TEMPLATES
                .iter()
                .find(|t| t.name.to_lowercase().starts_with(&query))
        })
}

impl BusinessTemplate {
    /// Keywords joined for use as `focus_keywords`.
    pub fn keyword_list(&self) -> String {
        self.keywords.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_template_exact_and_prefix() {
        assert_eq!(find_template("Tech/Software").unwrap().style, CaptionStyle::Educational);
        assert_eq!(find_template("fitness").unwrap().name, "Fitness/Health");
        assert_eq!(find_template("RETAIL").unwrap().cta, "Shop now");
    }

    #[test]
    fn test_find_template_unknown() {
        assert!(find_template("spaceport").is_none());
        assert!(find_template("  ").is_none());
    }

    #[test]
    fn test_keyword_list() {
        let t = find_template("restaurant").unwrap();
        assert!(t.keyword_list().starts_with("cuisine, dining"));
    }
}
