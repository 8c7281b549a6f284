//! Prompt assembly from business context, options, and website analysis.

use super::options::{BusinessContext, CaptionOptions};
use crate::types::WebsiteAnalysis;

/// Closing block shared by every prompt: asks for three blank-line separated captions.
const FORMAT_BLOCK: &str = "Format as 3 separate captions, each on its own paragraph:

[First caption without emojis/hashtags]

[Second caption without emojis/hashtags]

[Third caption without emojis/hashtags]";

/// Number of scraped services mentioned in the prompt.
const PROMPT_SERVICES: usize = 3;

/// Characters of scraped about-text mentioned in the prompt.
const PROMPT_ABOUT_CHARS: usize = 200;

/// Builds caption prompts.
///
/// With a website analysis the prompt is grounded in the company's own
/// description, services, and about text; without one it falls back to the
/// business type the user entered.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the prompt for one generation request.
    pub fn build(
        context: &BusinessContext,
        options: &CaptionOptions,
        analysis: Option<&WebsiteAnalysis>,
    ) -> String {
        match analysis {
            Some(analysis) => Self::enhanced(context, options, analysis),
            None => Self::basic(context, options),
        }
    }

    /// Append the "make them different" instruction used when regenerating.
    ///
    /// `attempt` is zero-based; attempt 0 returns the prompt unchanged.
    pub fn with_retry_suffix(prompt: &str, attempt: u32) -> String {
        if attempt == 0 {
            return prompt.to_string();
        }
        format!(
            "{prompt}\n\nRETRY #{}: Create completely different, fresh captions that are unique \
             and haven't been used before. Use different phrases, angles, and approaches.",
            attempt + 1
        )
    }

    fn enhanced(
        context: &BusinessContext,
        options: &CaptionOptions,
        analysis: &WebsiteAnalysis,
    ) -> String {
        let business_input = context.enhanced_description();
        let company_name = analysis
            .company_name()
            .unwrap_or_else(|| context.business.trim().to_string());
        let services = analysis
            .services
            .iter()
            .take(PROMPT_SERVICES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let about: String = analysis.about_text.chars().take(PROMPT_ABOUT_CHARS).collect();
        let story_topic = if options.text_only { " about the business" } else { "" };

        let requirements = format!(
            "Requirements:
- Each caption should be exactly {length} long
- NO emojis or hashtags
- Style: {style}
- {limit}
- {cta}
- Focus on connecting with the audience through authentic storytelling{story_topic}{avoid}",
            length = options.length.sentences(),
            style = options.style.instruction(),
            limit = options.character_limit.instruction(),
            cta = options.cta_instruction(),
            avoid = Self::avoid_line(context),
        );

        let company_info = format!(
            "Company Information:
- Business Type: {business_input}
- Description: {description}
- Services: {services}
- About: {about}",
            description = analysis.description,
        );

        if options.text_only {
            format!(
                "Create 3 engaging social media captions for {company_name} based on the company \
                 information provided (no image reference needed).\n\n\
                 {company_info}\n\n\
                 {requirements}\n\n\
                 {FORMAT_BLOCK}"
            )
        } else {
            format!(
                "Create 3 engaging social media captions for {company_name} using the uploaded image.\n\n\
                 {company_info}\n\n\
                 {requirements}\n\
                 - Reference the image content appropriately and naturally\n\n\
                 {FORMAT_BLOCK}"
            )
        }
    }

    fn basic(context: &BusinessContext, options: &CaptionOptions) -> String {
        let described = context.enhanced_description();
        let business_type = if described.trim().is_empty() {
            "business".to_string()
        } else {
            described
        };

        let requirements = format!(
            "Requirements:
- Each caption should be exactly {length} long
- NO emojis or hashtags
- Style: {style}
- Include storytelling elements that connect with the audience
- {limit}
- {cta}{avoid}",
            length = options.length.sentences(),
            style = options.style.instruction(),
            limit = options.character_limit.instruction(),
            cta = options.cta_instruction(),
            avoid = Self::avoid_line(context),
        );

        if options.text_only {
            format!(
                "Create 3 engaging social media captions for a {business_type} based on the \
                 business type provided.\n\n\
                 {requirements}\n\
                 - Create engaging content about typical {business_type} activities, values, or services\n\n\
                 {FORMAT_BLOCK}"
            )
        } else {
            format!(
                "Create 3 engaging social media captions for a {business_type} using this image.\n\n\
                 {requirements}\n\
                 - Reference the image content naturally\n\n\
                 {FORMAT_BLOCK}"
            )
        }
    }

    fn avoid_line(context: &BusinessContext) -> String {
        let avoid = context.avoid_words.trim();
        if avoid.is_empty() {
            String::new()
        } else {
            format!("\n- Avoid these words: {avoid}")
        }
    }
}
