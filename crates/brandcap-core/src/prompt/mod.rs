//! Prompt composition: caption options, business context, category
//! templates, and the builder that merges them with website analysis.

mod builder;
mod options;
pub mod templates;

pub use builder::PromptBuilder;
pub use options::{
    BusinessContext, CaptionLength, CaptionOptions, CaptionStyle, CharacterLimit, TargetAudience,
};
pub use templates::{find_template, BusinessTemplate, TEMPLATES};
