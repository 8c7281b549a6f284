//! Generate setup: config overrides, flag validation, request assembly.

use std::sync::Arc;

use brandcap_core::prompt::find_template;
use brandcap_core::{Brandcap, BusinessContext, CaptionRequest, Config, ImageSource};

use super::types::{LlmProvider, OutputFormat};
use super::{GenerateArgs, GenerateContext};

/// Validate flags, load config, and assemble everything needed to generate.
pub fn setup_generate(args: &GenerateArgs) -> anyhow::Result<GenerateContext> {
    validate_args(args)?;

    let mut config = Config::load()?;
    apply_overrides(args, &mut config);

    let request = build_request(args, &config)?;
    let brandcap = Arc::new(Brandcap::new(config.clone()));

    Ok(GenerateContext {
        brandcap,
        request,
        config,
    })
}

/// Reject flag combinations that cannot be satisfied.
pub fn validate_args(args: &GenerateArgs) -> anyhow::Result<()> {
    if args.business.trim().is_empty() {
        anyhow::bail!("--business must not be empty");
    }

    let sources = [
        args.input.is_some(),
        args.website_image.is_some(),
        args.image_url.is_some(),
    ];
    let source_count = sources.iter().filter(|s| **s).count();
    if source_count > 1 {
        anyhow::bail!("Use only one of INPUT, --website-image, or --image-url");
    }
    if args.text_only && source_count > 0 {
        anyhow::bail!("--text-only cannot be combined with an image source");
    }
    if args.website_image.is_some() && args.website.is_none() {
        anyhow::bail!("--website-image requires --website");
    }
    if args.website_image == Some(0) {
        anyhow::bail!("--website-image is 1-based; use 1 for the first image");
    }
    if args.copy.is_some() && !matches!(args.format, OutputFormat::Text) {
        anyhow::bail!("--copy prints plain caption text and cannot be combined with --format json or jsonl");
    }

    if let Some(path) = &args.input {
        if !path.exists() {
            anyhow::bail!(
                "Input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
                path
            );
        }
        if path.is_dir() && args.copy.is_some() {
            anyhow::bail!("--copy only works with a single image");
        }
    }
    Ok(())
}

/// Apply provider, key, and concurrency flags to the loaded config.
pub fn apply_overrides(args: &GenerateArgs, config: &mut Config) {
    if let Some(provider) = args.provider {
        config.llm.provider = provider.to_string();
    }

    // A session key from the interactive flow goes straight into the config
    // so the provider factory finds it without an env var.
    if let Some(key) = &args.api_key {
        let provider = args
            .provider
            .or_else(|| LlmProvider::from_name(&config.llm.provider))
            .unwrap_or(LlmProvider::Openai);
        inject_api_key(&mut config.llm, provider, key);
    }

    if let Some(parallel) = args.parallel {
        config.generation.parallel = parallel.max(1);
    }
}

/// Build the request every image shares. The image source is filled in later.
pub fn build_request(args: &GenerateArgs, config: &Config) -> anyhow::Result<CaptionRequest> {
    let context = BusinessContext {
        business: args.business.trim().to_string(),
        website_url: args.website.clone().filter(|w| !w.trim().is_empty()),
        focus_keywords: args.keywords.trim().to_string(),
        avoid_words: args.avoid.trim().to_string(),
        target_audience: args.audience.map(Into::into).unwrap_or_default(),
    };

    let mut request = CaptionRequest::from_config(context, &config.generation)
        .with_tier(args.tier.into())
        .with_model(args.model.clone());

    let explicit_style = args.style.map(Into::into);
    match &args.category {
        Some(name) => {
            let Some(template) = find_template(name) else {
                anyhow::bail!(
                    "Unknown category '{name}'.\n\n  Hint: Run `brandcap templates` to list categories."
                );
            };
            tracing::debug!("Using category template '{}'", template.name);
            request = request.with_template(template, explicit_style);
        }
        None => {
            if let Some(style) = explicit_style {
                request = request.with_style(style);
            }
        }
    }

    if let Some(length) = args.length {
        request.options.length = length.into();
    }
    if let Some(limit) = args.limit {
        request.options.character_limit = limit.into();
    }
    if args.no_cta {
        request.options.include_cta = false;
    }

    Ok(request)
}

/// Image source for a single (non-batch) request.
pub fn image_source(args: &GenerateArgs) -> ImageSource {
    if args.text_only {
        return ImageSource::None;
    }
    if let Some(path) = &args.input {
        return ImageSource::Path(path.clone());
    }
    if let Some(index) = args.website_image {
        return ImageSource::WebsiteImage(index);
    }
    match &args.image_url {
        Some(url) => ImageSource::Url(url.clone()),
        None => ImageSource::None,
    }
}

/// Inject a session API key into the LLM config for the specified provider.
pub fn inject_api_key(
    llm_config: &mut brandcap_core::config::LlmConfig,
    provider: LlmProvider,
    key: &str,
) {
    match provider {
        LlmProvider::Anthropic => {
            let cfg = llm_config.anthropic.get_or_insert_with(Default::default);
            cfg.api_key = key.to_string();
        }
        LlmProvider::Openai => {
            let cfg = llm_config.openai.get_or_insert_with(Default::default);
            cfg.api_key = key.to_string();
        }
        LlmProvider::Ollama => {} // Ollama doesn't use API keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::generate::types::{Length, Style};
    use brandcap_core::{CaptionLength, CaptionStyle, ModelTier};
    use std::path::PathBuf;

    fn args(business: &str) -> GenerateArgs {
        GenerateArgs {
            business: business.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_blank_business() {
        assert!(validate_args(&args("  ")).is_err());
    }

    #[test]
    fn rejects_text_only_with_image() {
        let a = GenerateArgs {
            text_only: true,
            image_url: Some("https://example.com/a.jpg".into()),
            ..args("cafe")
        };
        let err = validate_args(&a).unwrap_err().to_string();
        assert!(err.contains("--text-only"));
    }

    #[test]
    fn rejects_copy_with_json_format() {
        for format in [OutputFormat::Json, OutputFormat::Jsonl] {
            let a = GenerateArgs {
                copy: Some(1),
                format,
                ..args("cafe")
            };
            let err = validate_args(&a).unwrap_err().to_string();
            assert!(err.contains("--copy"));
        }

        let a = GenerateArgs {
            copy: Some(1),
            ..args("cafe")
        };
        assert!(validate_args(&a).is_ok());
    }

    #[test]
    fn website_image_requires_website() {
        let a = GenerateArgs {
            website_image: Some(2),
            ..args("cafe")
        };
        assert!(validate_args(&a).is_err());

        let a = GenerateArgs {
            website: Some("cafe.example".into()),
            website_image: Some(2),
            ..args("cafe")
        };
        assert!(validate_args(&a).is_ok());
    }

    #[test]
    fn rejects_missing_input_path() {
        let a = GenerateArgs {
            input: Some(PathBuf::from("/definitely/not/here.jpg")),
            ..args("cafe")
        };
        let err = validate_args(&a).unwrap_err().to_string();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn rejects_multiple_image_sources() {
        let dir = tempfile::tempdir().unwrap();
        let a = GenerateArgs {
            input: Some(dir.path().to_path_buf()),
            image_url: Some("https://example.com/a.jpg".into()),
            ..args("cafe")
        };
        assert!(validate_args(&a).is_err());
    }

    #[test]
    fn build_request_applies_flags() {
        let a = GenerateArgs {
            website: Some("  ".into()),
            keywords: " fresh, local ".into(),
            style: Some(Style::Casual),
            length: Some(Length::Short),
            no_cta: true,
            tier: crate::cli::generate::types::Tier::Premium,
            model: Some("gpt-4.1".into()),
            ..args(" bakery ")
        };
        let request = build_request(&a, &Config::default()).unwrap();
        assert_eq!(request.context.business, "bakery");
        assert!(request.context.website_url.is_none());
        assert_eq!(request.context.focus_keywords, "fresh, local");
        assert_eq!(request.options.style, CaptionStyle::Casual);
        assert_eq!(request.options.length, CaptionLength::Short);
        assert!(!request.options.include_cta);
        assert_eq!(request.tier, ModelTier::Premium);
        assert_eq!(request.model_override.as_deref(), Some("gpt-4.1"));
    }

    #[test]
    fn category_template_sets_style_unless_explicit() {
        let a = GenerateArgs {
            category: Some("fitness".into()),
            ..args("gym")
        };
        let request = build_request(&a, &Config::default()).unwrap();
        assert_eq!(request.options.style, CaptionStyle::Inspirational);

        let a = GenerateArgs {
            category: Some("fitness".into()),
            style: Some(Style::Educational),
            ..args("gym")
        };
        let request = build_request(&a, &Config::default()).unwrap();
        assert_eq!(request.options.style, CaptionStyle::Educational);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let a = GenerateArgs {
            category: Some("spaceport".into()),
            ..args("gym")
        };
        let err = build_request(&a, &Config::default()).unwrap_err().to_string();
        assert!(err.contains("brandcap templates"));
    }

    #[test]
    fn image_source_selection() {
        assert_eq!(image_source(&args("cafe")), ImageSource::None);
        let a = GenerateArgs {
            website_image: Some(3),
            ..args("cafe")
        };
        assert_eq!(image_source(&a), ImageSource::WebsiteImage(3));
        let a = GenerateArgs {
            input: Some(PathBuf::from("a.jpg")),
            ..args("cafe")
        };
        assert_eq!(image_source(&a), ImageSource::Path(PathBuf::from("a.jpg")));
    }

    #[test]
    fn overrides_provider_key_and_parallel() {
        let mut config = Config::default();
        let a = GenerateArgs {
            provider: Some(LlmProvider::Anthropic),
            api_key: Some("sk-ant-test".into()),
            parallel: Some(0),
            ..args("cafe")
        };
        apply_overrides(&a, &mut config);
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.anthropic.unwrap().api_key, "sk-ant-test");
        assert_eq!(config.generation.parallel, 1);
    }
}
