//! Guided caption generation.
//!
//! Walks the user through: business → website → image source → category and
//! tone → generation, then offers the per-caption actions (mark used, copy,
//! save, regenerate) against the shared session so used captions are avoided
//! on later requests.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use brandcap_core::prompt::TEMPLATES;
use brandcap_core::{
    Brandcap, CaptionLength, CaptionRequest, CaptionSet, CaptionStyle, CharacterLimit, Exporter,
    ModelTier, PreparedImage, TargetAudience,
};
use console::Style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use super::theme::brandcap_theme;
use super::{handle_interrupt, Session};
use crate::cli::generate::{
    self, build_request, image_source, render, validate_args, GenerateArgs, GenerateContext, Tier,
};

/// What to do after the action menu closes.
enum Next {
    Regenerate,
    NewRequest,
    Menu,
}

/// Run guided generation until the user returns to the main menu.
pub async fn guided_generate(session: &Session) -> anyhow::Result<()> {
    let theme = brandcap_theme();

    loop {
        let Some((args, choices)) = prompt_request(&theme, session).await? else {
            return Ok(());
        };

        if let Err(e) = validate_args(&args) {
            print_error(&e.to_string());
            continue;
        }

        let request = match build_request(&args, &session.config) {
            Ok(request) => choices.apply(request),
            Err(e) => {
                print_error(&e.to_string());
                continue;
            }
        };

        // Folders go through the same batch path as `brandcap generate DIR`.
        if let Some(dir) = args.input.clone().filter(|p| p.is_dir()) {
            run_batch(&theme, session, args, request, &dir).await?;
            continue;
        }
        let request = request.with_image(image_source(&args));

        match generate_and_act(&theme, session, &request).await? {
            Next::NewRequest => continue,
            _ => return Ok(()),
        }
    }
}

async fn run_batch(
    theme: &ColorfulTheme,
    session: &Session,
    mut args: GenerateArgs,
    request: CaptionRequest,
    dir: &Path,
) -> anyhow::Result<()> {
    let export_dir = session.config.export_dir();
    let Some(save) = Confirm::with_theme(theme)
        .with_prompt(format!("Save caption files to {}?", export_dir.display()))
        .default(true)
        .interact_opt()?
    else {
        return Ok(());
    };
    args.save = save;

    let ctx = GenerateContext {
        brandcap: session.brandcap.clone(),
        request,
        config: session.config.clone(),
    };
    if let Err(e) = generate::process_batch(&ctx, &args, dir).await {
        print_error(&e.to_string());
    }
    Ok(())
}

/// Generate, show, and offer actions; repeats while the user asks to regenerate.
async fn generate_and_act(
    theme: &ColorfulTheme,
    session: &Session,
    request: &CaptionRequest,
) -> anyhow::Result<Next> {
    loop {
        let generated = match generate::run_with_spinner(&session.brandcap, request).await {
            Ok(generated) => generated,
            Err(e) => {
                print_error(&e.to_string());
                return Ok(Next::NewRequest);
            }
        };
        let mut set = generated.captions;
        let history = session.brandcap.history().await;
        render::print_caption_set_with_history(&set, Some(&history));

        match action_menu(theme, session, &mut set, generated.image.as_ref()).await? {
            Next::Regenerate => continue,
            other => return Ok(other),
        }
    }
}

const ACTIONS: &[&str] = &[
    "Mark / unmark a caption as used",
    "Show a caption for copying",
    "Save downloads",
    "Regenerate (avoiding used captions)",
    "New request",
    "Back to main menu",
];

async fn action_menu(
    theme: &ColorfulTheme,
    session: &Session,
    set: &mut CaptionSet,
    image: Option<&PreparedImage>,
) -> anyhow::Result<Next> {
    let green = Style::new().for_stderr().green();

    loop {
        let choice = Select::with_theme(theme)
            .with_prompt("What next?")
            .items(ACTIONS)
            .default(0)
            .interact_opt()?;

        match choice {
            Some(0) => {
                let Some(index) = pick_caption(theme, set)? else {
                    continue;
                };
                let text = set.variants[index].text.clone();
                let message = if session.brandcap.unmark_used(&text).await {
                    "Removed from usage history".to_string()
                } else {
                    let count = session.brandcap.mark_used(&text, &set.business).await;
                    format!("Marked as used ({count}x)")
                };
                eprintln!("  {} {message}", green.apply_to("✓"));

                let history = session.brandcap.history().await;
                for variant in &mut set.variants {
                    variant.previously_used = history.is_duplicate(&variant.text);
                }
                render::print_caption_set_with_history(set, Some(&history));
            }
            Some(1) => {
                if let Some(index) = pick_caption(theme, set)? {
                    eprintln!();
                    println!("{}", set.variants[index].text);
                    eprintln!();
                }
            }
            Some(2) => {
                let default_dir = session.config.export_dir().display().to_string();
                let Some(raw) = handle_interrupt(
                    Input::<String>::with_theme(theme)
                        .with_prompt("Save to directory")
                        .default(default_dir)
                        .interact_text(),
                )?
                else {
                    continue;
                };
                let dir = PathBuf::from(shellexpand::tilde(raw.trim()).into_owned());
                match Exporter::new(dir).save_all(set, image) {
                    Ok(written) => render::print_saved(&written),
                    Err(e) => print_error(&format!("Save failed: {e}")),
                }
            }
            Some(3) => return Ok(Next::Regenerate),
            Some(4) => return Ok(Next::NewRequest),
            _ => return Ok(Next::Menu),
        }
    }
}

fn pick_caption(theme: &ColorfulTheme, set: &CaptionSet) -> anyhow::Result<Option<usize>> {
    let items: Vec<String> = set
        .variants
        .iter()
        .map(|v| format!("{}: {}", render::caption_header(v), preview(&v.text, 60)))
        .collect();
    Ok(Select::with_theme(theme)
        .with_prompt("Which caption?")
        .items(&items)
        .default(0)
        .interact_opt()?)
}

fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > max_chars {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}

// ── Request form ───────────────────────────────────────────────────────────

/// Choices the form makes with core types; applied after `build_request`.
struct FormChoices {
    style: CaptionStyle,
    length: CaptionLength,
    limit: CharacterLimit,
    audience: TargetAudience,
    include_cta: bool,
}

impl FormChoices {
    fn apply(self, mut request: CaptionRequest) -> CaptionRequest {
        request.options.style = self.style;
        request.options.length = self.length;
        request.options.character_limit = self.limit;
        request.options.include_cta = self.include_cta;
        request.context.target_audience = self.audience;
        request
    }
}

/// Collect a request from the user. `None` means cancelled.
async fn prompt_request(
    theme: &ColorfulTheme,
    session: &Session,
) -> anyhow::Result<Option<(GenerateArgs, FormChoices)>> {
    let Some(business) = prompt_text(theme, "Business name or type", None, false)? else {
        return Ok(None);
    };
    let Some(website) =
        prompt_text(theme, "Company website (optional, Enter to skip)", None, true)?
    else {
        return Ok(None);
    };
    let website = Some(website).filter(|w| !w.trim().is_empty());

    let mut args = GenerateArgs {
        business,
        website,
        provider: Some(session.provider),
        api_key: session.api_key.clone(),
        ..Default::default()
    };

    if !prompt_image_source(theme, session, &mut args).await? {
        return Ok(None);
    }

    let category_items: Vec<String> = std::iter::once("None".to_string())
        .chain(TEMPLATES.iter().map(|t| t.name.to_string()))
        .collect();
    let Some(category) = Select::with_theme(theme)
        .with_prompt("Business category")
        .items(&category_items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(None);
    };
    let template = category.checked_sub(1).map(|i| &TEMPLATES[i]);
    args.category = template.map(|t| t.name.to_string());

    let default_style = template
        .map(|t| t.style)
        .unwrap_or(session.config.generation.style);
    let Some(style) = select(theme, "Caption style", &CaptionStyle::ALL, default_style)? else {
        return Ok(None);
    };
    let Some(length) = select(
        theme,
        "Caption length",
        &CaptionLength::ALL,
        session.config.generation.length,
    )?
    else {
        return Ok(None);
    };
    let Some(limit) = select(
        theme,
        "Character limit",
        &CharacterLimit::ALL,
        session.config.generation.character_limit,
    )?
    else {
        return Ok(None);
    };
    let Some(audience) = select(theme, "Target audience", &TargetAudience::ALL, TargetAudience::General)? else {
        return Ok(None);
    };

    let keyword_default = template.map(|t| t.keyword_list());
    let Some(keywords) =
        prompt_text(theme, "Focus keywords (comma-separated, optional)", keyword_default, true)?
    else {
        return Ok(None);
    };
    let Some(avoid) = prompt_text(theme, "Words to avoid (optional)", None, true)? else {
        return Ok(None);
    };
    args.keywords = keywords;
    args.avoid = avoid;

    let Some(include_cta) = Confirm::with_theme(theme)
        .with_prompt("Include a call-to-action?")
        .default(session.config.generation.include_cta)
        .interact_opt()?
    else {
        return Ok(None);
    };

    let tiers = [ModelTier::Standard, ModelTier::Premium];
    let tier_items: Vec<&str> = tiers.iter().map(|t| t.label()).collect();
    let Some(tier) = Select::with_theme(theme)
        .with_prompt("Model tier")
        .items(&tier_items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(None);
    };
    args.tier = if tier == 1 { Tier::Premium } else { Tier::Standard };

    let choices = FormChoices {
        style,
        length,
        limit,
        audience,
        include_cta,
    };
    Ok(Some((args, choices)))
}

const IMAGE_SOURCES: &[&str] = &[
    "Local image file (or a folder for batch captions)",
    "Image from the company website",
    "Image URL",
    "Text only (no image)",
];

/// Fill in the image source fields. Returns `false` if cancelled.
async fn prompt_image_source(
    theme: &ColorfulTheme,
    session: &Session,
    args: &mut GenerateArgs,
) -> anyhow::Result<bool> {
    let warn = Style::new().for_stderr().yellow();

    loop {
        let default = if args.website.is_some() { 1 } else { 0 };
        let Some(choice) = Select::with_theme(theme)
            .with_prompt("Image source")
            .items(IMAGE_SOURCES)
            .default(default)
            .interact_opt()?
        else {
            return Ok(false);
        };

        match choice {
            0 => {
                let Some(raw) = prompt_text(theme, "Path to image or folder", None, false)? else {
                    return Ok(false);
                };
                let path = PathBuf::from(shellexpand::tilde(raw.trim()).into_owned());
                if !path.exists() {
                    eprintln!(
                        "  {}",
                        warn.apply_to(format!("Path not found: {}", path.display()))
                    );
                    continue;
                }
                args.input = Some(path);
            }
            1 => {
                let Some(url) = args.website.clone() else {
                    eprintln!("  {}", warn.apply_to("Enter a company website to use its images."));
                    continue;
                };
                match pick_website_image(theme, &session.brandcap, &url).await? {
                    Some(index) => args.website_image = Some(index),
                    None => continue,
                }
            }
            2 => {
                let Some(url) = prompt_text(theme, "Image URL", None, false)? else {
                    return Ok(false);
                };
                args.image_url = Some(url.trim().to_string());
            }
            _ => args.text_only = true,
        }
        return Ok(true);
    }
}

/// Analyze the site and let the user pick one of its images (1-based).
async fn pick_website_image(
    theme: &ColorfulTheme,
    brandcap: &Brandcap,
    url: &str,
) -> anyhow::Result<Option<usize>> {
    let warn = Style::new().for_stderr().yellow();

    let spinner = render::spinner("Analyzing website...");
    let result = brandcap.analyze(url).await;
    spinner.finish_and_clear();

    let analysis = match result {
        Ok(analysis) => analysis,
        Err(e) => {
            eprintln!("  {}", warn.apply_to(format!("{e}")));
            eprintln!("  {}", warn.apply_to(e.hint()));
            return Ok(None);
        }
    };
    if analysis.images.is_empty() {
        eprintln!("  {}", warn.apply_to("No usable images found on the website."));
        return Ok(None);
    }

    let items: Vec<String> = analysis
        .images
        .iter()
        .map(|img| format!("{} ({})", img.description, img.url))
        .collect();
    let choice = Select::with_theme(theme)
        .with_prompt("Website image")
        .items(&items)
        .default(0)
        .interact_opt()?;
    Ok(choice.map(|i| i + 1))
}

// ── Prompt helpers ─────────────────────────────────────────────────────────

fn prompt_text(
    theme: &ColorfulTheme,
    prompt: &str,
    default: Option<String>,
    allow_empty: bool,
) -> anyhow::Result<Option<String>> {
    let mut input = Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(allow_empty);
    if let Some(default) = default {
        input = input.default(default);
    }
    handle_interrupt(input.interact_text())
}

/// Select one of `options`, starting on `default`.
fn select<T: Copy + PartialEq + Display>(
    theme: &ColorfulTheme,
    prompt: &str,
    options: &[T],
    default: T,
) -> anyhow::Result<Option<T>> {
    let items: Vec<String> = options.iter().map(ToString::to_string).collect();
    let start = options.iter().position(|o| *o == default).unwrap_or(0);
    let choice = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&items)
        .default(start)
        .interact_opt()?;
    Ok(choice.map(|i| options[i]))
}

fn print_error(message: &str) {
    let red = Style::new().for_stderr().red();
    eprintln!();
    eprintln!("  {} {message}", red.apply_to("✗"));
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_first_line() {
        assert_eq!(preview("short\nsecond", 60), "short");
        assert_eq!(preview(&"é".repeat(70), 60), format!("{}...", "é".repeat(60)));
    }
}
