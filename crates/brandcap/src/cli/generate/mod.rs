//! The `brandcap generate` command.

mod batch;
pub mod render;
mod setup;
pub mod types;

pub use setup::{apply_overrides, build_request, image_source, inject_api_key, validate_args, setup_generate};
pub use types::{Audience, Length, Limit, LlmProvider, OutputFormat, Style, Tier};

use brandcap_core::output::OutputFormat as CoreOutputFormat;
use brandcap_core::{Brandcap, BrandcapError, CaptionRequest, Config, Exporter, Generated, OutputWriter};
use clap::Args;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

pub use batch::process_batch;

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Image file, or a directory of images for batch mode
    pub input: Option<PathBuf>,

    /// Business name or type, e.g. "Rosie's Bakery" or "yoga studio"
    #[arg(short, long)]
    pub business: String,

    /// Company website to analyze for brand context
    #[arg(short, long)]
    pub website: Option<String>,

    /// Use the Nth image found on the website instead of a local file
    #[arg(long, value_name = "N", requires = "website")]
    pub website_image: Option<usize>,

    /// Use a remote image URL
    #[arg(long, value_name = "URL")]
    pub image_url: Option<String>,

    /// Generate captions without an image
    #[arg(long)]
    pub text_only: bool,

    /// Caption style (overrides the category template)
    #[arg(long, value_enum)]
    pub style: Option<Style>,

    /// Caption length
    #[arg(long, value_enum)]
    pub length: Option<Length>,

    /// Character-limit preset
    #[arg(long, value_enum)]
    pub limit: Option<Limit>,

    /// Leave out the call-to-action
    #[arg(long)]
    pub no_cta: bool,

    /// Comma-separated keywords to emphasize
    #[arg(long, default_value = "")]
    pub keywords: String,

    /// Comma-separated words to avoid
    #[arg(long, default_value = "")]
    pub avoid: String,

    /// Target audience
    #[arg(long, value_enum)]
    pub audience: Option<Audience>,

    /// Business category template (see `brandcap templates`)
    #[arg(long)]
    pub category: Option<String>,

    /// Cost tier: standard (cheaper) or premium
    #[arg(long, value_enum, default_value = "standard")]
    pub tier: Tier,

    /// LLM provider (defaults to `[llm].provider`)
    #[arg(long, value_enum)]
    pub provider: Option<LlmProvider>,

    /// Model name, overriding the tier's configured model
    #[arg(long)]
    pub model: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write JSON output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print only caption N, for piping into a clipboard tool
    #[arg(long, value_name = "N")]
    pub copy: Option<usize>,

    /// Save caption text, package, and image files to this directory
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    /// Save files to the configured export directory
    #[arg(long, conflicts_with = "save_dir")]
    pub save: bool,

    /// Concurrent generations in batch mode
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// API key for the selected provider (session-only, set by interactive mode)
    #[arg(skip)]
    pub api_key: Option<String>,
}

/// Manual Default impl for constructing GenerateArgs outside of clap.
///
/// Values match the clap defaults above. Used by the interactive module.
impl Default for GenerateArgs {
    fn default() -> Self {
        Self {
            input: None,
            business: String::new(),
            website: None,
            website_image: None,
            image_url: None,
            text_only: false,
            style: None,
            length: None,
            limit: None,
            no_cta: false,
            keywords: String::new(),
            avoid: String::new(),
            audience: None,
            category: None,
            tier: Tier::Standard,
            provider: None,
            model: None,
            format: OutputFormat::Text,
            output: None,
            copy: None,
            save_dir: None,
            save: false,
            parallel: None,
            api_key: None,
        }
    }
}

impl GenerateArgs {
    /// Directory for saved files, if saving was requested.
    pub fn export_dir(&self, config: &Config) -> Option<PathBuf> {
        match &self.save_dir {
            Some(dir) => Some(PathBuf::from(
                shellexpand::tilde(&dir.to_string_lossy()).into_owned(),
            )),
            None => self.save.then(|| config.export_dir()),
        }
    }
}

/// Everything assembled by setup_generate().
pub struct GenerateContext {
    /// Shared with interactive mode so the used-caption history carries over
    pub brandcap: Arc<Brandcap>,
    /// Request without an image source; each run fills one in
    pub request: CaptionRequest,
    pub config: Config,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs) -> anyhow::Result<()> {
    let ctx = setup_generate(&args)?;

    match &args.input {
        Some(path) if path.is_dir() => process_batch(&ctx, &args, path).await,
        _ => process_single(&ctx, &args).await,
    }
}

// ── Single request ─────────────────────────────────────────────────────────

async fn process_single(ctx: &GenerateContext, args: &GenerateArgs) -> anyhow::Result<()> {
    let request = ctx.request.clone().with_image(setup::image_source(args));
    let generated = run_with_spinner(&ctx.brandcap, &request).await?;
    emit(ctx, args, &generated)
}

/// Generate behind a spinner, turning known failures into friendly messages.
pub async fn run_with_spinner(
    brandcap: &Brandcap,
    request: &CaptionRequest,
) -> anyhow::Result<Generated> {
    let message = if request.context.website().is_some() {
        "Analyzing website and generating captions..."
    } else {
        "Generating captions..."
    };
    let spinner = render::spinner(message);
    let result = brandcap.generate(request).await;
    spinner.finish_and_clear();
    result.map_err(friendly_error)
}

/// Attach the matching hint to errors the user can act on.
pub fn friendly_error(error: BrandcapError) -> anyhow::Error {
    if let BrandcapError::Generation(e) = &error {
        if let Some((title, remedy)) = e.hint() {
            return anyhow::anyhow!("{title}: {e}\n\n  Hint: {remedy}");
        }
    }
    error.into()
}

/// Print, write, copy, and save one generation's results as requested.
fn emit(ctx: &GenerateContext, args: &GenerateArgs, generated: &Generated) -> anyhow::Result<()> {
    let set = &generated.captions;

    if let Some(n) = args.copy {
        let Some(variant) = set.variant(n) else {
            anyhow::bail!("Only {} captions were generated", set.variants.len());
        };
        println!("{}", variant.text);
    } else {
        match args.format {
            OutputFormat::Text => render::print_caption_set(set),
            OutputFormat::Json | OutputFormat::Jsonl => {
                write_json(ctx, args, std::slice::from_ref(set), true)?
            }
        }
    }

    if let Some(dir) = args.export_dir(&ctx.config) {
        let written = Exporter::new(dir).save_all(set, generated.image.as_ref())?;
        render::print_saved(&written);
    }
    Ok(())
}

/// Write records as JSON or JSONL to `--output` or stdout.
///
/// With `single`, JSON format writes the one record as an object, not an array.
pub(crate) fn write_json<T: Serialize>(
    ctx: &GenerateContext,
    args: &GenerateArgs,
    records: &[T],
    single: bool,
) -> anyhow::Result<()> {
    let format = match args.format {
        OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        _ => CoreOutputFormat::Json,
    };
    let pretty = ctx.config.output.pretty;

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut writer = OutputWriter::new(sink, format, pretty);
    match records {
        [record] if single => writer.write(record)?,
        _ => writer.write_all(records)?,
    }
    writer.flush()?;

    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_args_defaults() {
        let args = GenerateArgs::default();
        assert!(matches!(args.format, OutputFormat::Text));
        assert!(matches!(args.tier, Tier::Standard));
        assert!(args.input.is_none());
        assert!(!args.text_only);
        assert!(args.copy.is_none());
    }

    #[test]
    fn export_dir_from_flag_or_config() {
        let config = Config::default();
        let args = GenerateArgs::default();
        assert!(args.export_dir(&config).is_none());

        let args = GenerateArgs {
            save: true,
            ..Default::default()
        };
        assert_eq!(args.export_dir(&config), Some(config.export_dir()));

        let args = GenerateArgs {
            save_dir: Some(PathBuf::from("out")),
            ..Default::default()
        };
        assert_eq!(args.export_dir(&config), Some(PathBuf::from("out")));
    }

    #[test]
    fn friendly_error_adds_hint() {
        let err = BrandcapError::Generation(brandcap_core::GenerationError::Llm {
            message: "OpenAI HTTP 401 Unauthorized: bad key".to_string(),
            status_code: Some(401),
        });
        let message = friendly_error(err).to_string();
        assert!(message.starts_with("Authentication error"));
        assert!(message.contains("Hint:"));
    }
}
