//! The `brandcap analyze` command: show what website analysis finds.

use brandcap_core::output::OutputFormat as CoreOutputFormat;
use brandcap_core::{Brandcap, Config, OutputWriter, WebsiteAnalysis};
use clap::Args;

use super::generate::render;
use super::generate::OutputFormat;

/// Characters of about-text shown in the text report.
const ABOUT_PREVIEW_CHARS: usize = 300;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Website URL (the scheme is optional)
    pub url: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub async fn execute(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = Config::load()?;
    let pretty = config.output.pretty;
    let brandcap = Brandcap::new(config);

    let spinner = render::spinner("Analyzing website...");
    let result = brandcap.analyze(&args.url).await;
    spinner.finish_and_clear();

    let analysis = match result {
        Ok(analysis) => analysis,
        Err(e) => anyhow::bail!("{e}\n\n  Hint: {}", e.hint()),
    };

    match args.format {
        OutputFormat::Text => {
            for line in report(&analysis) {
                println!("{line}");
            }
        }
        OutputFormat::Json | OutputFormat::Jsonl => {
            let format = if args.format == OutputFormat::Json {
                CoreOutputFormat::Json
            } else {
                CoreOutputFormat::JsonLines
            };
            let mut writer = OutputWriter::new(std::io::stdout().lock(), format, pretty);
            writer.write(&analysis)?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Text report for an analysis.
fn report(analysis: &WebsiteAnalysis) -> Vec<String> {
    let mut lines = render::analysis_lines(analysis);
    lines.push(String::new());

    let field = |label: &str, value: &str| {
        let value = if value.trim().is_empty() { "-" } else { value };
        format!("{label:<13}{value}")
    };
    lines.push(field("Title:", &analysis.title));
    lines.push(field("Description:", &analysis.description));
    lines.push(field("Keywords:", &analysis.keywords));
    lines.push(field("Tone:", &analysis.tone));

    let about: String = analysis.about_text.chars().take(ABOUT_PREVIEW_CHARS).collect();
    let ellipsis = if analysis.about_text.chars().count() > ABOUT_PREVIEW_CHARS {
        "..."
    } else {
        ""
    };
    lines.push(field("About:", &format!("{about}{ellipsis}")));

    if !analysis.services.is_empty() {
        lines.push(String::new());
        lines.push("Services:".to_string());
        lines.extend(analysis.services.iter().map(|s| format!("  - {s}")));
    }

    if !analysis.images.is_empty() {
        lines.push(String::new());
        lines.push("Images (use with --website-image N):".to_string());
        lines.extend(
            analysis
                .images
                .iter()
                .enumerate()
                .map(|(i, img)| format!("  {}. {} ({})", i + 1, img.description, img.url)),
        );
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandcap_core::WebsiteImage;

    #[test]
    fn report_numbers_images_from_one() {
        let analysis = WebsiteAnalysis {
            url: "https://rosies.example/".into(),
            title: "Rosie's Bakery | Home".into(),
            services: vec!["Sourdough".into()],
            images: vec![WebsiteImage {
                url: "https://rosies.example/hero.jpg".into(),
                alt: "Bread".into(),
                title: String::new(),
                description: "Bread".into(),
            }],
            ..Default::default()
        };
        let lines = report(&analysis);
        assert_eq!(lines[0], "✅ Website Analysis Complete for Rosie's Bakery");
        assert!(lines.contains(&"Description: -".to_string()));
        assert!(lines.contains(&"  - Sourdough".to_string()));
        assert!(lines.contains(&"  1. Bread (https://rosies.example/hero.jpg)".to_string()));
    }

    #[test]
    fn report_truncates_about_text() {
        let analysis = WebsiteAnalysis {
            about_text: "x".repeat(400),
            ..Default::default()
        };
        let lines = report(&analysis);
        let about = lines.iter().find(|l| l.starts_with("About:")).unwrap();
        assert!(about.ends_with("..."));
        assert_eq!(about.len(), 13 + ABOUT_PREVIEW_CHARS + 3);
    }
}
