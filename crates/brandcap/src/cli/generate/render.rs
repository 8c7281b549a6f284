//! Human-readable rendering of caption sets and website analyses.
//!
//! Captions go to stdout so they can be piped; status lines, warnings, and
//! spinners go to stderr.

use std::path::PathBuf;
use std::time::Duration;

use brandcap_core::{CaptionSet, CaptionVariant, SessionHistory, WebsiteAnalysis};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

/// Pages listed under a website analysis summary.
const PAGES_SHOWN: usize = 5;

/// "Caption N (New)" or "Caption N (Previously Used)".
pub fn caption_header(variant: &CaptionVariant) -> String {
    let status = if variant.previously_used {
        "Previously Used"
    } else {
        "New"
    };
    format!("Caption {} ({status})", variant.index)
}

/// Platform suitability markers, e.g. `Facebook: ✅ (312/500)`.
pub fn platform_line(variant: &CaptionVariant) -> String {
    variant
        .fit
        .entries()
        .iter()
        .map(|(platform, limit, fits)| {
            let mark = if *fits { "✅" } else { "⚠️" };
            format!("{platform}: {mark} ({}/{limit})", variant.char_count)
        })
        .collect::<Vec<_>>()
        .join("   ")
}

/// Summary lines for the website analysis, or the failure notice.
///
/// Returns an empty vec when no website was requested.
pub fn analysis_summary(set: &CaptionSet) -> Vec<String> {
    match (&set.website, &set.website_error) {
        (Some(analysis), _) => analysis_lines(analysis),
        (None, Some(reason)) => vec![
            "⚠️ Website Analysis Failed - Using basic business type only".to_string(),
            format!("   {reason}"),
        ],
        (None, None) => Vec::new(),
    }
}

/// Lines describing a successful analysis.
pub fn analysis_lines(analysis: &WebsiteAnalysis) -> Vec<String> {
    let name = analysis
        .company_name()
        .unwrap_or_else(|| "Company".to_string());
    let pages = &analysis.pages_analyzed;

    if pages.len() <= 1 {
        return vec![format!("✅ Website Analysis Complete for {name}")];
    }

    let mut lines = vec![format!(
        "✅ Website Analysis Complete for {name} ({} pages analyzed)",
        pages.len()
    )];
    lines.extend(
        pages
            .iter()
            .take(PAGES_SHOWN)
            .enumerate()
            .map(|(i, page)| format!("   {}. {page}", i + 1)),
    );
    lines
}

/// Print the full caption set. With a history, previously used captions
/// also show when and for whom they were used.
pub fn print_caption_set_with_history(set: &CaptionSet, history: Option<&SessionHistory>) {
    let green = Style::new().for_stderr().green();
    let yellow = Style::new().for_stderr().yellow();
    let dim = Style::new().for_stderr().dim();
    let bold = Style::new().bold();
    let warn = Style::new().yellow().bold();
    let muted = Style::new().dim();

    eprintln!();
    for line in analysis_summary(set) {
        if line.starts_with('⚠') {
            eprintln!("  {}", yellow.apply_to(line));
        } else {
            eprintln!("  {}", green.apply_to(line));
        }
    }
    if set.duplicates_remaining {
        eprintln!(
            "  {}",
            yellow.apply_to(
                "⚠️ Some generated captions may be similar to previously used ones. \
                 Consider using different keywords or business descriptions for more variety."
            )
        );
    }
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "{} · {} · {} mode · {}ms",
            set.provider,
            set.model,
            set.options.mode_label(),
            set.latency_ms
        ))
    );
    eprintln!();

    for variant in &set.variants {
        let header = caption_header(variant);
        if variant.previously_used {
            println!("{}", warn.apply_to(header));
            if let Some(used) = history.and_then(|h| h.find_duplicate(&variant.text)) {
                println!(
                    "  Similar caption used on {} for {}",
                    used.used_at.format("%Y-%m-%d"),
                    if used.business.is_empty() { "Unknown" } else { used.business.as_str() }
                );
            }
        } else {
            println!("{}", bold.apply_to(header));
        }
        println!();
        println!("{}", variant.text);
        println!();
        println!("{}", muted.apply_to(platform_line(variant)));
        println!();
    }
}

pub fn print_caption_set(set: &CaptionSet) {
    print_caption_set_with_history(set, None);
}

/// List files written by an export.
pub fn print_saved(paths: &[PathBuf]) {
    let green = Style::new().for_stderr().green();
    for path in paths {
        eprintln!("  {} {}", green.apply_to("Saved"), path.display());
    }
}

/// Spinner shown while a single generation runs.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
