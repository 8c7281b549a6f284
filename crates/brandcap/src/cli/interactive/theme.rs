//! Dialoguer theme and banner for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// `ColorfulTheme` with brandcap's prompt glyphs and colors.
pub fn brandcap_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().magenta(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().magenta(),
        active_item_style: Style::new().for_stderr().magenta(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Prints the version banner to stderr so stdout stays clean for captions.
pub fn print_banner() {
    let version_line = format!("Brandcap v{}", brandcap_core::VERSION);
    let tagline = "Brand-aware social media captions";

    let inner_width = tagline.len() + 4;

    let top = format!("  ╔{:═<width$}╗", "", width = inner_width);
    let mid1 = format!("  ║{:^width$}║", version_line, width = inner_width);
    let mid2 = format!("  ║{:^width$}║", tagline, width = inner_width);
    let bot = format!("  ╚{:═<width$}╝", "", width = inner_width);

    let magenta = Style::new().for_stderr().magenta();

    eprintln!();
    eprintln!("{}", magenta.apply_to(&top));
    eprintln!("{}", magenta.apply_to(&mid1));
    eprintln!("{}", magenta.apply_to(&mid2));
    eprintln!("{}", magenta.apply_to(&bot));
    eprintln!();
}
