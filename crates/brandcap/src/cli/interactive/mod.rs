//! Interactive mode: the guided experience for a bare `brandcap` invocation.
//!
//! When `brandcap` is run with no subcommand on a TTY, this module offers a
//! menu-driven flow built on the same request assembly and rendering as the
//! flag-based CLI. One session (website cache and used-caption history) is
//! shared by every request until the user exits.

pub mod generate;
pub mod setup;
pub mod theme;

use std::sync::Arc;

use brandcap_core::{Brandcap, Config};
use console::Style;
use dialoguer::{Input, Select};

use crate::cli::generate::{apply_overrides, render, GenerateArgs, LlmProvider};

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// State shared by every request in one interactive run.
pub struct Session {
    pub brandcap: Arc<Brandcap>,
    /// Config with the session's provider and key applied
    pub config: Config,
    pub provider: LlmProvider,
    pub api_key: Option<String>,
}

impl Session {
    fn new(config: &Config, selection: setup::ProviderSelection) -> Self {
        let args = GenerateArgs {
            provider: Some(selection.provider),
            api_key: selection.api_key.clone(),
            ..Default::default()
        };
        let mut config = config.clone();
        apply_overrides(&args, &mut config);
        Self {
            brandcap: Arc::new(Brandcap::new(config.clone())),
            config,
            provider: selection.provider,
            api_key: selection.api_key,
        }
    }
}

const MENU_ITEMS: &[&str] = &[
    "Generate captions",
    "Analyze a website",
    "Show configuration",
    "Start a fresh session",
    "Exit",
];

/// Entry point for interactive mode.
pub async fn run(config: Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::brandcap_theme();
    let mut session: Option<Session> = None;

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => {
                if session.is_none() {
                    session = setup::select_provider(&config)?.map(|s| Session::new(&config, s));
                }
                if let Some(session) = &session {
                    generate::guided_generate(session).await?;
                }
            }
            Some(1) => guided_analyze(&theme, session.as_ref(), &config).await?,
            Some(2) => show_config(&config),
            Some(3) => {
                if let Some(session) = &session {
                    session.brandcap.reset().await;
                }
                session = None;
                let dim = Style::new().for_stderr().dim();
                eprintln!("  {}", dim.apply_to("Cleared website cache and used-caption history."));
            }
            _ => break, // Exit, Esc, or Ctrl+C
        }
    }

    Ok(())
}

/// Prompt for a URL and print what the analysis finds.
async fn guided_analyze(
    theme: &dialoguer::theme::ColorfulTheme,
    session: Option<&Session>,
    config: &Config,
) -> anyhow::Result<()> {
    let Some(url) = handle_interrupt(
        Input::<String>::with_theme(theme)
            .with_prompt("Website URL")
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    // Reuse the session's cache when there is one.
    let fresh;
    let brandcap = match session {
        Some(session) => session.brandcap.as_ref(),
        None => {
            fresh = Brandcap::new(config.clone());
            &fresh
        }
    };

    let spinner = render::spinner("Analyzing website...");
    let result = brandcap.analyze(&url).await;
    spinner.finish_and_clear();

    eprintln!();
    match result {
        Ok(analysis) => {
            let green = Style::new().for_stderr().green();
            let mut lines = render::analysis_lines(&analysis).into_iter();
            if let Some(headline) = lines.next() {
                eprintln!("  {}", green.apply_to(headline));
            }
            for line in lines {
                eprintln!("  {line}");
            }
            if !analysis.description.is_empty() {
                eprintln!("  Description: {}", analysis.description);
            }
            if !analysis.services.is_empty() {
                eprintln!("  Services: {}", analysis.services.join("; "));
            }
            eprintln!("  Images found: {}", analysis.images.len());
        }
        Err(e) => {
            let warn = Style::new().for_stderr().yellow();
            eprintln!("  {}", warn.apply_to(format!("⚠️ {e}")));
            eprintln!("  {}", warn.apply_to(e.hint()));
        }
    }
    eprintln!();
    Ok(())
}

/// Summary of the settings that shape caption generation.
fn show_config(config: &Config) {
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    let config_path = Config::default_path();
    let path_note = if config_path.exists() {
        "(exists)"
    } else {
        "(using defaults)"
    };

    eprintln!();
    eprintln!("  {}", cyan.apply_to("Current configuration:"));
    eprintln!();
    eprintln!(
        "    {:<20} {} {}",
        label.apply_to("Config file:"),
        config_path.display(),
        dim.apply_to(path_note)
    );
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Provider:"),
        config.llm.provider
    );
    eprintln!(
        "    {:<20} {}",
        label.apply_to("Export dir:"),
        config.export_dir().display()
    );
    eprintln!(
        "    {:<20} {} / {} / {}",
        label.apply_to("Caption defaults:"),
        config.generation.style,
        config.generation.length,
        config.generation.character_limit
    );
    eprintln!(
        "    {:<20} {} (up to {} pages)",
        label.apply_to("Website analysis:"),
        if config.scrape.enabled { "enabled" } else { "disabled" },
        config.scrape.max_pages
    );
    eprintln!(
        "    {:<20} {} images, {} at a time",
        label.apply_to("Batch:"),
        config.generation.batch_limit,
        config.generation.parallel
    );
    eprintln!();
    eprintln!(
        "  {}",
        dim.apply_to("Edit the file or run `brandcap config set-key <provider> <key>`.")
    );
    eprintln!();
}
