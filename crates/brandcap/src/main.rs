//! Brandcap CLI - brand-aware social media captions from an image and a website.
//!
//! Brandcap reads a company website for brand context, then asks a
//! vision-capable LLM for three caption variants for an image.
//!
//! # Usage
//!
//! ```bash
//! # Captions for one image, grounded in the company website
//! brandcap generate bread.jpg --business "bakery" --website rosies-bakery.com
//!
//! # Caption every image in a directory and save the text files
//! brandcap generate ./photos/ --business "bakery" --save-dir ./captions
//!
//! # Inspect what the website analysis finds
//! brandcap analyze rosies-bakery.com
//!
//! # Guided mode
//! brandcap
//! ```

use clap::{Parser, Subcommand};
use std::io::IsTerminal;

mod cli;
mod logging;

/// Brandcap - brand-aware social media captions from an image and a website.
#[derive(Parser, Debug)]
#[command(name = "brandcap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate captions for an image, a directory of images, or text only
    Generate(Box<cli::generate::GenerateArgs>),

    /// Analyze a company website and show what was found
    Analyze(cli::analyze::AnalyzeArgs),

    /// List business category templates
    Templates,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match brandcap_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `brandcap config path`."
            );
            brandcap_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Brandcap v{}", brandcap_core::VERSION);

    match cli.command {
        Some(Commands::Generate(args)) => cli::generate::execute(*args).await,
        Some(Commands::Analyze(args)) => cli::analyze::execute(args).await,
        Some(Commands::Templates) => {
            cli::templates::execute();
            Ok(())
        }
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if std::io::stderr().is_terminal() && std::io::stdin().is_terminal() => {
            cli::interactive::run(config).await
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
