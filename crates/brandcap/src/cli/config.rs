//! The `brandcap config` command for configuration management.

use brandcap_core::Config;
use clap::{Args, Subcommand};
use std::path::Path;

use super::generate::LlmProvider;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Store an API key in the config file (comments are preserved)
    SetKey {
        #[arg(value_enum)]
        provider: LlmProvider,

        key: String,
    },
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::load()?;
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at: {}\nUse --force to overwrite.",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, Config::default().to_toml()?)?;

            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }

        ConfigCommand::SetKey { provider, key } => {
            if key.trim().is_empty() {
                anyhow::bail!("API key must not be empty");
            }
            let path = Config::default_path();
            if !save_key(&path, provider, key.trim())? {
                anyhow::bail!("{} does not use an API key", provider.label());
            }
            println!("{} API key saved to {}", provider.label(), path.display());
        }
    }

    Ok(())
}

/// Write `[llm.<provider>].api_key` into the config file, preserving comments.
///
/// Returns `false` for providers that take no key.
pub fn save_key(config_path: &Path, provider: LlmProvider, key: &str) -> anyhow::Result<bool> {
    let Some(section) = provider.key_section() else {
        return Ok(false);
    };

    let content = if config_path.exists() {
        std::fs::read_to_string(config_path)?
    } else {
        String::new()
    };
    let mut doc: toml_edit::DocumentMut = content.parse()?;

    if !doc.contains_key("llm") {
        doc["llm"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    if !doc["llm"]
        .as_table()
        .is_some_and(|t| t.contains_key(section))
    {
        doc["llm"][section] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["llm"][section]["api_key"] = toml_edit::value(key);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, doc.to_string())?;
    tracing::debug!("Saved {section} key to {}", config_path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_key_creates_file_and_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(save_key(&path, LlmProvider::Openai, "sk-test").unwrap());

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.llm.openai.unwrap().api_key, "sk-test");
    }

    #[test]
    fn save_key_preserves_comments_and_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "# my settings\n[generation]\nretry_attempts = 5\n\n[llm.anthropic]\nstandard_model = \"claude-x\"\n",
        )
        .unwrap();

        assert!(save_key(&path, LlmProvider::Anthropic, "sk-ant").unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# my settings"));
        assert!(content.contains("retry_attempts = 5"));
        assert!(content.contains("standard_model = \"claude-x\""));
        assert!(content.contains("api_key = \"sk-ant\""));
    }

    #[test]
    fn save_key_ollama_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(!save_key(&path, LlmProvider::Ollama, "unused").unwrap());
        assert!(!path.exists());
    }
}
