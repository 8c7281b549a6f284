//! Provider setup: API key detection, entry, and optional persistence.

use brandcap_core::llm::resolve_env_var;
use brandcap_core::Config;
use console::Style;
use dialoguer::{Password, Select};

use super::theme::brandcap_theme;
use crate::cli::config::save_key;
use crate::cli::generate::LlmProvider;

/// Provider chosen for the session.
pub struct ProviderSelection {
    pub provider: LlmProvider,
    /// API key entered during this session (not from env/config).
    pub api_key: Option<String>,
}

/// Ask which provider to use and make sure it has an API key.
///
/// Returns `None` if the user cancels.
pub fn select_provider(config: &Config) -> anyhow::Result<Option<ProviderSelection>> {
    let theme = brandcap_theme();
    let dim = Style::new().for_stderr().dim();
    let warn = Style::new().for_stderr().yellow();

    let items: Vec<String> = LlmProvider::ALL
        .iter()
        .map(|p| match p {
            LlmProvider::Ollama => format!("{} (local)", p.label()),
            _ => p.label().to_string(),
        })
        .collect();
    let default = LlmProvider::from_name(&config.llm.provider)
        .and_then(|current| LlmProvider::ALL.iter().position(|p| *p == current))
        .unwrap_or(0);

    let Some(choice) = Select::with_theme(&theme)
        .with_prompt("LLM provider")
        .items(&items)
        .default(default)
        .interact_opt()?
    else {
        return Ok(None);
    };
    let provider = LlmProvider::ALL[choice];

    let Some(env_var) = provider.env_var() else {
        return Ok(Some(ProviderSelection {
            provider,
            api_key: None,
        }));
    };

    if config_has_key(config, provider) {
        eprintln!(
            "  {}",
            dim.apply_to(format!("Using existing API key from {env_var} / config"))
        );
        return Ok(Some(ProviderSelection {
            provider,
            api_key: None,
        }));
    }

    eprintln!("  {}", warn.apply_to(format!("{env_var} not set.")));
    let key = match Password::with_theme(&theme)
        .with_prompt(format!("Enter your {} API key (Esc to skip)", provider.label()))
        .allow_empty_password(true)
        .interact()
    {
        Ok(k) if !k.trim().is_empty() => k.trim().to_string(),
        _ => return Ok(None),
    };

    let save_options = &["Yes, save to config file", "No, use for this session only"];
    match Select::with_theme(&theme)
        .with_prompt("Save this key for future sessions?")
        .items(save_options)
        .default(0)
        .interact_opt()?
    {
        Some(0) => {
            let path = Config::default_path();
            match save_key(&path, provider, &key) {
                Ok(_) => eprintln!(
                    "  {}",
                    dim.apply_to(format!("Key saved to {}", path.display()))
                ),
                Err(e) => {
                    eprintln!("  {}", warn.apply_to(format!("Could not save to config: {e}")));
                    eprintln!("  Using key for this session only.");
                }
            }
        }
        Some(_) => {}
        None => return Ok(None),
    }

    Ok(Some(ProviderSelection {
        provider,
        api_key: Some(key),
    }))
}

/// Whether the config (directly or through `${ENV_VAR}`) yields an API key.
pub(crate) fn config_has_key(config: &Config, provider: LlmProvider) -> bool {
    let configured = match provider {
        LlmProvider::Openai => config.llm.openai.clone().unwrap_or_default().api_key,
        LlmProvider::Anthropic => config.llm.anthropic.clone().unwrap_or_default().api_key,
        LlmProvider::Ollama => return true,
    };
    resolve_env_var(&configured).is_some()
}
