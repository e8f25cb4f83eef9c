use std::{fs, io, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

use crate::explain::ChatSettings;

pub const DEFAULT_CONFIG_PATH: &str = "explain.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub ledger_rpc_url: String,
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            ledger_rpc_url: "https://fullnode.mainnet.sui.io:443".into(),
            llm_api_url: "https://api.groq.com/openai/v1/chat/completions".into(),
            llm_api_key: None,
            llm_model: "llama-3.3-70b-versatile".into(),
            llm_temperature: 0.6,
            llm_max_tokens: 1024,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    ledger_rpc_url: Option<String>,
    llm_api_url: Option<String>,
    llm_api_key: Option<String>,
    llm_model: Option<String>,
    llm_temperature: Option<f32>,
    llm_max_tokens: Option<u32>,
}

pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(DEFAULT_CONFIG_PATH), |key| std::env::var(key).ok())
}

/// Defaults, then the TOML file at `path` if it exists, then environment.
pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse config file '{}'", path.display()))?;
            settings.apply_file(file_cfg);
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    for key in ["LEDGER_RPC_URL", "APP__LEDGER_RPC_URL"] {
        if let Some(v) = env(key) {
            settings.ledger_rpc_url = v;
        }
    }
    for key in ["LLM_API_URL", "APP__LLM_API_URL"] {
        if let Some(v) = env(key) {
            settings.llm_api_url = v;
        }
    }
    for key in ["GROQ_API_KEY", "LLM_API_KEY", "APP__LLM_API_KEY"] {
        if let Some(v) = env(key) {
            settings.llm_api_key = Some(v);
        }
    }
    for key in ["LLM_MODEL", "APP__LLM_MODEL"] {
        if let Some(v) = env(key) {
            settings.llm_model = v;
        }
    }
    if let Some(parsed) = env("APP__LLM_TEMPERATURE").and_then(|v| v.parse().ok()) {
        settings.llm_temperature = parsed;
    }
    if let Some(parsed) = env("APP__LLM_MAX_TOKENS").and_then(|v| v.parse().ok()) {
        settings.llm_max_tokens = parsed;
    }

    Ok(settings)
}

impl ClientSettings {
    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.ledger_rpc_url {
            self.ledger_rpc_url = v;
        }
        if let Some(v) = file_cfg.llm_api_url {
            self.llm_api_url = v;
        }
        if let Some(v) = file_cfg.llm_api_key {
            self.llm_api_key = Some(v);
        }
        if let Some(v) = file_cfg.llm_model {
            self.llm_model = v;
        }
        if let Some(v) = file_cfg.llm_temperature {
            self.llm_temperature = v;
        }
        if let Some(v) = file_cfg.llm_max_tokens {
            self.llm_max_tokens = v;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        check_http_url("ledger_rpc_url", &self.ledger_rpc_url)?;
        check_http_url("llm_api_url", &self.llm_api_url)?;
        Ok(())
    }

    /// Settings for the chat client; fails when no API key is configured.
    pub fn chat_settings(&self) -> anyhow::Result<ChatSettings> {
        let Some(api_key) = self.llm_api_key.as_deref().map(str::trim) else {
            bail!("missing LLM API key; set GROQ_API_KEY or llm_api_key in {DEFAULT_CONFIG_PATH}");
        };
        if api_key.is_empty() {
            bail!("LLM API key is empty");
        }
        Ok(ChatSettings {
            api_url: self.llm_api_url.clone(),
            api_key: api_key.to_string(),
            model: self.llm_model.clone(),
            temperature: self.llm_temperature,
            max_tokens: self.llm_max_tokens,
        })
    }
}

fn check_http_url(name: &str, raw: &str) -> anyhow::Result<()> {
    let url = Url::parse(raw).with_context(|| format!("{name} '{raw}' is not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{name} '{raw}' must use http or https");
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
