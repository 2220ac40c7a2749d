//! Model configuration.
//!
//! Loaded once per session from a JSON file under the user config
//! directory, saved only through an explicit `save`. Missing or unreadable
//! config yields the documented defaults rather than an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::providers;

/// Which kind of backend serves completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Local inference server (Ollama-compatible).
    #[default]
    Ollama,
    /// Hosted provider reached over its public API.
    Online,
}

/// How to reach a model.
///
/// Stored as flat camelCase JSON for compatibility with existing config
/// files; `selection()` resolves the discriminated view the client uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    pub model_type: ModelType,
    /// Base URL of the local inference server.
    pub ollama_url: String,
    /// Model name on the local inference server.
    pub model_name: String,
    pub selected_provider: String,
    pub selected_model: String,
    /// Overrides the provider's default endpoint when non-empty.
    pub custom_endpoint: String,
    pub api_key: String,
    // Legacy fields from before provider selection existed; migrated on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: ModelType::Ollama,
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.1:8b".to_string(),
            selected_provider: String::new(),
            selected_model: String::new(),
            custom_endpoint: String::new(),
            api_key: String::new(),
            openai_endpoint: None,
            openai_api_key: None,
        }
    }
}

/// Resolved backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelection {
    Local { endpoint: String, model: String },
    Hosted { provider_id: String, model_id: String, endpoint: String, api_key: String },
}

impl ModelConfig {
    /// Load from the default location, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from_file(&path)
    }

    /// Load from a specific file, falling back to defaults on any error.
    pub fn load_from_file(path: &Path) -> Self {
        let config = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Self>(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };
        config.migrated()
    }

    /// Save to the default location.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to_file(&path)
    }

    /// Save to a specific file.
    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ideaboard").join("config.json"))
    }

    /// Resolve which backend a completion call should hit.
    ///
    /// Hosted inference requires a provider, a model and an API key;
    /// anything less falls back to local inference. The endpoint falls back
    /// to the provider's default when no custom endpoint is set.
    pub fn selection(&self) -> ModelSelection {
        if self.model_type == ModelType::Online
            && !self.selected_provider.is_empty()
            && !self.selected_model.is_empty()
            && !self.api_key.is_empty()
        {
            let endpoint = if self.custom_endpoint.is_empty() {
                providers::default_endpoint(&self.selected_provider).to_string()
            } else {
                self.custom_endpoint.clone()
            };
            return ModelSelection::Hosted {
                provider_id: self.selected_provider.clone(),
                model_id: self.selected_model.clone(),
                endpoint,
                api_key: self.api_key.clone(),
            };
        }
        ModelSelection::Local { endpoint: self.ollama_url.clone(), model: self.model_name.clone() }
    }

    /// Carry forward pre-provider-selection OpenAI settings.
    fn migrated(mut self) -> Self {
        if self.selected_provider.is_empty() {
            if let (Some(endpoint), Some(key)) =
                (self.openai_endpoint.take(), self.openai_api_key.take())
            {
                self.selected_provider = "openai".to_string();
                self.selected_model = "gpt-4o".to_string();
                self.custom_endpoint = endpoint;
                self.api_key = key;
                self.model_type = ModelType::Online;
            }
        }
        self
    }
}
