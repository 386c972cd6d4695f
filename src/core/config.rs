//! Application configuration management

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Citation marker inserted by the Cite button
const DEFAULT_CITATION_MARKER: &str = " <span style=\"color: var(--primary-color); background: var(--secondary-color); padding: 2px 4px; border-radius: 4px;\">[citation needed]</span>&nbsp;";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Identity documents are created under
    pub owner_id: String,
    /// Where documents live
    pub store: StoreConfig,
    /// Recently used local document folders
    pub recent_folders: Vec<PathBuf>,
    /// Editor settings
    pub editor: EditorConfig,
    /// AI assistant settings
    pub assistant: AssistantConfig,
    /// UI settings
    pub ui: UiConfig,
}

/// Document store selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Documents vanish when the app exits
    Memory,
    /// One JSON file per document; `None` uses the app data directory
    Local { dir: Option<PathBuf> },
    /// Hosted REST table
    Remote {
        url: String,
        api_key: String,
        #[serde(default)]
        access_token: Option<String>,
        #[serde(default = "default_table")]
        table: String,
    },
}

fn default_table() -> String {
    "documents".to_string()
}

/// Editor-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum undo snapshots kept per document
    pub history_limit: usize,
    /// Title given to new documents
    pub placeholder_title: String,
    /// Markup inserted by the Cite command
    pub citation_marker: String,
    /// Font size in pixels
    pub font_size: f32,
}

/// AI assistant settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Serverless function answering assistant prompts
    pub function_url: Option<String>,
    /// Key sent with assistant requests
    pub api_key: Option<String>,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Notes panel width
    pub notes_width: f32,
    /// Assistant panel width
    pub assistant_width: f32,
    /// Seconds a notification stays on screen
    pub notification_secs: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            owner_id: "local-user".to_string(),
            store: StoreConfig::Local { dir: None },
            recent_folders: Vec::new(),
            editor: EditorConfig::default(),
            assistant: AssistantConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 500,
            placeholder_title: "Untitled Document".to_string(),
            citation_marker: DEFAULT_CITATION_MARKER.to_string(),
            font_size: 16.0,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            notes_width: 240.0,
            assistant_width: 320.0,
            notification_secs: 4.0,
        }
    }
}

impl AppConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "aira", "AiraWriter")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Apply `AIRA_*` overrides read through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(owner) = lookup("AIRA_OWNER_ID").filter(|v| !v.trim().is_empty()) {
            self.owner_id = owner;
        }

        if let Some(url) = lookup("AIRA_STORE_URL") {
            let api_key = lookup("AIRA_STORE_KEY").or_else(|| match &self.store {
                StoreConfig::Remote { api_key, .. } => Some(api_key.clone()),
                _ => None,
            });
            match api_key {
                Some(api_key) => {
                    let access_token = lookup("AIRA_ACCESS_TOKEN");
                    self.store = StoreConfig::Remote {
                        url,
                        api_key,
                        access_token,
                        table: default_table(),
                    };
                }
                None => tracing::warn!("AIRA_STORE_URL is set without AIRA_STORE_KEY; ignoring"),
            }
        }

        if let Some(url) = lookup("AIRA_FUNCTION_URL") {
            self.assistant.function_url = Some(url);
        }
        if let Some(key) = lookup("AIRA_FUNCTION_KEY") {
            self.assistant.api_key = Some(key);
        }
    }

    /// Add a folder to recent folders
    pub fn add_recent_folder(&mut self, path: PathBuf) {
        // Remove if already exists
        self.recent_folders.retain(|p| p != &path);
        // Add to front
        self.recent_folders.insert(0, path);
        // Keep only last 10
        self.recent_folders.truncate(10);
    }

    /// Directory used by the local store when none is configured
    pub fn default_documents_dir() -> PathBuf {
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().join("documents"))
            .unwrap_or_else(|| PathBuf::from("documents"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"owner_id": "u-1", "editor": {"history_limit": 50}}"#).unwrap();
        assert_eq!(config.owner_id, "u-1");
        assert_eq!(config.editor.history_limit, 50);
        assert_eq!(config.editor.placeholder_title, "Untitled Document");
        assert_eq!(config.store, StoreConfig::Local { dir: None });
    }

    #[test]
    fn test_store_config_is_tagged() {
        let store: StoreConfig = serde_json::from_str(
            r#"{"kind": "remote", "url": "https://x.supabase.co", "api_key": "k"}"#,
        )
        .unwrap();
        assert_eq!(
            store,
            StoreConfig::Remote {
                url: "https://x.supabase.co".to_string(),
                api_key: "k".to_string(),
                access_token: None,
                table: "documents".to_string(),
            }
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(lookup(&[
            ("AIRA_OWNER_ID", "user-42"),
            ("AIRA_STORE_URL", "https://x.supabase.co"),
            ("AIRA_STORE_KEY", "anon"),
            ("AIRA_FUNCTION_URL", "https://x.functions.supabase.co/summarize"),
        ]));

        assert_eq!(config.owner_id, "user-42");
        assert!(matches!(config.store, StoreConfig::Remote { ref api_key, .. } if api_key == "anon"));
        assert_eq!(
            config.assistant.function_url.as_deref(),
            Some("https://x.functions.supabase.co/summarize")
        );
    }

    #[test]
    fn test_store_url_without_key_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(lookup(&[("AIRA_STORE_URL", "https://x.supabase.co")]));
        assert_eq!(config.store, StoreConfig::Local { dir: None });
    }

    #[test]
    fn test_recent_folders_are_deduplicated() {
        let mut config = AppConfig::default();
        config.add_recent_folder(PathBuf::from("/a"));
        config.add_recent_folder(PathBuf::from("/b"));
        config.add_recent_folder(PathBuf::from("/a"));
        assert_eq!(config.recent_folders, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
    }
}
