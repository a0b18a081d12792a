use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ActlinkError, Result};
use crate::types::{InputMethod, Role};

/// Top-level configuration for actlink.
///
/// Loaded from `~/.actlink/config.toml` by default. Every section has serde
/// defaults so a partial file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActlinkConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub input: InputConfig,
    /// Declared actions, in registration order.
    #[serde(default)]
    pub actions: Vec<ActionDecl>,
}

impl ActlinkConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ActlinkConfig = toml::from_str(&content)?;
        info!(
            actions = config.actions.len(),
            "Configuration loaded from {}",
            path.display()
        );
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ActlinkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Which side of the relay this process plays.
    pub role: Role,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            role: Role::Local,
            log_level: "info".to_string(),
        }
    }
}

/// Relay link settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Name of the shared link, used in diagnostics.
    pub link_name: String,
    /// Suppress local end events without a prior start (and repeated starts).
    pub strict_pairing: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            link_name: "ActionLink".to_string(),
            strict_pairing: true,
        }
    }
}

/// Input binding defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Binding method for declarations that do not name one.
    pub default_method: InputMethod,
}

/// One declared action.
///
/// Callbacks cannot live in a config file; the host attaches them when it
/// turns declarations into descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDecl {
    pub name: String,
    pub gesture: String,
    /// Overrides `input.default_method` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<InputMethod>,
    #[serde(default)]
    pub touch_button: bool,
    /// Whether the action has end handlers on both sides.
    #[serde(default = "default_true")]
    pub end_handlers: bool,
}

impl ActionDecl {
    /// The binding method after applying the configured default.
    pub fn method_or(&self, default: InputMethod) -> InputMethod {
        self.method.unwrap_or(default)
    }
}

fn default_true() -> bool {
    true
}
