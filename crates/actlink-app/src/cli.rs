//! CLI argument definitions for the actlink binary.
//!
//! Uses `clap` with derive macros.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// actlink: declare gesture-bound actions once and relay their start/end
/// lifecycle between a local and a remote role.
#[derive(Parser, Debug)]
#[command(name = "actlink", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the declared actions in registration order.
    List,
    /// Build the registry and bind it for the configured role.
    Check,
    /// Replay an input script through a local binder and a remote dispatcher.
    Simulate {
        /// Script file: one `begin|end|cancel|change <gesture> [processed]` per line.
        script: PathBuf,
        /// Name of the simulated local actor.
        #[arg(long = "actor", default_value = "player")]
        actor: String,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > ACTLINK_CONFIG env var > ~/.actlink/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("ACTLINK_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Whether the user pointed at a config file explicitly. A missing
    /// explicit file is an error; a missing default file is not.
    pub fn config_is_explicit(&self) -> bool {
        self.config.is_some() || std::env::var("ACTLINK_CONFIG").is_ok()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".actlink").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".actlink").join("config.toml");
    }
    PathBuf::from("config.toml")
}
