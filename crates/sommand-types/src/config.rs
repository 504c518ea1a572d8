//! TOML configuration: user-facing messages, the input prefix, and the
//! console identity.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SommandError};

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct SommandConfig {
    /// Prefix stripped from input lines before tokenizing.
    #[serde(default = "default_prefix")]
    pub command_prefix: String,
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Entities offered by the console's entity resolver.
    #[serde(default, rename = "entity")]
    pub entities: Vec<EntityConfig>,
}

impl Default for SommandConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_prefix(),
            messages: MessagesConfig::default(),
            identity: IdentityConfig::default(),
            entities: Vec::new(),
        }
    }
}

impl SommandConfig {
    /// Parse a configuration from TOML text.
    pub fn parse(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::parse(&text)?;
        if config.identity.name.trim().is_empty() {
            return Err(SommandError::Config(format!(
                "{}: identity name must not be blank",
                path.display()
            )));
        }
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

/// Messages sent to an identity when a command does not run.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MessagesConfig {
    #[serde(default = "default_unknown_command")]
    pub unknown_command: String,
    /// `{label}` is replaced with the root command's primary name.
    #[serde(default = "default_unknown_subcommand")]
    pub unknown_subcommand: String,
    #[serde(default = "default_no_permission")]
    pub no_permission: String,
    #[serde(default = "default_execution_error")]
    pub execution_error: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            unknown_command: default_unknown_command(),
            unknown_subcommand: default_unknown_subcommand(),
            no_permission: default_no_permission(),
            execution_error: default_execution_error(),
        }
    }
}

impl MessagesConfig {
    /// The unknown-subcommand message for a root label.
    pub fn unknown_subcommand_for(&self, label: &str) -> String {
        self.unknown_subcommand.replace("{label}", label)
    }

    /// The unknown-command message for a typed label.
    pub fn unknown_command_for(&self, label: &str) -> String {
        self.unknown_command.replace("{label}", label)
    }
}

/// The identity the console binary runs as.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_name")]
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Grants every permission.
    #[serde(default)]
    pub operator: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            name: default_identity_name(),
            permissions: Vec::new(),
            operator: false,
        }
    }
}

/// A named entity known to the console's resolver.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EntityConfig {
    pub name: String,
    /// Permission required to see this entity in suggestions.
    #[serde(default)]
    pub permission: Option<String>,
}

fn default_prefix() -> String {
    "/".to_string()
}

fn default_unknown_command() -> String {
    "Unknown command: {label}".to_string()
}

fn default_unknown_subcommand() -> String {
    "Unknown subcommand. Use /{label} help".to_string()
}

fn default_no_permission() -> String {
    "You do not have permission.".to_string()
}

fn default_execution_error() -> String {
    "An internal error occurred while attempting to perform this command.".to_string()
}

fn default_identity_name() -> String {
    "console".to_string()
}
