// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the link configuration file to simplify the process
//! of serialization and deserialization. File I/O is left to the caller to
//! figure out.
//!
//! # General Layout
//!
//! ```toml
//! home = "~"
//!
//! [links]
//! "~/.vimrc" = "vim/vimrc"
//! "~/.config/nvim" = "$DOTFILES/nvim"
//! "" = "shell/*"
//! ```
//!
//! Each entry of the links table maps a target to a source. The empty key
//! stands for "no target", which links every source into the home directory.
//! Entries keep their declaration order, so a later entry wins over an
//! earlier one that resolves to the same target.

use crate::plan::LinkSpec;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    str::FromStr,
};
use toml::Table;

const DEFAULT_HOME: &str = "~";

/// Link configuration.
#[derive(Debug, Default, PartialEq, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default target directory for links declared without a target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,

    /// Mapping of link target to link source in declaration order.
    #[serde(default)]
    pub links: Table,
}

impl Config {
    /// Construct new configuration with an empty link table.
    pub fn new(home: impl Into<String>) -> Self {
        Self {
            home: Some(home.into()),
            links: Table::new(),
        }
    }

    /// Default target directory, `~` when none was configured.
    pub fn home(&self) -> &str {
        self.home.as_deref().unwrap_or(DEFAULT_HOME)
    }

    /// Use `home` as default target directory only if none was configured.
    pub fn with_fallback_home(mut self, home: Option<String>) -> Self {
        if self.home.is_none() {
            self.home = home;
        }
        self
    }

    /// Convert link table into link specifications in declaration order.
    ///
    /// Entries whose source is not a string are skipped. Parsing never
    /// produces such entries.
    pub fn link_specs(&self) -> Vec<LinkSpec> {
        self.links
            .iter()
            .filter_map(|(target, source)| {
                source
                    .as_str()
                    .map(|source| LinkSpec::new(Some(target.as_str()), Some(source)))
            })
            .collect()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: Config = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        if let Some((target, _)) = config.links.iter().find(|(_, source)| !source.is_str()) {
            return Err(ConfigError::Source {
                target: target.clone(),
            });
        }

        // INVARIANT: Perform shell expansion on home field.
        if let Some(home) = config.home.as_mut() {
            *home = shellexpand::full(home.as_str())
                .map_err(ConfigError::ShellExpansion)?
                .into_owned();
        }

        Ok(config)
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Link source is not a string.
    #[error("link source of target {target:?} must be a string")]
    Source { target: String },

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}
