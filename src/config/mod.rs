//! Build configuration management for `texmk.toml`.
//!
//! The file is optional; every field has a default.
//!
//! # Sections
//!
//! | Section        | Purpose                                        |
//! |----------------|------------------------------------------------|
//! | `[latex]`      | Compiler commands and fixed flags              |
//! | `[bibtex]`     | Bibliography tool command                      |
//! | `[makeindex]`  | Index/glossary tool command                    |
//! | `[build]`      | Pass limit, error policy, post-build steps     |
//!
//! # Example
//!
//! ```toml
//! [latex]
//! pdf = ["xelatex"]
//!
//! [bibtex]
//! command = ["biber"]
//!
//! [build]
//! max_runs = 5
//! exit_on_error = false
//! ```

mod build;
pub mod defaults;
mod error;
mod tools;

pub use build::BuildConfig;
pub use error::ConfigError;
pub use tools::{BibtexConfig, LatexConfig, MakeindexConfig};

use crate::cli::Cli;
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Passes the controller may need before its rerun loop: the first pass,
/// the pass after makeindex, and the pass after bibtex.
pub const MIN_RUNS: usize = 3;

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing texmk.toml
#[derive(Debug, Clone, Educe, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct MakeConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Working directory for every tool (set from the CLI)
    #[serde(skip)]
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    /// Primary compiler
    #[serde(default)]
    pub latex: LatexConfig,

    /// Bibliography tool
    #[serde(default)]
    pub bibtex: BibtexConfig,

    /// Index tool
    #[serde(default)]
    pub makeindex: MakeindexConfig,

    /// Convergence and post-build settings
    #[serde(default)]
    pub build: BuildConfig,
}

impl MakeConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: MakeConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content).with_context(|| format!("in `{}`", path.display()))
    }

    /// Load `<root>/<cli.config>` if it exists, then apply CLI overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.config_path = config_path;
        config.root = root.to_path_buf();
        config.update_with_cli(cli);
        config.expand_commands();
        Ok(config)
    }

    /// The compiler command for the configured output format.
    pub fn compiler(&self) -> &[String] {
        if self.build.pdf {
            &self.latex.pdf
        } else {
            &self.latex.dvi
        }
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        Self::update_flag(&mut self.build.quiet, cli.quiet, true);
        Self::update_flag(&mut self.build.exit_on_error, cli.no_exit, false);
        Self::update_flag(&mut self.build.preview, cli.preview, true);
        Self::update_flag(&mut self.build.clean, cli.clean, true);
        Self::update_flag(&mut self.build.pdf, cli.dvi, false);
        Self::update_flag(&mut self.build.check_cite, cli.check_cite, true);
        Self::update_option(&mut self.build.max_runs, cli.max_runs.as_ref());
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Set a boolean to `value` when the CLI flag is present
    fn update_flag(config_option: &mut bool, flag: bool, value: bool) {
        if flag {
            *config_option = value;
        }
    }

    /// Expand `~` in the binary of every command
    fn expand_commands(&mut self) {
        for command in [
            &mut self.latex.pdf,
            &mut self.latex.dvi,
            &mut self.bibtex.command,
            &mut self.makeindex.command,
        ] {
            if let Some(head) = command.first_mut() {
                *head = shellexpand::tilde(head.as_str()).into_owned();
            }
        }
    }

    /// Validate configuration before the first pass
    pub fn validate(&self) -> Result<()> {
        for (field, command) in [
            ("[latex.pdf]", &self.latex.pdf),
            ("[latex.dvi]", &self.latex.dvi),
            ("[bibtex.command]", &self.bibtex.command),
            ("[makeindex.command]", &self.makeindex.command),
        ] {
            if command.is_empty() {
                bail!(ConfigError::Validation(format!(
                    "{field} must have at least one element"
                )));
            }
        }

        if self.build.max_runs < MIN_RUNS {
            bail!(ConfigError::Validation(format!(
                "[build.max_runs] must be at least {MIN_RUNS}, got {}",
                self.build.max_runs
            )));
        }

        let field = if self.build.pdf { "[latex.pdf]" } else { "[latex.dvi]" };
        Self::check_command_installed(field, self.compiler())
    }

    /// Check if a command is installed and available
    fn check_command_installed(field: &str, command: &[String]) -> Result<()> {
        let Some(cmd) = command.first() else {
            bail!(ConfigError::Validation(format!(
                "{field} must have at least one element"
            )));
        };
        which::which(cmd).with_context(|| {
            format!("`{cmd}` not found. Is your LaTeX distribution on your PATH?")
        })?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
