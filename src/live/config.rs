//! Configuration loading
//!
//! `defaults/live.default.toml` is embedded into the library so that documented defaults and
//! runtime behavior stay in sync. Hosts layer their own files and key overrides on top via
//! [`Loader`] before deserializing into [`LiveConfig`]. The built configuration is validated:
//! the table name must be usable as an identifier in the rewritten program.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

use crate::live::formats::PrintOptions;
use crate::live::lexing::{tokenize, Token};

const DEFAULT_TOML: &str = include_str!("../../defaults/live.default.toml");

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});
static KEY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]+$").expect("key prefix pattern is valid"));

/// Top-level configuration for a live session
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LiveConfig {
    pub rewrite: RewriteConfig,
    pub printer: PrinterConfig,
}

/// Controls how literals are rewritten and how the table is bound
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewriteConfig {
    pub all_vars_name: String,
    pub key_prefix: String,
    pub declaration_keyword: DeclarationKeyword,
    pub binding: Binding,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrinterConfig {
    pub indent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKeyword {
    Const,
    Let,
    Var,
}

impl DeclarationKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKeyword::Const => "const",
            DeclarationKeyword::Let => "let",
            DeclarationKeyword::Var => "var",
        }
    }
}

/// How a rendered program gets hold of the literal table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Binding {
    /// Prefix the program with a declaration of the table
    Declaration,
    /// Wrap the program in a function taking the table as its only parameter
    Parameter,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            all_vars_name: "__AllVars".to_string(),
            key_prefix: "a".to_string(),
            declaration_keyword: DeclarationKeyword::Const,
            binding: Binding::Declaration,
        }
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

impl PrinterConfig {
    pub fn print_options(&self) -> PrintOptions {
        PrintOptions {
            indent: self.indent.clone(),
        }
    }
}

impl LiveConfig {
    /// Reject values that would produce an unparseable rewritten program
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.rewrite.all_vars_name;
        if !IDENTIFIER.is_match(name) || is_reserved(name) {
            return Err(ConfigError::Message(format!(
                "rewrite.all_vars_name `{}` is not a valid identifier",
                name
            )));
        }
        if !KEY_PREFIX.is_match(&self.rewrite.key_prefix) {
            return Err(ConfigError::Message(format!(
                "rewrite.key_prefix `{}` must be one or more ASCII letters",
                self.rewrite.key_prefix
            )));
        }
        if !self.printer.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(ConfigError::Message(
                "printer.indent may only contain spaces and tabs".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_reserved(name: &str) -> bool {
    match tokenize(name) {
        Ok(tokens) => !matches!(tokens.as_slice(), [(Token::Identifier(_), _)]),
        Err(_) => true,
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder, deserialize and validate the resulting configuration.
    pub fn build(self) -> Result<LiveConfig, ConfigError> {
        let config: LiveConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<LiveConfig, ConfigError> {
    Loader::new().build()
}
