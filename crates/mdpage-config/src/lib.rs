//! Configuration management for mdpage.
//!
//! Parses `mdpage.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories. Every setting has a
//! default, so running without a config file is the common case.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `diagrams.command`
//! - `diagrams.config_file`
//! - `index.project_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdpage.toml";

/// Default fence tag marking diagram blocks.
const DEFAULT_LANGUAGE: &str = "mermaid";
/// Default scratch directory for diagram sources and rendered SVGs.
const DEFAULT_OUTPUT_DIR: &str = "tmp";
/// Default Mermaid CLI location (npm-installed).
const DEFAULT_COMMAND: &str = "node_modules/.bin/mmdc";
/// Default Mermaid style configuration.
const DEFAULT_CONFIG_FILE: &str = "mermaid.json";
/// Default primary page path.
const DEFAULT_PAGE: &str = "llg-brr.html";
/// Default index page path.
const DEFAULT_INDEX: &str = "index.html";
/// Title used when the document has no heading.
const DEFAULT_TITLE: &str = "Rendered Markdown";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override diagram output directory.
    pub output_dir: Option<PathBuf>,
    /// Override diagram renderer command.
    pub command: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram rendering configuration (paths are relative strings from TOML).
    diagrams: DiagramsConfigRaw,
    /// Output page configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Index page configuration.
    pub index: IndexConfig,

    /// Resolved diagrams configuration (set after loading).
    #[serde(skip)]
    pub diagrams_resolved: DiagramsConfig,
    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw diagrams configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    language: Option<String>,
    output_dir: Option<String>,
    command: Option<String>,
    config_file: Option<String>,
}

/// Resolved diagram rendering configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramsConfig {
    /// Fence tag that marks diagram blocks (e.g. `mermaid`).
    pub language: String,
    /// Directory holding transient sources and persistent rendered SVGs.
    pub output_dir: PathBuf,
    /// Renderer executable. Bare names are looked up on `PATH`.
    pub command: PathBuf,
    /// Style configuration passed to the renderer.
    pub config_file: PathBuf,
}

impl DiagramsConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_owned(),
            output_dir: base.join(DEFAULT_OUTPUT_DIR),
            command: resolve_command(base, DEFAULT_COMMAND),
            config_file: base.join(DEFAULT_CONFIG_FILE),
        }
    }
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    page: Option<String>,
    index: Option<String>,
    default_title: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Path of the rendered document page.
    pub page: PathBuf,
    /// Path of the index page.
    pub index: PathBuf,
    /// Title used when the document has no heading line.
    pub default_title: String,
}

impl OutputConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            page: base.join(DEFAULT_PAGE),
            index: base.join(DEFAULT_INDEX),
            default_title: DEFAULT_TITLE.to_owned(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Index page configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Fixed index page title.
    pub title: String,
    /// Project repository linked from the index page.
    pub project_url: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            title: "LLGuidance".to_owned(),
            project_url: "https://github.com/guidance-ai/llguidance".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.command`").
        field: String,
        /// Error message (e.g., "${`MMDC`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Resolve a renderer command against the config directory.
///
/// Commands containing a path separator are treated as paths; bare names are
/// left for `PATH` lookup.
fn resolve_command(base: &Path, command: &str) -> PathBuf {
    if command.contains('/') || command.contains(std::path::MAIN_SEPARATOR) {
        base.join(command)
    } else {
        PathBuf::from(command)
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdpage.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.diagrams_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(command) = &settings.command {
            self.diagrams_resolved.command.clone_from(command);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            diagrams: DiagramsConfigRaw::default(),
            output: OutputConfigRaw::default(),
            index: IndexConfig::default(),
            diagrams_resolved: DiagramsConfig::with_base(base),
            output_resolved: OutputConfig::with_base(base),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let diagrams = &self.diagrams_resolved;
        require_non_empty(&diagrams.language, "diagrams.language")?;
        if diagrams.language.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "diagrams.language cannot contain whitespace".to_owned(),
            ));
        }
        require_non_empty(&diagrams.command.to_string_lossy(), "diagrams.command")?;

        require_non_empty(&self.output_resolved.default_title, "output.default_title")?;
        if self.output_resolved.page == self.output_resolved.index {
            return Err(ConfigError::Validation(
                "output.page and output.index must differ".to_owned(),
            ));
        }

        require_non_empty(&self.index.title, "index.title")?;
        require_http_url(&self.index.project_url, "index.project_url")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref command) = self.diagrams.command {
            self.diagrams.command = Some(expand::expand_env(command, "diagrams.command")?);
        }
        if let Some(ref config_file) = self.diagrams.config_file {
            self.diagrams.config_file =
                Some(expand::expand_env(config_file, "diagrams.config_file")?);
        }
        self.index.project_url = expand::expand_env(&self.index.project_url, "index.project_url")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.diagrams_resolved = DiagramsConfig {
            language: self
                .diagrams
                .language
                .clone()
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()),
            output_dir: resolve(self.diagrams.output_dir.as_deref(), DEFAULT_OUTPUT_DIR),
            command: resolve_command(
                config_dir,
                self.diagrams.command.as_deref().unwrap_or(DEFAULT_COMMAND),
            ),
            config_file: resolve(self.diagrams.config_file.as_deref(), DEFAULT_CONFIG_FILE),
        };

        self.output_resolved = OutputConfig {
            page: resolve(self.output.page.as_deref(), DEFAULT_PAGE),
            index: resolve(self.output.index.as_deref(), DEFAULT_INDEX),
            default_title: self
                .output
                .default_title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
        };
    }
}
