//! Configuration management for mdpress.
//!
//! Parses `mdpress.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support `${VAR}` / `${VAR:-default}`
//! expansion via shell-style substitution. Expanded fields:
//!
//! - `rendering.plantuml_url`
//! - `rendering.mermaid_command`

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdpress.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override markdown source directory.
    pub source_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override style profile name.
    pub profile: Option<String>,
    /// Override output format name.
    pub format: Option<String>,
    /// Override worker count.
    pub workers: Option<usize>,
    /// Override page margins string.
    pub page_margins: Option<String>,
    /// Override keep-intermediates flag.
    pub keep_intermediates: Option<bool>,
    /// Override the PlantUML server URL.
    pub plantuml_url: Option<String>,
    /// Override the mermaid CLI command.
    pub mermaid_command: Option<String>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Conversion run configuration (paths are relative strings from TOML).
    conversion: ConversionConfigRaw,
    /// Diagram rendering configuration.
    pub rendering: RenderingConfig,

    /// Resolved conversion configuration (set after loading).
    #[serde(skip)]
    pub conversion_resolved: ConversionConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw conversion configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConversionConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    profile: Option<String>,
    format: Option<String>,
    workers: Option<usize>,
    page_margins: Option<String>,
    keep_intermediates: Option<bool>,
}

/// Resolved conversion configuration with absolute paths.
#[derive(Debug)]
pub struct ConversionConfig {
    /// Directory scanned for `*.md` source documents.
    pub source_dir: PathBuf,
    /// Directory receiving final artifacts, one subdirectory per format.
    pub output_dir: PathBuf,
    /// Project directory for mdpress data (`.mdpress/`).
    pub project_dir: PathBuf,
    /// Style profile name.
    pub profile: String,
    /// Output format name (`pdf`, `epub`, `mobi`).
    pub format: String,
    /// Concurrent document conversions; 0 lets the pool decide.
    pub workers: usize,
    /// CSS-like page margins shorthand; empty means the profile default.
    pub page_margins: Option<String>,
    /// Keep per-document scratch artifacts after a successful conversion.
    pub keep_intermediates: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("output"),
            project_dir: PathBuf::from(".mdpress"),
            profile: "a4-print".to_owned(),
            format: "pdf".to_owned(),
            workers: 4,
            page_margins: None,
            keep_intermediates: false,
        }
    }
}

impl ConversionConfig {
    /// State store directory (`.mdpress/state/`).
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.project_dir.join("state")
    }

    /// Scratch root (`.mdpress/scratch/`).
    #[must_use]
    pub fn scratch_dir(&self) -> PathBuf {
        self.project_dir.join("scratch")
    }
}

/// Diagram rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// PlantUML server URL.
    pub plantuml_url: String,
    /// Mermaid CLI command.
    pub mermaid_command: String,
    /// Optional mermaid style configuration file.
    pub mermaid_style_config: Option<String>,
    /// Per-render deadline in seconds.
    pub render_timeout_secs: u64,
    /// Per-converter-invocation deadline in seconds.
    pub convert_timeout_secs: u64,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            plantuml_url: "http://localhost:8080".to_owned(),
            mermaid_command: "mmdc".to_owned(),
            mermaid_style_config: None,
            render_timeout_secs: 60,
            convert_timeout_secs: 300,
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
    EnvVar { field: String, message: String },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
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

/// Expand `${VAR}` / `${VAR:-default}` references in a config string.
fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: e.to_string(),
        })
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `mdpress.toml` in the current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing
    /// CLI arguments to take precedence over config file values.
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
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.conversion_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.conversion_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(profile) = &settings.profile {
            self.conversion_resolved.profile.clone_from(profile);
        }
        if let Some(format) = &settings.format {
            self.conversion_resolved.format.clone_from(format);
        }
        if let Some(workers) = settings.workers {
            self.conversion_resolved.workers = workers;
        }
        if let Some(margins) = &settings.page_margins {
            self.conversion_resolved.page_margins = Some(margins.clone());
        }
        if let Some(keep) = settings.keep_intermediates {
            self.conversion_resolved.keep_intermediates = keep;
        }
        if let Some(url) = &settings.plantuml_url {
            self.rendering.plantuml_url.clone_from(url);
        }
        if let Some(command) = &settings.mermaid_command {
            self.rendering.mermaid_command.clone_from(command);
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
            conversion: ConversionConfigRaw::default(),
            rendering: RenderingConfig::default(),
            conversion_resolved: ConversionConfig {
                source_dir: base.join("docs"),
                output_dir: base.join("output"),
                project_dir: base.join(".mdpress"),
                ..ConversionConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks profile-independent invariants only; profile and format names
    /// are validated against the pipeline's profile table by the caller.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.conversion_resolved.profile, "conversion.profile")?;
        require_non_empty(&self.conversion_resolved.format, "conversion.format")?;
        require_non_empty(&self.rendering.plantuml_url, "rendering.plantuml_url")?;
        require_http_url(&self.rendering.plantuml_url, "rendering.plantuml_url")?;
        require_non_empty(&self.rendering.mermaid_command, "rendering.mermaid_command")?;

        if self.rendering.render_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "rendering.render_timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if self.rendering.convert_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "rendering.convert_timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.rendering.plantuml_url =
            expand_env(&self.rendering.plantuml_url, "rendering.plantuml_url")?;
        self.rendering.mermaid_command =
            expand_env(&self.rendering.mermaid_command, "rendering.mermaid_command")?;
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = ConversionConfig::default();
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.conversion_resolved = ConversionConfig {
            source_dir: resolve(self.conversion.source_dir.as_deref(), "docs"),
            output_dir: resolve(self.conversion.output_dir.as_deref(), "output"),
            project_dir: config_dir.join(".mdpress"),
            profile: self
                .conversion
                .profile
                .clone()
                .unwrap_or(defaults.profile),
            format: self.conversion.format.clone().unwrap_or(defaults.format),
            workers: self.conversion.workers.unwrap_or(defaults.workers),
            page_margins: self.conversion.page_margins.clone(),
            keep_intermediates: self
                .conversion
                .keep_intermediates
                .unwrap_or(defaults.keep_intermediates),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(
            config.conversion_resolved.source_dir,
            PathBuf::from("/test/docs")
        );
        assert_eq!(
            config.conversion_resolved.output_dir,
            PathBuf::from("/test/output")
        );
        assert_eq!(
            config.conversion_resolved.state_dir(),
            PathBuf::from("/test/.mdpress/state")
        );
        assert_eq!(
            config.conversion_resolved.scratch_dir(),
            PathBuf::from("/test/.mdpress/scratch")
        );
        assert_eq!(config.conversion_resolved.profile, "a4-print");
        assert_eq!(config.conversion_resolved.format, "pdf");
        assert_eq!(config.conversion_resolved.workers, 4);
        assert_eq!(config.rendering.mermaid_command, "mmdc");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.rendering.plantuml_url, "http://localhost:8080");
        assert_eq!(config.rendering.render_timeout_secs, 60);
    }

    #[test]
    fn test_parse_and_resolve() {
        let toml = r#"
[conversion]
source_dir = "manuscript"
output_dir = "books"
profile = "kindle-basic"
format = "epub"
workers = 2
page_margins = "0.5in"
keep_intermediates = true

[rendering]
plantuml_url = "http://plantuml.internal:8080"
mermaid_command = "/opt/mmdc"
render_timeout_secs = 120
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        let conv = &config.conversion_resolved;
        assert_eq!(conv.source_dir, PathBuf::from("/project/manuscript"));
        assert_eq!(conv.output_dir, PathBuf::from("/project/books"));
        assert_eq!(conv.project_dir, PathBuf::from("/project/.mdpress"));
        assert_eq!(conv.profile, "kindle-basic");
        assert_eq!(conv.format, "epub");
        assert_eq!(conv.workers, 2);
        assert_eq!(conv.page_margins.as_deref(), Some("0.5in"));
        assert!(conv.keep_intermediates);
        assert_eq!(config.rendering.plantuml_url, "http://plantuml.internal:8080");
        assert_eq!(config.rendering.render_timeout_secs, 120);
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            profile: Some("kindle-large".to_owned()),
            format: Some("mobi".to_owned()),
            workers: Some(8),
            page_margins: Some("1in 0.5in".to_owned()),
            plantuml_url: Some("http://other:9090".to_owned()),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.conversion_resolved.profile, "kindle-large");
        assert_eq!(config.conversion_resolved.format, "mobi");
        assert_eq!(config.conversion_resolved.workers, 8);
        assert_eq!(
            config.conversion_resolved.page_margins.as_deref(),
            Some("1in 0.5in")
        );
        assert_eq!(config.rendering.plantuml_url, "http://other:9090");
        // Unchanged
        assert_eq!(
            config.conversion_resolved.source_dir,
            PathBuf::from("/test/docs")
        );
    }

    #[test]
    fn test_apply_cli_settings_empty_changes_nothing() {
        let before = Config::default_with_base(Path::new("/test"));
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(
            config.conversion_resolved.profile,
            before.conversion_resolved.profile
        );
        assert_eq!(config.rendering.plantuml_url, before.rendering.plantuml_url);
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEST_PLANTUML_URL", "http://plantuml.test:8080");
        }

        let toml = r#"
[rendering]
plantuml_url = "${TEST_PLANTUML_URL}"
mermaid_command = "${TEST_MMDC:-mmdc}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.rendering.plantuml_url, "http://plantuml.test:8080");
        assert_eq!(config.rendering.mermaid_command, "mmdc");

        unsafe {
            std::env::remove_var("TEST_PLANTUML_URL");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_MDPRESS_TEST_VAR");
        }

        let toml = r#"
[rendering]
plantuml_url = "${MISSING_MDPRESS_TEST_VAR}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("rendering.plantuml_url"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.rendering.plantuml_url = "ftp://nope".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("plantuml_url"));

        let mut config = Config::default_with_base(Path::new("/test"));
        config.rendering.render_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("render_timeout_secs"));

        let mut config = Config::default_with_base(Path::new("/test"));
        config.conversion_resolved.format = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("conversion.format"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = Config::load(Some(Path::new("/no/such/mdpress.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_explicit_file_resolves_relative_to_it() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("mdpress.toml");
        std::fs::write(&path, "[conversion]\nsource_dir = \"chapters\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(
            config.conversion_resolved.source_dir,
            tmp.path().join("chapters")
        );
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }
}
