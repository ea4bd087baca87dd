use anyhow::{Context, Result};
use halkit::{CycleGuard, PageLimits, RouteUrlBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides, e.g. `APP__HAL__BASE_URL`.
pub const ENV_PREFIX: &str = "APP__";

/// Application configuration: hypermedia settings plus the ambient
/// logging map.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base directory for relative log paths. Empty means the current
    /// directory; `~` expands to the user's home.
    #[serde(default)]
    pub home_dir: String,
    #[serde(default)]
    pub hal: HalConfig,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
}

/// Settings that shape generated URLs and page limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HalConfig {
    pub base_url: String,
    pub version_prefix: String,
    pub cycle_guard: CycleGuard,
    pub paging: PageLimits,
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8087".to_string(),
            version_prefix: "v".to_string(),
            cycle_guard: CycleGuard::default(),
            paging: PageLimits::default(),
        }
    }
}

impl HalConfig {
    pub fn url_builder(&self) -> RouteUrlBuilder {
        RouteUrlBuilder::new(self.base_url.as_str())
            .with_version_prefix(self.version_prefix.as_str())
    }
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, LogSection>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub console_level: String, // "info", "debug", "error", "off"
    pub file: String,          // "logs/hal.log"; empty disables the file
    pub file_level: String,
    pub max_backups: Option<usize>,
    pub max_size_mb: Option<u64>,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            console_level: "info".to_string(),
            file: String::new(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        }
    }
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    HashMap::from([("default".to_string(), LogSection::default())])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            hal: HalConfig::default(),
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    /// Also normalizes `home_dir` into an absolute path.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        Self::load_with_env_prefix(config_path.as_ref(), ENV_PREFIX)
    }

    fn load_with_env_prefix(config_path: &Path, env_prefix: &str) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        if !config_path.is_file() {
            anyhow::bail!("config file not found: {}", config_path.display());
        }

        // logging stays None unless YAML or ENV provide it
        let base = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path))
            // APP__HAL__PAGING__MAX_SIZE=50 maps to hal.paging.max_size
            .merge(Env::prefixed(env_prefix).split("__"));

        let mut config: AppConfig = figment
            .extract()
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

        config.normalize_home_dir()?;
        Ok(config)
    }

    /// Load configuration from file or fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                c.normalize_home_dir()
                    .context("Failed to resolve home_dir (defaults)")?;
                Ok(c)
            }
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(base_url) = &args.base_url {
            self.hal.base_url = base_url.clone();
        }

        // Set logging level based on verbose flags for "default" section.
        let logging = self.logging.get_or_insert_with(default_logging_config);
        let default_section = logging.entry("default".to_string()).or_default();
        match args.verbose {
            0 => {}
            1 => default_section.console_level = "debug".to_string(),
            _ => default_section.console_level = "trace".to_string(),
        }
    }

    /// Check the values serde cannot: page limits and the base URL.
    pub fn validate(&self) -> Result<()> {
        let paging = &self.hal.paging;
        if paging.default_size == 0 {
            anyhow::bail!("hal.paging.default_size must be at least 1");
        }
        if paging.default_size > paging.max_size {
            anyhow::bail!(
                "hal.paging.default_size ({}) exceeds hal.paging.max_size ({})",
                paging.default_size,
                paging.max_size
            );
        }
        if self.hal.base_url.trim().is_empty() {
            anyhow::bail!("hal.base_url must not be empty");
        }
        Ok(())
    }

    fn normalize_home_dir(&mut self) -> Result<()> {
        let resolved =
            resolve_home_dir(&self.home_dir).context("home_dir normalization failed")?;
        self.home_dir = resolved.to_string_lossy().to_string();
        Ok(())
    }
}

/// Command line arguments structure.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub base_url: Option<String>,
    pub print_config: bool,
    pub verbose: u8,
}

/// Expand `~`, make the path absolute and create it when it was given.
fn resolve_home_dir(raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    let cwd = std::env::current_dir().context("current directory is not accessible")?;
    if raw.is_empty() {
        return Ok(cwd);
    }

    let path = match raw.strip_prefix('~') {
        Some(rest) => {
            let home = user_home().context("cannot expand '~': no home directory")?;
            home.join(rest.trim_start_matches(['/', '\\']))
        }
        None => PathBuf::from(raw),
    };
    let path = if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    };

    std::fs::create_dir_all(&path)
        .with_context(|| format!("cannot create home_dir {}", path.display()))?;
    Ok(path)
}

fn user_home() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "USERPROFILE";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";
    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
