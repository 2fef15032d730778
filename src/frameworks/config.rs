use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fmt, fs, time::Duration};
use url::Url;

use crate::interface_adapters::i18n::Locale;

// Runtime settings; environment variables win over the optional config file.

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_STORAGE_DIR: &str = ".grounds";
pub const DEFAULT_CONFIG_FILE: &str = "grounds.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: Url,
    pub request_timeout: Duration,
    pub storage_dir: PathBuf,
    pub locale: Locale,
}

// Shape of `grounds.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub api_base_url: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub storage_dir: Option<PathBuf>,
    pub locale: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidUrl { value: String, source: url::ParseError },
    InvalidTimeout(String),
    InvalidLocale(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            ConfigError::InvalidUrl { value, source } => {
                write!(f, "invalid API base url {value:?}: {source}")
            }
            ConfigError::InvalidTimeout(value) => write!(f, "invalid request timeout {value:?}"),
            ConfigError::InvalidLocale(value) => write!(f, "unsupported locale {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    // Read `GROUNDS_CONFIG` (or ./grounds.toml when present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = env::var("GROUNDS_CONFIG").ok().map(PathBuf::from);
        let file = match explicit {
            Some(path) => Some(read_file(&path)?),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Some(read_file(default)?)
                } else {
                    None
                }
            }
        };
        Self::from_sources(file.unwrap_or_default(), |key| env::var(key).ok())
    }

    pub fn from_sources(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base = env("API_BASE_URL")
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(&base).map_err(|source| ConfigError::InvalidUrl {
            value: base.clone(),
            source,
        })?;

        let request_timeout = match env("REQUEST_TIMEOUT_MS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(millis) if millis > 0 => Duration::from_millis(millis),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => match file.request_timeout_ms {
                Some(0) => return Err(ConfigError::InvalidTimeout("0".to_string())),
                Some(millis) => Duration::from_millis(millis),
                None => DEFAULT_REQUEST_TIMEOUT,
            },
        };

        let storage_dir = env("STORAGE_DIR")
            .map(PathBuf::from)
            .or(file.storage_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        let locale = match env("LOCALE").or(file.locale) {
            Some(raw) => Locale::parse(&raw).ok_or(ConfigError::InvalidLocale(raw))?,
            None => Locale::Ko,
        };

        Ok(Self {
            api_base_url,
            request_timeout,
            storage_dir,
            locale,
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
