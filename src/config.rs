use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub api: ApiConfig,
    pub dimensions: DimensionsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8050,
            debug: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub ons_base_url: String,
    pub postcodes_base_url: String,
    pub population_type: String,
    /// Area type used for the postcode's own area, e.g. `lsoa`.
    pub area_type: String,
    /// Full area selector of the comparison region, e.g. `ctry,E92000001`.
    pub reference_area: String,
    pub reference_name: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            ons_base_url: "https://api.beta.ons.gov.uk/v1".to_string(),
            postcodes_base_url: "https://api.postcodes.io".to_string(),
            population_type: "UR".to_string(),
            area_type: "lsoa".to_string(),
            reference_area: "ctry,E92000001".to_string(),
            reference_name: "England".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// `timeout_secs = 0` disables the request timeout.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn area_selector(&self, area_code: &str) -> String {
        format!("{},{}", self.area_type, area_code)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DimensionsConfig {
    pub page_size: u32,
    /// Labels hidden in addition to the built-in denylist.
    pub exclude: Vec<String>,
}

impl Default for DimensionsConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            exclude: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Loads `path` if given, else `config.toml` when present, else the defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_path = Path::new("config.toml");
                if default_path.exists() {
                    Self::load_from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
