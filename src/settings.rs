use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{collections::HashSet, env, fmt, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_images_dir")]
    pub images_dir: String,

    #[serde(default = "default_image_sizes")]
    pub image_sizes: Vec<u32>,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_remote_fetch_timeout")]
    pub remote_fetch_timeout_secs: u64,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "Image-Derivatives-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_images_dir() -> String {
    "images".to_string()
}
fn default_image_sizes() -> Vec<u32> {
    vec![75, 300, 800]
}
fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}
fn default_remote_fetch_timeout() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            cors_allowed_origins: default_cors_origins(),
            images_dir: default_images_dir(),
            image_sizes: default_image_sizes(),
            max_upload_bytes: default_max_upload_bytes(),
            remote_fetch_timeout_secs: default_remote_fetch_timeout(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("image_sizes")
                    .with_list_parse_key("cors_allowed_origins")
                    .ignore_empty(true)
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;
        config.images_dir = config.images_dir.trim_matches('/').to_string();

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.images_dir.trim_matches('/').trim().is_empty() {
            errors.push("IMAGES_DIR cannot be empty".to_string());
        }
        if self.image_sizes.is_empty() {
            errors.push("IMAGE_SIZES must list at least one size".to_string());
        }
        if self.image_sizes.iter().any(|&s| s == 0) {
            errors.push("IMAGE_SIZES must be positive".to_string());
        }
        let unique: HashSet<_> = self.image_sizes.iter().collect();
        if unique.len() != self.image_sizes.len() {
            errors.push("IMAGE_SIZES must not contain duplicates".to_string());
        }
        if self.max_upload_bytes == 0 {
            errors.push("MAX_UPLOAD_BYTES must be greater than zero".to_string());
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Public URL prefix derivatives are served under, e.g. `/images`.
    pub fn images_url_prefix(&self) -> String {
        format!("/{}", self.images_dir.trim_matches('/'))
    }

    pub fn remote_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_fetch_timeout_secs)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

/// Immutable snapshot of the image settings, built once at startup and
/// shared by every ingest and purge.
#[derive(Debug, Clone)]
pub struct ImageSettings {
    pub dir: PathBuf,
    pub sizes: Arc<[u32]>,
    pub url_prefix: String,
    pub max_upload_bytes: usize,
}

impl From<&AppConfig> for ImageSettings {
    fn from(config: &AppConfig) -> Self {
        ImageSettings {
            dir: PathBuf::from(config.images_dir.trim_matches('/')),
            sizes: config.image_sizes.clone().into(),
            url_prefix: config.images_url_prefix(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}
