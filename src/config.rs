use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// IANA timezone name used to interpret zoneless timestamps.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub dates: DateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,

    /// Worker threads for scanning. 0 means use available parallelism.
    #[serde(default)]
    pub threads: usize,
}

fn default_image_extensions() -> Vec<String> {
    vec![
        "jpg".to_string(),
        "jpeg".to_string(),
        "png".to_string(),
        "gif".to_string(),
        "bmp".to_string(),
        "tiff".to_string(),
        "webp".to_string(),
        "heic".to_string(),
        "heif".to_string(),
    ]
}

fn default_video_extensions() -> Vec<String> {
    vec![
        "mp4".to_string(),
        "avi".to_string(),
        "mov".to_string(),
        "wmv".to_string(),
        "flv".to_string(),
        "mkv".to_string(),
        "webm".to_string(),
        "m4v".to_string(),
        "3gp".to_string(),
        "mpg".to_string(),
        "mpeg".to_string(),
    ]
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            image_extensions: default_image_extensions(),
            video_extensions: default_video_extensions(),
            threads: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateConfig {
    /// Strict mode rejects capture times before January 1st of this year.
    #[serde(default = "default_epoch_floor_year")]
    pub epoch_floor_year: i32,

    /// Strict mode rejects capture times more than this far in the future.
    #[serde(default = "default_future_skew_hours")]
    pub future_skew_hours: i64,
}

fn default_epoch_floor_year() -> i32 {
    1990
}

fn default_future_skew_hours() -> i64 {
    24
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            epoch_floor_year: default_epoch_floor_year(),
            future_skew_hours: default_future_skew_hours(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mediadex")
        .join("mediadex.db")
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            timezone: default_timezone(),
            scanner: ScannerConfig::default(),
            dates: DateConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Parsed timezone from the config string.
    pub fn timezone(&self) -> Result<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow::anyhow!("invalid timezone {:?}: {}", self.timezone, e))
    }

    /// Effective worker count: configured value, or available parallelism.
    pub fn worker_threads(&self) -> usize {
        if self.scanner.threads > 0 {
            self.scanner.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mediadex")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}
