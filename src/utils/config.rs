// Configuration utilities

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

/// Analysis knobs. The defaults are the values fixed by the exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Year that rider age is measured against.
    pub reference_year: i64,
    /// Groups smaller than this are dropped from median rankings.
    pub min_group_size: i64,
    /// How many age buckets the ranking report keeps.
    pub top_buckets: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            analysis: AnalysisConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            reference_year: 2021,
            min_group_size: 10,
            top_buckets: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON or YAML file, by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(&path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let ext = path.as_ref().extension().and_then(|e| e.to_str());
        let config = match ext {
            Some("json") => serde_json::from_str(&contents)
                .map_err(|e| AppError::Config(e.to_string()))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
                .map_err(|e| AppError::Config(e.to_string()))?,
            _ => {
                return Err(AppError::Config(
                    "unsupported config file format".to_string(),
                ))
            }
        };

        Ok(config)
    }

    /// Get the log level filter.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.logging.level.to_lowercase().as_str() {
            "off" => log::LevelFilter::Off,
            "error" => log::LevelFilter::Error,
            "warn" => log::LevelFilter::Warn,
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            _ => log::LevelFilter::Info,
        }
    }
}
