//! Dashboard configuration.
//!
//! Defaults, optionally overridden by a JSON file (`--config` or
//! `CRASH_DASHBOARD_CONFIG`), then by the data path (positional argument or
//! `CRASH_DASHBOARD_DATA`).

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::ConfigResult;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "CRASH_DASHBOARD_CONFIG";

/// Environment variable overriding the data file path.
pub const DATA_ENV: &str = "CRASH_DASHBOARD_DATA";

/// Data file read when nothing else is configured.
pub const DEFAULT_DATA_PATH: &str = "AIRPLANECRASHESPROJECT.csv";

/// Command-line arguments; each falls back to its environment variable.
#[derive(Parser, Debug, Default)]
#[command(name = "crash-dashboard")]
#[command(about = "Interactive airplane crash records dashboard", long_about = None)]
pub struct Cli {
    /// Crash CSV to load at startup
    #[arg(env = DATA_ENV)]
    pub data: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// CSV file loaded at startup.
    pub data_path: PathBuf,
    /// Rows shown in the filtered-data preview table.
    pub preview_rows: usize,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            preview_rows: 5,
            window_width: 1280.0,
            window_height: 900.0,
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Resolve the configuration from parsed arguments.
    pub fn from_cli(cli: &Cli) -> ConfigResult<Self> {
        Self::resolve(cli.config.as_deref(), cli.data.clone())
    }

    fn resolve(file: Option<&Path>, data: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match file {
            Some(path) => {
                log::info!("Reading configuration from {}", path.display());
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        if let Some(path) = data {
            config.data_path = path;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::io::Write;

    #[test]
    fn defaults_point_at_the_bundled_csv() {
        let config = DashboardConfig::default();
        assert_eq!(config.data_path, PathBuf::from("AIRPLANECRASHESPROJECT.csv"));
        assert_eq!(config.preview_rows, 5);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "preview_rows": 20 }}"#).unwrap();
        file.flush().unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.preview_rows, 20);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }

    #[test]
    fn data_path_beats_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_path": "from_file.csv" }}"#).unwrap();
        file.flush().unwrap();

        let only_file = DashboardConfig::resolve(Some(file.path()), None).unwrap();
        assert_eq!(only_file.data_path, PathBuf::from("from_file.csv"));

        let data = DashboardConfig::resolve(Some(file.path()), Some("arg.csv".into())).unwrap();
        assert_eq!(data.data_path, PathBuf::from("arg.csv"));
    }

    #[test]
    fn cli_feeds_config_file_and_data_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "data_path": "from_file.csv", "preview_rows": 8 }}"#).unwrap();
        file.flush().unwrap();

        let cli = Cli::try_parse_from([
            OsStr::new("crash-dashboard"),
            OsStr::new("--config"),
            file.path().as_os_str(),
            OsStr::new("arg.csv"),
        ])
        .unwrap();
        let config = DashboardConfig::from_cli(&cli).unwrap();
        assert_eq!(config.data_path, PathBuf::from("arg.csv"));
        assert_eq!(config.preview_rows, 8);
    }

    #[test]
    fn empty_cli_gives_defaults() {
        let config = DashboardConfig::from_cli(&Cli::default()).unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        file.flush().unwrap();
        assert!(DashboardConfig::from_file(file.path()).is_err());
    }
}
