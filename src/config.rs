use crate::error::Result;
use crate::types::Dimension;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "riskboard.toml";
pub const CONFIG_ENV: &str = "RISKBOARD_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub default_rank_field: String,
    pub preview_rows: usize,
    pub report_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_path: PathBuf::from("risk_index.csv"),
            output_dir: PathBuf::from("."),
            default_rank_field: "Risk".to_string(),
            preview_rows: 10,
            report_base_url: "./report/".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text)?;
        // fail early on a field name the service does not know
        Dimension::from_field(&config.default_rank_field)?;
        Ok(config)
    }

    /// Read `path`; a missing file means defaults.
    pub fn load(path: &Path) -> Result<Config> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(path)?;
        Config::from_toml(&text)
    }

    /// `$RISKBOARD_CONFIG` if set, else `riskboard.toml` in the working directory.
    pub fn discover() -> Result<Config> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Config::load(&path)
    }

    pub fn rank_dimension(&self) -> Result<Dimension> {
        Dimension::from_field(&self.default_rank_field)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RiskError;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn partial_override() {
        let c = Config::from_toml(
            "data_path = \"data/admin2.csv\"\ndefault_rank_field = \"N_H\"\npreview_rows = 3\n",
        )
        .unwrap();
        assert_eq!(c.data_path, PathBuf::from("data/admin2.csv"));
        assert_eq!(c.rank_dimension().unwrap(), Dimension::Hazard);
        assert_eq!(c.preview_rows, 3);
        assert_eq!(c.report_base_url, "./report/");
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            Config::from_toml("default_rank_field = \"Rainfall\""),
            Err(RiskError::UnknownField(_))
        ));
        assert!(matches!(
            Config::from_toml("page_size = 25"),
            Err(RiskError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let c = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(c, Config::default());

        let path = dir.path().join("riskboard.toml");
        std::fs::write(&path, "output_dir = \"out\"").unwrap();
        let c = Config::load(&path).unwrap();
        assert_eq!(c.output_path("a.csv"), PathBuf::from("out").join("a.csv"));
    }
}
