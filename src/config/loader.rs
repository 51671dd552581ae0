//! Dataset loading.
//!
//! This module provides the [`ConfigLoader`] type, which reads a tariff
//! dataset from disk and builds its [`TariffIndex`] once.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::index::TariffIndex;
use super::types::TariffDataset;

/// Loads a tariff dataset and holds the index built from it.
///
/// Supported formats are chosen by file extension: `.json`, `.yaml` and
/// `.yml`.
///
/// # Example
///
/// ```no_run
/// use tariff_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/tariff.json")?;
/// println!("Loaded {} tariff versions", loader.index().versions().len());
/// # Ok::<(), tariff_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    dataset: TariffDataset,
    index: TariffIndex,
}

impl ConfigLoader {
    /// Loads the dataset file at `path`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ConfigNotFound`] if the file cannot be read
    /// - [`EngineError::ConfigParseError`] if it is not valid JSON/YAML
    /// - [`EngineError::UnsupportedFormat`] for any other extension
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let is_yaml = match extension.as_deref() {
            Some("json") => false,
            Some("yaml" | "yml") => true,
            _ => return Err(EngineError::UnsupportedFormat { path: path_str }),
        };

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let parsed: Result<TariffDataset, String> = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };
        let dataset = parsed.map_err(|message| EngineError::ConfigParseError {
            path: path_str.clone(),
            message,
        })?;

        let loader = Self::from_dataset(dataset);
        info!(
            path = %path_str,
            versions = loader.index.versions().len(),
            "Loaded tariff dataset"
        );
        Ok(loader)
    }

    /// Parses a dataset from JSON text.
    ///
    /// # Example
    ///
    /// ```
    /// use tariff_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::from_json_str(r#"{"tariff": {"weekly_hours": 38.5}}"#)?;
    /// assert_eq!(loader.index().weekly_hours().to_string(), "38.5");
    /// # Ok::<(), tariff_engine::error::EngineError>(())
    /// ```
    pub fn from_json_str(content: &str) -> EngineResult<Self> {
        let dataset = serde_json::from_str(content).map_err(|e| EngineError::ConfigParseError {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_dataset(dataset))
    }

    /// Wraps an already-parsed dataset and builds its index.
    pub fn from_dataset(dataset: TariffDataset) -> Self {
        let index = TariffIndex::build(&dataset);
        Self { dataset, index }
    }

    /// Returns the raw dataset.
    pub fn dataset(&self) -> &TariffDataset {
        &self.dataset
    }

    /// Returns the index built from the dataset.
    pub fn index(&self) -> &TariffIndex {
        &self.index
    }

    /// Consumes the loader, returning the index.
    pub fn into_index(self) -> TariffIndex {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PayGrade, VersionId};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn config_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/tariff.json")
    }

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("tariff-engine-{}-{}", std::process::id(), name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_fixture_dataset() {
        crate::logging::init_test();
        let loader = ConfigLoader::load(config_path()).unwrap();
        let index = loader.index();

        assert_eq!(index.versions().len(), 2);
        assert_eq!(index.weekly_hours().to_string(), "40");

        let latest = VersionId::new(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(index.steps_at(latest, PayGrade::EgII), 7);
        assert!(loader.dataset().tariff.get("entgelttabellen").is_some());
    }

    #[test]
    fn test_load_yaml_dataset() {
        let path = temp_file(
            "dataset.yaml",
            "tariff:\n  weekly_hours: 40\n  bd_hourly:\n    - valid_from: 2025-04-01\n      by_eg:\n        EG II: 38.03\n",
        );

        let loader = ConfigLoader::load(&path).unwrap();
        let version = VersionId::new(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        let rate = loader.index().on_call_rate(version, PayGrade::EgII).unwrap();
        assert_eq!(rate.rate.to_string(), "38.03");

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_file_returns_error() {
        let result = ConfigLoader::load("/nonexistent/tariff.json");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("tariff.json"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_unsupported_extension_returns_error() {
        let result = ConfigLoader::load("/nonexistent/tariff.toml");
        assert!(matches!(result, Err(EngineError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_load_invalid_json_returns_parse_error() {
        let path = temp_file("broken.json", "{ \"tariff\": [");

        match ConfigLoader::load(&path) {
            Err(EngineError::ConfigParseError { path: reported, message }) => {
                assert!(reported.ends_with("broken.json"));
                assert!(!message.is_empty());
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_from_json_str_without_tariff_section() {
        let loader = ConfigLoader::from_json_str("{}").unwrap();
        assert!(loader.index().versions().is_empty());
        assert!(ConfigLoader::from_json_str("not json").is_err());
    }
}
