use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::size::{Gender, SizeGuide};

/// Analyzer settings, read from TOML.
///
/// ```toml
/// gender = "female"
/// pixel_to_unit_ratio = 0.12
/// size_guide = "guides/eu_female.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Selects the built-in size guide.
    #[serde(default)]
    pub gender: Gender,
    /// Physical units per pixel, e.g. from a reference object in frame.
    #[serde(default = "default_pixel_to_unit_ratio")]
    pub pixel_to_unit_ratio: f32,
    /// JSON size guide replacing the built-in one.
    #[serde(default)]
    pub size_guide: Option<PathBuf>,
}

fn default_pixel_to_unit_ratio() -> f32 {
    0.1
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            gender: Gender::default(),
            pixel_to_unit_ratio: default_pixel_to_unit_ratio(),
            size_guide: None,
        }
    }
}

impl AnalyzerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The configured guide file, or the built-in guide for `gender`.
    pub fn size_guide(&self) -> Result<SizeGuide> {
        match &self.size_guide {
            Some(path) => SizeGuide::load(path),
            None => Ok(SizeGuide::builtin(self.gender)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AnalyzerConfig::from_toml("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.gender, Gender::Male);
        assert!((config.pixel_to_unit_ratio - 0.1).abs() < 1e-6);
    }

    #[test]
    fn parses_fields() {
        let config = AnalyzerConfig::from_toml(
            r#"
            gender = "female"
            pixel_to_unit_ratio = 0.25
            "#,
        )
        .unwrap();
        assert_eq!(config.gender, Gender::Female);
        assert_eq!(config.pixel_to_unit_ratio, 0.25);
        assert_eq!(config.size_guide().unwrap(), SizeGuide::builtin(Gender::Female));
    }

    #[test]
    fn rejects_bad_gender() {
        let result = AnalyzerConfig::from_toml(r#"gender = "robot""#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn loads_guide_from_file() {
        let path = std::env::temp_dir().join("percent_body_test_guide.json");
        std::fs::write(
            &path,
            r#"{"sizes": [{"label": "ONE", "ranges": {"waist": {"min": 0.0, "max": 200.0}}}]}"#,
        )
        .unwrap();

        let config = AnalyzerConfig {
            size_guide: Some(path.clone()),
            ..AnalyzerConfig::default()
        };
        let guide = config.size_guide().unwrap();
        assert_eq!(guide.sizes.len(), 1);
        assert_eq!(guide.sizes[0].label, "ONE");

        std::fs::remove_file(path).ok();

        let missing = AnalyzerConfig {
            size_guide: Some(PathBuf::from("/nonexistent/guide.json")),
            ..AnalyzerConfig::default()
        };
        assert!(matches!(missing.size_guide(), Err(Error::Io(_))));
    }
}
