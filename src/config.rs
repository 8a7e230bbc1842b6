//! Persisted viewer configuration (pretty JSON)

use crate::cache::SortMode;
use crate::constants::cache::DEFAULT_CAPACITY;
use crate::constants::plot::{DEFAULT_LINE_WIDTH, DEFAULT_WAVELENGTH_MAX, DEFAULT_WAVELENGTH_MIN};
use crate::data::curve::Range;
use crate::error::{Result, SpectraError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Spectrum library opened last
    pub library_dir: Option<PathBuf>,
    /// Identifiers active when the viewer was closed, in insertion order
    pub active: Vec<String>,
    pub visible_excitation: bool,
    pub visible_emission: bool,
    pub sort_mode: SortMode,
    pub cache_capacity: usize,
    /// Plotted wavelength range (nm)
    pub wavelength: Range,
    pub line_width: f64,
    pub fill_curves: bool,
    pub dark_mode: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            library_dir: None,
            active: Vec::new(),
            visible_excitation: true,
            visible_emission: true,
            sort_mode: SortMode::default(),
            cache_capacity: DEFAULT_CAPACITY,
            wavelength: Range::new(DEFAULT_WAVELENGTH_MIN, DEFAULT_WAVELENGTH_MAX),
            line_width: DEFAULT_LINE_WIDTH,
            fill_curves: true,
            dark_mode: true,
        }
    }
}

impl ViewerConfig {
    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config.validated())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| {
            SpectraError::Config(format!("Failed to write {}: {}", path.display(), e))
        })?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Replace values the viewer cannot work with by their defaults
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        let w = self.wavelength;
        if !(w.min.is_finite() && w.max.is_finite() && w.max > w.min) {
            log::warn!("Invalid wavelength range {:?} in config, using default", w);
            self.wavelength = defaults.wavelength;
        }
        if self.cache_capacity == 0 {
            self.cache_capacity = defaults.cache_capacity;
        }
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            self.line_width = defaults.line_width;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ViewerConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = ViewerConfig {
            library_dir: Some(PathBuf::from("/data/spectra")),
            active: vec!["fitc".to_string(), "pe".to_string()],
            sort_mode: SortMode::EmissionReversed,
            visible_excitation: false,
            ..ViewerConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(ViewerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "sort_mode": "Alphabetical", "wavelength": { "min": 500.0, "max": 500.0 }, "cache_capacity": 0 }"#,
        )
        .unwrap();
        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.sort_mode, SortMode::Alphabetical);
        assert_eq!(config.wavelength, ViewerConfig::default().wavelength);
        assert_eq!(config.cache_capacity, DEFAULT_CAPACITY);
        assert!(config.visible_emission);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ViewerConfig::load(&path),
            Err(SpectraError::Json(_))
        ));
    }
}
