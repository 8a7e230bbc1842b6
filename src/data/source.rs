//! Spectrum loading.
//!
//! The cache only needs something implementing [`SpectrumLoader`]. The
//! on-disk implementation, [`SpectrumLibrary`], reads a directory of CSV
//! files through polars:
//!
//! - `index.csv`: `id`, `name` and optional `excitation_max`, `emission_max`,
//!   `absorption`, `two_photon` columns
//! - `<id>.csv`: `wavelength` plus `excitation` (or `absorption`) and
//!   `emission` columns; empty cells are skipped per column

use crate::constants::config::LIBRARY_INDEX_FILE;
use crate::data::curve::Curve;
use crate::data::spectrum::Spectrum;
use crate::error::{Result, SpectraError};
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// A loaded spectrum plus optional peak metadata from the source
#[derive(Debug, Clone, Default)]
pub struct LoadedSpectrum {
    pub spectrum: Spectrum,
    pub excitation_max: Option<f64>,
    pub emission_max: Option<f64>,
}

impl LoadedSpectrum {
    pub fn new(spectrum: Spectrum) -> Self {
        Self {
            spectrum,
            excitation_max: None,
            emission_max: None,
        }
    }

    /// Well-formed but invalid result for identifiers the loader cannot serve
    pub fn unknown(id: &str) -> Self {
        Self::new(Spectrum::invalid(id))
    }
}

/// Source of spectra for the cache.
///
/// Implementations must not fail: unknown identifiers produce an invalid
/// [`Spectrum`] (see [`LoadedSpectrum::unknown`]).
pub trait SpectrumLoader {
    fn load(&self, id: &str) -> LoadedSpectrum;
}

impl<F> SpectrumLoader for F
where
    F: Fn(&str) -> LoadedSpectrum,
{
    fn load(&self, id: &str) -> LoadedSpectrum {
        self(id)
    }
}

/// One row of a library index
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryEntry {
    pub id: String,
    pub name: String,
    pub excitation_max: Option<f64>,
    pub emission_max: Option<f64>,
    pub absorption: bool,
    pub two_photon: bool,
}

/// Directory of CSV spectra described by an `index.csv`
#[derive(Debug, Clone)]
pub struct SpectrumLibrary {
    root: PathBuf,
    entries: Vec<LibraryEntry>,
}

impl SpectrumLibrary {
    /// Read the library index in `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        profiling::scope!("SpectrumLibrary::open");

        let df = read_csv(&dir.join(LIBRARY_INDEX_FILE))?;
        let ids = str_column(&df, "id")?;
        let names = match df.column("name") {
            Ok(_) => str_column(&df, "name")?,
            Err(_) => ids.iter().map(|id| id.clone()).collect(),
        };
        let excitation_max = optional_f64_column(&df, "excitation_max")?;
        let emission_max = optional_f64_column(&df, "emission_max")?;
        let absorption = optional_bool_column(&df, "absorption");
        let two_photon = optional_bool_column(&df, "two_photon");

        let mut entries = Vec::with_capacity(ids.len());
        for (row, id) in ids.into_iter().enumerate() {
            let Some(id) = id.filter(|s| !s.trim().is_empty()) else {
                log::warn!("{}: row {} has no id, skipped", LIBRARY_INDEX_FILE, row + 1);
                continue;
            };
            let id = id.trim().to_string();
            let name = names
                .get(row)
                .cloned()
                .flatten()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| id.clone());
            entries.push(LibraryEntry {
                id,
                name,
                excitation_max: peak_at(&excitation_max, row),
                emission_max: peak_at(&emission_max, row),
                absorption: absorption.get(row).copied().unwrap_or(false),
                two_photon: two_photon.get(row).copied().unwrap_or(false),
            });
        }

        log::info!(
            "Opened spectrum library {} ({} fluorophores)",
            dir.display(),
            entries.len()
        );
        Ok(Self {
            root: dir.to_path_buf(),
            entries,
        })
    }

    /// Library directory for a dropped or picked path: the directory itself,
    /// or the directory holding a picked index file.
    pub fn resolve_root(path: &Path) -> Result<PathBuf> {
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
        match (path.file_name(), path.parent()) {
            (Some(name), Some(parent)) if name == LIBRARY_INDEX_FILE => Ok(parent.to_path_buf()),
            _ => Err(SpectraError::UnsupportedFormat {
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            }),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn find(&self, id: &str) -> Option<&LibraryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// `(id, name)` pairs in index order
    pub fn identifiers(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|e| (e.id.clone(), e.name.clone()))
            .collect()
    }

    /// Load `id`, reporting unknown identifiers and unreadable files.
    pub fn load_strict(&self, id: &str) -> Result<LoadedSpectrum> {
        let entry = self
            .find(id)
            .ok_or_else(|| SpectraError::UnknownIdentifier(id.to_string()))?;

        let df = read_csv(&self.root.join(format!("{}.csv", entry.id)))?;
        let wavelength = optional_f64_column(&df, "wavelength")?.ok_or_else(|| {
            SpectraError::ColumnNotFound {
                column: "wavelength".to_string(),
            }
        })?;

        // A file with only an absorption column marks the spectrum as such
        let (first, absorption) = match optional_f64_column(&df, "excitation")? {
            Some(col) if !entry.absorption => (Some(col), false),
            excitation => match optional_f64_column(&df, "absorption")? {
                Some(col) => (Some(col), true),
                None => (excitation, entry.absorption),
            },
        };
        let emission = optional_f64_column(&df, "emission")?;

        let spectrum = Spectrum::new(
            entry.id.clone(),
            curve_from_columns(&entry.id, &wavelength, first.as_deref()),
            curve_from_columns(&entry.id, &wavelength, emission.as_deref()),
        )
        .with_absorption(absorption)
        .with_two_photon(entry.two_photon);

        Ok(LoadedSpectrum {
            spectrum,
            excitation_max: entry.excitation_max,
            emission_max: entry.emission_max,
        })
    }
}

impl SpectrumLoader for SpectrumLibrary {
    fn load(&self, id: &str) -> LoadedSpectrum {
        match self.load_strict(id) {
            Ok(loaded) => loaded,
            Err(e) => {
                log::warn!("Failed to load spectrum '{}': {}", id, e);
                LoadedSpectrum::unknown(id)
            }
        }
    }
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(SpectraError::FileIo(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .finish()?
        .collect()?;
    Ok(df)
}

fn column_series(df: &DataFrame, name: &str) -> Result<Series> {
    df.column(name)
        .map(|c| c.as_materialized_series().clone())
        .map_err(|_| SpectraError::ColumnNotFound {
            column: name.to_string(),
        })
}

fn str_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = column_series(df, name)?.cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|s| s.map(str::to_string))
        .collect())
}

fn optional_f64_column(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<f64>>>> {
    let Ok(series) = column_series(df, name) else {
        return Ok(None);
    };
    let series = series.cast(&DataType::Float64)?;
    Ok(Some(series.f64()?.into_iter().collect()))
}

/// Missing or unparsable flag columns read as all-false
fn optional_bool_column(df: &DataFrame, name: &str) -> Vec<bool> {
    column_series(df, name)
        .and_then(|s| Ok(s.cast(&DataType::Boolean)?))
        .and_then(|s| Ok(s.bool()?.into_iter().map(|v| v.unwrap_or(false)).collect()))
        .unwrap_or_default()
}

fn peak_at(column: &Option<Vec<Option<f64>>>, row: usize) -> Option<f64> {
    column
        .as_ref()
        .and_then(|c| c.get(row).copied().flatten())
        .filter(|w| w.is_finite() && *w > 0.0)
}

fn curve_from_columns(
    id: &str,
    wavelength: &[Option<f64>],
    values: Option<&[Option<f64>]>,
) -> Curve {
    let Some(values) = values else {
        log::debug!("'{}' has no data for one of its curves", id);
        return Curve::empty();
    };
    let (xs, ys): (Vec<f64>, Vec<f64>) = wavelength
        .iter()
        .zip(values)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    Curve::from_samples(&xs, &ys)
}
