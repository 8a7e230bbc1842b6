//! Application state management
//!
//! Owns the single [`Cache`] instance and everything the front end derives
//! from it. The front end never holds entry references across frames; it keeps
//! the latest [`Snapshot`] and resolves handles through the cache on use.

mod ui;
mod view;

pub use ui::UiState;
pub use view::ViewState;

use crate::cache::{Cache, CurveKind, Snapshot, SnapshotKind, SortMode};
use crate::config::ViewerConfig;
use crate::constants::cache::CAPACITY_INCREMENT;
use crate::constants::plot::{INTENSITY_MAX, INTENSITY_MIN};
use crate::data::curve::Range;
use crate::data::source::{LoadedSpectrum, SpectrumLibrary};
use crate::error::Result;
use crate::plot::{PlotTransform, Viewport, hit_test};
use std::path::Path;

fn no_library(id: &str) -> LoadedSpectrum {
    LoadedSpectrum::unknown(id)
}

/// Main application state container
pub struct AppState {
    /// Spectral cache (single instance for the whole viewer)
    pub cache: Cache,

    /// Currently opened spectrum library
    pub library: Option<SpectrumLibrary>,

    /// Latest ordered view of the active spectra
    pub snapshot: Snapshot,

    /// View and visualization state
    pub view: ViewState,

    /// UI interaction state
    pub ui: UiState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl AppState {
    /// Build state from a config, reopening its library and active spectra.
    /// Library errors are reported through [`UiState`], not returned.
    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut cache = Cache::with_capacity(no_library, config.cache_capacity, CAPACITY_INCREMENT);
        let snapshot = cache.set_settings(
            config.visible_excitation,
            config.visible_emission,
            config.sort_mode,
        );
        let mut state = Self {
            cache,
            library: None,
            snapshot,
            view: ViewState::from_config(config),
            ui: UiState::new(),
        };

        if let Some(dir) = &config.library_dir {
            match state.open_library(dir) {
                Ok(()) => state.add_ids(&config.active),
                Err(e) => state.ui.report(&e),
            }
        }
        state
    }

    /// Snapshot of the current state as a persistable config.
    ///
    /// Active ids are stored in insertion order, not display order, so that
    /// re-adding them on restore reproduces the same snapshot.
    pub fn to_config(&self) -> ViewerConfig {
        let settings = self.cache.settings();
        let mut active: Vec<(u32, String)> = self
            .snapshot
            .iter()
            .filter_map(|i| self.cache.entry(i.handle).map(|e| (e.index(), i.id.clone())))
            .collect();
        active.sort_by_key(|(index, _)| *index);

        ViewerConfig {
            library_dir: self.library.as_ref().map(|l| l.root().to_path_buf()),
            active: active.into_iter().map(|(_, id)| id).collect(),
            visible_excitation: settings.visible_excitation,
            visible_emission: settings.visible_emission,
            sort_mode: settings.sort_mode,
            cache_capacity: self.cache.capacity(),
            wavelength: self.view.wavelength,
            line_width: self.view.line_width,
            fill_curves: self.view.fill_curves,
            dark_mode: self.view.dark_mode,
        }
    }

    /// Open a spectrum library, replacing the current one and its entries
    pub fn open_library(&mut self, dir: &Path) -> Result<()> {
        let library = SpectrumLibrary::open(dir)?;
        let snapshot = self.cache.replace_loader(library.clone());
        self.library = Some(library);
        self.apply(snapshot);
        Ok(())
    }

    /// Activate identifiers known to the library, in the given order
    pub fn add_ids(&mut self, ids: &[String]) {
        let Some(library) = &self.library else {
            return;
        };
        let keys: Vec<(String, String)> = ids
            .iter()
            .filter_map(|id| library.find(id))
            .map(|e| (e.id.clone(), e.name.clone()))
            .collect();
        if keys.is_empty() {
            return;
        }
        let snapshot = self.cache.add(keys);
        self.apply(snapshot);
    }

    pub fn remove_ids(&mut self, ids: &[String]) {
        let snapshot = self.cache.remove(ids);
        self.apply(snapshot);
    }

    pub fn clear(&mut self) {
        let snapshot = self.cache.clear();
        self.apply(snapshot);
    }

    /// Change visibility defaults and sort mode
    pub fn set_display(
        &mut self,
        visible_excitation: bool,
        visible_emission: bool,
        sort_mode: SortMode,
    ) {
        let snapshot =
            self.cache.set_settings(visible_excitation, visible_emission, sort_mode);
        self.apply(snapshot);
    }

    /// Apply `cutoff` to every entry with a selected curve
    pub fn set_cutoff_for_selected(&mut self, cutoff: f64) {
        for item in &self.snapshot.items {
            if let Some(entry) = self.cache.entry_mut(item.handle) {
                if entry.select_excitation() || entry.select_emission() {
                    entry.set_intensity_cutoff(cutoff);
                }
            }
        }
        if self.cache.take_modified() {
            self.snapshot = self.cache.update();
            self.view.invalidate_shapes();
        }
    }

    /// Transform for `viewport` over the configured wavelength range
    pub fn transform(&self, viewport: Viewport) -> Result<PlotTransform> {
        PlotTransform::new(
            self.view.wavelength,
            Range::new(INTENSITY_MIN, INTENSITY_MAX),
            viewport,
        )
    }

    /// Toggle selection of the curve under `point`. Returns what was hit.
    pub fn click(
        &mut self,
        transform: &PlotTransform,
        point: [f64; 2],
    ) -> Option<(String, CurveKind)> {
        let (handle, kind) = hit_test(
            &self.cache,
            &self.snapshot.items,
            transform,
            point,
            self.view.line_width,
        )?;
        let entry = self.cache.entry_mut(handle)?;
        let selected = entry.is_selected(kind);
        entry.set_selected(kind, !selected);
        let id = entry.id().to_string();

        if self.cache.take_modified() {
            self.snapshot = self.cache.update();
            self.view.invalidate_shapes();
        }
        Some((id, kind))
    }

    fn apply(&mut self, snapshot: Snapshot) {
        let modified = self.cache.take_modified();
        match snapshot.kind {
            SnapshotKind::Sync => self.view.invalidate_shapes(),
            SnapshotKind::Update if modified => self.view.invalidate_shapes(),
            SnapshotKind::Update => {}
        }
        self.snapshot = snapshot;
    }
}
