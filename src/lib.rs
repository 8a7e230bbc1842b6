//! Spectra Oxide: fluorescence spectra cache and plotting engine.
//!
//! The engine (`cache`, `data`, `plot`) has no GUI dependency. `app` and `ui`
//! put an egui front end on top of it.

pub mod app;
pub mod cache;
pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod plot;
pub mod state;
pub mod ui;

pub use app::SpectraViewer;
pub use cache::{
    Cache, CacheEntry, CacheSettings, CurveKind, EntryHandle, Snapshot, SnapshotItem, SnapshotKind,
    SortMode,
};
pub use config::ViewerConfig;
pub use data::{Curve, LoadedSpectrum, Range, Rgb, Spectrum, SpectrumLibrary, SpectrumLoader};
pub use error::{Result, SpectraError};
pub use plot::{PlotShape, PlotTransform, Viewport};
