pub mod color;
pub mod curve;
pub mod source;
pub mod spectrum;

// Re-export key types for convenience
pub use color::{Rgb, visible_spectrum};
pub use curve::{Curve, Range, ScaledCurve};
pub use source::{LibraryEntry, LoadedSpectrum, SpectrumLibrary, SpectrumLoader};
pub use spectrum::Spectrum;
