//! Excitation/emission curve pair for one fluorophore.

use crate::data::curve::Curve;

/// Spectral data of a single fluorophore.
///
/// The first curve is either an excitation or an absorption spectrum,
/// depending on [`Spectrum::is_absorption`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spectrum {
    id: String,
    excitation: Curve,
    emission: Curve,
    absorption: bool,
    two_photon: bool,
}

impl Spectrum {
    pub fn new(id: impl Into<String>, excitation: Curve, emission: Curve) -> Self {
        Self {
            id: id.into(),
            excitation,
            emission,
            absorption: false,
            two_photon: false,
        }
    }

    /// Spectrum with both curves set to the empty sentinel.
    pub fn invalid(id: impl Into<String>) -> Self {
        Self::new(id, Curve::empty(), Curve::empty())
    }

    /// Mark the first curve as an absorption spectrum
    pub fn with_absorption(mut self, absorption: bool) -> Self {
        self.absorption = absorption;
        self
    }

    pub fn with_two_photon(mut self, two_photon: bool) -> Self {
        self.two_photon = two_photon;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn excitation(&self) -> &Curve {
        &self.excitation
    }

    pub fn emission(&self) -> &Curve {
        &self.emission
    }

    pub fn is_absorption(&self) -> bool {
        self.absorption
    }

    pub fn is_two_photon(&self) -> bool {
        self.two_photon
    }

    /// Valid if both curves hold real data
    pub fn is_valid(&self) -> bool {
        !self.excitation.is_empty() && !self.emission.is_empty()
    }

    pub fn excitation_at(&self, wavelength: f64, cutoff: f64) -> f64 {
        self.excitation.intensity_at(wavelength, cutoff)
    }

    pub fn emission_at(&self, wavelength: f64, cutoff: f64) -> f64 {
        self.emission.intensity_at(wavelength, cutoff)
    }

    /// Curve-derived excitation peak (nm)
    pub fn excitation_max(&self) -> f64 {
        self.excitation.intensity_max()
    }

    /// Curve-derived emission peak (nm)
    pub fn emission_max(&self) -> f64 {
        self.emission.intensity_max()
    }
}
