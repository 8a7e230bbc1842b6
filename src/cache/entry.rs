//! Cached spectrum plus its per-session display state.

use crate::data::spectrum::Spectrum;

/// Which curve of a spectrum an operation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurveKind {
    Excitation,
    Emission,
}

/// A [`Spectrum`] owned by the cache, with mutable display state.
///
/// Setters only raise the `modified` flag when the value actually changes, so
/// downstream consumers can skip redraws for no-op toggles.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    spectrum: Spectrum,
    meta_excitation_max: Option<f64>,
    meta_emission_max: Option<f64>,
    index: u32,
    visible_excitation: bool,
    visible_emission: bool,
    select_excitation: bool,
    select_emission: bool,
    intensity_cutoff: f64,
    modified: bool,
}

impl CacheEntry {
    pub fn new(spectrum: Spectrum, index: u32) -> Self {
        Self {
            spectrum,
            meta_excitation_max: None,
            meta_emission_max: None,
            index,
            visible_excitation: true,
            visible_emission: true,
            select_excitation: false,
            select_emission: false,
            intensity_cutoff: 0.0,
            modified: false,
        }
    }

    /// Attach peak wavelengths from source metadata. Non-positive or
    /// non-finite values count as unset.
    pub fn with_metadata(
        mut self,
        excitation_max: Option<f64>,
        emission_max: Option<f64>,
    ) -> Self {
        self.meta_excitation_max = excitation_max.filter(|w| w.is_finite() && *w > 0.0);
        self.meta_emission_max = emission_max.filter(|w| w.is_finite() && *w > 0.0);
        self
    }

    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    pub fn id(&self) -> &str {
        self.spectrum.id()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: u32) {
        if self.index != index {
            self.index = index;
            self.modified = true;
        }
    }

    /// Excitation peak: metadata if present, else derived from the curve
    pub fn excitation_max(&self) -> f64 {
        self.meta_excitation_max.unwrap_or_else(|| self.spectrum.excitation_max())
    }

    /// Emission peak: metadata if present, else derived from the curve
    pub fn emission_max(&self) -> f64 {
        self.meta_emission_max.unwrap_or_else(|| self.spectrum.emission_max())
    }

    pub fn peak(&self, kind: CurveKind) -> f64 {
        match kind {
            CurveKind::Excitation => self.excitation_max(),
            CurveKind::Emission => self.emission_max(),
        }
    }

    pub fn visible_excitation(&self) -> bool {
        self.visible_excitation
    }

    pub fn visible_emission(&self) -> bool {
        self.visible_emission
    }

    pub fn select_excitation(&self) -> bool {
        self.select_excitation
    }

    pub fn select_emission(&self) -> bool {
        self.select_emission
    }

    pub fn intensity_cutoff(&self) -> f64 {
        self.intensity_cutoff
    }

    pub fn is_visible(&self, kind: CurveKind) -> bool {
        match kind {
            CurveKind::Excitation => self.visible_excitation,
            CurveKind::Emission => self.visible_emission,
        }
    }

    pub fn is_selected(&self, kind: CurveKind) -> bool {
        match kind {
            CurveKind::Excitation => self.select_excitation,
            CurveKind::Emission => self.select_emission,
        }
    }

    pub fn set_visible_excitation(&mut self, visible: bool) {
        if self.visible_excitation != visible {
            self.visible_excitation = visible;
            self.modified = true;
        }
    }

    pub fn set_visible_emission(&mut self, visible: bool) {
        if self.visible_emission != visible {
            self.visible_emission = visible;
            self.modified = true;
        }
    }

    pub fn set_select_excitation(&mut self, select: bool) {
        if self.select_excitation != select {
            self.select_excitation = select;
            self.modified = true;
        }
    }

    pub fn set_select_emission(&mut self, select: bool) {
        if self.select_emission != select {
            self.select_emission = select;
            self.modified = true;
        }
    }

    pub fn set_selected(&mut self, kind: CurveKind, select: bool) {
        match kind {
            CurveKind::Excitation => self.set_select_excitation(select),
            CurveKind::Emission => self.set_select_emission(select),
        }
    }

    pub fn set_intensity_cutoff(&mut self, cutoff: f64) {
        if self.intensity_cutoff != cutoff {
            self.intensity_cutoff = cutoff;
            self.modified = true;
        }
    }

    /// Excitation intensity at `wavelength`, honoring the entry's cutoff
    pub fn excitation_at(&self, wavelength: f64) -> f64 {
        self.spectrum.excitation_at(wavelength, self.intensity_cutoff)
    }

    /// Emission intensity at `wavelength`, honoring the entry's cutoff
    pub fn emission_at(&self, wavelength: f64) -> f64 {
        self.spectrum.emission_at(wavelength, self.intensity_cutoff)
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Acknowledge the current state; returns whether anything had changed.
    pub fn take_modified(&mut self) -> bool {
        std::mem::take(&mut self.modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::curve::Curve;

    fn entry() -> CacheEntry {
        let spectrum = Spectrum::new(
            "pe",
            Curve::new(&[480.0, 496.0, 565.0], &[60.0, 80.0, 100.0]).unwrap(),
            Curve::new(&[560.0, 578.0, 650.0], &[20.0, 100.0, 10.0]).unwrap(),
        );
        CacheEntry::new(spectrum, 7)
    }

    #[test]
    fn test_metadata_overrides_curve_peak() {
        let e = entry();
        assert_eq!(e.excitation_max(), 565.0);
        assert_eq!(e.emission_max(), 578.0);

        let e = entry().with_metadata(Some(496.0), None);
        assert_eq!(e.excitation_max(), 496.0);
        assert_eq!(e.emission_max(), 578.0);

        // Unset sentinel from source files
        let e = entry().with_metadata(Some(-1.0), Some(f64::NAN));
        assert_eq!(e.excitation_max(), 565.0);
        assert_eq!(e.emission_max(), 578.0);
    }

    #[test]
    fn test_modified_only_on_change() {
        let mut e = entry();
        assert!(!e.is_modified());

        e.set_visible_excitation(true);
        e.set_select_emission(false);
        e.set_intensity_cutoff(0.0);
        assert!(!e.is_modified());

        e.set_visible_emission(false);
        assert!(e.is_modified());
        assert!(e.take_modified());
        assert!(!e.is_modified());

        e.set_intensity_cutoff(5.0);
        assert!(e.take_modified());
        e.set_selected(CurveKind::Excitation, true);
        assert!(e.select_excitation());
        assert!(e.take_modified());
        e.set_index(7);
        assert!(!e.is_modified());
    }

    #[test]
    fn test_cutoff_applies_to_lookups() {
        let mut e = entry();
        assert_eq!(e.excitation_at(480.0), 60.0);
        e.set_intensity_cutoff(70.0);
        assert_eq!(e.excitation_at(480.0), 0.0);
        assert_eq!(e.emission_at(578.0), 100.0);
    }
}
