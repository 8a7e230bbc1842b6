//! Piecewise-linear spectral curves and their viewport projections.
//!
//! A [`Curve`] holds normalized source samples in domain space (wavelength in
//! nm, intensity in %). It is never mutated by plotting: [`Curve::scale`]
//! produces a separate [`ScaledCurve`] working copy in viewport space, which
//! is recomputed whenever the viewport geometry changes.

use crate::constants::plot::{INTENSITY_MAX, INTENSITY_MIN};
use crate::data::color::{Rgb, visible_spectrum};
use crate::error::{Result, SpectraError};
use crate::plot::Viewport;
use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// A spectral curve sampled at discrete wavelengths.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    x_range: Range,
    y_range: Range,
    points: Vec<[f64; 2]>,
    color: Rgb,
    empty: bool,
}

impl Default for Curve {
    fn default() -> Self {
        Self::empty()
    }
}

impl Curve {
    /// Build a curve from raw samples.
    ///
    /// Non-finite samples are dropped, the rest sorted by wavelength. Negative
    /// intensities clamp to 0 and all intensities are rescaled to percent of
    /// the curve maximum.
    ///
    /// # Errors
    /// [`SpectraError::InvalidCurveData`] if the lists differ in length or
    /// fewer than 2 usable samples remain.
    pub fn new(wavelengths: &[f64], intensities: &[f64]) -> Result<Self> {
        if wavelengths.len() != intensities.len() {
            return Err(SpectraError::invalid_curve(format!(
                "{} wavelengths but {} intensities",
                wavelengths.len(),
                intensities.len()
            )));
        }

        let mut points: Vec<[f64; 2]> = wavelengths
            .iter()
            .zip(intensities)
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .map(|(&x, &y)| [x, y.max(0.0)])
            .collect();

        if points.len() < 2 {
            return Err(SpectraError::invalid_curve(format!(
                "at least 2 samples required, got {}",
                points.len()
            )));
        }

        points.sort_by(|a, b| a[0].total_cmp(&b[0]));

        let peak = points.iter().map(|p| p[1]).fold(0.0, f64::max);
        if peak > 0.0 {
            let gain = INTENSITY_MAX / peak;
            for p in &mut points {
                p[1] *= gain;
            }
        }

        let x_range = Range::new(points[0][0], points[points.len() - 1][0]);
        let mut curve = Self {
            x_range,
            y_range: Range::new(INTENSITY_MIN, INTENSITY_MAX),
            points,
            color: Rgb::BLACK,
            empty: false,
        };
        curve.set_color(None);
        Ok(curve)
    }

    /// Like [`Curve::new`], but falls back to the empty sentinel on bad data.
    pub fn from_samples(wavelengths: &[f64], intensities: &[f64]) -> Self {
        match Self::new(wavelengths, intensities) {
            Ok(curve) => curve,
            Err(e) => {
                log::warn!("{}; using empty curve", e);
                Self::empty()
            }
        }
    }

    /// The empty sentinel: a 0-1 diagonal so downstream arithmetic always has
    /// two points to work with.
    pub fn empty() -> Self {
        Self {
            x_range: Range::new(0.0, 1.0),
            y_range: Range::new(0.0, 1.0),
            points: vec![[0.0, 0.0], [1.0, 1.0]],
            color: Rgb::BLACK,
            empty: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn x_range(&self) -> Range {
        self.x_range
    }

    pub fn y_range(&self) -> Range {
        self.y_range
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Derive the curve color from `wavelength`, or from the curve peak.
    pub fn set_color(&mut self, wavelength: Option<f64>) {
        let wavelength = wavelength.unwrap_or_else(|| self.intensity_max());
        self.color = visible_spectrum(wavelength);
    }

    /// Intensity (%) at `wavelength`, or 0 when outside the curve domain or
    /// not above `cutoff`.
    ///
    /// Returns the intensity of the first sample whose wavelength is at or
    /// above the query; no interpolation happens between samples.
    pub fn intensity_at(&self, wavelength: f64, cutoff: f64) -> f64 {
        if self.empty || !self.x_range.contains(wavelength) {
            return 0.0;
        }
        let intensity = first_at_or_above(&self.points, wavelength)
            .map(|p| p[1])
            .unwrap_or(0.0);
        if intensity <= cutoff { 0.0 } else { intensity }
    }

    /// Wavelength of the first sample attaining the maximum intensity.
    pub fn intensity_max(&self) -> f64 {
        let mut peak = self.points[0];
        for p in &self.points[1..] {
            if p[1] > peak[1] {
                peak = *p;
            }
        }
        peak[0]
    }

    /// Copy of the curve with every sample at or below `cutoff` zeroed, so
    /// the drawn shape agrees with [`Curve::intensity_at`].
    pub fn with_cutoff(&self, cutoff: f64) -> Curve {
        let mut curve = self.clone();
        if !self.empty {
            for p in &mut curve.points {
                if p[1] <= cutoff {
                    p[1] = 0.0;
                }
            }
        }
        curve
    }

    /// Project the curve into `viewport`.
    ///
    /// Every point is mapped through `x_map`/`y_map` (intensity multiplied by
    /// `intensity_gain` first). Mapped y is clamped to the viewport's vertical
    /// bounds. Points whose mapped x falls outside horizontally are dropped;
    /// where a segment crosses a vertical edge, an interpolated point is
    /// inserted on that edge. A curve entirely outside the viewport yields an
    /// empty point sequence.
    pub fn scale(
        &self,
        viewport: &Viewport,
        x_map: impl Fn(f64) -> f64,
        y_map: impl Fn(f64) -> f64,
        intensity_gain: f64,
    ) -> ScaledCurve {
        profiling::scope!("Curve::scale");

        let mut scaled = ScaledCurve {
            points: Vec::new(),
            viewport: *viewport,
            color: self.color,
            closed: false,
        };
        if self.empty {
            return scaled;
        }

        let first_x = x_map(self.x_range.min);
        let last_x = x_map(self.x_range.max);
        if last_x < viewport.left || first_x > viewport.right {
            return scaled;
        }

        let project = |px: f64, intensity: f64| {
            [px, y_map(intensity).max(viewport.top).min(viewport.bottom)]
        };
        let crossing = |from: [f64; 2], to: [f64; 2], edge: f64| {
            let t = (edge - from[0]) / (to[0] - from[0]);
            from[1] + t * (to[1] - from[1])
        };

        scaled.points.reserve(self.points.len() + 2);
        let mut prev: Option<[f64; 2]> = None;
        for &[x, y] in &self.points {
            let current = [x_map(x), y * intensity_gain];
            if let Some(prev) = prev {
                if prev[0] < viewport.left && current[0] > viewport.left {
                    let edge = crossing(prev, current, viewport.left);
                    scaled.points.push(project(viewport.left, edge));
                }
                if prev[0] < viewport.right && current[0] > viewport.right {
                    let edge = crossing(prev, current, viewport.right);
                    scaled.points.push(project(viewport.right, edge));
                }
            }
            if current[0] >= viewport.left && current[0] <= viewport.right {
                scaled.points.push(project(current[0], current[1]));
            }
            prev = Some(current);
        }
        scaled
    }

    /// Domain-space hit test: is `point` on or below the curve?
    ///
    /// `x_map`, when given, converts the query wavelength into the curve's
    /// wavelength space before the lookup.
    pub fn contains(
        &self,
        point: [f64; 2],
        line_width: f64,
        x_map: Option<&dyn Fn(f64) -> f64>,
    ) -> bool {
        if self.empty {
            return false;
        }
        let x = x_map.map_or(point[0], |f| f(point[0]));
        match bracketing_sample(&self.points, x) {
            Some(sample) => {
                point[1] >= self.y_range.min && point[1] <= sample[1] + line_width / 2.0
            }
            None => false,
        }
    }
}

/// Curve projected into viewport space (y grows downwards).
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledCurve {
    points: Vec<[f64; 2]>,
    viewport: Viewport,
    color: Rgb,
    closed: bool,
}

impl ScaledCurve {
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The curve itself, without the two closing points.
    pub fn outline(&self) -> &[[f64; 2]] {
        if self.closed {
            &self.points[..self.points.len() - 2]
        } else {
            &self.points
        }
    }

    /// Close the outline down to the viewport bottom so the area under the
    /// curve can be filled. No-op on an empty or already closed curve.
    pub fn close_curve(&mut self) {
        if self.points.is_empty() || self.closed {
            return;
        }
        let first_x = self.points[0][0];
        let last_x = self.points[self.points.len() - 1][0];
        self.points.push([last_x, self.viewport.bottom]);
        self.points.push([first_x, self.viewport.bottom]);
        self.closed = true;
    }

    /// Viewport-space hit test: does `point` land on or below the curve?
    ///
    /// `x_map`, when given, converts the query x into viewport space first.
    pub fn contains(
        &self,
        point: [f64; 2],
        line_width: f64,
        x_map: Option<&dyn Fn(f64) -> f64>,
    ) -> bool {
        let x = x_map.map_or(point[0], |f| f(point[0]));
        if point[1] > self.viewport.bottom {
            return false;
        }
        match bracketing_sample(self.outline(), x) {
            Some(sample) => point[1] >= sample[1] - line_width / 2.0,
            None => false,
        }
    }
}

/// First sample with x at or above `x` (points sorted by x).
fn first_at_or_above(points: &[[f64; 2]], x: f64) -> Option<[f64; 2]> {
    let idx = points.partition_point(|p| p[0] < x);
    points.get(idx).copied()
}

/// Sample bracketing `x`, or `None` when `x` lies outside the sampled span.
fn bracketing_sample(points: &[[f64; 2]], x: f64) -> Option<[f64; 2]> {
    let (first, last) = (points.first()?, points.last()?);
    if x < first[0] || x > last[0] {
        return None;
    }
    first_at_or_above(points, x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn triangle() -> Curve {
        // Peak at 500 nm
        Curve::new(
            &[400.0, 450.0, 500.0, 550.0, 600.0],
            &[0.0, 0.5, 1.0, 0.5, 0.0],
        )
        .unwrap()
    }

    fn identity_viewport() -> Viewport {
        Viewport::new(0.0, 0.0, 1000.0, 100.0).unwrap()
    }

    #[test]
    fn test_construction_rejects_bad_data() {
        let err = Curve::new(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, SpectraError::InvalidCurveData { .. }));

        let err = Curve::new(&[1.0], &[1.0]).unwrap_err();
        assert!(matches!(err, SpectraError::InvalidCurveData { .. }));

        // NaN samples are dropped before the length check on usable points
        assert!(Curve::new(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_from_samples_falls_back_to_empty() {
        let curve = Curve::from_samples(&[1.0, 2.0, 3.0], &[1.0]);
        assert!(curve.is_empty());
        assert_eq!(curve.points().len(), 2);
        assert_eq!(curve.intensity_at(0.5, 0.0), 0.0);
    }

    #[test]
    fn test_normalization() {
        let curve = Curve::new(&[520.0, 500.0, 510.0], &[2.0, -1.0, 4.0]).unwrap();
        assert_eq!(curve.points(), &[[500.0, 0.0], [510.0, 100.0], [520.0, 50.0]]);
        assert_eq!(curve.x_range(), Range::new(500.0, 520.0));
        assert_eq!(curve.y_range(), Range::new(0.0, 100.0));
    }

    #[test]
    fn test_intensity_outside_domain_is_zero() {
        let curve = triangle();
        assert_eq!(curve.intensity_at(399.9, 0.0), 0.0);
        assert_eq!(curve.intensity_at(600.1, 0.0), 0.0);
        assert_eq!(curve.intensity_at(-1.0e9, 0.0), 0.0);
    }

    #[test]
    fn test_intensity_lookup() {
        let curve = triangle();
        assert_abs_diff_eq!(curve.intensity_at(500.0, 0.0), 100.0);
        // First sample at or above the query
        assert_abs_diff_eq!(curve.intensity_at(460.0, 0.0), 100.0);
        assert_abs_diff_eq!(curve.intensity_at(450.0, 0.0), 50.0);
        // Cutoff suppresses low values
        assert_eq!(curve.intensity_at(450.0, 50.0), 0.0);
        assert_abs_diff_eq!(curve.intensity_at(450.0, 49.0), 50.0);
    }

    #[test]
    fn test_intensity_max_takes_first_peak() {
        let curve = Curve::new(&[400.0, 410.0, 420.0, 430.0], &[1.0, 3.0, 3.0, 2.0]).unwrap();
        assert_eq!(curve.intensity_max(), 410.0);
        assert_eq!(triangle().intensity_max(), 500.0);
    }

    #[test]
    fn test_color_follows_peak() {
        let mut curve = triangle();
        assert_eq!(curve.color(), visible_spectrum(500.0));
        curve.set_color(Some(650.0));
        assert_eq!(curve.color(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_scale_clips_to_viewport() {
        let curve = triangle();
        // Shift so that 400..600 nm maps onto 0..200 px; viewport shows 50..150
        let viewport = Viewport::new(50.0, 10.0, 150.0, 90.0).unwrap();
        let scaled = curve.scale(&viewport, |x| x - 400.0, |y| 100.0 - y, 1.0);

        assert!(!scaled.is_empty());
        for p in scaled.points() {
            assert!(p[0] >= viewport.left && p[0] <= viewport.right);
            assert!(p[1] >= viewport.top && p[1] <= viewport.bottom);
        }
        // Samples at 450 and 550 nm sit exactly on the edges
        assert_eq!(scaled.points()[0][0], 50.0);
        assert_eq!(scaled.points()[scaled.points().len() - 1][0], 150.0);
        // Original untouched
        assert_eq!(curve, triangle());
    }

    #[test]
    fn test_scale_interpolates_edges() {
        let curve = triangle();
        let viewport = Viewport::new(425.0, 0.0, 575.0, 100.0).unwrap();
        let scaled = curve.scale(&viewport, |x| x, |y| 100.0 - y, 1.0);
        let points = scaled.points();
        // 400 nm (0%) -> 450 nm (50%) crosses 425 nm at 25%
        assert_eq!(points[0][0], 425.0);
        assert_abs_diff_eq!(points[0][1], 75.0);
        assert_eq!(points[points.len() - 1][0], 575.0);
        assert_abs_diff_eq!(points[points.len() - 1][1], 75.0);
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn test_scale_sparse_curve_spanning_viewport() {
        // No sample lands inside the viewport, but the curve crosses it
        let curve = Curve::new(&[400.0, 600.0], &[0.0, 1.0]).unwrap();
        let viewport = Viewport::new(450.0, 0.0, 550.0, 100.0).unwrap();
        let scaled = curve.scale(&viewport, |x| x, |y| 100.0 - y, 1.0);
        let points = scaled.points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0][0], 450.0);
        assert_abs_diff_eq!(points[0][1], 75.0);
        assert_eq!(points[1][0], 550.0);
        assert_abs_diff_eq!(points[1][1], 25.0);
    }

    #[test]
    fn test_with_cutoff_zeroes_low_samples() {
        let curve = triangle().with_cutoff(50.0);
        let intensities: Vec<f64> = curve.points().iter().map(|p| p[1]).collect();
        assert_eq!(intensities, vec![0.0, 0.0, 100.0, 0.0, 0.0]);
        assert_eq!(curve.x_range(), triangle().x_range());
        assert_eq!(curve.color(), triangle().color());
        assert!(Curve::empty().with_cutoff(50.0).is_empty());
    }

    #[test]
    fn test_scale_applies_gain_and_clamps() {
        let curve = triangle();
        let scaled = curve.scale(&identity_viewport(), |x| x, |y| 100.0 - y, 2.0);
        // 50% * 2 => 100% => y = 0; 100% * 2 clamps at the top
        assert_eq!(scaled.points()[1], [450.0, 0.0]);
        assert_eq!(scaled.points()[2], [500.0, 0.0]);
        assert_eq!(scaled.points()[0], [400.0, 100.0]);
    }

    #[test]
    fn test_scale_outside_viewport_is_empty() {
        let curve = triangle();
        let viewport = Viewport::new(700.0, 0.0, 900.0, 100.0).unwrap();
        let scaled = curve.scale(&viewport, |x| x, |y| y, 1.0);
        assert!(scaled.is_empty());

        let scaled = Curve::empty().scale(&identity_viewport(), |x| x, |y| y, 1.0);
        assert!(scaled.is_empty());
    }

    #[test]
    fn test_close_curve() {
        let curve = triangle();
        let mut scaled = curve.scale(&identity_viewport(), |x| x, |y| 100.0 - y, 1.0);
        let n = scaled.points().len();
        scaled.close_curve();
        assert!(scaled.is_closed());
        assert_eq!(scaled.points().len(), n + 2);
        assert_eq!(scaled.points()[n], [600.0, 100.0]);
        assert_eq!(scaled.points()[n + 1], [400.0, 100.0]);
        assert_eq!(scaled.outline().len(), n);

        // Closing twice is a no-op
        scaled.close_curve();
        assert_eq!(scaled.points().len(), n + 2);

        let viewport = Viewport::new(700.0, 0.0, 900.0, 100.0).unwrap();
        let mut empty = curve.scale(&viewport, |x| x, |y| y, 1.0);
        empty.close_curve();
        assert!(empty.points().is_empty());
    }

    #[test]
    fn test_scaled_contains() {
        let curve = triangle();
        let mut scaled = curve.scale(&identity_viewport(), |x| x, |y| 100.0 - y, 1.0);
        scaled.close_curve();

        // Peak at y=0 on screen, so anything at 500 nm is under the curve
        assert!(scaled.contains([500.0, 40.0], 2.0, None));
        // At 450 nm the curve sits at y=50
        assert!(scaled.contains([450.0, 49.5], 2.0, None));
        assert!(!scaled.contains([450.0, 48.0], 2.0, None));
        // Outside the sampled span or below the viewport
        assert!(!scaled.contains([350.0, 90.0], 2.0, None));
        assert!(!scaled.contains([500.0, 120.0], 2.0, None));

        let shift = |x: f64| x + 50.0;
        assert!(scaled.contains([400.0, 60.0], 2.0, Some(&shift)));
    }

    #[test]
    fn test_domain_contains() {
        let curve = triangle();
        assert!(curve.contains([500.0, 80.0], 0.0, None));
        assert!(curve.contains([450.0, 50.5], 2.0, None));
        assert!(!curve.contains([450.0, 60.0], 2.0, None));
        assert!(!curve.contains([650.0, 0.0], 2.0, None));
        assert!(!Curve::empty().contains([0.5, 0.5], 2.0, None));
    }
}
