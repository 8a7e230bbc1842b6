//! Affine mapping between domain space (nm, %) and viewport space (pixels).

use crate::data::curve::Range;
use crate::error::{Result, SpectraError};

/// Pixel-space rectangle; `top < bottom`, y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Viewport {
    /// # Errors
    /// [`SpectraError::DegenerateTransform`] if either extent is not a
    /// positive finite number.
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Result<Self> {
        check_extent("viewport x", right - left)?;
        check_extent("viewport y", bottom - top)?;
        Ok(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, point: [f64; 2]) -> bool {
        point[0] >= self.left
            && point[0] <= self.right
            && point[1] >= self.top
            && point[1] <= self.bottom
    }
}

fn check_extent(axis: &'static str, extent: f64) -> Result<()> {
    if extent.is_finite() && extent > 0.0 {
        Ok(())
    } else {
        Err(SpectraError::DegenerateTransform { axis, extent })
    }
}

/// Bidirectional mapping between a wavelength/intensity rectangle and a
/// viewport. Intensity increases upwards in domain space and downwards in
/// viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotTransform {
    wavelength: Range,
    intensity: Range,
    viewport: Viewport,
    scale_x: f64,
    scale_y: f64,
}

impl PlotTransform {
    /// # Errors
    /// [`SpectraError::DegenerateTransform`] for a zero or non-finite domain
    /// extent. Scale factors are never computed from such a range.
    pub fn new(wavelength: Range, intensity: Range, viewport: Viewport) -> Result<Self> {
        check_extent("wavelength", wavelength.extent())?;
        check_extent("intensity", intensity.extent())?;
        Ok(Self {
            wavelength,
            intensity,
            viewport,
            scale_x: viewport.width() / wavelength.extent(),
            scale_y: viewport.height() / intensity.extent(),
        })
    }

    pub fn wavelength(&self) -> Range {
        self.wavelength
    }

    pub fn intensity(&self) -> Range {
        self.intensity
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Pixels per nanometer
    pub fn scale_x(&self) -> f64 {
        self.scale_x
    }

    /// Pixels per percent
    pub fn scale_y(&self) -> f64 {
        self.scale_y
    }

    pub fn set_domain(&mut self, wavelength: Range, intensity: Range) -> Result<()> {
        *self = Self::new(wavelength, intensity, self.viewport)?;
        Ok(())
    }

    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        *self = Self::new(self.wavelength, self.intensity, viewport)?;
        Ok(())
    }

    #[inline]
    pub fn to_viewport_x(&self, wavelength: f64) -> f64 {
        self.viewport.left + (wavelength - self.wavelength.min) * self.scale_x
    }

    #[inline]
    pub fn to_viewport_y(&self, intensity: f64) -> f64 {
        self.viewport.bottom - (intensity - self.intensity.min) * self.scale_y
    }

    #[inline]
    pub fn to_domain_x(&self, x: f64) -> f64 {
        self.wavelength.min + (x - self.viewport.left) / self.scale_x
    }

    #[inline]
    pub fn to_domain_y(&self, y: f64) -> f64 {
        self.intensity.min + (self.viewport.bottom - y) / self.scale_y
    }

    pub fn to_viewport(&self, point: [f64; 2]) -> [f64; 2] {
        [self.to_viewport_x(point[0]), self.to_viewport_y(point[1])]
    }

    pub fn to_domain(&self, point: [f64; 2]) -> [f64; 2] {
        [self.to_domain_x(point[0]), self.to_domain_y(point[1])]
    }

    /// Wavelength → viewport x as a standalone function value
    pub fn to_viewport_x_fn(&self) -> impl Fn(f64) -> f64 + Copy + use<> {
        let t = *self;
        move |w| t.to_viewport_x(w)
    }

    /// Intensity → viewport y as a standalone function value
    pub fn to_viewport_y_fn(&self) -> impl Fn(f64) -> f64 + Copy + use<> {
        let t = *self;
        move |i| t.to_viewport_y(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn transform() -> PlotTransform {
        PlotTransform::new(
            Range::new(300.0, 900.0),
            Range::new(0.0, 100.0),
            Viewport::new(20.0, 10.0, 620.0, 210.0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_forward_mapping() {
        let t = transform();
        assert_relative_eq!(t.scale_x(), 1.0);
        assert_relative_eq!(t.scale_y(), 2.0);
        assert_relative_eq!(t.to_viewport_x(300.0), 20.0);
        assert_relative_eq!(t.to_viewport_x(900.0), 620.0);
        // y is inverted
        assert_relative_eq!(t.to_viewport_y(0.0), 210.0);
        assert_relative_eq!(t.to_viewport_y(100.0), 10.0);
    }

    #[test]
    fn test_round_trip() {
        let t = PlotTransform::new(
            Range::new(351.3, 782.9),
            Range::new(0.0, 100.0),
            Viewport::new(3.0, 7.0, 1283.0, 731.0).unwrap(),
        )
        .unwrap();
        let mut v = t.viewport().left;
        while v <= t.viewport().right {
            assert_relative_eq!(t.to_viewport_x(t.to_domain_x(v)), v, epsilon = 1e-9);
            v += 13.7;
        }
        let p = [512.0, 42.0];
        let back = t.to_domain(t.to_viewport(p));
        assert_relative_eq!(back[0], p[0], epsilon = 1e-9);
        assert_relative_eq!(back[1], p[1], epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_ranges() {
        let viewport = Viewport::new(0.0, 0.0, 100.0, 100.0).unwrap();
        let err = PlotTransform::new(Range::new(500.0, 500.0), Range::new(0.0, 100.0), viewport)
            .unwrap_err();
        assert!(matches!(
            err,
            SpectraError::DegenerateTransform {
                axis: "wavelength",
                ..
            }
        ));
        assert!(
            PlotTransform::new(Range::new(300.0, 900.0), Range::new(0.0, f64::NAN), viewport)
                .is_err()
        );
        assert!(Viewport::new(0.0, 0.0, 0.0, 100.0).is_err());
        assert!(Viewport::new(0.0, 100.0, 100.0, 50.0).is_err());
    }

    #[test]
    fn test_setters_keep_previous_on_error() {
        let mut t = transform();
        assert!(t.set_domain(Range::new(400.0, 400.0), Range::new(0.0, 100.0)).is_err());
        assert_eq!(t, transform());

        t.set_viewport(Viewport::new(0.0, 0.0, 1200.0, 100.0).unwrap())
            .unwrap();
        assert_relative_eq!(t.scale_x(), 2.0);
        assert_relative_eq!(t.scale_y(), 1.0);
    }

    #[test]
    fn test_map_fns() {
        let t = transform();
        let fx = t.to_viewport_x_fn();
        let fy = t.to_viewport_y_fn();
        assert_relative_eq!(fx(600.0), 320.0);
        assert_relative_eq!(fy(50.0), 110.0);
    }
}
