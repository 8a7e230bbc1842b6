//! View and visualization state

use crate::config::ViewerConfig;
use crate::data::curve::Range;
use crate::plot::{PlotShape, Viewport};

/// View state manages all visualization and display options
#[derive(Debug, Clone)]
pub struct ViewState {
    /// Plotted wavelength range (nm)
    pub wavelength: Range,

    /// Curve outline width in pixels (also the hit-test tolerance)
    pub line_width: f64,

    /// Fill the area under each curve
    pub fill_curves: bool,

    /// Label emission peaks with fluorophore names
    pub show_labels: bool,

    /// Dark mode theme toggle
    pub dark_mode: bool,

    /// Show help window
    pub show_help: bool,

    /// Shapes from the last rebuild, in viewport space
    pub shapes: Vec<PlotShape>,

    /// Viewport the cached shapes were built for
    shapes_viewport: Option<Viewport>,

    /// Cached shapes no longer match the cache
    shapes_dirty: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl ViewState {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            wavelength: config.wavelength,
            line_width: config.line_width,
            fill_curves: config.fill_curves,
            show_labels: true,
            dark_mode: config.dark_mode,
            show_help: false,
            shapes: Vec::new(),
            shapes_viewport: None,
            shapes_dirty: true,
        }
    }

    /// Force a shape rebuild on the next frame
    pub fn invalidate_shapes(&mut self) {
        self.shapes_dirty = true;
    }

    /// Whether shapes must be rebuilt for `viewport`
    pub fn needs_shapes(&self, viewport: &Viewport) -> bool {
        self.shapes_dirty || self.shapes_viewport.as_ref() != Some(viewport)
    }

    pub fn store_shapes(&mut self, viewport: Viewport, shapes: Vec<PlotShape>) {
        self.shapes = shapes;
        self.shapes_viewport = Some(viewport);
        self.shapes_dirty = false;
    }

    /// Toggle dark mode
    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }
}
