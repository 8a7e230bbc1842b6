//! Application-wide constants and default values
//!
//! This module centralizes all magic numbers and default values used throughout
//! the application, making them easier to maintain and configure.

/// Spectral cache defaults
pub mod cache {
    /// Soft capacity of backing storage before a capacity rebuild is considered
    pub const DEFAULT_CAPACITY: usize = 50;

    /// Amount the soft capacity grows when nothing can be evicted
    pub const CAPACITY_INCREMENT: usize = 10;
}

/// Visible spectrum approximation (nm)
pub mod spectrum {
    /// Shortest wavelength that maps to a visible color
    pub const VISIBLE_MIN: f64 = 380.0;

    /// Longest wavelength that maps to a visible color
    pub const VISIBLE_MAX: f64 = 780.0;

    /// Below this wavelength the color intensity falls off towards `VISIBLE_MIN`
    pub const FALLOFF_LOW: f64 = 420.0;

    /// Above this wavelength the color intensity falls off towards `VISIBLE_MAX`
    pub const FALLOFF_HIGH: f64 = 700.0;

    /// Relative intensity left at the very edges of the visible range
    pub const EDGE_INTENSITY: f64 = 0.3;

    /// Hue band edges: violet, blue, cyan, green, yellow, red
    pub const BAND_BLUE: f64 = 440.0;
    pub const BAND_CYAN: f64 = 480.0;
    pub const BAND_GREEN: f64 = 500.0;
    pub const BAND_YELLOW: f64 = 560.0;
    pub const BAND_RED: f64 = 620.0;
}

/// Plotting and visualization defaults
pub mod plot {
    /// Default plotted wavelength range (nm)
    pub const DEFAULT_WAVELENGTH_MIN: f64 = 300.0;
    pub const DEFAULT_WAVELENGTH_MAX: f64 = 900.0;

    /// Intensity display range (%)
    pub const INTENSITY_MIN: f64 = 0.0;
    pub const INTENSITY_MAX: f64 = 100.0;

    /// Default curve outline width in pixels
    pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

    /// Grid line spacing along the wavelength axis (nm)
    pub const GRID_STEP_NM: f64 = 50.0;

    /// Every n-th grid line is a labelled major line
    pub const GRID_MAJOR_EVERY: usize = 2;

    /// Alpha of filled curve areas
    pub const FILL_ALPHA: u8 = 60;
}

/// UI layout defaults
pub mod layout {
    /// Left panel (fluorophore library) default width
    pub const LIBRARY_PANEL_WIDTH: f32 = 240.0;

    /// Table row height in the library panel
    pub const TABLE_ROW_HEIGHT: f32 = 18.0;

    /// Table header row height
    pub const TABLE_HEADER_HEIGHT: f32 = 20.0;

    /// Margin between the painter rect and the plotted viewport
    pub const PLOT_MARGIN: f32 = 24.0;
}

/// Configuration file paths
pub mod config {
    /// Configuration file name
    pub const CONFIG_FILE: &str = "spectra-oxide.json";

    /// Index file inside a spectrum library directory
    pub const LIBRARY_INDEX_FILE: &str = "index.csv";
}
