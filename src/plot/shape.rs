//! Renderer-agnostic plot shapes built from the cache.
//!
//! The front end only has to know how to paint three kinds of shapes; all
//! geometry is already in viewport space.

use crate::cache::{Cache, CacheEntry, CurveKind, EntryHandle, SnapshotItem};
use crate::constants::plot::{GRID_MAJOR_EVERY, INTENSITY_MAX, INTENSITY_MIN};
use crate::data::color::Rgb;
use crate::data::curve::ScaledCurve;
use crate::plot::transform::PlotTransform;
use std::borrow::Cow;

/// Closed set of things the renderer draws
#[derive(Debug, Clone, PartialEq)]
pub enum PlotShape {
    /// Closed area under a spectral curve
    CurveArea {
        handle: EntryHandle,
        kind: CurveKind,
        points: Vec<[f64; 2]>,
        color: Rgb,
        filled: bool,
        selected: bool,
    },
    GridLine {
        from: [f64; 2],
        to: [f64; 2],
        major: bool,
    },
    Label {
        pos: [f64; 2],
        text: String,
    },
}

impl PlotShape {
    /// Curve points without the two closing points; empty for other shapes
    pub fn outline(&self) -> &[[f64; 2]] {
        match self {
            PlotShape::CurveArea { points, .. } => &points[..points.len().saturating_sub(2)],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeOptions {
    /// Fill the area under each curve
    pub fill: bool,
    /// Put the display name above each emission peak
    pub labels: bool,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            fill: true,
            labels: true,
        }
    }
}

/// Draw order of the two curves of an entry
const DRAW_ORDER: [CurveKind; 2] = [CurveKind::Excitation, CurveKind::Emission];

/// Project one curve of `entry`, with its intensity cutoff applied, and close
/// it for filling
pub fn scale_entry_curve(
    entry: &CacheEntry,
    kind: CurveKind,
    transform: &PlotTransform,
) -> ScaledCurve {
    let curve = match kind {
        CurveKind::Excitation => entry.spectrum().excitation(),
        CurveKind::Emission => entry.spectrum().emission(),
    };
    let curve = if entry.intensity_cutoff() > 0.0 {
        Cow::Owned(curve.with_cutoff(entry.intensity_cutoff()))
    } else {
        Cow::Borrowed(curve)
    };
    let mut scaled = curve.scale(
        transform.viewport(),
        transform.to_viewport_x_fn(),
        transform.to_viewport_y_fn(),
        1.0,
    );
    scaled.close_curve();
    scaled
}

/// Curve areas (and optional labels) for every visible curve in `snapshot`.
///
/// Handles that no longer resolve are skipped.
pub fn build_shapes(
    cache: &Cache,
    snapshot: &[SnapshotItem],
    transform: &PlotTransform,
    options: &ShapeOptions,
) -> Vec<PlotShape> {
    profiling::scope!("build_shapes");

    let mut shapes = Vec::with_capacity(snapshot.len() * 3);
    for item in snapshot {
        let Some(entry) = cache.entry(item.handle) else {
            continue;
        };
        for kind in DRAW_ORDER {
            if !entry.is_visible(kind) {
                continue;
            }
            let scaled = scale_entry_curve(entry, kind, transform);
            if scaled.is_empty() {
                continue;
            }
            shapes.push(PlotShape::CurveArea {
                handle: item.handle,
                kind,
                color: scaled.color(),
                points: scaled.points().to_vec(),
                filled: options.fill,
                selected: entry.is_selected(kind),
            });
        }

        if options.labels && entry.visible_emission() && !entry.spectrum().emission().is_empty() {
            let pos = transform.to_viewport([entry.emission_max(), INTENSITY_MAX]);
            if transform.viewport().contains(pos) {
                shapes.push(PlotShape::Label {
                    pos,
                    text: item.name.clone(),
                });
            }
        }
    }
    shapes
}

/// Wavelength grid every `step_nm`, plus quarter intensity lines.
pub fn grid_shapes(transform: &PlotTransform, step_nm: f64) -> Vec<PlotShape> {
    let mut shapes = Vec::new();
    let viewport = *transform.viewport();
    let range = transform.wavelength();
    if !(step_nm > 0.0) {
        return shapes;
    }

    let first = (range.min / step_nm).ceil() as i64;
    let last = (range.max / step_nm).floor() as i64;
    for n in first..=last {
        let wavelength = n as f64 * step_nm;
        let x = transform.to_viewport_x(wavelength);
        let major = n.rem_euclid(GRID_MAJOR_EVERY as i64) == 0;
        shapes.push(PlotShape::GridLine {
            from: [x, viewport.top],
            to: [x, viewport.bottom],
            major,
        });
        if major {
            shapes.push(PlotShape::Label {
                pos: [x, viewport.bottom],
                text: format!("{}", wavelength),
            });
        }
    }

    let quarter = (INTENSITY_MAX - INTENSITY_MIN) / 4.0;
    for q in 0..=4 {
        let y = transform.to_viewport_y(INTENSITY_MIN + q as f64 * quarter);
        shapes.push(PlotShape::GridLine {
            from: [viewport.left, y],
            to: [viewport.right, y],
            major: q % 2 == 0,
        });
    }
    shapes
}

/// Topmost visible curve under `point` (viewport space), in reverse draw order.
pub fn hit_test(
    cache: &Cache,
    snapshot: &[SnapshotItem],
    transform: &PlotTransform,
    point: [f64; 2],
    line_width: f64,
) -> Option<(EntryHandle, CurveKind)> {
    for item in snapshot.iter().rev() {
        let Some(entry) = cache.entry(item.handle) else {
            continue;
        };
        for kind in DRAW_ORDER.iter().rev().copied() {
            if !entry.is_visible(kind) {
                continue;
            }
            if scale_entry_curve(entry, kind, transform).contains(point, line_width, None) {
                return Some((item.handle, kind));
            }
        }
    }
    None
}
