use crate::app::SpectraViewer;
use crate::constants::layout::PLOT_MARGIN;
use crate::constants::plot::{FILL_ALPHA, GRID_STEP_NM};
use crate::data::color::Rgb;
use crate::plot::{PlotShape, ShapeOptions, Viewport, build_shapes, grid_shapes};
use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke};

pub fn to_color32(rgb: Rgb, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(rgb.r, rgb.g, rgb.b, alpha)
}

#[inline]
fn pos(p: [f64; 2]) -> Pos2 {
    egui::pos2(p[0] as f32, p[1] as f32)
}

struct Palette {
    grid: Color32,
    text: Color32,
}

/// Render the spectra plot and handle curve selection clicks
pub fn render_plot(app: &mut SpectraViewer, ui: &mut egui::Ui) {
    profiling::scope!("render_plot");

    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click());
    let rect = response.rect.shrink(PLOT_MARGIN);

    // Too small to draw into
    let Ok(viewport) = Viewport::new(
        rect.left() as f64,
        rect.top() as f64,
        rect.right() as f64,
        rect.bottom() as f64,
    ) else {
        return;
    };
    let transform = match app.state.transform(viewport) {
        Ok(t) => t,
        Err(e) => {
            app.state.ui.report(&e);
            return;
        }
    };

    if app.state.view.needs_shapes(&viewport) {
        profiling::scope!("rebuild_shapes");
        let options = ShapeOptions {
            fill: app.state.view.fill_curves,
            labels: app.state.view.show_labels,
        };
        let mut shapes = grid_shapes(&transform, GRID_STEP_NM);
        shapes.extend(build_shapes(
            &app.state.cache,
            &app.state.snapshot.items,
            &transform,
            &options,
        ));
        app.state.view.store_shapes(viewport, shapes);
    }

    let palette = Palette {
        grid: ui.visuals().weak_text_color(),
        text: ui.visuals().text_color(),
    };
    for shape in &app.state.view.shapes {
        paint_shape(&painter, rect, shape, app.state.view.line_width as f32, &palette);
    }
    painter.rect_stroke(
        rect,
        0.0,
        Stroke::new(1.0, palette.grid),
        egui::StrokeKind::Inside,
    );

    if let Some(hover) = response.hover_pos().filter(|p| rect.contains(*p)) {
        let wavelength = transform.to_domain_x(hover.x as f64);
        painter.text(
            rect.right_top() + egui::vec2(-4.0, 4.0),
            Align2::RIGHT_TOP,
            format!("{:.0} nm", wavelength),
            FontId::monospace(12.0),
            palette.text,
        );
    }

    if response.clicked() {
        if let Some(click) = response.interact_pointer_pos() {
            let point = [click.x as f64, click.y as f64];
            if let Some((id, kind)) = app.state.click(&transform, point) {
                log::debug!("Toggled selection of {:?} curve of '{}'", kind, id);
            }
        }
    }
}

fn paint_shape(
    painter: &Painter,
    rect: Rect,
    shape: &PlotShape,
    line_width: f32,
    palette: &Palette,
) {
    match shape {
        PlotShape::GridLine { from, to, major } => {
            let (width, strength): (f32, f32) = if *major { (1.0, 0.6) } else { (0.5, 0.3) };
            painter.line_segment(
                [pos(*from), pos(*to)],
                Stroke::new(width, palette.grid.gamma_multiply(strength)),
            );
        }
        PlotShape::Label { pos: p, text } => {
            let at = pos(*p);
            // Axis labels sit under the plot, peak labels above their curve
            let anchor = if at.y > rect.center().y {
                Align2::CENTER_TOP
            } else {
                Align2::CENTER_BOTTOM
            };
            painter.text(at, anchor, text, FontId::proportional(12.0), palette.text);
        }
        PlotShape::CurveArea {
            color,
            filled,
            selected,
            ..
        } => {
            let outline: Vec<Pos2> = shape.outline().iter().map(|p| pos(*p)).collect();
            if outline.len() < 2 {
                return;
            }
            let stroke_color = if *color == Rgb::BLACK {
                palette.text
            } else {
                to_color32(*color, 255)
            };

            if *filled {
                // Per-segment trapezoids: the closed curve is generally not convex
                let fill = to_color32(*color, FILL_ALPHA);
                let bottom = rect.bottom();
                for w in outline.windows(2) {
                    painter.add(Shape::convex_polygon(
                        vec![
                            w[0],
                            w[1],
                            egui::pos2(w[1].x, bottom),
                            egui::pos2(w[0].x, bottom),
                        ],
                        fill,
                        Stroke::NONE,
                    ));
                }
            }

            let width = if *selected { line_width * 2.0 } else { line_width };
            painter.add(Shape::line(outline, Stroke::new(width, stroke_color)));
        }
    }
}
