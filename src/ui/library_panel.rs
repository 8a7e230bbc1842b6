use crate::app::SpectraViewer;
use crate::constants::layout::{TABLE_HEADER_HEIGHT, TABLE_ROW_HEIGHT};
use egui_extras::{Column, TableBuilder};

enum Change {
    Add(String),
    Remove(String),
}

fn format_peak(peak: Option<f64>) -> String {
    peak.map(|p| format!("{:.0}", p)).unwrap_or_else(|| "-".to_string())
}

/// Render the fluorophore library (left sidebar) with virtual scrolling
pub fn render_library_panel(app: &mut SpectraViewer, ui: &mut eframe::egui::Ui) {
    profiling::scope!("render_library_panel");

    ui.heading("Fluorophores");
    ui.separator();

    if app.state.library.is_none() {
        ui.label("No library opened");
        if ui.button("📂 Open library...").clicked() {
            app.open_library_dialog();
        }
        return;
    }

    ui.horizontal(|ui| {
        ui.label("🔍");
        ui.add(
            eframe::egui::TextEdit::singleline(&mut app.state.ui.library_filter)
                .hint_text("Filter...")
                .desired_width(140.0),
        );
        if ui.small_button("✖").on_hover_text("Clear filter").clicked() {
            app.state.ui.library_filter.clear();
        }
    });

    let mut clear_all = false;
    let mut changes = Vec::new();
    if let Some(library) = &app.state.library {
        let rows: Vec<_> = library
            .entries()
            .iter()
            .filter(|e| app.state.ui.matches_filter(&e.id, &e.name))
            .collect();

        ui.horizontal(|ui| {
            ui.label(format!("{} of {}", rows.len(), library.entries().len()));
            clear_all = ui.small_button("Clear all").clicked();
        });
        ui.separator();

        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(eframe::egui::Layout::left_to_right(eframe::egui::Align::Center))
            .column(Column::exact(24.0))
            .column(Column::remainder().clip(true))
            .column(Column::initial(40.0))
            .column(Column::initial(40.0))
            .header(TABLE_HEADER_HEIGHT, |mut header| {
                header.col(|_| {});
                header.col(|ui| {
                    ui.strong("Name");
                });
                header.col(|ui| {
                    ui.strong("Ex");
                });
                header.col(|ui| {
                    ui.strong("Em");
                });
            })
            .body(|body| {
                body.rows(TABLE_ROW_HEIGHT, rows.len(), |mut row| {
                    let entry = rows[row.index()];
                    let mut active = app.state.cache.is_active(&entry.id);
                    row.col(|ui| {
                        if ui.checkbox(&mut active, "").changed() {
                            changes.push(if active {
                                Change::Add(entry.id.clone())
                            } else {
                                Change::Remove(entry.id.clone())
                            });
                        }
                    });
                    row.col(|ui| {
                        let label = ui.label(entry.name.as_str());
                        let mut hover = entry.id.clone();
                        if entry.absorption {
                            hover.push_str(" (absorption)");
                        }
                        if entry.two_photon {
                            hover.push_str(" (two-photon)");
                        }
                        label.on_hover_text(hover);
                    });
                    row.col(|ui| {
                        ui.label(format_peak(entry.excitation_max));
                    });
                    row.col(|ui| {
                        ui.label(format_peak(entry.emission_max));
                    });
                });
            });
    }

    if clear_all {
        app.state.clear();
    }

    // Applied after the table so the cache is not borrowed while rendering
    let (added, removed): (Vec<_>, Vec<_>) =
        changes.into_iter().partition(|c| matches!(c, Change::Add(_)));
    let ids = |changes: Vec<Change>| -> Vec<String> {
        changes
            .into_iter()
            .map(|c| match c {
                Change::Add(id) | Change::Remove(id) => id,
            })
            .collect()
    };
    if !added.is_empty() {
        app.state.add_ids(&ids(added));
    }
    if !removed.is_empty() {
        app.state.remove_ids(&ids(removed));
    }
}
