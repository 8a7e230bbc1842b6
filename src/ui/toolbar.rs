use crate::app::SpectraViewer;
use crate::cache::SortMode;
use crate::constants::plot::{INTENSITY_MAX, INTENSITY_MIN};
use eframe::egui::ComboBox;

/// Render the toolbar: library, display defaults and cutoff
pub fn render_toolbar(app: &mut SpectraViewer, ui: &mut eframe::egui::Ui) {
    ui.horizontal(|ui| {
        if ui.button("📂").on_hover_text("Open spectrum library").clicked() {
            app.open_library_dialog();
        }
        if ui.button("💾").on_hover_text("Export view config").clicked() {
            app.export_config();
        }

        ui.separator();

        let settings = app.state.cache.settings();
        let mut sort_mode = settings.sort_mode;
        let mut visible_excitation = settings.visible_excitation;
        let mut visible_emission = settings.visible_emission;

        ComboBox::from_label("Sort")
            .selected_text(sort_mode.to_string())
            .show_ui(ui, |ui| {
                for mode in SortMode::ALL {
                    ui.selectable_value(&mut sort_mode, mode, mode.to_string());
                }
            });
        ui.checkbox(&mut visible_excitation, "Excitation");
        ui.checkbox(&mut visible_emission, "Emission");

        if sort_mode != settings.sort_mode
            || visible_excitation != settings.visible_excitation
            || visible_emission != settings.visible_emission
        {
            app.state
                .set_display(visible_excitation, visible_emission, sort_mode);
        }

        ui.separator();

        let slider = ui
            .add(
                eframe::egui::Slider::new(&mut app.state.ui.cutoff, INTENSITY_MIN..=INTENSITY_MAX)
                    .text("Cutoff %"),
            )
            .on_hover_text("Intensity cutoff for selected curves");
        if slider.changed() {
            let cutoff = app.state.ui.cutoff;
            app.state.set_cutoff_for_selected(cutoff);
        }

        ui.separator();

        if ui
            .toggle_value(&mut app.state.view.fill_curves, "▨")
            .on_hover_text("Fill curves (F)")
            .changed()
        {
            app.state.view.invalidate_shapes();
        }
        if ui
            .toggle_value(&mut app.state.view.show_labels, "🏷")
            .on_hover_text("Peak labels (L)")
            .changed()
        {
            app.state.view.invalidate_shapes();
        }
        ui.toggle_value(&mut app.state.view.dark_mode, "🌙")
            .on_hover_text("Dark mode (T)");
        if ui.button("❓").on_hover_text("Help (H)").clicked() {
            app.state.view.show_help = !app.state.view.show_help;
        }
    });
}
