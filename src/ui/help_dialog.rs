use crate::app::SpectraViewer;

pub fn render_help_dialog(app: &mut SpectraViewer, ctx: &eframe::egui::Context) {
    if app.state.view.show_help {
        eframe::egui::Window::new("⌨ Keyboard Shortcuts")
            .anchor(eframe::egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .show(ctx, |ui| {
                ui.heading("Display");
                ui.label("F - Toggle curve fill");
                ui.label("L - Toggle peak labels");
                ui.label("T - Toggle dark/light theme");
                ui.label("H / F1 - Toggle help");
                ui.label("ESC - Close help");

                ui.separator();
                ui.heading("Mouse Controls");
                ui.label("Click curve - Select / deselect it");
                ui.label("Cutoff slider - Applies to selected curves");

                ui.separator();
                ui.heading("Library");
                ui.label("Tick a row - Plot the fluorophore");
                ui.label("Filter - Match by name or identifier");

                ui.separator();
                if ui.button("Close").clicked() {
                    app.state.view.show_help = false;
                }
            });
    }
}
