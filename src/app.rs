use eframe::App;
use eframe::egui::{self, CentralPanel, SidePanel, TopBottomPanel};
use std::path::PathBuf;

use crate::config::ViewerConfig;
use crate::constants;
use crate::data::SpectrumLibrary;
use crate::state::AppState;
use crate::ui;

pub struct SpectraViewer {
    pub state: AppState,

    /// Where the config is written back on exit
    config_path: PathBuf,
}

impl SpectraViewer {
    pub fn new(config: ViewerConfig, config_path: PathBuf) -> Self {
        Self {
            state: AppState::from_config(&config),
            config_path,
        }
    }

    /// Ask for a library folder and open it
    pub fn open_library_dialog(&mut self) {
        if let Some(dir) = rfd::FileDialog::new()
            .set_title("Open spectrum library")
            .pick_folder()
        {
            match self.state.open_library(&dir) {
                Ok(()) => self.state.ui.clear_error(),
                Err(e) => self.state.ui.report(&e),
            }
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| {
            i.raw.dropped_files.first().and_then(|f| f.path.clone())
        });
        if let Some(path) = dropped {
            let opened = SpectrumLibrary::resolve_root(&path)
                .and_then(|dir| self.state.open_library(&dir));
            match opened {
                Ok(()) => self.state.ui.clear_error(),
                Err(e) => self.state.ui.report(&e),
            }
        }
    }

    pub fn save_config(&mut self) {
        if let Err(e) = self.state.to_config().save(&self.config_path) {
            self.state.ui.report(&e);
        }
    }

    /// Export the current config to a user-chosen file
    pub fn export_config(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(constants::config::CONFIG_FILE)
            .save_file()
        {
            if let Err(e) = self.state.to_config().save(&path) {
                self.state.ui.report(&e);
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::T) {
                self.state.view.toggle_dark_mode();
            }
            if i.key_pressed(egui::Key::F) {
                self.state.view.fill_curves = !self.state.view.fill_curves;
                self.state.view.invalidate_shapes();
            }
            if i.key_pressed(egui::Key::L) {
                self.state.view.show_labels = !self.state.view.show_labels;
                self.state.view.invalidate_shapes();
            }
            if i.key_pressed(egui::Key::H) || i.key_pressed(egui::Key::F1) {
                self.state.view.show_help = !self.state.view.show_help;
            }
            if i.key_pressed(egui::Key::Escape) {
                self.state.view.show_help = false;
            }
        });
    }
}

impl App for SpectraViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        profiling::scope!("SpectraViewer::update");

        if self.state.view.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        // Text fields swallow their own keys
        if !ctx.wants_keyboard_input() {
            self.handle_shortcuts(ctx);
        }

        self.handle_dropped_files(ctx);

        TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::render_toolbar(self, ui);
        });

        TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(library) = &self.state.library {
                    ui.label(format!("📁 {}", library.root().display()));
                    ui.separator();
                    ui.label(format!("Library: {}", library.entries().len()));
                    ui.separator();
                }
                ui.label(format!(
                    "Active: {} | Stored: {}",
                    self.state.cache.len(),
                    self.state.cache.stored_len()
                ));
                if let Some(message) = self.state.ui.error_message.clone() {
                    ui.separator();
                    ui.colored_label(egui::Color32::from_rgb(255, 100, 100), message);
                    if ui.small_button("✖").clicked() {
                        self.state.ui.clear_error();
                    }
                }
            });
        });

        SidePanel::left("library")
            .default_width(constants::layout::LIBRARY_PANEL_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                ui::render_library_panel(self, ui);
            });

        CentralPanel::default().show(ctx, |ui| {
            if self.state.snapshot.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.heading("No spectra selected");
                    ui.label("Open a spectrum library and tick fluorophores to plot them");
                });
            }
            ui::render_plot(self, ui);
        });

        ui::render_help_dialog(self, ctx);

        if ctx.input(|i| i.viewport().close_requested()) {
            self.save_config();
        }

        profiling::finish_frame!();
    }
}
