#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use spectra_oxide::SpectraViewer;
use spectra_oxide::config::ViewerConfig;
use spectra_oxide::constants::config::CONFIG_FILE;
use std::path::PathBuf;

#[cfg(feature = "profile-with-puffin")]
fn start_puffin_server() -> Option<puffin_http::Server> {
    puffin::set_scopes_on(true);
    match puffin_http::Server::new("127.0.0.1:8585") {
        Ok(server) => {
            log::info!("Puffin server listening on 127.0.0.1:8585");
            Some(server)
        }
        Err(e) => {
            log::warn!("Failed to start puffin server: {}", e);
            None
        }
    }
}

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    #[cfg(feature = "profile-with-puffin")]
    let _puffin_server = start_puffin_server();

    let config_path = PathBuf::from(CONFIG_FILE);
    let config = ViewerConfig::load(&config_path).unwrap_or_else(|e| {
        log::warn!("{}, using defaults", e.user_message());
        ViewerConfig::default()
    });

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Spectra Oxide - Fluorescence Spectra Viewer",
        options,
        Box::new(|_| Ok(Box::new(SpectraViewer::new(config, config_path)))),
    )
}
