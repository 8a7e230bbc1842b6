mod help_dialog;
mod library_panel;
mod plot;
mod toolbar;

pub use help_dialog::render_help_dialog;
pub use library_panel::render_library_panel;
pub use plot::{render_plot, to_color32};
pub use toolbar::render_toolbar;
