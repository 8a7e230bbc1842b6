//! UI interaction state

use crate::error::SpectraError;

/// Transient front-end state that is never persisted
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Error message to display in UI (status bar)
    pub error_message: Option<String>,

    /// Substring filter for the library panel
    pub library_filter: String,

    /// Intensity cutoff slider value (%)
    pub cutoff: f64,
}

impl UiState {
    /// Create a new UiState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an error message
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.error_message = Some(message);
    }

    /// Log `err` and show its user-facing message
    pub fn report(&mut self, err: &SpectraError) {
        log::warn!("{}: {}", err.title(), err);
        self.error_message = Some(err.user_message());
    }

    /// Clear the current error message
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    /// Check if there's an error to display
    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// Does `name` or `id` pass the library filter (case-insensitive)?
    pub fn matches_filter(&self, id: &str, name: &str) -> bool {
        let filter = self.library_filter.trim().to_lowercase();
        filter.is_empty()
            || name.to_lowercase().contains(&filter)
            || id.to_lowercase().contains(&filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_lifecycle() {
        let mut ui = UiState::new();
        assert!(!ui.has_error());
        ui.set_error("boom");
        assert_eq!(ui.error_message.as_deref(), Some("boom"));
        ui.clear_error();
        assert!(!ui.has_error());

        ui.report(&SpectraError::UnknownIdentifier("cy9".to_string()));
        assert_eq!(ui.error_message.as_deref(), Some("Unknown fluorophore 'cy9'"));
    }

    #[test]
    fn test_library_filter() {
        let mut ui = UiState::new();
        assert!(ui.matches_filter("fitc", "FITC"));
        ui.library_filter = " alexa ".to_string();
        assert!(ui.matches_filter("af488", "Alexa Fluor 488"));
        assert!(!ui.matches_filter("fitc", "FITC"));
    }
}
