use crate::core::models::{AppMode, AppSettings};
use crate::services::api::Backend;
use crate::services::pages::report;
use crate::services::toast::Notifier;
use log::info;

pub const API_KEY_HINT: &str = "Add GEMINI_API_KEY to your .env file for character detection to work.";
pub const MODE_CHANGE_FAILED: &str = "Failed to update mode";

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsState {
    pub settings: Option<AppSettings>,
    pub loading: bool,
    pub saving: bool,
    /// Last message returned by a mode change, shown under the toggle.
    pub message: Option<String>,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            settings: None,
            loading: true,
            saving: false,
            message: None,
        }
    }
}

impl SettingsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load(&mut self, backend: &dyn Backend, notifier: &dyn Notifier) {
        self.loading = true;
        let fetched = report(backend.get_settings().await, notifier, "Failed to load settings");
        self.finish_loading(fetched);
    }

    pub fn finish_loading(&mut self, settings: Option<AppSettings>) {
        if settings.is_some() {
            self.settings = settings;
        }
        self.loading = false;
    }

    pub fn mode(&self) -> Option<AppMode> {
        self.settings.as_ref().map(|s| s.app_mode)
    }

    pub fn api_key_label(&self) -> &'static str {
        match &self.settings {
            Some(s) if s.gemini_api_key_set => "Configured",
            _ => "Not Set",
        }
    }

    /// The hint only makes sense while the key is missing.
    pub fn api_key_hint(&self) -> Option<&'static str> {
        match &self.settings {
            Some(s) if !s.gemini_api_key_set => Some(API_KEY_HINT),
            _ => None,
        }
    }

    /// Flips the backend between cloud and local processing. The new mode
    /// is taken from the response when present.
    pub async fn toggle_mode(&mut self, backend: &dyn Backend, notifier: &dyn Notifier) -> bool {
        let Some(current) = self.mode() else {
            return false;
        };
        let requested = current.toggled();
        self.saving = true;
        let outcome = report(backend.set_mode(requested).await, notifier, MODE_CHANGE_FAILED);
        self.saving = false;

        match outcome {
            Some(change) => {
                let mode = change.new_mode.unwrap_or(requested);
                info!("Backend mode switched to {}", mode.as_str());
                if let Some(settings) = self.settings.as_mut() {
                    settings.app_mode = mode;
                }
                notifier.success(&change.message);
                self.message = Some(change.message);
                true
            }
            None => {
                self.message = Some(MODE_CHANGE_FAILED.to_string());
                false
            }
        }
    }
}
