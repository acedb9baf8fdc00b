use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;
use std::time::Duration;
use url::Url;

/// First audio segment of a generated chapter. Later segments are not
/// sequenced on the client.
pub const FIRST_SEGMENT_FILE: &str = "segment_0000.mp3";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_toast_ttl_ms")]
    pub toast_ttl_ms: u64,

    #[serde(default = "default_generate_all_delay_ms")]
    pub generate_all_delay_ms: u64,

    #[serde(default = "default_casting_batch_delay_ms")]
    pub casting_batch_delay_ms: u64,

    #[serde(default = "default_generation_refresh_delay_ms")]
    pub generation_refresh_delay_ms: u64,

    #[serde(default = "default_analysis_refresh_delay_secs")]
    pub analysis_refresh_delay_secs: u64,

    #[serde(default = "default_casting_redirect_delay_ms")]
    pub casting_redirect_delay_ms: u64,

    #[serde(default = "default_voice_locale")]
    pub default_voice_locale: String,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_refresh_interval_secs() -> u64 {
    5
}
fn default_toast_ttl_ms() -> u64 {
    3000
}
fn default_generate_all_delay_ms() -> u64 {
    500
}
fn default_casting_batch_delay_ms() -> u64 {
    100
}
fn default_generation_refresh_delay_ms() -> u64 {
    1000
}
fn default_analysis_refresh_delay_secs() -> u64 {
    5
}
fn default_casting_redirect_delay_ms() -> u64 {
    1500
}
fn default_voice_locale() -> String {
    "fr-FR".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            refresh_interval_secs: default_refresh_interval_secs(),
            toast_ttl_ms: default_toast_ttl_ms(),
            generate_all_delay_ms: default_generate_all_delay_ms(),
            casting_batch_delay_ms: default_casting_batch_delay_ms(),
            generation_refresh_delay_ms: default_generation_refresh_delay_ms(),
            analysis_refresh_delay_secs: default_analysis_refresh_delay_secs(),
            casting_redirect_delay_ms: default_casting_redirect_delay_ms(),
            default_voice_locale: default_voice_locale(),
        }
    }
}

impl Config {
    /// Reads `config.yml` from the working directory, falling back to the
    /// built-in local backend address when the file does not exist.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.yml"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.base_url()?;
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) -> Result<()> {
        self.save_to(Path::new("config.yml"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Backend root. Always carries a trailing slash so relative joins keep
    /// every path segment.
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.api_base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).with_context(|| format!("Invalid api_base_url: {}", self.api_base_url))
    }

    /// Builds an API endpoint URL such as `books/42/chapters`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url()?;
        base.join(path.trim_start_matches('/'))
            .with_context(|| format!("Invalid endpoint path: {}", path))
    }

    /// Resolves a backend-relative file path (`cover_path`, `audio_path`)
    /// against the static-file root.
    pub fn static_url(&self, relative: &str) -> Result<String> {
        let normalized = relative.replace('\\', "/");
        Ok(self.endpoint(&normalized)?.to_string())
    }

    pub fn chapter_audio_url(&self, audio_path: &str) -> Result<String> {
        let dir = audio_path.trim_end_matches(['/', '\\']);
        self.static_url(&format!("{}/{}", dir, FIRST_SEGMENT_FILE))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn toast_ttl(&self) -> Duration {
        Duration::from_millis(self.toast_ttl_ms)
    }

    pub fn generate_all_delay(&self) -> Duration {
        Duration::from_millis(self.generate_all_delay_ms)
    }

    pub fn casting_batch_delay(&self) -> Duration {
        Duration::from_millis(self.casting_batch_delay_ms)
    }

    pub fn generation_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.generation_refresh_delay_ms)
    }

    pub fn analysis_refresh_delay(&self) -> Duration {
        Duration::from_secs(self.analysis_refresh_delay_secs)
    }

    pub fn casting_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.casting_redirect_delay_ms)
    }
}
