use crate::core::config::Config;
use crate::core::models::Chapter;

/// Layers of a cover that doubles as a progress indicator.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverOverlay {
    /// No cover uploaded yet.
    Placeholder,
    Plain {
        url: String,
    },
    /// Desaturated, dimmed base with a full-colour copy revealed from the
    /// left up to `progress` percent.
    Generating {
        url: String,
        progress: f64,
        label: Option<String>,
    },
}

impl CoverOverlay {
    pub fn new(cover_url: Option<String>, progress: f64, is_generating: bool) -> Self {
        let Some(url) = cover_url else {
            return CoverOverlay::Placeholder;
        };
        if !is_generating {
            return CoverOverlay::Plain { url };
        }
        let progress = if progress.is_finite() { progress.clamp(0.0, 100.0) } else { 0.0 };
        let label = (progress > 0.0).then(|| format!("Generating {}%", progress.round()));
        CoverOverlay::Generating {
            url,
            progress,
            label,
        }
    }

    /// Resolves a backend `cover_path` before building the overlay.
    pub fn for_cover(config: &Config, cover_path: Option<&str>, progress: f64, is_generating: bool) -> Self {
        let url = cover_path.and_then(|p| match config.static_url(p) {
            Ok(url) => Some(url),
            Err(e) => {
                log::warn!("Unusable cover path {}: {:#}", p, e);
                None
            }
        });
        Self::new(url, progress, is_generating)
    }

    /// CSS `clip-path` for the colour layer: hides the right-hand remainder.
    pub fn clip_path(&self) -> Option<String> {
        match self {
            CoverOverlay::Generating { progress, .. } => {
                Some(format!("inset(0 {}% 0 0)", 100.0 - progress))
            }
            _ => None,
        }
    }
}

/// Share of chapters that are completed and have audio, in percent.
pub fn completion_percentage(chapters: &[Chapter]) -> f64 {
    if chapters.is_empty() {
        return 0.0;
    }
    let done = chapters.iter().filter(|c| c.has_audio()).count();
    done as f64 / chapters.len() as f64 * 100.0
}

/// A book cover shows generation progress only while partly done.
pub fn is_partially_generated(percentage: f64) -> bool {
    percentage > 0.0 && percentage < 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ChapterStatus;

    fn chapter(id: i64, status: &str, audio: bool) -> Chapter {
        Chapter {
            id,
            title: format!("C{}", id),
            position: id as u32,
            status: ChapterStatus::from(status.to_string()),
            audio_path: audio.then(|| format!("data/audio/{}", id)),
            progress: None,
        }
    }

    #[test]
    fn test_placeholder_without_cover() {
        assert_eq!(CoverOverlay::new(None, 50.0, true), CoverOverlay::Placeholder);
    }

    #[test]
    fn test_plain_when_idle() {
        let overlay = CoverOverlay::new(Some("c.png".to_string()), 100.0, false);
        assert_eq!(overlay, CoverOverlay::Plain { url: "c.png".to_string() });
        assert_eq!(overlay.clip_path(), None);
    }

    #[test]
    fn test_zero_progress_has_no_label() {
        let overlay = CoverOverlay::new(Some("c.png".to_string()), 0.0, true);
        match &overlay {
            CoverOverlay::Generating { label, .. } => assert_eq!(label, &None),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(overlay.clip_path().as_deref(), Some("inset(0 100% 0 0)"));
    }

    #[test]
    fn test_partial_reveal_is_proportional() {
        let overlay = CoverOverlay::new(Some("c.png".to_string()), 40.0, true);
        assert_eq!(overlay.clip_path().as_deref(), Some("inset(0 60% 0 0)"));
        match overlay {
            CoverOverlay::Generating { label, .. } => {
                assert_eq!(label.as_deref(), Some("Generating 40%"))
            }
            other => panic!("unexpected {:?}", other),
        }

        let rounded = CoverOverlay::new(Some("c.png".to_string()), 33.333, true);
        match rounded {
            CoverOverlay::Generating { label, .. } => {
                assert_eq!(label.as_deref(), Some("Generating 33%"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_progress_is_clamped() {
        let overlay = CoverOverlay::new(Some("c.png".to_string()), 140.0, true);
        assert_eq!(overlay.clip_path().as_deref(), Some("inset(0 0% 0 0)"));
    }

    #[test]
    fn test_for_cover_resolves_static_root() {
        let overlay = CoverOverlay::for_cover(&Config::default(), Some("data/covers/x.png"), 0.0, false);
        assert_eq!(
            overlay,
            CoverOverlay::Plain {
                url: "http://localhost:8000/data/covers/x.png".to_string()
            }
        );
    }

    #[test]
    fn test_completion_percentage() {
        assert_eq!(completion_percentage(&[]), 0.0);
        let chapters = vec![
            chapter(1, "completed", true),
            chapter(2, "COMPLETED", false),
            chapter(3, "PROCESSING", false),
            chapter(4, "pending", false),
        ];
        assert_eq!(completion_percentage(&chapters), 25.0);
        assert!(is_partially_generated(25.0));
        assert!(!is_partially_generated(0.0));
        assert!(!is_partially_generated(100.0));
    }
}
