use crate::core::config::Config;
use crate::core::route::Route;
use crate::services::playback::{AudioHandle, PlaybackStore, PLAYBACK_SPEEDS};
use log::debug;

/// Minimum spacing between accepted `timeupdate` events.
pub const TIME_UPDATE_THROTTLE_MS: f64 = 1000.0;

/// `m:ss`. Zero, negative, NaN and infinite all read as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, secs)
}

/// What the reconciliation pass did to the audio handle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncOutcome {
    pub loaded: Option<String>,
    pub requested_play: bool,
    pub requested_pause: bool,
}

/// Brings the audio handle in line with the store. Run whenever the
/// session URL or the play flag changes.
pub fn reconcile<H: AudioHandle>(store: &PlaybackStore<H>) -> SyncOutcome {
    let mut outcome = SyncOutcome::default();
    let Some(handle) = store.handle() else {
        return outcome;
    };

    if let Some(url) = store.audio_url() {
        if handle.source() != url {
            handle.load(url);
            // a fresh load resets the rate in browsers
            handle.set_playback_rate(store.speed());
            outcome.loaded = Some(url.to_string());
        }
    }

    if store.is_playing() && handle.is_paused() && !handle.source().is_empty() {
        if let Err(e) = handle.play() {
            debug!("Autoplay refused: {:#}", e);
        }
        outcome.requested_play = true;
    } else if !store.is_playing() && !handle.is_paused() {
        handle.pause();
        outcome.requested_pause = true;
    }
    outcome
}

/// Locally observed position and length of the loaded audio.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerClock {
    current_time: f64,
    duration: f64,
    last_time_update_ms: f64,
}

impl PlayerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Accepts at most one position update per second. Returns whether the
    /// displayed time changed.
    pub fn on_time_update(&mut self, now_ms: f64, position: f64) -> bool {
        if now_ms - self.last_time_update_ms > TIME_UPDATE_THROTTLE_MS {
            self.current_time = position;
            self.last_time_update_ms = now_ms;
            return true;
        }
        false
    }

    /// Ignores NaN and infinite lengths (metadata missing or a stream).
    pub fn on_duration_change(&mut self, duration: f64) -> bool {
        if duration.is_finite() {
            self.duration = duration;
            return true;
        }
        false
    }

    /// Moves the handle and mirrors the new position right away.
    pub fn seek<H: AudioHandle>(&mut self, handle: Option<&H>, position: f64) {
        self.current_time = position;
        if let Some(handle) = handle {
            handle.seek(position);
        }
    }

    /// Seek bar upper bound.
    pub fn seek_max(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            self.duration
        } else {
            0.0
        }
    }

    pub fn times(&self) -> PlayerTimes {
        PlayerTimes {
            elapsed: format_time(self.current_time),
            total: format_time(self.duration),
            position: self.current_time,
            seek_max: self.seek_max(),
        }
    }
}

/// Seek bar and time readouts. Kept out of [`PlayerView`] so position
/// changes never rebuild the player frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTimes {
    pub elapsed: String,
    pub total: String,
    pub position: f64,
    pub seek_max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeedOption {
    pub speed: f64,
    pub label: String,
    pub selected: bool,
}

pub fn speed_label(speed: f64) -> String {
    format!("{}x", speed)
}

/// Everything the persistent player draws. `None` when nothing is loaded,
/// in which case the player is absent from the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub book_title: String,
    pub chapter_label: String,
    pub cover_url: Option<String>,
    pub book_route: Route,
    pub audio_url: String,
    pub is_playing: bool,
    pub play_label: &'static str,
    pub speed_label: String,
    pub speeds: Vec<SpeedOption>,
    pub show_lyrics: bool,
}

impl PlayerView {
    pub fn build<H: AudioHandle>(
        store: &PlaybackStore<H>,
        config: &Config,
    ) -> Option<PlayerView> {
        let session = store.session()?;
        if session.audio_url.is_empty() {
            return None;
        }
        let cover_url = session
            .book
            .cover_path
            .as_deref()
            .and_then(|p| config.static_url(p).ok());
        let speed = store.speed();
        Some(PlayerView {
            book_title: session.book.title.clone(),
            chapter_label: format!("Chapter {}: {}", session.chapter.position, session.chapter.title),
            cover_url,
            book_route: Route::Book(session.book.id),
            audio_url: session.audio_url.clone(),
            is_playing: store.is_playing(),
            play_label: if store.is_playing() { "Pause" } else { "Play" },
            speed_label: speed_label(speed),
            speeds: PLAYBACK_SPEEDS
                .iter()
                .map(|&s| SpeedOption {
                    speed: s,
                    label: speed_label(s),
                    selected: s == speed,
                })
                .collect(),
            show_lyrics: store.show_lyrics(),
        })
    }
}
