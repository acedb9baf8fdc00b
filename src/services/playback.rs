use crate::core::models::{BookId, BookSnapshot, ChapterSnapshot};
use anyhow::Result;
use log::debug;

/// Speeds offered in the player menu. Other values are accepted.
pub const PLAYBACK_SPEEDS: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// The one real audio output. Methods take `&self` because the browser
/// element is a shared handle.
pub trait AudioHandle {
    /// Currently loaded source, empty when nothing is loaded.
    fn source(&self) -> String;
    /// Replaces the source; resets the position.
    fn load(&self, url: &str);
    /// Requests playback. Browsers may refuse (autoplay policy).
    fn play(&self) -> Result<()>;
    fn pause(&self);
    fn is_paused(&self) -> bool;
    fn current_time(&self) -> f64;
    fn seek(&self, seconds: f64);
    /// NaN or infinite until metadata is known.
    fn duration(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);
}

/// What is loaded right now. Replaced wholesale by every `play`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub book: BookSnapshot,
    pub chapter: ChapterSnapshot,
    pub audio_url: String,
}

/// A "play" action prepared by a page, applied to the store as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub book: BookSnapshot,
    pub chapter: ChapterSnapshot,
    pub audio_url: String,
}

/// Process-wide playback state, shared by every page and driven by the
/// persistent player.
pub struct PlaybackStore<H> {
    session: Option<PlaybackSession>,
    is_playing: bool,
    speed: f64,
    show_lyrics: bool,
    handle: Option<H>,
}

impl<H> Default for PlaybackStore<H> {
    fn default() -> Self {
        Self {
            session: None,
            is_playing: false,
            speed: 1.0,
            show_lyrics: false,
            handle: None,
        }
    }
}

impl<H: AudioHandle> PlaybackStore<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the player once its audio element exists.
    pub fn attach(&mut self, handle: H) {
        handle.set_playback_rate(self.speed);
        self.handle = Some(handle);
    }

    pub fn detach(&mut self) -> Option<H> {
        self.handle.take()
    }

    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.audio_url.as_str())
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn show_lyrics(&self) -> bool {
        self.show_lyrics
    }

    /// True when `book_id` is the loaded book and it is playing.
    pub fn is_playing_book(&self, book_id: BookId) -> bool {
        self.is_playing && self.session.as_ref().is_some_and(|s| s.book.id == book_id)
    }

    /// Replaces the session; nothing of the previous one is kept.
    pub fn play(&mut self, book: BookSnapshot, chapter: ChapterSnapshot, url: impl Into<String>) {
        let audio_url = url.into();
        debug!("Playing book {} chapter {} from {}", book.id, chapter.id, audio_url);
        self.session = Some(PlaybackSession {
            book,
            chapter,
            audio_url,
        });
        self.is_playing = true;
    }

    pub fn start(&mut self, request: PlayRequest) {
        self.play(request.book, request.chapter, request.audio_url);
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
        if let Some(handle) = &self.handle {
            handle.pause();
        }
    }

    pub fn toggle_play(&mut self) {
        if self.session.is_none() {
            return;
        }
        if self.is_playing {
            self.pause();
        } else if let Some(handle) = &self.handle {
            if let Err(e) = handle.play() {
                debug!("Playback request refused: {:#}", e);
            }
            self.is_playing = true;
        }
    }

    pub fn set_playback_speed(&mut self, speed: f64) {
        self.speed = speed;
        if let Some(handle) = &self.handle {
            handle.set_playback_rate(speed);
        }
    }

    pub fn toggle_lyrics(&mut self) {
        self.show_lyrics = !self.show_lyrics;
    }
}


#[cfg(test)]
mod tests {
    use super::mock::{book, chapter, MockAudio};
    use super::*;

    #[test]
    fn test_play_replaces_previous_session() {
        let mut store: PlaybackStore<MockAudio> = PlaybackStore::new();
        store.play(book(1), chapter(10, 1), "http://host/a.mp3");
        store.pause();
        store.play(book(2), chapter(20, 3), "http://host/b.mp3");

        let session = store.session().unwrap();
        assert_eq!(session.book.id, 2);
        assert_eq!(session.chapter.id, 20);
        assert_eq!(session.audio_url, "http://host/b.mp3");
        assert!(store.is_playing());
        assert!(store.is_playing_book(2));
        assert!(!store.is_playing_book(1));
    }

    #[test]
    fn test_toggle_without_session_is_noop() {
        let mut store = PlaybackStore::new();
        store.attach(MockAudio::new());
        store.toggle_play();
        assert!(!store.is_playing());
        assert!(store.handle().unwrap().log().is_empty());
    }

    #[test]
    fn test_toggle_drives_handle() {
        let audio = MockAudio::new();
        let mut store = PlaybackStore::new();
        store.attach(audio.clone());
        store.play(book(1), chapter(10, 2), "https://host/seg0.mp3");

        store.toggle_play();
        assert!(!store.is_playing());
        assert_eq!(audio.log(), vec!["pause"]);

        store.toggle_play();
        assert!(store.is_playing());
        assert_eq!(audio.log(), vec!["pause", "play"]);
    }

    #[test]
    fn test_toggle_swallows_refused_play() {
        let audio = MockAudio::new();
        audio.refuse_play.set(true);
        let mut store = PlaybackStore::new();
        store.attach(audio.clone());
        store.play(book(1), chapter(10, 2), "https://host/seg0.mp3");
        store.pause();
        store.toggle_play();
        assert!(store.is_playing());
    }

    #[test]
    fn test_toggle_without_handle_keeps_paused() {
        let mut store: PlaybackStore<MockAudio> = PlaybackStore::new();
        store.play(book(1), chapter(10, 2), "u");
        store.pause();
        store.toggle_play();
        assert!(!store.is_playing());
    }

    #[test]
    fn test_speed_applies_to_attached_handle() {
        let audio = MockAudio::new();
        let mut store = PlaybackStore::new();
        store.set_playback_speed(1.5);
        store.attach(audio.clone());
        assert_eq!(audio.rate.get(), 1.5);

        store.set_playback_speed(0.75);
        assert_eq!(store.speed(), 0.75);
        assert_eq!(audio.rate.get(), 0.75);

        store.set_playback_speed(3.0);
        assert_eq!(audio.rate.get(), 3.0);
    }

    #[test]
    fn test_lyrics_toggle_is_cosmetic() {
        let audio = MockAudio::new();
        let mut store = PlaybackStore::new();
        store.attach(audio.clone());
        store.toggle_lyrics();
        assert!(store.show_lyrics());
        store.toggle_lyrics();
        assert!(!store.show_lyrics());
        assert!(audio.log().is_empty());
    }
}
