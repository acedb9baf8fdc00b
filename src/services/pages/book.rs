use crate::core::config::Config;
use crate::core::models::{Book, BookId, Chapter, ChapterId, ChapterStatus, UploadFile};
use crate::services::api::Backend;
use crate::services::batch::{generate_sequentially, pending_chapters};
use crate::services::cover::{completion_percentage, is_partially_generated, CoverOverlay};
use crate::services::pages::report;
use crate::services::playback::PlayRequest;
use crate::services::toast::Notifier;
use anyhow::Result;
use futures_util::future::try_join;
use log::info;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    Completed,
    Processing,
    Pending,
}

/// Control shown at the end of a chapter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterAction {
    /// Play, plus a regenerate button.
    Play,
    /// Busy indicator. Only a request this page is still sending can be
    /// cancelled, and only locally.
    Generating { cancellable: bool },
    Generate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChapterRow {
    pub id: ChapterId,
    pub position_label: String,
    pub title: String,
    pub status_label: String,
    pub badge: StatusBadge,
    /// Sub-progress bar value, present while processing.
    pub progress: Option<f64>,
    pub action: ChapterAction,
}

/// Outcome of the book-level play/pause button.
#[derive(Debug, Clone, PartialEq)]
pub enum BookPlayIntent {
    NothingToPlay,
    Pause,
    Play(PlayRequest),
}

pub const NOTHING_TO_PLAY: &str = "No audio available yet. Generate chapters first!";

#[derive(Debug, Clone, PartialEq)]
pub struct BookDetail {
    pub book_id: BookId,
    pub book: Option<Book>,
    pub chapters: Vec<Chapter>,
    pub loading: bool,
    /// Chapter whose generation request is in flight from this page.
    pub generating: Option<ChapterId>,
    pub batch_generating: bool,
    pub auto_refresh: bool,
}

/// Book and its chapters, fetched together.
pub async fn fetch_book_detail(backend: &dyn Backend, book_id: BookId) -> Result<(Book, Vec<Chapter>)> {
    try_join(backend.get_book(book_id), backend.list_chapters(book_id)).await
}

impl BookDetail {
    pub fn new(book_id: BookId) -> Self {
        Self {
            book_id,
            book: None,
            chapters: Vec::new(),
            loading: true,
            generating: None,
            batch_generating: false,
            auto_refresh: true,
        }
    }

    /// Applies a fetch result. On failure earlier data stays on screen.
    pub fn apply_fetch(&mut self, result: Result<(Book, Vec<Chapter>)>, notifier: &dyn Notifier) {
        if let Some((book, chapters)) = report(result, notifier, "Failed to load book data") {
            self.book = Some(book);
            self.chapters = chapters;
        }
        self.loading = false;
    }

    pub async fn refresh(&mut self, backend: &dyn Backend, notifier: &dyn Notifier) {
        let result = fetch_book_detail(backend, self.book_id).await;
        self.apply_fetch(result, notifier);
    }

    pub fn not_found(&self) -> bool {
        !self.loading && self.book.is_none()
    }

    pub fn completed_chapters(&self) -> Vec<&Chapter> {
        self.chapters.iter().filter(|c| c.has_audio()).collect()
    }

    pub fn completion_percentage(&self) -> f64 {
        completion_percentage(&self.chapters)
    }

    pub fn progress_label(&self) -> String {
        format!("{} / {} chapters", self.completed_chapters().len(), self.chapters.len())
    }

    /// "2/5 ready", shown only while some but not all chapters are done.
    pub fn ready_badge(&self) -> Option<String> {
        let done = self.completed_chapters().len();
        (done > 0 && done < self.chapters.len()).then(|| format!("{}/{} ready", done, self.chapters.len()))
    }

    pub fn can_generate_all(&self) -> bool {
        !self.batch_generating && self.completed_chapters().len() != self.chapters.len()
    }

    pub fn cover(&self, config: &Config) -> CoverOverlay {
        let percentage = self.completion_percentage();
        let cover_path = self.book.as_ref().and_then(|b| b.cover_path.as_deref());
        CoverOverlay::for_cover(config, cover_path, percentage, is_partially_generated(percentage))
    }

    pub fn chapter_rows(&self) -> Vec<ChapterRow> {
        self.chapters.iter().map(|c| self.chapter_row(c)).collect()
    }

    fn chapter_row(&self, chapter: &Chapter) -> ChapterRow {
        let pending_here = self.generating == Some(chapter.id);
        let processing = chapter.status == ChapterStatus::Processing || pending_here;
        let badge = if chapter.is_completed() {
            StatusBadge::Completed
        } else if processing {
            StatusBadge::Processing
        } else {
            StatusBadge::Pending
        };
        let action = if chapter.has_audio() {
            ChapterAction::Play
        } else if processing {
            ChapterAction::Generating {
                cancellable: pending_here,
            }
        } else {
            ChapterAction::Generate
        };
        ChapterRow {
            id: chapter.id,
            position_label: chapter.position_label(),
            title: chapter.title.clone(),
            status_label: chapter.status.label(),
            badge,
            progress: processing.then(|| chapter.progress.unwrap_or(0.0)),
            action,
        }
    }

    /// Builds the request that plays one chapter's first audio segment.
    pub fn play_request(&self, chapter_id: ChapterId, config: &Config) -> Option<PlayRequest> {
        let book = self.book.as_ref()?;
        let chapter = self.chapters.iter().find(|c| c.id == chapter_id)?;
        let audio_path = chapter.audio_path.as_deref().filter(|p| !p.is_empty())?;
        let audio_url = match config.chapter_audio_url(audio_path) {
            Ok(url) => url,
            Err(e) => {
                log::error!("Cannot build audio URL for chapter {}: {:#}", chapter.id, e);
                return None;
            }
        };
        Some(PlayRequest {
            book: book.snapshot(),
            chapter: chapter.snapshot(),
            audio_url,
        })
    }

    /// Book-level button: pause this book if it is the one playing,
    /// otherwise start from the first playable chapter.
    pub fn play_intent(&self, playing_this_book: bool, config: &Config) -> BookPlayIntent {
        let Some(first) = self.completed_chapters().first().map(|c| c.id) else {
            return BookPlayIntent::NothingToPlay;
        };
        if playing_this_book {
            return BookPlayIntent::Pause;
        }
        match self.play_request(first, config) {
            Some(request) => BookPlayIntent::Play(request),
            None => BookPlayIntent::NothingToPlay,
        }
    }

    /// Forgets the local pending generation. The backend job keeps running.
    pub fn cancel_generation(&mut self, notifier: &dyn Notifier) {
        self.generating = None;
        notifier.info("Generation cancelled");
    }
}

/// Fire-and-forget trigger for one chapter.
pub async fn generate_chapter(backend: &dyn Backend, notifier: &dyn Notifier, chapter_id: ChapterId) -> bool {
    match report(backend.generate_chapter(chapter_id).await, notifier, "Generation failed") {
        Some(()) => {
            notifier.success("Generation started");
            true
        }
        None => false,
    }
}

/// Triggers every chapter that is not completed yet, one after another.
pub async fn generate_all(
    backend: &dyn Backend,
    notifier: &dyn Notifier,
    chapters: &[Chapter],
    delay: Duration,
) -> bool {
    let pending = pending_chapters(chapters);
    match report(
        generate_sequentially(backend, &pending, delay).await,
        notifier,
        "Batch generation failed",
    ) {
        Some(count) => {
            info!("Batch generation requested for {} chapters", count);
            notifier.success("Batch generation started!");
            true
        }
        None => false,
    }
}

pub async fn upload_cover(backend: &dyn Backend, notifier: &dyn Notifier, book_id: BookId, file: UploadFile) -> bool {
    match report(backend.upload_cover(book_id, file).await, notifier, "Cover upload failed") {
        Some(()) => {
            notifier.success("Cover uploaded successfully");
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::BookStatus;
    use crate::services::api::mock::MockBackend;
    use crate::services::toast::mock::RecordingNotifier;
    use crate::services::toast::ToastKind;

    fn book() -> Book {
        Book {
            id: 42,
            title: "Les Misérables".to_string(),
            author: "Victor Hugo".to_string(),
            status: BookStatus::Ready,
            cover_path: Some("data/covers/book_42_cover.jpg".to_string()),
        }
    }

    fn chapter(id: i64, status: &str, audio: bool, progress: Option<f64>) -> Chapter {
        Chapter {
            id,
            title: format!("Chapter {}", id),
            position: id as u32,
            status: ChapterStatus::from(status.to_string()),
            audio_path: audio.then(|| format!("data/audio/book_42/chapter_{}", id)),
            progress,
        }
    }

    fn loaded(chapters: Vec<Chapter>) -> BookDetail {
        let mut detail = BookDetail::new(42);
        detail.apply_fetch(Ok((book(), chapters)), &RecordingNotifier::new());
        detail
    }

    #[tokio::test]
    async fn test_refresh_fetches_book_and_chapters() {
        let backend = MockBackend::new();
        backend.books.lock().unwrap().push(book());
        backend
            .chapters
            .lock()
            .unwrap()
            .insert(42, vec![chapter(1, "PROCESSING", false, Some(40.0))]);
        let notifier = RecordingNotifier::new();

        let mut detail = BookDetail::new(42);
        assert!(detail.loading);
        detail.refresh(&backend, &notifier).await;
        assert!(!detail.loading);
        assert_eq!(detail.book.as_ref().map(|b| b.id), Some(42));
        assert_eq!(detail.chapters.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_data() {
        let backend = MockBackend::new();
        backend.fail_on("get_book");
        let notifier = RecordingNotifier::new();
        let mut detail = loaded(vec![chapter(1, "COMPLETED", true, None)]);
        detail.refresh(&backend, &notifier).await;
        assert_eq!(detail.chapters.len(), 1);
        assert!(detail.book.is_some());
        assert_eq!(notifier.last(), Some((ToastKind::Error, "Failed to load book data".to_string())));
    }

    #[test]
    fn test_missing_book_reads_as_not_found() {
        let mut detail = BookDetail::new(42);
        detail.apply_fetch(Err(anyhow::anyhow!("404")), &RecordingNotifier::new());
        assert!(detail.not_found());
    }

    #[test]
    fn test_processing_chapter_row() {
        let detail = loaded(vec![chapter(1, "PROCESSING", false, Some(40.0))]);
        let rows = detail.chapter_rows();
        assert_eq!(rows[0].progress, Some(40.0));
        assert_eq!(rows[0].badge, StatusBadge::Processing);
        assert_eq!(rows[0].action, ChapterAction::Generating { cancellable: false });
        assert_eq!(rows[0].position_label, "#01");
    }

    #[test]
    fn test_rows_treat_status_case_alike() {
        let detail = loaded(vec![
            chapter(1, "completed", true, None),
            chapter(2, "COMPLETED", true, None),
            chapter(3, "pending", false, None),
        ]);
        let rows = detail.chapter_rows();
        assert_eq!(rows[0].action, ChapterAction::Play);
        assert_eq!(rows[1].action, ChapterAction::Play);
        assert_eq!(rows[0].status_label, rows[1].status_label);
        assert_eq!(rows[2].action, ChapterAction::Generate);
        assert_eq!(rows[2].badge, StatusBadge::Pending);
        assert_eq!(rows[2].progress, None);
    }

    #[test]
    fn test_local_pending_generation_is_cancellable() {
        let mut detail = loaded(vec![chapter(3, "PENDING", false, None)]);
        detail.generating = Some(3);
        let row = &detail.chapter_rows()[0];
        assert_eq!(row.action, ChapterAction::Generating { cancellable: true });
        assert_eq!(row.progress, Some(0.0));

        let notifier = RecordingNotifier::new();
        detail.cancel_generation(&notifier);
        assert_eq!(detail.chapter_rows()[0].action, ChapterAction::Generate);
        assert_eq!(notifier.last(), Some((ToastKind::Info, "Generation cancelled".to_string())));
    }

    #[test]
    fn test_progress_summary_and_cover() {
        let detail = loaded(vec![
            chapter(1, "COMPLETED", true, None),
            chapter(2, "PROCESSING", false, Some(10.0)),
        ]);
        assert_eq!(detail.completion_percentage(), 50.0);
        assert_eq!(detail.ready_badge().as_deref(), Some("1/2 ready"));
        assert_eq!(detail.progress_label(), "1 / 2 chapters");
        assert!(detail.can_generate_all());
        assert_eq!(detail.cover(&Config::default()).clip_path().as_deref(), Some("inset(0 50% 0 0)"));

        let done = loaded(vec![chapter(1, "COMPLETED", true, None)]);
        assert_eq!(done.ready_badge(), None);
        assert!(!done.can_generate_all());
        assert!(matches!(done.cover(&Config::default()), CoverOverlay::Plain { .. }));
    }

    #[test]
    fn test_play_intent() {
        let config = Config::default();
        let none = loaded(vec![chapter(1, "PROCESSING", false, None)]);
        assert_eq!(none.play_intent(false, &config), BookPlayIntent::NothingToPlay);

        let detail = loaded(vec![
            chapter(1, "PENDING", false, None),
            chapter(2, "COMPLETED", true, None),
            chapter(3, "COMPLETED", true, None),
        ]);
        assert_eq!(detail.play_intent(true, &config), BookPlayIntent::Pause);
        match detail.play_intent(false, &config) {
            BookPlayIntent::Play(request) => {
                assert_eq!(request.chapter.id, 2);
                assert_eq!(request.book.id, 42);
                assert_eq!(
                    request.audio_url,
                    "http://localhost:8000/data/audio/book_42/chapter_2/segment_0000.mp3"
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_play_request_needs_audio() {
        let detail = loaded(vec![chapter(1, "COMPLETED", false, None)]);
        assert!(detail.play_request(1, &Config::default()).is_none());
        assert!(detail.play_request(99, &Config::default()).is_none());
    }

    #[tokio::test]
    async fn test_generate_chapter_toasts() {
        let backend = MockBackend::new();
        let notifier = RecordingNotifier::new();
        assert!(generate_chapter(&backend, &notifier, 7).await);
        assert_eq!(notifier.last(), Some((ToastKind::Success, "Generation started".to_string())));

        backend.fail_on("generate");
        assert!(!generate_chapter(&backend, &notifier, 7).await);
        assert_eq!(notifier.last(), Some((ToastKind::Error, "Generation failed".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_all_skips_completed() {
        let backend = MockBackend::new();
        let notifier = RecordingNotifier::new();
        let chapters = vec![
            chapter(1, "completed", true, None),
            chapter(2, "PROCESSING", false, None),
            chapter(3, "PENDING", false, None),
        ];
        assert!(generate_all(&backend, &notifier, &chapters, Duration::from_millis(500)).await);
        assert_eq!(backend.calls(), vec!["generate 2", "generate 3"]);
        assert_eq!(notifier.last(), Some((ToastKind::Success, "Batch generation started!".to_string())));
    }

    #[tokio::test]
    async fn test_cover_upload() {
        let backend = MockBackend::new();
        let notifier = RecordingNotifier::new();
        assert!(upload_cover(&backend, &notifier, 42, UploadFile::new("cover.png", vec![1])).await);
        assert_eq!(backend.calls(), vec!["upload_cover 42 image/png"]);

        backend.fail_on("upload_cover");
        assert!(!upload_cover(&backend, &notifier, 42, UploadFile::new("cover.png", vec![1])).await);
        assert_eq!(notifier.last(), Some((ToastKind::Error, "Cover upload failed".to_string())));
    }
}
