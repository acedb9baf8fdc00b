use crate::core::models::UploadFile;
use crate::core::route::Route;
use crate::services::api::Backend;
use crate::services::pages::report;
use crate::services::toast::Notifier;
use log::info;

/// State of the upload drop zone on the home page.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<UploadFile>,
    pub auto_process: bool,
    pub uploading: bool,
}

impl UploadForm {
    pub fn new() -> Self {
        Self {
            auto_process: true,
            ..Self::default()
        }
    }

    pub fn select(&mut self, file: UploadFile) {
        self.file = Some(file);
    }

    pub fn clear(&mut self) {
        self.file = None;
    }

    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.uploading
    }

    /// Uploads the selected file. Returns where to navigate on success.
    pub async fn submit(&mut self, backend: &dyn Backend, notifier: &dyn Notifier) -> Option<Route> {
        let file = self.file.clone()?;
        if self.uploading {
            return None;
        }
        self.uploading = true;
        let route = upload_book(backend, notifier, file, self.auto_process).await;
        self.uploading = false;
        if route.is_some() {
            self.file = None;
        }
        route
    }
}

/// With auto-processing the user lands on the book, otherwise on casting.
pub async fn upload_book(
    backend: &dyn Backend,
    notifier: &dyn Notifier,
    file: UploadFile,
    auto_process: bool,
) -> Option<Route> {
    let name = file.name.clone();
    let book = report(backend.upload_book(file, auto_process).await, notifier, "Upload failed")?;
    info!("Uploaded {} as book {}", name, book.id);
    Some(Route::after_upload(book.id, auto_process))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api::mock::MockBackend;
    use crate::services::toast::mock::RecordingNotifier;
    use crate::services::toast::ToastKind;

    #[tokio::test]
    async fn test_upload_and_process_opens_book() {
        let backend = MockBackend::new();
        let notifier = RecordingNotifier::new();
        let mut form = UploadForm::new();
        form.select(UploadFile::new("les_miserables.epub", vec![0; 16]));
        assert!(form.can_submit());

        let route = form.submit(&backend, &notifier).await;
        assert_eq!(route.map(|r| r.path()), Some("/books/42".to_string()));
        assert_eq!(backend.calls(), vec!["upload les_miserables.epub true"]);
        assert!(notifier.messages().is_empty());
        assert!(form.file.is_none());
        assert!(!form.uploading);
    }

    #[tokio::test]
    async fn test_upload_and_configure_opens_casting() {
        let backend = MockBackend::new();
        let notifier = RecordingNotifier::new();
        let route = upload_book(&backend, &notifier, UploadFile::new("b.epub", vec![]), false).await;
        assert_eq!(route, Some(Route::Casting(42)));
        assert_eq!(backend.calls(), vec!["upload b.epub false"]);
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_file() {
        let backend = MockBackend::new();
        backend.fail_on("upload");
        let notifier = RecordingNotifier::new();
        let mut form = UploadForm::new();
        form.select(UploadFile::new("b.epub", vec![]));
        assert_eq!(form.submit(&backend, &notifier).await, None);
        assert!(form.file.is_some());
        assert_eq!(notifier.last(), Some((ToastKind::Error, "Upload failed".to_string())));
    }

    #[tokio::test]
    async fn test_submit_without_file_sends_nothing() {
        let backend = MockBackend::new();
        let mut form = UploadForm::new();
        assert!(!form.can_submit());
        assert_eq!(form.submit(&backend, &RecordingNotifier::new()).await, None);
        assert!(backend.calls().is_empty());
    }
}
