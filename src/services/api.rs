use crate::core::config::Config;
use crate::core::models::{
    AppMode, AppSettings, Book, BookId, Chapter, ChapterId, Character, CharacterId, ModeChange,
    ModeUpdate, UploadFile, Voice, VoiceAssignment, VoiceCatalog,
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

#[cfg(target_arch = "wasm32")]
pub trait BackendBounds {}
#[cfg(target_arch = "wasm32")]
impl<T> BackendBounds for T {}

#[cfg(not(target_arch = "wasm32"))]
pub trait BackendBounds: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync> BackendBounds for T {}

/// REST surface of the audiobook backend.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait Backend: BackendBounds {
    async fn upload_book(&self, file: UploadFile, auto_process: bool) -> Result<Book>;
    async fn list_books(&self) -> Result<Vec<Book>>;
    async fn get_book(&self, id: BookId) -> Result<Book>;
    async fn delete_book(&self, id: BookId) -> Result<()>;
    async fn upload_cover(&self, id: BookId, file: UploadFile) -> Result<()>;
    async fn list_chapters(&self, book_id: BookId) -> Result<Vec<Chapter>>;
    async fn list_characters(&self, book_id: BookId) -> Result<Vec<Character>>;
    /// An empty `voice_id` asks the backend to auto-assign.
    async fn assign_voice(&self, character_id: CharacterId, voice_id: &str) -> Result<()>;
    async fn list_voices(&self) -> Result<Vec<Voice>>;
    async fn generate_chapter(&self, chapter_id: ChapterId) -> Result<()>;
    async fn analyze_book(&self, book_id: BookId) -> Result<()>;
    async fn get_settings(&self) -> Result<AppSettings>;
    async fn set_mode(&self, mode: AppMode) -> Result<ModeChange>;
}

pub struct HttpBackend {
    client: Client,
    config: Config,
}

impl HttpBackend {
    pub fn new(config: Config) -> Result<Self> {
        config.base_url()?;
        Ok(Self {
            client: Client::new(),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.config.endpoint(path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send GET {}", path))?;
        let resp = ensure_success(resp, path).await?;
        resp.json::<T>()
            .await
            .with_context(|| format!("Failed to parse response of {}", path))
    }

    /// Triggers a background job. Only transport failures are errors; the
    /// job itself is observed by polling.
    async fn fire(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let resp = self
            .client
            .post(url)
            .send()
            .await
            .with_context(|| format!("Failed to send POST {}", path))?;
        if !resp.status().is_success() {
            warn!("POST {} answered {}", path, resp.status());
        }
        Ok(())
    }
}

async fn ensure_success(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(anyhow!("{} failed with status {}: {}", what, status, body))
}

fn file_part(file: UploadFile) -> Result<multipart::Part> {
    let content_type = file.content_type().to_string();
    multipart::Part::bytes(file.bytes)
        .file_name(file.name)
        .mime_str(&content_type)
        .context("Invalid mime type")
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl Backend for HttpBackend {
    async fn upload_book(&self, file: UploadFile, auto_process: bool) -> Result<Book> {
        debug!("Uploading {} ({} bytes)", file.name, file.bytes.len());
        let mut url = self.url("books/upload")?;
        url.query_pairs_mut()
            .append_pair("auto_process", if auto_process { "true" } else { "false" });

        let form = multipart::Form::new().part("file", file_part(file)?);
        let resp = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .context("Failed to send upload request")?;
        let resp = ensure_success(resp, "Upload").await?;
        resp.json::<Book>().await.context("Failed to parse uploaded book")
    }

    async fn list_books(&self) -> Result<Vec<Book>> {
        self.get_json("books").await
    }

    async fn get_book(&self, id: BookId) -> Result<Book> {
        self.get_json(&format!("books/{}", id)).await
    }

    async fn delete_book(&self, id: BookId) -> Result<()> {
        let resp = self
            .client
            .delete(self.url(&format!("books/{}", id))?)
            .send()
            .await
            .context("Failed to send delete request")?;
        ensure_success(resp, "Delete").await?;
        Ok(())
    }

    async fn upload_cover(&self, id: BookId, file: UploadFile) -> Result<()> {
        let form = multipart::Form::new().part("file", file_part(file)?);
        let resp = self
            .client
            .post(self.url(&format!("books/{}/cover", id))?)
            .multipart(form)
            .send()
            .await
            .context("Failed to send cover upload")?;
        ensure_success(resp, "Cover upload").await?;
        Ok(())
    }

    async fn list_chapters(&self, book_id: BookId) -> Result<Vec<Chapter>> {
        self.get_json(&format!("books/{}/chapters", book_id)).await
    }

    async fn list_characters(&self, book_id: BookId) -> Result<Vec<Character>> {
        self.get_json(&format!("books/{}/characters", book_id)).await
    }

    async fn assign_voice(&self, character_id: CharacterId, voice_id: &str) -> Result<()> {
        let resp = self
            .client
            .patch(self.url(&format!("characters/{}", character_id))?)
            .json(&VoiceAssignment { assigned_voice_id: voice_id })
            .send()
            .await
            .context("Failed to send voice assignment")?;
        ensure_success(resp, "Voice assignment").await?;
        Ok(())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>> {
        let catalog: VoiceCatalog = self.get_json("voices").await?;
        Ok(catalog.voices)
    }

    async fn generate_chapter(&self, chapter_id: ChapterId) -> Result<()> {
        self.fire(&format!("generation/generate/{}", chapter_id)).await
    }

    async fn analyze_book(&self, book_id: BookId) -> Result<()> {
        self.fire(&format!("generation/analyze/{}", book_id)).await
    }

    async fn get_settings(&self) -> Result<AppSettings> {
        self.get_json("settings").await
    }

    async fn set_mode(&self, mode: AppMode) -> Result<ModeChange> {
        let resp = self
            .client
            .put(self.url("settings/mode")?)
            .json(&ModeUpdate { app_mode: mode })
            .send()
            .await
            .context("Failed to send mode update")?;
        let resp = ensure_success(resp, "Mode update").await?;
        resp.json::<ModeChange>().await.context("Failed to parse mode update response")
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// In-memory backend recording every call in order.
    #[derive(Default, Clone)]
    pub struct MockBackend {
        pub books: Arc<Mutex<Vec<Book>>>,
        pub chapters: Arc<Mutex<HashMap<BookId, Vec<Chapter>>>>,
        pub characters: Arc<Mutex<Vec<Character>>>,
        pub voices: Arc<Mutex<Vec<Voice>>>,
        pub settings: Arc<Mutex<Option<AppSettings>>>,
        pub calls: Arc<Mutex<Vec<String>>>,
        /// Calls whose name starts with one of these prefixes fail.
        pub failing: Arc<Mutex<Vec<String>>>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_on(&self, prefix: &str) {
            self.failing.lock().unwrap().push(prefix.to_string());
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> Result<()> {
            self.calls.lock().unwrap().push(call.clone());
            if self.failing.lock().unwrap().iter().any(|p| call.starts_with(p.as_str())) {
                return Err(anyhow!("Mock failure for {}", call));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Backend for MockBackend {
        async fn upload_book(&self, file: UploadFile, auto_process: bool) -> Result<Book> {
            self.record(format!("upload {} {}", file.name, auto_process))?;
            let book = Book {
                id: 42,
                title: file.name.trim_end_matches(".epub").to_string(),
                author: "Unknown".to_string(),
                status: crate::core::models::BookStatus::Processing,
                cover_path: None,
            };
            self.books.lock().unwrap().push(book.clone());
            Ok(book)
        }

        async fn list_books(&self) -> Result<Vec<Book>> {
            self.record("list_books".to_string())?;
            Ok(self.books.lock().unwrap().clone())
        }

        async fn get_book(&self, id: BookId) -> Result<Book> {
            self.record(format!("get_book {}", id))?;
            self.books
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.id == id)
                .cloned()
                .ok_or_else(|| anyhow!("Book not found"))
        }

        async fn delete_book(&self, id: BookId) -> Result<()> {
            self.record(format!("delete_book {}", id))?;
            self.books.lock().unwrap().retain(|b| b.id != id);
            Ok(())
        }

        async fn upload_cover(&self, id: BookId, file: UploadFile) -> Result<()> {
            self.record(format!("upload_cover {} {}", id, file.content_type()))
        }

        async fn list_chapters(&self, book_id: BookId) -> Result<Vec<Chapter>> {
            self.record(format!("list_chapters {}", book_id))?;
            Ok(self.chapters.lock().unwrap().get(&book_id).cloned().unwrap_or_default())
        }

        async fn list_characters(&self, book_id: BookId) -> Result<Vec<Character>> {
            self.record(format!("list_characters {}", book_id))?;
            Ok(self.characters.lock().unwrap().clone())
        }

        async fn assign_voice(&self, character_id: CharacterId, voice_id: &str) -> Result<()> {
            self.record(format!("assign_voice {} {}", character_id, voice_id))
        }

        async fn list_voices(&self) -> Result<Vec<Voice>> {
            self.record("list_voices".to_string())?;
            Ok(self.voices.lock().unwrap().clone())
        }

        async fn generate_chapter(&self, chapter_id: ChapterId) -> Result<()> {
            self.record(format!("generate {}", chapter_id))
        }

        async fn analyze_book(&self, book_id: BookId) -> Result<()> {
            self.record(format!("analyze {}", book_id))
        }

        async fn get_settings(&self) -> Result<AppSettings> {
            self.record("get_settings".to_string())?;
            self.settings
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| anyhow!("No settings"))
        }

        async fn set_mode(&self, mode: AppMode) -> Result<ModeChange> {
            self.record(format!("set_mode {}", mode.as_str()))?;
            Ok(ModeChange {
                message: format!("Mode updated to {}. Restart backend to apply.", mode.as_str()),
                new_mode: Some(mode),
            })
        }
    }
}
