use crate::core::models::{Chapter, ChapterId};
use crate::services::api::Backend;
use crate::utils::time::sleep;
use anyhow::{Context, Result};
use log::info;
use std::time::Duration;

/// Chapters the "generate all" action still has to trigger.
pub fn pending_chapters(chapters: &[Chapter]) -> Vec<ChapterId> {
    chapters
        .iter()
        .filter(|c| !c.is_completed())
        .map(|c| c.id)
        .collect()
}

/// Triggers generation one chapter at a time, waiting `delay` after each
/// request so the backend is not flooded. Stops at the first failure.
pub async fn generate_sequentially(
    backend: &dyn Backend,
    chapter_ids: &[ChapterId],
    delay: Duration,
) -> Result<usize> {
    let mut started = 0;
    for id in chapter_ids {
        backend
            .generate_chapter(*id)
            .await
            .with_context(|| format!("Failed to start generation for chapter {}", id))?;
        started += 1;
        info!("Generation requested for chapter {} ({}/{})", id, started, chapter_ids.len());
        sleep(delay).await;
    }
    Ok(started)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ChapterStatus;
    use crate::services::api::mock::MockBackend;

    fn chapter(id: i64, status: &str) -> Chapter {
        Chapter {
            id,
            title: format!("C{}", id),
            position: id as u32,
            status: ChapterStatus::from(status.to_string()),
            audio_path: None,
            progress: None,
        }
    }

    #[test]
    fn test_pending_skips_completed_any_case() {
        let chapters = vec![
            chapter(1, "COMPLETED"),
            chapter(2, "completed"),
            chapter(3, "PROCESSING"),
            chapter(4, "PENDING"),
        ];
        assert_eq!(pending_chapters(&chapters), vec![3, 4]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_are_sequential_and_spaced() -> Result<()> {
        let backend = MockBackend::new();
        let start = tokio::time::Instant::now();
        let started = generate_sequentially(&backend, &[5, 6, 7], Duration::from_millis(500)).await?;
        assert_eq!(started, 3);
        assert_eq!(backend.calls(), vec!["generate 5", "generate 6", "generate 7"]);
        assert!(start.elapsed() >= Duration::from_millis(1500));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_at_first_failure() {
        let backend = MockBackend::new();
        backend.fail_on("generate 6");
        let result = generate_sequentially(&backend, &[5, 6, 7], Duration::from_millis(100)).await;
        assert!(result.is_err());
        assert_eq!(backend.calls(), vec!["generate 5", "generate 6"]);
    }
}
