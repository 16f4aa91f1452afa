use std::sync::Arc;

use chrono::{DateTime, Utc};
use common::error::AppError;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, instrument, warn};

use crate::{fetcher::DocumentSource, indexer, Document, Paragraph};

/// An immutable view of the documentation corpus. Paragraphs are always
/// derived from the documents of the same snapshot.
#[derive(Debug, Default)]
pub struct CacheSnapshot {
    documents: Vec<Document>,
    paragraphs: Vec<Paragraph>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl CacheSnapshot {
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let paragraphs = indexer::index(&documents);
        Self {
            documents,
            paragraphs,
            refreshed_at: Some(Utc::now()),
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn document(&self, title: &str) -> Option<&Document> {
        self.documents.iter().find(|document| document.title == title)
    }

    pub const fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// True once a refresh has succeeded, even if the space was empty.
    pub const fn is_populated(&self) -> bool {
        self.refreshed_at.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub documents: usize,
    pub paragraphs: usize,
}

/// In-memory documentation cache. Readers clone the current snapshot `Arc`;
/// a refresh builds a complete new snapshot before swapping it in.
pub struct KnowledgeCache {
    source: Arc<dyn DocumentSource>,
    snapshot: RwLock<Arc<CacheSnapshot>>,
    refresh_lock: Mutex<()>,
}

impl KnowledgeCache {
    pub fn new(source: Arc<dyn DocumentSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Arc::new(CacheSnapshot::default())),
            refresh_lock: Mutex::new(()),
        }
    }

    pub async fn snapshot(&self) -> Arc<CacheSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    pub async fn is_populated(&self) -> bool {
        self.snapshot.read().await.is_populated()
    }

    /// Rebuilds the cache from the source. On failure the previous snapshot
    /// stays in place.
    pub async fn refresh(&self) -> Result<RefreshSummary, AppError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Refreshes only when no refresh has succeeded yet. Failures are logged
    /// and leave the cache empty.
    pub async fn ensure_populated(&self) {
        if self.is_populated().await {
            return;
        }

        let _guard = self.refresh_lock.lock().await;
        // Another task may have finished a refresh while we waited.
        if self.is_populated().await {
            return;
        }

        if let Err(e) = self.refresh_locked().await {
            warn!(error = %e, "Documentation cache is still empty");
        }
    }

    #[instrument(skip_all)]
    async fn refresh_locked(&self) -> Result<RefreshSummary, AppError> {
        let documents = match self.source.fetch_all().await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "Documentation refresh failed; keeping previous snapshot");
                return Err(e);
            }
        };

        let snapshot = CacheSnapshot::from_documents(documents);
        let summary = RefreshSummary {
            documents: snapshot.documents.len(),
            paragraphs: snapshot.paragraphs.len(),
        };

        *self.snapshot.write().await = Arc::new(snapshot);

        info!(
            documents = summary.documents,
            paragraphs = summary.paragraphs,
            "Documentation cache refreshed"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubSource;
    use futures::future::join_all;

    #[tokio::test]
    async fn starts_empty_and_unpopulated() {
        let cache = KnowledgeCache::new(Arc::new(StubSource::new(Vec::new())));
        let snapshot = cache.snapshot().await;
        assert!(!snapshot.is_populated());
        assert!(snapshot.paragraphs().is_empty());
    }

    #[tokio::test]
    async fn ensure_populated_fetches_once() {
        let source = Arc::new(StubSource::new(vec![Document::new(
            "1",
            "Setup",
            "Install the CLI",
        )]));
        let cache = KnowledgeCache::new(source.clone());

        cache.ensure_populated().await;
        cache.ensure_populated().await;

        assert_eq!(source.calls(), 1);
        assert_eq!(
            cache.snapshot().await.paragraphs(),
            &[Paragraph::new("Setup", "Install the CLI")]
        );
    }

    #[tokio::test]
    async fn concurrent_first_readers_share_one_refresh() {
        let source = Arc::new(
            StubSource::new(vec![Document::new("1", "Setup", "Install the CLI")])
                .with_delay(std::time::Duration::from_millis(20)),
        );
        let cache = Arc::new(KnowledgeCache::new(source.clone()));

        join_all((0..8).map(|_| {
            let cache = Arc::clone(&cache);
            async move { cache.ensure_populated().await }
        }))
        .await;

        assert_eq!(source.calls(), 1);
        assert!(cache.is_populated().await);
    }

    #[tokio::test]
    async fn refresh_is_idempotent_for_unchanged_corpus() {
        let source = Arc::new(StubSource::new(vec![
            Document::new("1", "Setup", "Install the CLI\nRun the wizard"),
            Document::new("2", "FAQ", "Admin rights are required"),
        ]));
        let cache = KnowledgeCache::new(source.clone());

        cache.refresh().await.expect("first refresh");
        let first = cache.snapshot().await;
        let summary = cache.refresh().await.expect("second refresh");
        let second = cache.snapshot().await;

        assert_eq!(source.calls(), 2);
        assert_eq!(first.paragraphs(), second.paragraphs());
        assert_eq!(
            summary,
            RefreshSummary {
                documents: 2,
                paragraphs: 3
            }
        );
    }

    #[tokio::test]
    async fn refresh_replaces_rather_than_merges() {
        let source = Arc::new(StubSource::new(vec![Document::new("1", "Old", "stale text")]));
        let cache = KnowledgeCache::new(source.clone());
        cache.refresh().await.expect("first refresh");
        let before = cache.snapshot().await;

        source.set_documents(vec![Document::new("2", "New", "fresh text")]);
        cache.refresh().await.expect("second refresh");
        let after = cache.snapshot().await;

        // A reader holding the old snapshot still sees a complete old view.
        assert_eq!(before.paragraphs(), &[Paragraph::new("Old", "stale text")]);
        assert_eq!(after.paragraphs(), &[Paragraph::new("New", "fresh text")]);
        assert!(after.document("Old").is_none());
        assert!(after.document("New").is_some());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let source = Arc::new(StubSource::new(vec![Document::new("1", "Setup", "Install")]));
        let cache = KnowledgeCache::new(source.clone());
        cache.refresh().await.expect("first refresh");

        source.set_failing(true);
        let result = cache.refresh().await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert_eq!(
            cache.snapshot().await.paragraphs(),
            &[Paragraph::new("Setup", "Install")]
        );
    }

    #[tokio::test]
    async fn failed_lazy_population_is_retried_later() {
        let source = Arc::new(StubSource::new(vec![Document::new("1", "Setup", "Install")]));
        source.set_failing(true);
        let cache = KnowledgeCache::new(source.clone());

        cache.ensure_populated().await;
        assert!(!cache.is_populated().await);

        source.set_failing(false);
        cache.ensure_populated().await;
        assert!(cache.is_populated().await);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn empty_space_counts_as_populated() {
        let source = Arc::new(StubSource::new(Vec::new()));
        let cache = KnowledgeCache::new(source.clone());

        cache.ensure_populated().await;
        cache.ensure_populated().await;

        assert!(cache.is_populated().await);
        assert_eq!(source.calls(), 1);
    }
}
