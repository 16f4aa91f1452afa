use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use common::error::AppError;

use crate::{fetcher::DocumentSource, Document};

/// In-memory document source that counts fetches.
pub struct StubSource {
    documents: Mutex<Vec<Document>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl StubSource {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents: Mutex::new(documents),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_documents(&self, documents: Vec<Document>) {
        *self.documents.lock().expect("stub documents poisoned") = documents;
    }
}

#[async_trait]
impl DocumentSource for StubSource {
    async fn fetch_all(&self) -> Result<Vec<Document>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("documentation source unavailable".into()));
        }
        Ok(self
            .documents
            .lock()
            .expect("stub documents poisoned")
            .clone())
    }
}
