//! Shared state handed to every HTTP/WS handler

use std::sync::Arc;

use contracts::ReadingStore;
use ingestion::IngestionPipeline;

/// State shared by the HTTP and WebSocket handlers.
///
/// Writes go through the pipeline; reads go straight to the store.
pub struct AppState<S> {
    pub pipeline: Arc<IngestionPipeline<S>>,
    pub store: S,
}

impl<S> AppState<S>
where
    S: ReadingStore + Clone + Send + Sync,
{
    pub fn new(pipeline: Arc<IngestionPipeline<S>>, store: S) -> Self {
        Self { pipeline, store }
    }
}

impl<S: Clone> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            store: self.store.clone(),
        }
    }
}
