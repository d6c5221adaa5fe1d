//! Caller-facing result stream of a run.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use hclip_models::{CroppedResult, OutputRecord, RunId};

use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunSummary;

/// One item of a run: a finished crop job, or the fatal error that ended the run.
pub type RunItem = PipelineResult<CroppedResult>;

/// Lazily produced, single-pass results of one run, in completion order.
///
/// The stream ends after the last result or right after a fatal error. By the
/// time it ends the run's scratch directory has already been removed.
/// Dropping the stream early cancels outstanding crop jobs and cleans up in
/// the background; use [`ResultStream::abandon`] to wait for that.
#[derive(Debug)]
pub struct ResultStream {
    run_id: RunId,
    rx: mpsc::Receiver<RunItem>,
    producer: Option<JoinHandle<RunSummary>>,
    include_metadata: bool,
}

impl ResultStream {
    pub(crate) fn new(
        run_id: RunId,
        rx: mpsc::Receiver<RunItem>,
        producer: JoinHandle<RunSummary>,
        include_metadata: bool,
    ) -> Self {
        Self {
            run_id,
            rx,
            producer: Some(producer),
            include_metadata,
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// Next result, or `None` once the run is over.
    pub async fn next(&mut self) -> Option<RunItem> {
        self.rx.recv().await
    }

    /// Next result as an output record.
    ///
    /// A failed crop job comes back as a non-fatal [`PipelineError::Crop`];
    /// reading can continue after it.
    pub async fn next_record(&mut self) -> Option<PipelineResult<OutputRecord>> {
        let item = self.next().await?;
        let include_metadata = self.include_metadata;
        Some(item.and_then(|result| {
            let title = result.descriptor.title.clone();
            result
                .into_record(include_metadata)
                .map_err(|failure| PipelineError::Crop { title, failure })
        }))
    }

    /// Blocking variant of [`ResultStream::next`] for synchronous callers.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async execution context.
    pub fn blocking_next(&mut self) -> Option<RunItem> {
        self.rx.blocking_recv()
    }

    /// Iterate the remaining results from synchronous code.
    pub fn into_blocking_iter(self) -> BlockingResults {
        BlockingResults { stream: self }
    }

    /// Stop reading and wait for the run to wind down.
    ///
    /// Outstanding crop jobs are cancelled and the scratch directory is gone
    /// when this returns. Returns the run summary, or `None` if the run task
    /// panicked. After the stream has ended this just collects the summary.
    pub async fn abandon(mut self) -> Option<RunSummary> {
        self.rx.close();
        let producer = self.producer.take()?;
        producer.await.ok()
    }
}

impl Stream for ResultStream {
    type Item = RunItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Blocking iterator over a [`ResultStream`].
#[derive(Debug)]
pub struct BlockingResults {
    stream: ResultStream,
}

impl Iterator for BlockingResults {
    type Item = RunItem;

    fn next(&mut self) -> Option<Self::Item> {
        self.stream.blocking_next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use hclip_models::{CropFailure, CropFailureKind, CroppedVideo, HighlightDescriptor};

    fn stream_with(items: Vec<RunItem>, include_metadata: bool) -> ResultStream {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            tx.try_send(item).unwrap();
        }
        drop(tx);
        let producer = tokio::spawn(async { RunSummary::default() });
        ResultStream::new(RunId::from_string("run-1"), rx, producer, include_metadata)
    }

    fn climax() -> HighlightDescriptor {
        HighlightDescriptor::new("Climax", 0.99, 40.0, 55.0)
    }

    #[tokio::test]
    async fn test_next_record_with_metadata() {
        let ok = CroppedResult::succeeded(climax(), CroppedVideo::new("https://cdn/c.mp4"));
        let failed = CroppedResult::failed(
            HighlightDescriptor::new("Intro", 0.9, 0.0, 10.0),
            CropFailure::new(CropFailureKind::Remote, "no subject"),
        );
        let mut stream = stream_with(vec![Ok(ok), Ok(failed)], true);

        match stream.next_record().await.unwrap().unwrap() {
            OutputRecord::Highlight { title, score, video, .. } => {
                assert_eq!(title, "Climax");
                assert_eq!(score, 0.99);
                assert_eq!(video.location, "https://cdn/c.mp4");
            }
            other => panic!("unexpected record: {:?}", other),
        }

        let err = stream.next_record().await.unwrap().unwrap_err();
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("Intro"));

        assert!(stream.next_record().await.is_none());
    }

    #[tokio::test]
    async fn test_next_record_bare_video() {
        let ok = CroppedResult::succeeded(climax(), CroppedVideo::new("c.mp4"));
        let mut stream = stream_with(vec![Ok(ok)], false);

        let record = stream.next_record().await.unwrap().unwrap();
        assert_eq!(record, OutputRecord::Video(CroppedVideo::new("c.mp4")));
    }

    #[tokio::test]
    async fn test_fatal_error_passes_through() {
        let mut stream = stream_with(vec![Err(PipelineError::HighlightsMissing)], false);

        let err = stream.next_record().await.unwrap().unwrap_err();
        assert!(err.is_fatal());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_impl_yields_all_items() {
        let items = vec![
            Ok(CroppedResult::succeeded(climax(), CroppedVideo::new("a"))),
            Ok(CroppedResult::succeeded(climax(), CroppedVideo::new("b"))),
        ];
        let collected: Vec<RunItem> = stream_with(items, false).collect().await;
        assert_eq!(collected.len(), 2);
    }

    #[tokio::test]
    async fn test_abandon_returns_summary() {
        let stream = stream_with(Vec::new(), false);
        assert_eq!(stream.abandon().await, Some(RunSummary::default()));
    }
}
