//! Order-preserving bounded-concurrency dispatch.
//!
//! Sentences are spawned as soon as the window has room, so several
//! synthesize+trim operations run in parallel, but results are yielded
//! strictly in spawn order: the head of the pending queue gates everything
//! behind it. Dropping the returned stream aborts every in-flight task.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use futures_core::Stream;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::warn;

use crate::segment::Sentence;
use crate::trim::AudioSegment;

/// A spawned per-sentence task; aborted if dropped before completion so a
/// cancelled pipeline does not leave synthesis requests running.
struct PendingSegment {
    handle: Option<JoinHandle<Option<AudioSegment>>>,
    sequence: u64,
}

impl PendingSegment {
    fn spawn<Fut>(sequence: u64, fut: Fut) -> Self
    where
        Fut: Future<Output = Option<AudioSegment>> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(fut)),
            sequence,
        }
    }

    async fn join(mut self) -> Option<AudioSegment> {
        let handle = self.handle.take()?;
        match handle.await {
            Ok(segment) => segment,
            Err(e) => {
                warn!(sequence = self.sequence, error = %e, "segment task panicked, skipping");
                None
            }
        }
    }
}

impl Drop for PendingSegment {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Run `op` over every sentence with at most `window` operations in flight,
/// yielding completed segments in sentence order. A sentence for which `op`
/// returns `None` is skipped without stalling the rest. `dispatch_delay` is
/// inserted before each spawn to pace requests to the upstream service.
pub fn ordered_dispatch<S, F, Fut>(
    sentences: S,
    window: usize,
    dispatch_delay: Duration,
    mut op: F,
) -> impl Stream<Item = AudioSegment> + Send
where
    S: Stream<Item = Sentence> + Send + 'static,
    F: FnMut(Sentence) -> Fut + Send + 'static,
    Fut: Future<Output = Option<AudioSegment>> + Send + 'static,
{
    let window = window.max(1);
    async_stream::stream! {
        let mut sentences = std::pin::pin!(sentences);
        let mut pending: VecDeque<PendingSegment> = VecDeque::new();

        while let Some(sentence) = sentences.next().await {
            if !dispatch_delay.is_zero() {
                sleep(dispatch_delay).await;
            }
            let sequence = sentence.sequence;
            pending.push_back(PendingSegment::spawn(sequence, op(sentence)));

            // The queue is FIFO by construction, so waiting on the front
            // both enforces the window and preserves output order.
            while pending.len() >= window {
                if let Some(head) = pending.pop_front() {
                    if let Some(segment) = head.join().await {
                        yield segment;
                    }
                }
            }
        }

        while let Some(head) = pending.pop_front() {
            if let Some(segment) = head.join().await {
                yield segment;
            }
        }
    }
}
