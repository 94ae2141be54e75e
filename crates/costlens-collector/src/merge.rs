//! Fan-in merging of independently produced streams.
//!
//! [`FanIn::merge`] spawns one forwarding task per input and a barrier task
//! that owns the original output sender. Forwarders hold clones; the barrier
//! joins every forwarder before dropping its sender, so the merged output
//! closes exactly once, after the last input is done.
//!
//! Items from one input keep their relative order. Nothing is promised about
//! the interleaving of different inputs.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, trace};

use crate::error::{CollectError, CollectResult};

/// A forwarding task that did not finish normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeFault {
    pub message: String,
    pub panicked: bool,
}

/// What the barrier observed once every forwarder was joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub inputs: usize,
    /// Items forwarded by forwarders that finished normally.
    pub forwarded: usize,
    pub faults: Vec<MergeFault>,
}

impl MergeSummary {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Merged view over N input channels.
pub struct FanIn<T> {
    output: mpsc::Receiver<T>,
    barrier: Option<JoinHandle<MergeSummary>>,
}

impl<T: Send + 'static> FanIn<T> {
    /// Merge `inputs` into one bounded output of `capacity` (at least 1).
    ///
    /// Must be called from within a tokio runtime.
    pub fn merge(
        inputs: Vec<mpsc::Receiver<T>>,
        capacity: usize,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, output) = mpsc::channel(capacity.max(1));
        let input_count = inputs.len();

        let mut forwarders = JoinSet::new();
        for (index, input) in inputs.into_iter().enumerate() {
            forwarders.spawn(forward(index, input, tx.clone(), cancel.clone()));
        }

        let barrier = tokio::spawn(async move {
            let mut summary = MergeSummary {
                inputs: input_count,
                ..Default::default()
            };
            while let Some(joined) = forwarders.join_next().await {
                match joined {
                    Ok(forwarded) => summary.forwarded += forwarded,
                    Err(e) => {
                        error!(error = %e, panicked = e.is_panic(), "Fan-in forwarder failed");
                        summary.faults.push(MergeFault {
                            message: e.to_string(),
                            panicked: e.is_panic(),
                        });
                    }
                }
            }
            // Last sender: the merged output closes here.
            drop(tx);
            summary
        });

        Self {
            output,
            barrier: Some(barrier),
        }
    }
}

impl<T> FanIn<T> {
    /// Receive the next merged item, `None` once every input has closed.
    pub async fn recv(&mut self) -> Option<T> {
        self.output.recv().await
    }

    /// Stop accepting items and wait for the barrier.
    ///
    /// Items not yet received are discarded. Call after [`recv`](Self::recv)
    /// returned `None` to observe a complete merge.
    pub async fn finish(mut self) -> CollectResult<MergeSummary> {
        self.output.close();
        while self.output.recv().await.is_some() {}

        let barrier = match self.barrier.take() {
            Some(barrier) => barrier,
            None => return Ok(MergeSummary::default()),
        };
        barrier
            .await
            .map_err(|e| CollectError::MergeFault(format!("barrier task failed: {e}")))
    }
}

impl<T> Stream for FanIn<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.output.poll_recv(cx)
    }
}

impl<T> Drop for FanIn<T> {
    fn drop(&mut self) {
        // Dropping the barrier's JoinSet aborts any forwarder still running.
        if let Some(barrier) = self.barrier.take() {
            barrier.abort();
        }
    }
}

async fn forward<T>(
    index: usize,
    mut input: mpsc::Receiver<T>,
    output: mpsc::Sender<T>,
    cancel: CancellationToken,
) -> usize {
    let mut forwarded = 0;
    loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            item = input.recv() => item,
        };
        let Some(item) = item else { break };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = output.send(item) => {
                if sent.is_err() {
                    break;
                }
            }
        }
        forwarded += 1;
    }
    trace!(input = index, forwarded, "Forwarder finished");
    forwarded
}
