//! Streaming response collection.
//!
//! A provider reply is a single-pass channel of fragments. [`ReplyStream`]
//! owns the receiving end for the duration of one query and closes it on
//! every exit path, which tells the producer task to stop.

use tfpilot_core::error::{Error, Result};
use tfpilot_core::provider::{ChunkReceiver, StreamChunk, Usage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Owns a provider's chunk receiver until the reply is fully read.
pub struct ReplyStream {
    receiver: ChunkReceiver,
    usage: Option<Usage>,
}

impl ReplyStream {
    pub fn new(receiver: ChunkReceiver) -> Self {
        Self {
            receiver,
            usage: None,
        }
    }

    /// Usage reported by the provider, if any arrived.
    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }

    /// Read fragments until the reply ends, returning the concatenated text.
    ///
    /// The reply ends when the channel closes or a fragment is flagged
    /// `done` (its content still counts). An `Err` fragment aborts with that
    /// error and no partial text. Firing `cancel` aborts with
    /// [`Error::Cancelled`].
    pub async fn collect(&mut self, cancel: &CancellationToken) -> Result<String> {
        let mut text = String::new();
        let mut fragments = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(fragments, "Reply cancelled mid-stream");
                    return Err(Error::Cancelled);
                }
                next = self.receiver.recv() => next,
            };

            let Some(item) = next else {
                break;
            };
            let chunk = item?;
            fragments += 1;

            let done = self.absorb(chunk, &mut text);
            if done {
                break;
            }
        }

        debug!(fragments, chars = text.len(), "Reply collected");
        Ok(text)
    }

    /// Append a fragment's content; returns whether it was the last one.
    fn absorb(&mut self, chunk: StreamChunk, text: &mut String) -> bool {
        if let Some(content) = chunk.content.filter(|c| !c.is_empty()) {
            text.push_str(&content);
        } else {
            trace!("Metadata-only fragment");
        }
        if chunk.usage.is_some() {
            self.usage = chunk.usage;
        }
        chunk.done
    }
}

impl Drop for ReplyStream {
    fn drop(&mut self) {
        // Producer sends fail from here on, ending its task.
        self.receiver.close();
    }
}
