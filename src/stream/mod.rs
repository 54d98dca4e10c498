pub mod sse;
pub mod translator;

pub use sse::{data_payload, done_frame, LineFramer, DONE_FRAME};
pub use translator::{
    step, ChunkDelta, CompletionChunk, FinishReason, ProtocolState, StepOutput, StreamTranslator,
};

use std::pin::Pin;
use std::time::Instant;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use smallvec::SmallVec;

use crate::error::GatewayError;
use crate::observability::log_stream_complete;
use crate::protocol::openai_chat::encoder::encode_chunk_frame;

/// One item of the translated stream. `Done` is always the last item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    Chunk(CompletionChunk),
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Reading,
    Closing,
    Finished,
}

struct PendingChunks {
    chunks: SmallVec<[Option<CompletionChunk>; 4]>,
    head: usize,
}

impl PendingChunks {
    fn new() -> Self {
        Self {
            chunks: SmallVec::new(),
            head: 0,
        }
    }

    #[inline]
    fn pop_front(&mut self) -> Option<CompletionChunk> {
        if self.head >= self.chunks.len() {
            return None;
        }
        let chunk = self.chunks[self.head].take();
        self.head += 1;
        if self.head == self.chunks.len() {
            self.chunks.clear();
            self.head = 0;
        }
        chunk
    }

    #[inline]
    fn extend_from(&mut self, produced: &mut Vec<CompletionChunk>) {
        if produced.is_empty() {
            return;
        }
        self.chunks.reserve(produced.len());
        self.chunks.extend(produced.drain(..).map(Some));
    }

    fn push(&mut self, chunk: CompletionChunk) {
        self.chunks.push(Some(chunk));
    }
}

type BoxedByteStream<E> = Pin<Box<dyn Stream<Item = Result<Bytes, E>> + Send>>;

struct Pipeline<E> {
    upstream: Option<BoxedByteStream<E>>,
    translator: StreamTranslator,
    produced: Vec<CompletionChunk>,
    pending: PendingChunks,
    phase: Phase,
    started: Instant,
}

impl<E> Drop for Pipeline<E> {
    fn drop(&mut self) {
        if self.phase != Phase::Finished {
            tracing::debug!(
                request_id = self.translator.response_id(),
                chunks = self.translator.stats().total(),
                "client went away before the stream finished; upstream released"
            );
        }
    }
}

/// Drive `byte_stream` through `translator`, yielding chunks in upstream order and a
/// final [`StreamItem::Done`].
///
/// The upstream is only polled when the consumer asks for the next item, so a slow
/// client applies backpressure and dropping the returned stream drops the upstream
/// response. A read error becomes one `[Stream Error: ...]` chunk before `Done`.
pub fn translate_stream<S, E>(
    byte_stream: S,
    translator: StreamTranslator,
) -> impl Stream<Item = StreamItem> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let pipeline = Pipeline {
        upstream: Some(Box::pin(byte_stream) as BoxedByteStream<E>),
        translator,
        produced: Vec::with_capacity(8),
        pending: PendingChunks::new(),
        phase: Phase::Reading,
        started: Instant::now(),
    };

    futures_util::stream::unfold(pipeline, |mut pipeline| async move {
        loop {
            if let Some(chunk) = pipeline.pending.pop_front() {
                return Some((StreamItem::Chunk(chunk), pipeline));
            }
            match pipeline.phase {
                Phase::Finished => return None,
                Phase::Closing => {
                    pipeline.phase = Phase::Finished;
                    log_stream_complete(
                        pipeline.translator.response_id(),
                        pipeline.translator.model(),
                        pipeline.translator.stats(),
                        pipeline.started.elapsed(),
                    );
                    return Some((StreamItem::Done, pipeline));
                }
                Phase::Reading => {}
            }

            let next = match pipeline.upstream.as_mut() {
                Some(upstream) => upstream.as_mut().next().await,
                None => None,
            };
            match next {
                Some(Ok(bytes)) => {
                    pipeline
                        .translator
                        .push_bytes(&bytes, &mut pipeline.produced);
                    pipeline.pending.extend_from(&mut pipeline.produced);
                }
                Some(Err(err)) => {
                    let err = GatewayError::Stream(err.to_string());
                    tracing::warn!(
                        request_id = pipeline.translator.response_id(),
                        error = %err,
                        "upstream stream read failed"
                    );
                    let chunk = pipeline.translator.stream_error_chunk(&err);
                    pipeline.pending.push(chunk);
                    pipeline.upstream = None;
                    pipeline.phase = Phase::Closing;
                }
                None => {
                    pipeline.translator.finish_into(&mut pipeline.produced);
                    pipeline.pending.extend_from(&mut pipeline.produced);
                    pipeline.upstream = None;
                    pipeline.phase = Phase::Closing;
                }
            }
        }
    })
}

/// Serialize translated items into OpenAI SSE frames.
pub fn emit_sse<S>(items: S) -> impl Stream<Item = Bytes> + Send + 'static
where
    S: Stream<Item = StreamItem> + Send + 'static,
{
    items.filter_map(|item| {
        let frame = match item {
            StreamItem::Chunk(chunk) => match encode_chunk_frame(&chunk) {
                Ok(frame) => Some(frame),
                Err(err) => {
                    tracing::error!(request_id = %chunk.id, error = %err, "chunk serialization failed");
                    None
                }
            },
            StreamItem::Done => Some(done_frame()),
        };
        std::future::ready(frame)
    })
}
