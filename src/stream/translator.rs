use std::sync::Arc;

use crate::error::GatewayError;
use crate::observability::StreamStats;
use crate::protocol::heck::UpstreamMarker;

use super::sse::{data_payload, LineFramer};

/// Which delta field text fragments are routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolState {
    #[default]
    Normal,
    Reasoning,
}

/// Delta payload of one outbound chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkDelta {
    Content(String),
    Reasoning(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
}

impl FinishReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FinishReason::Stop => "stop",
        }
    }
}

/// One outbound event. Chunks are never revised once emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionChunk {
    pub id: Arc<str>,
    /// The alias the client asked for, not the resolved upstream id.
    pub model: Arc<str>,
    pub created: u64,
    pub delta: ChunkDelta,
    pub finish_reason: Option<FinishReason>,
}

/// What a single marker produces, before it is wrapped into a chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    Content(String),
    Reasoning(String),
    UpstreamError(String),
}

/// Advance the protocol state machine by one marker.
///
/// Pure: the only observable effect of the state is which delta field a text
/// fragment lands in.
#[must_use]
pub fn step(state: ProtocolState, marker: UpstreamMarker) -> (ProtocolState, Option<StepOutput>) {
    match marker {
        UpstreamMarker::ReasonStart => (ProtocolState::Reasoning, None),
        UpstreamMarker::ReasonDone => (ProtocolState::Normal, None),
        UpstreamMarker::AnswerStart
        | UpstreamMarker::AnswerDone
        | UpstreamMarker::RelatedQuestionStart
        | UpstreamMarker::RelatedQuestionDone
        | UpstreamMarker::ErrorSentinel => (state, None),
        UpstreamMarker::ErrorPayload(raw) => (state, Some(StepOutput::UpstreamError(raw))),
        UpstreamMarker::TextFragment(text) => {
            let output = match state {
                ProtocolState::Reasoning => StepOutput::Reasoning(text),
                ProtocolState::Normal => StepOutput::Content(text),
            };
            (state, Some(output))
        }
    }
}

/// Per-response translator from upstream bytes to [`CompletionChunk`]s.
pub struct StreamTranslator {
    state: ProtocolState,
    framer: LineFramer,
    lines: Vec<String>,
    response_id: Arc<str>,
    model: Arc<str>,
    created: u64,
    stats: StreamStats,
}

impl StreamTranslator {
    #[must_use]
    pub fn new(response_id: Arc<str>, model: Arc<str>, created: u64) -> Self {
        Self {
            state: ProtocolState::Normal,
            framer: LineFramer::new(),
            lines: Vec::with_capacity(8),
            response_id,
            model,
            created,
            stats: StreamStats::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    #[must_use]
    pub fn response_id(&self) -> &str {
        &self.response_id
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Consume one read of upstream bytes, appending any chunks it completes.
    pub fn push_bytes(&mut self, bytes: &[u8], out: &mut Vec<CompletionChunk>) {
        let mut lines = std::mem::take(&mut self.lines);
        self.framer.feed_into(bytes, &mut lines);
        for line in lines.drain(..) {
            if let Some(chunk) = self.translate_line(&line) {
                out.push(chunk);
            }
        }
        self.lines = lines;
    }

    /// Process whatever unterminated line is left once the upstream has closed.
    pub fn finish_into(&mut self, out: &mut Vec<CompletionChunk>) {
        if let Some(line) = self.framer.finish() {
            if let Some(chunk) = self.translate_line(&line) {
                out.push(chunk);
            }
        }
    }

    /// Translate one complete line. Non-`data:` lines and structural markers yield `None`.
    pub fn translate_line(&mut self, line: &str) -> Option<CompletionChunk> {
        let marker = UpstreamMarker::decode(data_payload(line)?)?;
        let (next, output) = step(self.state, marker);
        if next != self.state {
            tracing::trace!(from = ?self.state, to = ?next, "protocol state change");
        }
        self.state = next;

        match output? {
            StepOutput::Content(text) => {
                self.stats.content_chunks += 1;
                Some(self.chunk(ChunkDelta::Content(text), None))
            }
            StepOutput::Reasoning(text) => {
                self.stats.reasoning_chunks += 1;
                Some(self.chunk(ChunkDelta::Reasoning(text), None))
            }
            StepOutput::UpstreamError(raw) => {
                tracing::warn!(
                    request_id = %self.response_id,
                    payload = %raw,
                    "upstream reported an error inside the stream"
                );
                self.stats.error_chunks += 1;
                Some(self.chunk(
                    ChunkDelta::Content(format!("\n[Error: {raw}]")),
                    Some(FinishReason::Stop),
                ))
            }
        }
    }

    /// Chunk describing a failure to read the upstream body.
    pub fn stream_error_chunk(&mut self, err: &GatewayError) -> CompletionChunk {
        self.stats.error_chunks += 1;
        self.chunk(
            ChunkDelta::Content(format!("\n[{err}]")),
            Some(FinishReason::Stop),
        )
    }

    fn chunk(&self, delta: ChunkDelta, finish_reason: Option<FinishReason>) -> CompletionChunk {
        CompletionChunk {
            id: Arc::clone(&self.response_id),
            model: Arc::clone(&self.model),
            created: self.created,
            delta,
            finish_reason,
        }
    }
}
