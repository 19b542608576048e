//! Incremental decoder for chat-completions server-sent events.
//!
//! Bytes arrive in arbitrary slices; a `data:` line can be split across
//! network reads, and so can a multi-byte UTF-8 character. The decoder keeps
//! raw bytes until a full line is available, then turns each line into zero
//! or one [`StreamChunk`]s. Tool-call fragments are accumulated by index and
//! emitted on the final chunk, together with the last usage report seen.
//! Only `[DONE]` or the end of the byte stream finishes decoding.

use serde::Deserialize;
use std::collections::BTreeMap;
use storewise_core::message::MessageToolCall;
use storewise_core::provider::{StreamChunk, Usage};
use tracing::trace;

#[derive(Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    tool_calls: BTreeMap<u32, ToolCallAccumulator>,
    usage: Option<Usage>,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a terminal chunk has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed bytes; returns every chunk completed by them, in order.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamChunk> {
        self.buffer.extend_from_slice(bytes);
        let mut out = Vec::new();

        while !self.finished {
            let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(chunk) = self.decode_line(line.trim_end_matches(['\n', '\r'])) {
                out.push(chunk);
            }
        }
        out
    }

    /// Close the stream. Returns the terminal chunk unless one was already sent.
    pub fn finish(&mut self) -> Option<StreamChunk> {
        if self.finished {
            return None;
        }
        Some(self.terminal())
    }

    fn decode_line(&mut self, line: &str) -> Option<StreamChunk> {
        // blank separators and ":" comments carry nothing
        let data = line.strip_prefix("data:")?.trim();

        if data == "[DONE]" {
            return Some(self.terminal());
        }

        let event: StreamResponse = match serde_json::from_str(data) {
            Ok(e) => e,
            Err(e) => {
                trace!(data = %data, error = %e, "Ignoring unparseable SSE chunk");
                return None;
            }
        };

        // some providers repeat a running total on every chunk
        if let Some(usage) = event.usage {
            self.usage = Some(Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            });
        }

        let choice = event.choices.into_iter().next()?;
        for delta in choice.delta.tool_calls.unwrap_or_default() {
            let acc = self.tool_calls.entry(delta.index).or_default();
            if let Some(id) = delta.id {
                acc.id = id;
            }
            if let Some(function) = delta.function {
                if let Some(name) = function.name {
                    acc.name = name;
                }
                if let Some(args) = function.arguments {
                    acc.arguments.push_str(&args);
                }
            }
        }

        match choice.delta.content {
            Some(text) if !text.is_empty() => Some(StreamChunk {
                content: Some(text),
                tool_calls: Vec::new(),
                done: false,
                usage: None,
            }),
            _ => None,
        }
    }

    fn terminal(&mut self) -> StreamChunk {
        self.finished = true;
        StreamChunk {
            content: None,
            tool_calls: std::mem::take(&mut self.tool_calls)
                .into_values()
                .map(ToolCallAccumulator::into_tool_call)
                .collect(),
            done: true,
            usage: self.usage.take(),
        }
    }
}

#[derive(Default)]
struct ToolCallAccumulator {
    id: String,
    name: String,
    arguments: String,
}

impl ToolCallAccumulator {
    fn into_tool_call(self) -> MessageToolCall {
        MessageToolCall {
            id: self.id,
            name: self.name,
            arguments: self.arguments,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<StreamUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<StreamToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct StreamToolCallDelta {
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<StreamFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(chunks: &[StreamChunk]) -> String {
        chunks.iter().filter_map(|c| c.content.as_deref()).collect()
    }

    #[test]
    fn content_deltas_in_order() {
        let mut decoder = SseDecoder::new();
        let chunks = decoder.push(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Foot traffic \"}}]}\n\n\
              data: {\"choices\":[{\"delta\":{\"content\":\"is up 4%.\"}}]}\n\n\
              data: [DONE]\n\n",
        );
        assert_eq!(text_of(&chunks), "Foot traffic is up 4%.");
        assert!(chunks.last().unwrap().done);
        assert!(decoder.is_finished());
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn line_split_across_reads() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"choices\":[{\"delta\":{\"con").is_empty());
        let chunks = decoder.push(b"tent\":\"hello\"}}]}\n");
        assert_eq!(text_of(&chunks), "hello");
    }

    #[test]
    fn multibyte_char_split_across_reads() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"📈\"}}]}\n";
        let bytes = line.as_bytes();
        let split = line.find('📈').unwrap() + 2;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        let chunks = decoder.push(&bytes[split..]);
        assert_eq!(text_of(&chunks), "📈");
    }

    #[test]
    fn comments_and_garbage_are_skipped() {
        let mut decoder = SseDecoder::new();
        let chunks = decoder.push(b": keep-alive\n\ndata: not json\n\nevent: ping\n");
        assert!(chunks.is_empty());
        assert!(!decoder.is_finished());
    }

    #[test]
    fn tool_call_fragments_assembled_on_done() {
        let mut decoder = SseDecoder::new();
        decoder.push(
            br#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"id":"call_1","function":{"name":"get_state_census_data","arguments":"{\"state_"}}]}}]}
"#,
        );
        decoder.push(
            br#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"function":{"arguments":"code\":\"CA\"}"}}]}}]}
"#,
        );
        let chunks = decoder.push(b"data: [DONE]\n");
        let done = chunks.last().unwrap();
        assert_eq!(done.tool_calls.len(), 1);
        assert_eq!(done.tool_calls[0].id, "call_1");
        assert_eq!(done.tool_calls[0].name, "get_state_census_data");
        assert_eq!(done.tool_calls[0].arguments, r#"{"state_code":"CA"}"#);
    }

    #[test]
    fn usage_on_every_chunk_does_not_end_the_stream() {
        let mut decoder = SseDecoder::new();
        let chunks = decoder.push(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}],\"usage\":{\"prompt_tokens\":10,\"completion_tokens\":1,\"total_tokens\":11}}\n\n\
              data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}],\"usage\":{\"prompt_tokens\":10,\"completion_tokens\":2,\"total_tokens\":12}}\n\n",
        );
        assert_eq!(text_of(&chunks), "Hello world");
        assert!(!decoder.is_finished());

        let chunks = decoder.push(b"data: [DONE]\n\n");
        let done = chunks.last().unwrap();
        assert!(done.done);
        assert_eq!(done.usage.as_ref().unwrap().total_tokens, 12);
    }

    #[test]
    fn trailing_usage_only_chunk_is_reported_on_done() {
        let mut decoder = SseDecoder::new();
        let chunks = decoder.push(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\
              data: {\"choices\":[],\"usage\":{\"prompt_tokens\":10,\"completion_tokens\":5,\"total_tokens\":15}}\n",
        );
        assert_eq!(text_of(&chunks), "late");

        let last = decoder.finish().unwrap();
        assert_eq!(last.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn stream_without_done_is_closed_by_finish() {
        let mut decoder = SseDecoder::new();
        decoder.push(b"data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n");
        let last = decoder.finish().unwrap();
        assert!(last.done);
        assert!(last.content.is_none());
    }
}
