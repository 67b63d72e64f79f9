//! Frame decoder for the chat event stream.
//!
//! The backend writes one JSON event per line, each prefixed with `data: `,
//! with blank lines between frames. Network chunks split lines (and UTF-8
//! sequences) anywhere, so the decoder works on bytes and only looks at a
//! line once its terminating `\n` has arrived.

use std::collections::VecDeque;

use hh_base::config::constants::FRAME_PREFIX;
use serde::Deserialize;

/// One decoded event from the stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameEvent {
    Start {
        #[serde(default)]
        timestamp: Option<String>,
    },
    Content {
        #[serde(rename = "content")]
        text: String,
    },
    Complete {
        #[serde(default)]
        timestamp: Option<String>,
    },
    Cancelled {
        #[serde(default)]
        message: Option<String>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

enum Line {
    /// Blank separator, comment, or a non-data field
    Skip,
    Event(FrameEvent),
    Malformed(String),
}

fn parse_line(raw: &[u8]) -> Line {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    if raw.is_empty() || raw.starts_with(b":") {
        return Line::Skip;
    }
    let line = match std::str::from_utf8(raw) {
        Ok(s) => s,
        Err(e) => return Line::Malformed(format!("invalid UTF-8: {}", e)),
    };
    let payload = match line.strip_prefix(FRAME_PREFIX).or_else(|| line.strip_prefix("data:")) {
        Some(p) => p,
        None => {
            log::debug!("skipping non-data stream line: {}", line);
            return Line::Skip;
        }
    };
    match serde_json::from_str::<FrameEvent>(payload) {
        Ok(event) => Line::Event(event),
        Err(e) => Line::Malformed(format!("{} in {:?}", e, payload)),
    }
}

/// Incremental decoder. Holds at most one partial line between calls.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    dropped: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns every frame it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<FrameEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        let mut consumed = 0;
        while let Some(pos) = self.buffer[consumed..].iter().position(|&b| b == b'\n') {
            let end = consumed + pos;
            let line = parse_line(&self.buffer[consumed..end]);
            self.collect(line, &mut events);
            consumed = end + 1;
        }
        self.buffer.drain(..consumed);
        events
    }

    /// End of stream: decode a final line that arrived without its newline.
    pub fn finish(&mut self) -> Vec<FrameEvent> {
        let rest = std::mem::take(&mut self.buffer);
        let mut events = Vec::new();
        if !rest.is_empty() {
            self.collect(parse_line(&rest), &mut events);
        }
        events
    }

    fn collect(&mut self, line: Line, events: &mut Vec<FrameEvent>) {
        match line {
            Line::Skip => {}
            Line::Event(event) => events.push(event),
            Line::Malformed(reason) => {
                self.dropped += 1;
                log::warn!("dropping malformed stream frame: {}", reason);
            }
        }
    }

    /// Frames dropped so far because they failed to parse.
    pub fn dropped_frames(&self) -> usize {
        self.dropped
    }
}

/// Lazy iterator of frames over a sequence of raw chunks.
pub struct Frames<I> {
    chunks: I,
    decoder: FrameDecoder,
    ready: VecDeque<FrameEvent>,
    finished: bool,
}

/// Decode `chunks` lazily: a chunk is pulled only when no decoded frame is waiting.
pub fn frames<I>(chunks: I) -> Frames<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    Frames { chunks: chunks.into_iter(), decoder: FrameDecoder::new(), ready: VecDeque::new(), finished: false }
}

impl<I> Frames<I> {
    pub fn dropped_frames(&self) -> usize {
        self.decoder.dropped_frames()
    }
}

impl<I> Iterator for Frames<I>
where
    I: Iterator,
    I::Item: AsRef<[u8]>,
{
    type Item = FrameEvent;

    fn next(&mut self) -> Option<FrameEvent> {
        loop {
            if let Some(event) = self.ready.pop_front() {
                return Some(event);
            }
            if self.finished {
                return None;
            }
            match self.chunks.next() {
                Some(chunk) => self.ready.extend(self.decoder.push(chunk.as_ref())),
                None => {
                    self.finished = true;
                    self.ready.extend(self.decoder.finish());
                }
            }
        }
    }
}
