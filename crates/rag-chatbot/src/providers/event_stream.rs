//! Incremental decoder for `text/event-stream` bodies
//!
//! Network chunks do not respect line boundaries, so partial lines are held
//! back until their newline arrives. Bytes are buffered rather than text so a
//! multi-byte character split across two chunks decodes correctly.

/// Accumulates bytes and yields the payload of each complete `data:` line
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    buffer: Vec<u8>,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a network chunk, returning the `data:` payloads it completed
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(data) = Self::data_payload(&line) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Flush a trailing line that was never newline-terminated
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        Self::data_payload(&line)
    }

    fn data_payload(line: &[u8]) -> Option<String> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\n', '\r']);
        // Comments (":keep-alive"), `event:` and `id:` lines carry no payload
        line.strip_prefix("data:")
            .map(|data| data.strip_prefix(' ').unwrap_or(data).to_string())
    }
}
