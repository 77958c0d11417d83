//! UI-agnostic chat transcript.
//!
//! Entries are read-only from the outside. The only way to change the text
//! of an existing entry is through an [`InFlightReply`], which always writes
//! the whole accumulated reply, so a reader never sees a partial chunk
//! appended twice or a shortened reply.

use serde::{Deserialize, Serialize};

use crate::api::HistoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub sender: Sender,
    pub text: String,
}

impl Entry {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saved question/answer pairs flattened into alternating user/ai entries.
    pub fn from_history(history: &[HistoryEntry]) -> Self {
        let entries = history
            .iter()
            .flat_map(|item| {
                [
                    Entry::new(Sender::User, item.question.clone()),
                    Entry::new(Sender::Ai, item.answer.clone()),
                ]
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub(crate) fn push_user(&mut self, text: &str) {
        self.entries.push(Entry::new(Sender::User, text));
    }

    pub(crate) fn push_ai(&mut self, text: &str) {
        self.entries.push(Entry::new(Sender::Ai, text));
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Put older history in front of whatever is already here. Returns how
    /// many entries were inserted.
    pub(crate) fn prepend_history(&mut self, history: &[HistoryEntry]) -> usize {
        let mut merged = Self::from_history(history).entries;
        let offset = merged.len();
        merged.append(&mut self.entries);
        self.entries = merged;
        offset
    }

    /// Append an empty ai entry and hand back the only writer for it.
    pub(crate) fn begin_reply(&mut self) -> InFlightReply {
        self.entries.push(Entry::new(Sender::Ai, String::new()));
        InFlightReply {
            index: self.entries.len() - 1,
            buffer: String::new(),
            chunks: 0,
        }
    }

    fn overwrite(&mut self, index: usize, text: &str) {
        if let Some(entry) = self.entries.get_mut(index) {
            if entry.sender == Sender::Ai {
                entry.text.clear();
                entry.text.push_str(text);
            }
        }
    }
}

/// The ai entry currently receiving a streamed reply.
#[derive(Debug)]
pub struct InFlightReply {
    index: usize,
    buffer: String,
    chunks: usize,
}

impl InFlightReply {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn chunks_received(&self) -> usize {
        self.chunks
    }

    /// Add a chunk to the buffer, then replace the entry's text with the
    /// full buffer.
    pub fn append_chunk(&mut self, transcript: &mut Transcript, chunk: &str) {
        self.buffer.push_str(chunk);
        self.chunks += 1;
        transcript.overwrite(self.index, &self.buffer);
    }

    /// Freeze the entry at the accumulated text and return it.
    pub fn finalize(self, transcript: &mut Transcript) -> String {
        transcript.overwrite(self.index, &self.buffer);
        self.buffer
    }

    pub(crate) fn shift(&mut self, offset: usize) {
        self.index += offset;
    }
}
