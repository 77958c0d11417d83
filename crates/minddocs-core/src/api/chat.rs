use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::multipart::Form;
use reqwest::Url;
use serde::Deserialize;

use super::ApiClient;
use crate::error::{ApiError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

impl ApiClient {
    /// `GET /chatbot/history/{docName}`, oldest exchange first.
    pub async fn chat_history(&self, doc_name: &str) -> Result<Vec<HistoryEntry>> {
        let path = history_path(doc_name);
        self.send_json(self.get(&path)).await
    }

    /// `POST /chatbot/chat` with every selected document name.
    pub async fn chat(&self, question: &str, doc_names: &[String]) -> Result<ChatReply> {
        let mut form = Form::new().text("question", question.to_string());
        for name in doc_names {
            form = form.text("doc_names", name.clone());
        }
        self.send_json(self.post("/chatbot/chat").multipart(form)).await
    }

    /// `POST /chatbot/chat/stream`. The body is raw text with no framing;
    /// a non-success status is reported here, before any chunk is read.
    pub async fn chat_stream(&self, question: &str, doc_name: &str) -> Result<ReplyStream> {
        let form = Form::new()
            .text("question", question.to_string())
            .text("doc_name", doc_name.to_string());
        let response = self.send(self.post("/chatbot/chat/stream").multipart(form)).await?;
        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ApiError::Stream(e.to_string())));
        Ok(ReplyStream::new(chunks))
    }
}

fn history_path(doc_name: &str) -> String {
    // Only the path is taken from this URL; the host is a placeholder.
    match Url::parse("http://minddocs.invalid/chatbot/history") {
        Ok(mut url) => {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push(doc_name);
            }
            url.path().to_string()
        }
        Err(_) => format!("/chatbot/history/{}", doc_name),
    }
}

type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Decoded text of a streamed reply, in receipt order.
pub struct ReplyStream {
    chunks: ChunkStream,
    decoder: Utf8Decoder,
    finished: bool,
}

impl ReplyStream {
    pub fn new<S>(chunks: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            chunks: Box::pin(chunks),
            decoder: Utf8Decoder::default(),
            finished: false,
        }
    }

    /// Next piece of text; `None` once the transport signals end of input.
    /// A read error is yielded once and ends the stream.
    pub async fn next_text(&mut self) -> Option<Result<String>> {
        while !self.finished {
            match self.chunks.next().await {
                Some(Ok(bytes)) => {
                    let text = self.decoder.push(&bytes);
                    if !text.is_empty() {
                        return Some(Ok(text));
                    }
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    let rest = self.decoder.finish();
                    if !rest.is_empty() {
                        return Some(Ok(rest));
                    }
                }
            }
        }
        None
    }
}

/// Incremental UTF-8 decoding. A multi-byte character split across two
/// chunks is held back until its remaining bytes arrive.
#[derive(Default)]
struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // incomplete sequence at the end: wait for more bytes
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }

        out
    }

    fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}
