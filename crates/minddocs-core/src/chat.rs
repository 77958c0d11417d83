//! Chat controller: document selection, mode, transcript and the
//! per-submission state machine.
//!
//! ```text
//! Idle -> Sending -> Streaming -> (Done | Failed) -> Idle
//! ```
//!
//! The controller never touches the network. [`ChatController::submit`] and
//! [`ChatController::select`] hand back plain request descriptions; the
//! caller runs them (see [`spawn_submission`] and [`spawn_history`]) and
//! feeds the resulting [`ChatEvent`]s into [`ChatController::apply`]. Every
//! request carries a ticket, and events with a ticket that is no longer
//! current are dropped, so a late answer for a previous selection can never
//! land in the transcript of the current one.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{ApiClient, HistoryEntry};
use crate::error::{ApiError, Result};
use crate::transcript::{InFlightReply, Transcript};

pub const MISSING_INPUT: &str = "Please enter a question and select a document.";
pub const REPLY_FAILED: &str = "Chatbot failed to respond.";
pub const STREAM_FAILED: &str = "The streamed reply was interrupted.";
pub const BUSY: &str = "Wait for the current reply to finish.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    /// One request per question, any number of documents, saved history
    /// shown for a single selected document.
    #[default]
    History,
    /// Incremental reply for exactly one document.
    Streaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    Sending,
    Streaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The event belonged to an abandoned request.
    Stale,
    Updated,
    Finished(StreamOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionTarget {
    Stream { doc_name: String },
    Reply { doc_names: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: u64,
    pub question: String,
    pub target: SubmissionTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub ticket: u64,
    pub doc_name: String,
}

#[derive(Debug)]
pub enum ChatEvent {
    History {
        ticket: u64,
        result: Result<Vec<HistoryEntry>>,
    },
    Chunk {
        ticket: u64,
        text: String,
    },
    StreamEnded {
        ticket: u64,
    },
    StreamFailed {
        ticket: u64,
        error: ApiError,
    },
    Reply {
        ticket: u64,
        result: Result<String>,
    },
}

#[derive(Debug, Default)]
pub struct ChatController {
    mode: ChatMode,
    selection: Vec<String>,
    transcript: Transcript,
    in_flight: Option<InFlightReply>,
    active_ticket: Option<u64>,
    history_ticket: Option<u64>,
    sending: bool,
    next_ticket: u64,
    error: Option<String>,
}

impl ChatController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn is_selected(&self, doc_name: &str) -> bool {
        self.selection.iter().any(|d| d == doc_name)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn phase(&self) -> ChatPhase {
        match (&self.active_ticket, &self.in_flight) {
            (None, _) => ChatPhase::Idle,
            (Some(_), Some(reply)) if reply.chunks_received() > 0 => ChatPhase::Streaming,
            (Some(_), _) if self.sending => ChatPhase::Sending,
            (Some(_), _) => ChatPhase::Idle,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active_ticket.is_some()
    }

    pub fn is_loading_history(&self) -> bool {
        self.history_ticket.is_some()
    }

    /// Replace the selection. The transcript always follows the selection:
    /// it is cleared here and, in history mode with a single document, a
    /// history fetch is requested to refill it.
    pub fn select(&mut self, mut doc_names: Vec<String>) -> Option<HistoryRequest> {
        if self.mode == ChatMode::Streaming {
            doc_names.truncate(1);
        }
        self.selection = doc_names;
        self.reset_conversation();
        self.history_request()
    }

    /// Picker helper: in history mode the document is added or removed,
    /// in streaming mode it becomes the only selection.
    pub fn toggle_document(&mut self, doc_name: &str) -> Option<HistoryRequest> {
        let mut next = self.selection.clone();
        match self.mode {
            ChatMode::History => {
                if let Some(pos) = next.iter().position(|d| d == doc_name) {
                    next.remove(pos);
                } else {
                    next.push(doc_name.to_string());
                }
            }
            ChatMode::Streaming => next = vec![doc_name.to_string()],
        }
        self.select(next)
    }

    /// Switching to streaming keeps only the first selected document and
    /// clears the transcript. Switching back keeps that single document
    /// and reloads its history.
    pub fn set_mode(&mut self, mode: ChatMode) -> Option<HistoryRequest> {
        if mode == self.mode {
            return None;
        }
        self.mode = mode;
        if mode == ChatMode::Streaming {
            self.selection.truncate(1);
        }
        self.reset_conversation();
        self.history_request()
    }

    pub fn toggle_mode(&mut self) -> Option<HistoryRequest> {
        let mode = match self.mode {
            ChatMode::History => ChatMode::Streaming,
            ChatMode::Streaming => ChatMode::History,
        };
        self.set_mode(mode)
    }

    /// Validate and record a question. On success the user's entry is
    /// already in the transcript (plus an empty ai placeholder in streaming
    /// mode) before the caller issues the request.
    pub fn submit(&mut self, question: &str) -> Result<Submission> {
        if self.is_busy() {
            return Err(ApiError::validation(BUSY));
        }
        self.error = None;

        let question = question.trim();
        if question.is_empty() || self.selection.is_empty() {
            self.error = Some(MISSING_INPUT.to_string());
            return Err(ApiError::validation(MISSING_INPUT));
        }

        self.transcript.push_user(question);
        let ticket = self.issue_ticket();
        self.active_ticket = Some(ticket);
        self.sending = true;

        let target = match self.mode {
            ChatMode::Streaming => {
                self.in_flight = Some(self.transcript.begin_reply());
                SubmissionTarget::Stream {
                    doc_name: self.selection[0].clone(),
                }
            }
            ChatMode::History => SubmissionTarget::Reply {
                doc_names: self.selection.clone(),
            },
        };
        debug!(ticket, mode = ?self.mode, "chat submission");

        Ok(Submission {
            ticket,
            question: question.to_string(),
            target,
        })
    }

    pub fn apply(&mut self, event: ChatEvent) -> Applied {
        match event {
            ChatEvent::History { ticket, result } => {
                if self.history_ticket != Some(ticket) {
                    return Applied::Stale;
                }
                self.history_ticket = None;
                match result {
                    Ok(history) => {
                        let offset = self.transcript.prepend_history(&history);
                        if let Some(reply) = self.in_flight.as_mut() {
                            reply.shift(offset);
                        }
                    }
                    Err(e) => warn!(error = %e, "could not load chat history"),
                }
                Applied::Updated
            }
            ChatEvent::Chunk { ticket, text } => {
                if self.active_ticket != Some(ticket) {
                    return Applied::Stale;
                }
                match self.in_flight.as_mut() {
                    Some(reply) => {
                        reply.append_chunk(&mut self.transcript, &text);
                        Applied::Updated
                    }
                    None => Applied::Stale,
                }
            }
            ChatEvent::StreamEnded { ticket } => {
                if self.active_ticket != Some(ticket) {
                    return Applied::Stale;
                }
                if let Some(reply) = self.in_flight.take() {
                    reply.finalize(&mut self.transcript);
                }
                self.finish();
                Applied::Finished(StreamOutcome::Done)
            }
            ChatEvent::StreamFailed { ticket, error } => {
                if self.active_ticket != Some(ticket) {
                    return Applied::Stale;
                }
                warn!(ticket, error = %error, "streamed reply failed");
                // whatever already arrived stays visible
                if let Some(reply) = self.in_flight.take() {
                    reply.finalize(&mut self.transcript);
                }
                self.error = Some(error.banner(STREAM_FAILED));
                self.finish();
                Applied::Finished(StreamOutcome::Failed)
            }
            ChatEvent::Reply { ticket, result } => {
                if self.active_ticket != Some(ticket) {
                    return Applied::Stale;
                }
                let outcome = match result {
                    Ok(reply) => {
                        self.transcript.push_ai(&reply);
                        StreamOutcome::Done
                    }
                    Err(e) => {
                        warn!(ticket, error = %e, "chat request failed");
                        self.error = Some(e.banner(REPLY_FAILED));
                        StreamOutcome::Failed
                    }
                };
                self.finish();
                Applied::Finished(outcome)
            }
        }
    }

    fn finish(&mut self) {
        self.active_ticket = None;
        self.sending = false;
    }

    fn reset_conversation(&mut self) {
        self.transcript.clear();
        self.in_flight = None;
        self.active_ticket = None;
        self.history_ticket = None;
        self.sending = false;
    }

    fn history_request(&mut self) -> Option<HistoryRequest> {
        if self.mode != ChatMode::History || self.selection.len() != 1 {
            return None;
        }
        let ticket = self.issue_ticket();
        self.history_ticket = Some(ticket);
        Some(HistoryRequest {
            ticket,
            doc_name: self.selection[0].clone(),
        })
    }

    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }
}

/// Run a submission to completion, reporting every step through `sink`.
pub async fn run_submission<F>(client: &ApiClient, submission: Submission, sink: &F)
where
    F: Fn(ChatEvent),
{
    let ticket = submission.ticket;
    match submission.target {
        SubmissionTarget::Stream { doc_name } => {
            let mut reply = match client.chat_stream(&submission.question, &doc_name).await {
                Ok(reply) => reply,
                Err(error) => {
                    sink(ChatEvent::StreamFailed { ticket, error });
                    return;
                }
            };
            while let Some(piece) = reply.next_text().await {
                match piece {
                    Ok(text) => sink(ChatEvent::Chunk { ticket, text }),
                    Err(error) => {
                        sink(ChatEvent::StreamFailed { ticket, error });
                        return;
                    }
                }
            }
            sink(ChatEvent::StreamEnded { ticket });
        }
        SubmissionTarget::Reply { doc_names } => {
            let result = client
                .chat(&submission.question, &doc_names)
                .await
                .map(|r| r.reply);
            sink(ChatEvent::Reply { ticket, result });
        }
    }
}

/// Spawn [`run_submission`]. Aborting the handle abandons the request; the
/// connection is released when the task is dropped.
pub fn spawn_submission<F>(client: ApiClient, submission: Submission, sink: F) -> JoinHandle<()>
where
    F: Fn(ChatEvent) + Send + Sync + 'static,
{
    tokio::spawn(async move { run_submission(&client, submission, &sink).await })
}

pub fn spawn_history<F>(client: ApiClient, request: HistoryRequest, sink: F) -> JoinHandle<()>
where
    F: Fn(ChatEvent) + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let result = client.chat_history(&request.doc_name).await;
        sink(ChatEvent::History {
            ticket: request.ticket,
            result,
        });
    })
}
