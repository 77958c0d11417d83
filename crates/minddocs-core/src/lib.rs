pub mod api;
pub mod chat;
pub mod config;
pub mod directory;
pub mod error;
pub mod forms;
pub mod report;
pub mod routes;
pub mod session;
pub mod storage;
pub mod transcript;

// Re-export main types for convenience
pub use api::{ApiClient, DocumentRef, HistoryEntry, SummaryResult, TranslationResult};
pub use chat::{ChatController, ChatEvent, ChatMode, ChatPhase};
pub use config::Config;
pub use directory::{DocumentDirectory, Listing};
pub use error::{ApiError, Result};
pub use report::Report;
pub use routes::{guard, GuardDecision, NavLink, Route, SplashTimer};
pub use session::{Session, Theme, TokenStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use transcript::{Entry, Sender, Transcript};
