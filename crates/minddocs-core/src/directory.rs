//! Document Directory: the current user's uploaded documents.
//!
//! Fetched fresh on every page visit, never cached, all-or-nothing.

use tracing::{debug, error};

use crate::api::{ApiClient, DocumentRef};
use crate::error::Result;

/// Which backend listing to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// `/documents/me`, newest first, for the document table.
    Library,
    /// `/chatbot/documents/mydocs`, for the pickers on action pages.
    Actions,
}

#[derive(Clone)]
pub struct DocumentDirectory {
    client: ApiClient,
    listing: Listing,
}

impl DocumentDirectory {
    pub fn new(client: ApiClient, listing: Listing) -> Self {
        Self { client, listing }
    }

    pub fn listing(&self) -> Listing {
        self.listing
    }

    pub async fn list(&self) -> Result<Vec<DocumentRef>> {
        let result = match self.listing {
            Listing::Library => self.client.list_my_documents().await,
            Listing::Actions => self.client.list_chat_documents().await,
        };
        match &result {
            Ok(docs) => debug!(listing = ?self.listing, count = docs.len(), "documents listed"),
            Err(e) => error!(listing = ?self.listing, error = %e, "document listing failed"),
        }
        result
    }
}
