use std::path::PathBuf;

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::ApiClient;
use crate::error::Result;

/// Read-only projection of a document held by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentRef {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub blob_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl DocumentRef {
    /// `name (domain)`, the label used in every document picker.
    pub fn label(&self) -> String {
        match self.domain.as_deref() {
            Some(domain) if !domain.is_empty() => format!("{} ({})", self.name, domain),
            _ => self.name.clone(),
        }
    }

    pub fn uploaded_on(&self) -> &str {
        match self.created_at.as_deref() {
            Some(at) if !at.is_empty() => at,
            _ => "-",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub path: PathBuf,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub uploaded_documents: Vec<Value>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

impl UploadResponse {
    pub fn summary_line(&self) -> String {
        format!(
            "Uploaded {} file(s) as {} ({})",
            self.uploaded_documents.len(),
            self.user.as_deref().unwrap_or("Unknown User"),
            self.domain.as_deref().unwrap_or("Unknown Domain"),
        )
    }
}

impl ApiClient {
    /// `GET /documents/me`: the document table.
    pub async fn list_my_documents(&self) -> Result<Vec<DocumentRef>> {
        self.send_json(self.get("/documents/me")).await
    }

    /// `GET /chatbot/documents/mydocs`: the pickers on action pages.
    pub async fn list_chat_documents(&self) -> Result<Vec<DocumentRef>> {
        self.send_json(self.get("/chatbot/documents/mydocs")).await
    }

    /// `POST /documents/upload`. Files go first as `files` parts carrying
    /// their on-disk names, then one `names` part per file in the same order.
    pub async fn upload_documents(&self, files: &[UploadFile]) -> Result<UploadResponse> {
        let mut form = Form::new();
        for file in files {
            let bytes = tokio::fs::read(&file.path).await?;
            let file_name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document.pdf".to_string());
            let part = Part::bytes(bytes)
                .file_name(file_name)
                .mime_str("application/pdf")?;
            form = form.part("files", part);
        }
        for file in files {
            form = form.text("names", file.name.clone());
        }

        let response: UploadResponse = self
            .send_json(self.post("/documents/upload").multipart(form))
            .await?;
        info!(count = response.uploaded_documents.len(), "documents uploaded");
        Ok(response)
    }
}
