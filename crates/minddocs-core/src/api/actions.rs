use reqwest::multipart::Form;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::ApiClient;
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    #[serde(default)]
    pub doc_name: String,
    #[serde(default)]
    pub domain: Option<String>,
    pub original_word_count: u64,
    pub summary_word_count: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub compression_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationResult {
    pub translation: String,
    pub doc_name: String,
    #[serde(default)]
    pub domain: Option<String>,
    pub language: String,
    #[serde(default)]
    pub total_chunks: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractResult {
    pub extracted_fields: Value,
    pub doc_name: String,
    #[serde(default)]
    pub domain: Option<String>,
}

impl ExtractResult {
    pub fn pretty_fields(&self) -> String {
        serde_json::to_string_pretty(&self.extracted_fields)
            .unwrap_or_else(|_| self.extracted_fields.to_string())
    }
}

/// The summarizer reports its ratio as a formatted string (`"0.30"`);
/// older deployments send a plain number.
fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Ratio {
        Number(f64),
        Text(String),
    }

    match Ratio::deserialize(deserializer)? {
        Ratio::Number(n) => Ok(n),
        Ratio::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl ApiClient {
    /// `POST /summarize`
    pub async fn summarize(&self, doc_name: &str, ratio: f64) -> Result<SummaryResult> {
        let form = Form::new()
            .text("doc_name", doc_name.to_string())
            .text("ratio", ratio.to_string());
        self.send_json(self.post("/summarize").multipart(form)).await
    }

    /// `POST /translate`. The translation comes back raw, section markers
    /// included.
    pub async fn translate(&self, doc_name: &str, target_language: &str) -> Result<TranslationResult> {
        let form = Form::new()
            .text("doc_name", doc_name.to_string())
            .text("target_language", target_language.to_string());
        self.send_json(self.post("/translate").multipart(form)).await
    }

    /// `POST /extract`
    pub async fn extract(&self, doc_name: &str) -> Result<ExtractResult> {
        let form = Form::new().text("doc_name", doc_name.to_string());
        self.send_json(self.post("/extract").multipart(form)).await
    }
}
