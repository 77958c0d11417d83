//! Form state, validation and result shaping for the action and account
//! pages. Validation runs before any request is built; a failed check
//! yields `ApiError::Validation` carrying the banner text.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::{RegisterRequest, SummaryResult, TranslationResult, UploadFile, UploadResponse};
use crate::error::{ApiError, Result};

pub const SELECT_FILES: &str = "Please select at least one PDF file.";
pub const NAME_EVERY_FILE: &str = "Each file must have a custom name.";
pub const PDF_ONLY: &str = "Only PDF files can be uploaded.";
pub const UPLOAD_FAILED: &str = "Upload failed. Please check your files and try again.";

pub const SELECT_DOCUMENT: &str = "Please select a document.";
pub const SUMMARY_FAILED: &str = "Unexpected error during summarization.";
pub const SUMMARY_DOCUMENTS_FAILED: &str = "Failed to load your documents. Try re-logging in.";

pub const SELECT_DOCUMENT_AND_LANGUAGE: &str = "Please select both a document and a target language.";
pub const TRANSLATION_FAILED: &str = "Unexpected translation error.";
pub const TRANSLATION_DOCUMENTS_FAILED: &str = "Could not load your documents. Try again.";

pub const SELECT_EXTRACT_DOCUMENT: &str = "Please select a document to extract from.";
pub const EXTRACTION_FAILED: &str = "Unexpected error during extraction.";
pub const EXTRACT_DOCUMENTS_FAILED: &str = "Failed to load user documents.";

pub const CHAT_DOCUMENTS_FAILED: &str = "Failed to load your documents. Please re-login.";

pub const CREDENTIALS_REQUIRED: &str = "Please enter your username and password.";
pub const LOGIN_FAILED: &str = "Invalid credentials or server error.";

pub const REGISTER_FIELDS_REQUIRED: &str = "Please fill all required fields correctly.";
pub const REGISTER_CONFLICT: &str = "Username or email already exists.";
pub const REGISTER_SERVER_ERROR: &str = "Server error. Please try again later.";
pub const REGISTER_FAILED: &str = "Registration failed. Please check your details.";
pub const REGISTER_NETWORK: &str = "Network issue. Please check your connection.";

pub const LANGUAGES: [&str; 7] = ["English", "Hindi", "French", "German", "Spanish", "Chinese", "Arabic"];
pub const DOMAINS: [&str; 4] = ["retail", "medical", "finance", "legal"];

static SECTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--- Section \d+ ---\n?").expect("section marker pattern"));

/// Remove every `--- Section N ---` marker (with the line break after it)
/// from a raw translation and trim the result.
pub fn strip_section_markers(raw: &str) -> String {
    SECTION_MARKER.replace_all(raw, "").trim().to_string()
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Files picked for upload, each with the display name it will be stored
/// under.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadForm {
    files: Vec<PathBuf>,
    names: Vec<String>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The display name starts out as the file's own name.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.files.push(path);
        self.names.push(name);
    }

    pub fn remove_file(&mut self, index: usize) {
        if index < self.files.len() {
            self.files.remove(index);
        }
        if index < self.names.len() {
            self.names.remove(index);
        }
    }

    pub fn set_name(&mut self, index: usize, name: &str) {
        if let Some(slot) = self.names.get_mut(index) {
            *slot = name.to_string();
        }
    }

    pub fn reset(&mut self) {
        self.files.clear();
        self.names.clear();
    }

    pub fn validate(&self) -> Result<Vec<UploadFile>> {
        if self.files.is_empty() {
            return Err(ApiError::validation(SELECT_FILES));
        }
        if self.files.len() != self.names.len() || self.names.iter().any(|n| n.trim().is_empty()) {
            return Err(ApiError::validation(NAME_EVERY_FILE));
        }
        if !self.files.iter().all(|f| is_pdf(f)) {
            return Err(ApiError::validation(PDF_ONLY));
        }

        Ok(self
            .files
            .iter()
            .zip(&self.names)
            .map(|(path, name)| UploadFile {
                path: path.clone(),
                name: name.trim().to_string(),
            })
            .collect())
    }
}

/// Banner after an upload attempt.
pub fn upload_outcome(result: &Result<UploadResponse>) -> std::result::Result<String, String> {
    match result {
        Ok(response) => Ok(response.summary_line()),
        Err(ApiError::Validation(message)) => Err(message.clone()),
        Err(_) => Err(UPLOAD_FAILED.to_string()),
    }
}

const RATIO_MIN: u8 = 5;
const RATIO_MAX: u8 = 95;
const RATIO_STEP: u8 = 5;
const RATIO_DEFAULT: u8 = 30;

/// Summary request. The ratio is kept in whole percent so stepping up and
/// down never accumulates float error.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarizeForm {
    pub document: Option<String>,
    ratio_percent: u8,
}

impl Default for SummarizeForm {
    fn default() -> Self {
        Self {
            document: None,
            ratio_percent: RATIO_DEFAULT,
        }
    }
}

impl SummarizeForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ratio(&self) -> f64 {
        f64::from(self.ratio_percent) / 100.0
    }

    pub fn set_ratio(&mut self, ratio: f64) {
        if !ratio.is_finite() {
            return;
        }
        let percent = (ratio * 100.0).round().clamp(f64::from(RATIO_MIN), f64::from(RATIO_MAX));
        self.ratio_percent = percent as u8;
    }

    pub fn increase_ratio(&mut self) {
        self.ratio_percent = (self.ratio_percent + RATIO_STEP).min(RATIO_MAX);
    }

    pub fn decrease_ratio(&mut self) {
        self.ratio_percent = self.ratio_percent.saturating_sub(RATIO_STEP).max(RATIO_MIN);
    }

    /// Document name and ratio to send.
    pub fn validate(&self) -> Result<(String, f64)> {
        match self.document.as_deref() {
            Some(doc) if !doc.is_empty() => Ok((doc.to_string(), self.ratio())),
            _ => Err(ApiError::validation(SELECT_DOCUMENT)),
        }
    }
}

/// Label/value rows shown under a summary.
pub fn summary_details(result: &SummaryResult) -> Vec<(&'static str, String)> {
    vec![
        ("Document", result.doc_name.clone()),
        ("Domain", result.domain.clone().unwrap_or_else(|| "-".to_string())),
        ("Original words", result.original_word_count.to_string()),
        ("Summary words", result.summary_word_count.to_string()),
        ("Compression ratio", format!("{:.2}", result.compression_ratio)),
    ]
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranslateForm {
    pub document: Option<String>,
    pub language: Option<String>,
}

impl TranslateForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step through [`LANGUAGES`], starting at the first one.
    pub fn next_language(&mut self) {
        let next = match self.language.as_deref() {
            Some(current) => LANGUAGES
                .iter()
                .position(|l| *l == current)
                .map(|i| (i + 1) % LANGUAGES.len())
                .unwrap_or(0),
            None => 0,
        };
        self.language = Some(LANGUAGES[next].to_string());
    }

    pub fn validate(&self) -> Result<(String, String)> {
        match (self.document.as_deref(), self.language.as_deref()) {
            (Some(doc), Some(lang)) if !doc.is_empty() && !lang.is_empty() => {
                Ok((doc.to_string(), lang.to_string()))
            }
            _ => Err(ApiError::validation(SELECT_DOCUMENT_AND_LANGUAGE)),
        }
    }
}

/// Translation ready for display, markers removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub doc_name: String,
    pub language: String,
    pub text: String,
}

impl From<TranslationResult> for Translation {
    fn from(result: TranslationResult) -> Self {
        Self {
            text: strip_section_markers(&result.translation),
            doc_name: result.doc_name,
            language: result.language,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractForm {
    pub document: Option<String>,
}

impl ExtractForm {
    pub fn validate(&self) -> Result<String> {
        match self.document.as_deref() {
            Some(doc) if !doc.is_empty() => Ok(doc.to_string()),
            _ => Err(ApiError::validation(SELECT_EXTRACT_DOCUMENT)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(&str, &str)> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            return Err(ApiError::validation(CREDENTIALS_REQUIRED));
        }
        Ok((username, &self.password))
    }
}

/// Any login failure gets the same banner.
pub fn login_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Validation(message) => message.clone(),
        _ => LOGIN_FAILED.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub domain: String,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            domain: DOMAINS[0].to_string(),
        }
    }
}

impl RegisterForm {
    pub fn next_domain(&mut self) {
        let next = DOMAINS
            .iter()
            .position(|d| *d == self.domain)
            .map(|i| (i + 1) % DOMAINS.len())
            .unwrap_or(0);
        self.domain = DOMAINS[next].to_string();
    }

    pub fn validate(&self) -> Result<RegisterRequest> {
        let username = self.username.trim();
        let email = self.email.trim();
        if username.is_empty()
            || email.is_empty()
            || self.password.is_empty()
            || !DOMAINS.contains(&self.domain.as_str())
        {
            return Err(ApiError::validation(REGISTER_FIELDS_REQUIRED));
        }
        Ok(RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password.clone(),
            domain: self.domain.clone(),
        })
    }
}

pub fn register_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Validation(message) => message.clone(),
        ApiError::Server { status: 400, .. } => REGISTER_FIELDS_REQUIRED.to_string(),
        ApiError::Server { status: 409, .. } => REGISTER_CONFLICT.to_string(),
        ApiError::Server { status, .. } if *status >= 500 => REGISTER_SERVER_ERROR.to_string(),
        ApiError::Server { .. } => REGISTER_FAILED.to_string(),
        _ => REGISTER_NETWORK.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_section_markers() {
        assert_eq!(
            strip_section_markers("--- Section 1 ---\nHello\n--- Section 2 ---\nWorld"),
            "Hello\nWorld"
        );
        assert_eq!(strip_section_markers("  plain text \n"), "plain text");
        assert_eq!(
            strip_section_markers("--- Section 12 ---\nA--- Section 13 ---B"),
            "AB"
        );
    }

    #[test]
    fn test_upload_requires_files() {
        let form = UploadForm::new();
        let err = form.validate().unwrap_err();
        assert_eq!(err.banner(""), SELECT_FILES);
    }

    #[test]
    fn test_upload_names_default_to_file_name() {
        let mut form = UploadForm::new();
        form.add_file("/tmp/report.pdf");
        form.add_file("/tmp/Invoice.PDF");
        assert_eq!(form.names(), &["report.pdf".to_string(), "Invoice.PDF".to_string()]);

        form.set_name(0, "  Q1 Report ");
        let files = form.validate().unwrap();
        assert_eq!(files[0].name, "Q1 Report");
        assert_eq!(files[1].path, PathBuf::from("/tmp/Invoice.PDF"));
    }

    #[test]
    fn test_upload_blank_name_rejected() {
        let mut form = UploadForm::new();
        form.add_file("/tmp/report.pdf");
        form.set_name(0, "   ");
        assert_eq!(form.validate().unwrap_err().banner(""), NAME_EVERY_FILE);
    }

    #[test]
    fn test_upload_non_pdf_rejected() {
        let mut form = UploadForm::new();
        form.add_file("/tmp/notes.txt");
        assert_eq!(form.validate().unwrap_err().banner(""), PDF_ONLY);
    }

    #[test]
    fn test_upload_outcome_banners() {
        let ok: Result<UploadResponse> = Ok(UploadResponse {
            uploaded_documents: vec![serde_json::json!({"id": 1}), serde_json::json!({"id": 2})],
            user: Some("alice".to_string()),
            domain: None,
        });
        assert_eq!(upload_outcome(&ok).unwrap(), "Uploaded 2 file(s) as alice (Unknown Domain)");

        let failed: Result<UploadResponse> = Err(ApiError::Server {
            status: 500,
            detail: Some("disk full".to_string()),
        });
        assert_eq!(upload_outcome(&failed).unwrap_err(), UPLOAD_FAILED);
    }

    #[test]
    fn test_summarize_ratio_steps_and_clamps() {
        let mut form = SummarizeForm::new();
        assert!((form.ratio() - 0.3).abs() < 1e-9);

        for _ in 0..30 {
            form.increase_ratio();
        }
        assert!((form.ratio() - 0.95).abs() < 1e-9);

        for _ in 0..30 {
            form.decrease_ratio();
        }
        assert!((form.ratio() - 0.05).abs() < 1e-9);

        form.set_ratio(0.42);
        assert!((form.ratio() - 0.42).abs() < 1e-9);
        form.set_ratio(2.0);
        assert!((form.ratio() - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_requires_document() {
        let mut form = SummarizeForm::new();
        assert_eq!(form.validate().unwrap_err().banner(""), SELECT_DOCUMENT);
        form.document = Some("Q1 Report".to_string());
        let (doc, ratio) = form.validate().unwrap();
        assert_eq!(doc, "Q1 Report");
        assert!((ratio - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_summary_details_format_ratio() {
        let result = SummaryResult {
            summary: "s".to_string(),
            doc_name: "Q1 Report".to_string(),
            domain: Some("finance".to_string()),
            original_word_count: 400,
            summary_word_count: 120,
            compression_ratio: 0.3,
        };
        let details = summary_details(&result);
        assert_eq!(details[4], ("Compression ratio", "0.30".to_string()));
        assert_eq!(details[2].1, "400");
    }

    #[test]
    fn test_translate_requires_both() {
        let mut form = TranslateForm::new();
        form.document = Some("Q1 Report".to_string());
        assert_eq!(form.validate().unwrap_err().banner(""), SELECT_DOCUMENT_AND_LANGUAGE);

        form.next_language();
        assert_eq!(form.language.as_deref(), Some("English"));
        form.next_language();
        assert_eq!(form.language.as_deref(), Some("Hindi"));
        assert_eq!(form.validate().unwrap(), ("Q1 Report".to_string(), "Hindi".to_string()));
    }

    #[test]
    fn test_language_cycle_wraps() {
        let mut form = TranslateForm::new();
        form.language = Some("Arabic".to_string());
        form.next_language();
        assert_eq!(form.language.as_deref(), Some("English"));
    }

    #[test]
    fn test_translation_is_cleaned() {
        let translation: Translation = TranslationResult {
            translation: "--- Section 1 ---\nBonjour\n".to_string(),
            doc_name: "Q1 Report".to_string(),
            domain: None,
            language: "French".to_string(),
            total_chunks: 1,
        }
        .into();
        assert_eq!(translation.text, "Bonjour");
    }

    #[test]
    fn test_extract_requires_document() {
        let form = ExtractForm::default();
        assert_eq!(form.validate().unwrap_err().banner(""), SELECT_EXTRACT_DOCUMENT);
    }

    #[test]
    fn test_login_validation_and_failure_text() {
        let form = LoginForm {
            username: "alice".to_string(),
            password: String::new(),
        };
        assert_eq!(form.validate().unwrap_err().banner(""), CREDENTIALS_REQUIRED);

        let err = ApiError::Server {
            status: 401,
            detail: Some("Incorrect username or password".to_string()),
        };
        assert_eq!(login_error_message(&err), LOGIN_FAILED);
    }

    #[test]
    fn test_register_defaults_and_domain_cycle() {
        let mut form = RegisterForm::default();
        assert_eq!(form.domain, "retail");
        form.next_domain();
        form.next_domain();
        form.next_domain();
        assert_eq!(form.domain, "legal");
        form.next_domain();
        assert_eq!(form.domain, "retail");
    }

    #[test]
    fn test_register_requires_fields() {
        let mut form = RegisterForm {
            username: "alice".to_string(),
            email: " ".to_string(),
            password: "pw".to_string(),
            ..RegisterForm::default()
        };
        assert_eq!(form.validate().unwrap_err().banner(""), REGISTER_FIELDS_REQUIRED);

        form.email = "alice@example.com".to_string();
        let request = form.validate().unwrap();
        assert_eq!(request.domain, "retail");
        assert_eq!(request.email, "alice@example.com");
    }

    #[test]
    fn test_register_error_mapping() {
        let server = |status| ApiError::Server { status, detail: None };
        assert_eq!(register_error_message(&server(400)), REGISTER_FIELDS_REQUIRED);
        assert_eq!(register_error_message(&server(409)), REGISTER_CONFLICT);
        assert_eq!(register_error_message(&server(500)), REGISTER_SERVER_ERROR);
        assert_eq!(register_error_message(&server(503)), REGISTER_SERVER_ERROR);
        assert_eq!(register_error_message(&server(422)), REGISTER_FAILED);
        assert_eq!(
            register_error_message(&ApiError::Stream("reset".to_string())),
            REGISTER_NETWORK
        );
    }
}
