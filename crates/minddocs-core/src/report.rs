//! PDF export of summary and translation results.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{BuiltinFont, Mm, PdfDocument};
use tracing::info;

use crate::api::SummaryResult;
use crate::error::{ApiError, Result};
use crate::forms::{summary_details, Translation};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const LINE_HEIGHT: f32 = 6.0;
const FONT_SIZE: f32 = 12.0;
const TITLE_SIZE: f32 = 14.0;

/// Characters per line at 12pt Helvetica inside the margins.
pub const WRAP_COLUMNS: usize = 85;

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub body: String,
    pub file_name: String,
}

impl Report {
    pub fn from_summary(result: &SummaryResult) -> Self {
        let mut body = result.summary.trim().to_string();
        body.push_str("\n\n");
        for (label, value) in summary_details(result) {
            body.push_str(&format!("{}: {}\n", label, value));
        }
        Self {
            title: format!("Summary of: {}", result.doc_name),
            body,
            file_name: format!("{}_Summary.pdf", file_stem(&result.doc_name)),
        }
    }

    pub fn from_translation(translation: &Translation) -> Self {
        Self {
            title: format!("Translation of: {}", translation.doc_name),
            body: translation.text.clone(),
            file_name: format!(
                "{}_{}_Translation.pdf",
                file_stem(&translation.doc_name),
                file_stem(&translation.language)
            ),
        }
    }

    /// Lay the report out on A4 pages and return the PDF bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let (doc, page, layer) =
            PdfDocument::new(&self.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ApiError::Report(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ApiError::Report(e.to_string()))?;

        let mut current = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT - MARGIN;
        current.use_text(encodable(&self.title), TITLE_SIZE, Mm(MARGIN), Mm(y), &bold);
        y -= LINE_HEIGHT * 2.0;

        for line in wrap_text(&self.body, WRAP_COLUMNS) {
            if y < MARGIN {
                let (next_page, next_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
                current = doc.get_page(next_page).get_layer(next_layer);
                y = PAGE_HEIGHT - MARGIN;
            }
            if !line.is_empty() {
                current.use_text(encodable(&line), FONT_SIZE, Mm(MARGIN), Mm(y), &font);
            }
            y -= LINE_HEIGHT;
        }

        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer)
            .map_err(|e| ApiError::Report(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| ApiError::Report(e.to_string()))
    }

    /// Write the report into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, self.to_bytes()?)?;
        info!(path = %path.display(), "report exported");
        Ok(path)
    }
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

/// The built-in fonts only cover printable ASCII reliably.
fn encodable(text: &str) -> String {
    text.chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '?' })
        .collect()
}

/// Greedy word wrap. Paragraph breaks are kept, words longer than `width`
/// are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            if line_len > 0 && line_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line_len += word.len();
            line.extend(word);
        }

        lines.push(line);
    }

    lines
}
