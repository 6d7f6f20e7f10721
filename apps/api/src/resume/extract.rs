//! Plain-text extraction from uploaded resume documents.

use anyhow::{anyhow, Context, Result};
use docx_rs::{DocumentChild, ParagraphChild, RunChild};

use crate::errors::AppError;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Maps a MIME type to a supported document kind. Parameters such as
    /// `; charset=…` are ignored.
    pub fn from_mime(content_type: &str) -> Result<Self, AppError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            PDF_MIME => Ok(DocumentKind::Pdf),
            DOCX_MIME => Ok(DocumentKind::Docx),
            _ => Err(AppError::UnsupportedMediaType(content_type.to_string())),
        }
    }
}

/// Extracts text on the blocking pool. PDF parsing can panic on malformed
/// input; a panic surfaces here as an error.
pub async fn extract_text(kind: DocumentKind, content: Vec<u8>) -> Result<String> {
    tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => extract_pdf_text(&content),
        DocumentKind::Docx => extract_docx_text(&content),
    })
    .await
    .map_err(|e| anyhow!("Document extraction aborted: {e}"))?
}

pub fn extract_pdf_text(content: &[u8]) -> Result<String> {
    pdf_extract::extract_text_from_mem(content).context("Error extracting text from PDF")
}

/// One line per top-level paragraph.
pub fn extract_docx_text(content: &[u8]) -> Result<String> {
    let docx = docx_rs::read_docx(content).context("Error extracting text from DOCX")?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in &paragraph.children {
                if let ParagraphChild::Run(run) = paragraph_child {
                    for run_child in &run.children {
                        match run_child {
                            RunChild::Text(t) => text.push_str(&t.text),
                            RunChild::Tab(_) => text.push('\t'),
                            _ => {}
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}
