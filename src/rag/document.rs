// Document download and text extraction (PDF, DOCX).

use crate::rag::{RagError, RagResult};
use std::io::{Cursor, Read};
use std::time::Duration;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Supported document formats, selected from the URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Sniff the format from a URL. Only the path component is
    /// considered; query strings and fragments (signed download URLs
    /// carry both) never influence the choice, and neither does the
    /// host name.
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = reqwest::Url::parse(url).ok()?;
        let path = parsed.path().to_ascii_lowercase();

        if path.ends_with(".pdf") {
            Some(DocumentKind::Pdf)
        } else if path.ends_with(".docx") {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }
}

/// Download the document into memory.
pub async fn fetch_document(url: &str) -> RagResult<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| RagError::Download(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RagError::Download(e.to_string()))?;

    if !response.status().is_success() {
        return Err(RagError::Download(format!(
            "server returned {} for {}",
            response.status(),
            url
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| RagError::Download(e.to_string()))?;

    Ok(bytes.to_vec())
}

/// Extract raw text from downloaded document bytes.
///
/// Parsing is CPU-bound, so it runs on a blocking worker thread.
pub async fn extract_text(kind: DocumentKind, bytes: Vec<u8>) -> RagResult<String> {
    let text = tokio::task::spawn_blocking(move || match kind {
        DocumentKind::Pdf => extract_pdf(&bytes),
        DocumentKind::Docx => extract_docx(&bytes),
    })
    .await
    .map_err(|e| RagError::Extraction(format!("extraction task failed: {}", e)))??;

    Ok(text)
}

fn extract_pdf(bytes: &[u8]) -> RagResult<String> {
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| RagError::Extraction(format!("pdf parse error: {}", e)))
}

/// Pull paragraph text out of the DOCX archive.
///
/// A DOCX file is a zip containing `word/document.xml`; visible text
/// lives in `<w:t>` elements and paragraphs close with `</w:p>`.
fn extract_docx(bytes: &[u8]) -> RagResult<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| RagError::Extraction(format!("docx archive error: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| RagError::Extraction(format!("docx missing document.xml: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| RagError::Extraction(format!("docx read error: {}", e)))?;

    Ok(document_xml_to_text(&xml))
}

/// Flatten WordprocessingML into plain text, one line per paragraph.
fn document_xml_to_text(xml: &str) -> String {
    let mut out = String::new();

    for segment in xml.split('<') {
        let Some((tag, rest)) = segment.split_once('>') else {
            continue;
        };

        let is_text_run = (tag == "w:t" || tag.starts_with("w:t ")) && !tag.ends_with('/');
        if is_text_run {
            out.push_str(&unescape_xml(rest));
        } else if tag == "/w:p" || tag == "w:br" || tag == "w:br/" || tag.starts_with("w:br ") {
            out.push('\n');
        }
    }

    out.trim_end().to_string()
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
