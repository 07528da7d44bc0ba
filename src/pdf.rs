//! PDF text extraction using pdf_oxide.
//!
//! Reads every page in order, joins each page's text items with single
//! spaces, separates pages with a blank line, then flattens all whitespace
//! into single spaces. A page that fails to decode aborts the whole
//! extraction; there is no partial result.

use crate::error::ParseError;
use pdf_oxide::PdfDocument;
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Below this many characters the extracted text is a low-confidence signal.
pub const MIN_CONFIDENT_CHARS: usize = 200;

/// How far into the file the `%PDF-` marker may appear.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Advisory produced when extraction yields very little text.
///
/// This is never an error: callers warn the user and may carry on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShortInputWarning {
    pub characters: usize,
    pub threshold: usize,
}

impl fmt::Display for ShortInputWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PDF text seems very short ({} characters, under {}). Results may be limited.",
            self.characters, self.threshold
        )
    }
}

/// Check extracted text against the low-confidence threshold
pub fn short_input_warning(text: &str) -> Option<ShortInputWarning> {
    let characters = text.chars().count();
    (characters < MIN_CONFIDENT_CHARS).then_some(ShortInputWarning {
        characters,
        threshold: MIN_CONFIDENT_CHARS,
    })
}

/// Extract normalized text from raw PDF bytes
pub fn extract_text(bytes: &[u8]) -> Result<String, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::Open("input is empty".to_string()));
    }
    if !has_pdf_header(bytes) {
        return Err(ParseError::Open("missing %PDF- header".to_string()));
    }

    // pdf_oxide opens documents by path
    let temp_path = std::env::temp_dir().join(format!("pdf_quiz_{}.pdf", uuid::Uuid::new_v4()));
    std::fs::write(&temp_path, bytes)?;

    let result = extract_text_from_path(&temp_path);

    let _ = std::fs::remove_file(&temp_path);

    result
}

/// Extract normalized text from a PDF on disk
pub fn extract_text_from_path(pdf_path: &Path) -> Result<String, ParseError> {
    let mut doc = PdfDocument::open(pdf_path).map_err(|e| ParseError::Open(e.to_string()))?;

    let page_count = doc
        .page_count()
        .map_err(|e| ParseError::PageCount(e.to_string()))?;

    tracing::debug!(pages = page_count, path = %pdf_path.display(), "extracting PDF text");

    let mut pages = Vec::with_capacity(page_count);
    for page_idx in 0..page_count {
        let text = doc.extract_text(page_idx).map_err(|e| ParseError::Page {
            page: page_idx + 1,
            reason: e.to_string(),
        })?;
        pages.push(text);
    }

    Ok(assemble_pages(pages.iter().map(|page| page_items(page))))
}

/// Extract normalized text from base64-encoded PDF content.
/// Used by the relay, where uploads arrive as JSON.
pub fn extract_text_from_base64(base64_content: &str) -> Result<String, ParseError> {
    use base64::Engine;

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(base64_content.trim())
        .map_err(|e| ParseError::Base64(e.to_string()))?;

    extract_text(&bytes)
}

/// Run [`extract_text`] on the blocking pool
pub async fn extract_text_async(bytes: Vec<u8>) -> Result<String, ParseError> {
    tokio::task::spawn_blocking(move || extract_text(&bytes))
        .await
        .map_err(|e| ParseError::Io(std::io::Error::other(e)))?
}

/// Split a page's raw text into its non-empty text items
fn page_items(page_text: &str) -> Vec<&str> {
    page_text
        .lines()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Join items per page with spaces, add a blank line after every page,
/// then normalize.
fn assemble_pages<'a, P>(pages: P) -> String
where
    P: IntoIterator<Item = Vec<&'a str>>,
{
    let mut full_text = String::new();
    for items in pages {
        full_text.push_str(&items.join(" "));
        full_text.push_str("\n\n");
    }
    normalize_whitespace(&full_text)
}

/// Collapse every whitespace run into one space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal PDF with one Helvetica text line per page
    fn build_pdf(page_texts: &[&str]) -> Vec<u8> {
        let page_count = page_texts.len();
        let font_id = 3 + 2 * page_count;
        let kids = (0..page_count)
            .map(|i| format!("{} 0 R", 3 + 2 * i))
            .collect::<Vec<_>>()
            .join(" ");

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_count),
        ];
        for (i, text) in page_texts.iter().enumerate() {
            let content = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {} 0 R >> >> /Contents {} 0 R >>",
                font_id,
                4 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ));
        }
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        ));
        pdf.extend_from_slice(xref.as_bytes());
        pdf
    }

    fn assert_normalized(text: &str) {
        assert_eq!(text, text.trim());
        let chars: Vec<char> = text.chars().collect();
        assert!(chars
            .windows(2)
            .all(|w| !(w[0].is_whitespace() && w[1].is_whitespace())));
    }

    #[test]
    fn test_extract_pages_in_order() {
        let pdf = build_pdf(&["Hello   world", "Second page"]);
        let text = extract_text(&pdf).unwrap();

        assert_normalized(&text);
        assert!(!text.contains('\n'));
        let first = text.find("Hello world").unwrap();
        let second = text.find("Second page").unwrap();
        assert!(first < second, "pages out of order: {text}");
    }

    #[test]
    fn test_extract_from_path_matches_bytes() {
        let pdf = build_pdf(&["Only page"]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, &pdf).unwrap();

        let from_path = extract_text_from_path(file.path()).unwrap();
        assert_eq!(from_path, extract_text(&pdf).unwrap());
        assert!(from_path.contains("Only page"));
    }

    #[tokio::test]
    async fn test_extract_from_base64_and_async() {
        use base64::Engine;

        let pdf = build_pdf(&["Encoded page"]);
        let encoded = base64::engine::general_purpose::STANDARD.encode(&pdf);
        let text = extract_text_from_base64(&encoded).unwrap();
        assert!(text.contains("Encoded page"));
        assert_eq!(extract_text_async(pdf).await.unwrap(), text);
    }

    #[test]
    fn test_truncated_pdf_is_parse_error() {
        assert!(extract_text(b"%PDF-1.4\ngarbage garbage").is_err());
    }

    #[test]
    fn test_normalize_collapses_runs_and_trims() {
        let text = "  Chapter 1\t\tIntro \n\n\nCells   divide.\r\n ";
        assert_eq!(normalize_whitespace(text), "Chapter 1 Intro Cells divide.");
    }

    #[test]
    fn test_normalize_never_leaves_double_whitespace() {
        let samples = ["a\u{00a0} \tb", "\n\n", "", "x  y   z", " \u{2003}lead"];
        for sample in samples {
            let out = normalize_whitespace(sample);
            assert_eq!(out, out.trim());
            let chars: Vec<char> = out.chars().collect();
            assert!(chars
                .windows(2)
                .all(|w| !(w[0].is_whitespace() && w[1].is_whitespace())));
        }
    }

    #[test]
    fn test_page_items_skip_empty_lines() {
        let items = page_items("Title\n\n   \n  body text  \n");
        assert_eq!(items, vec!["Title", "body text"]);
    }

    #[test]
    fn test_assemble_pages_in_order() {
        let pages = vec![vec!["Page", "one"], vec![], vec!["Page", "three"]];
        assert_eq!(assemble_pages(pages), "Page one Page three");
    }

    #[test]
    fn test_assemble_zero_pages_is_empty() {
        assert_eq!(assemble_pages(Vec::<Vec<&str>>::new()), "");
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(matches!(extract_text(&[]), Err(ParseError::Open(_))));
    }

    #[test]
    fn test_non_pdf_bytes_are_parse_error() {
        let err = extract_text(b"just some plain text, definitely not a PDF").unwrap_err();
        assert!(matches!(err, ParseError::Open(_)));
    }

    #[test]
    fn test_bad_base64_is_parse_error() {
        let err = extract_text_from_base64("***not base64***").unwrap_err();
        assert!(matches!(err, ParseError::Base64(_)));
    }

    #[test]
    fn test_short_input_warning_threshold() {
        let short = "a".repeat(MIN_CONFIDENT_CHARS - 1);
        let warning = short_input_warning(&short).unwrap();
        assert_eq!(warning.characters, MIN_CONFIDENT_CHARS - 1);
        assert!(warning.to_string().contains("very short"));

        let enough = "a".repeat(MIN_CONFIDENT_CHARS);
        assert!(short_input_warning(&enough).is_none());
    }
}
