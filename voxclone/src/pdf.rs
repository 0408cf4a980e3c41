// PDF text extraction

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to extract text from PDF: {0}")]
    Extraction(String),

    #[error("No text could be extracted from PDF")]
    NoText,

    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// Check that an uploaded file name looks like a PDF
pub fn is_pdf_filename(name: &str) -> bool {
    name.to_lowercase().ends_with(".pdf")
}

/// Extract the text layer of a PDF held in memory.
///
/// Page breaks (form feeds) are kept in the output; the text cleaner turns
/// them into paragraph breaks. Scanned PDFs without a text layer yield
/// `PdfError::NoText`.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    // pdf-extract panics on some malformed documents
    let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| PdfError::Extraction("malformed PDF".to_string()))?
        .map_err(|e| PdfError::Extraction(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(PdfError::NoText);
    }

    Ok(text)
}

/// Read a local document: PDFs go through extraction, anything else is read as UTF-8 text
pub fn read_document(path: &Path) -> Result<String, PdfError> {
    let is_pdf = path
        .file_name()
        .map(|n| is_pdf_filename(&n.to_string_lossy()))
        .unwrap_or(false);

    if is_pdf {
        let bytes = std::fs::read(path)?;
        extract_text(&bytes)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Build a one-page PDF showing `line` in Helvetica. `line` must not
/// contain parentheses or backslashes.
#[cfg(test)]
pub(crate) fn single_page_pdf(line: &str) -> Vec<u8> {
    let content = format!("BT /F1 24 Tf 72 700 Td ({line}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
    }

    let xref_start = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn squeeze(text: &str) -> String {
        text.split_whitespace().collect()
    }

    #[test]
    fn test_is_pdf_filename() {
        assert!(is_pdf_filename("book.pdf"));
        assert!(is_pdf_filename("BOOK.PDF"));
        assert!(!is_pdf_filename("book.epub"));
        assert!(!is_pdf_filename("pdf"));
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert!(extract_text(b"this is not a pdf").is_err());
        assert!(extract_text(b"").is_err());
    }

    #[test]
    fn test_extract_text_layer() {
        let pdf = single_page_pdf("The quick brown fox jumps over the lazy dog.");
        let text = extract_text(&pdf).unwrap();
        assert_eq!(squeeze(&text), "Thequickbrownfoxjumpsoverthelazydog.");
    }

    #[test]
    fn test_read_document_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("letter.PDF");
        std::fs::write(&path, single_page_pdf("Dear reader.")).unwrap();

        assert_eq!(squeeze(&read_document(&path).unwrap()), "Dearreader.");
    }

    #[test]
    fn test_read_document_plain_text() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.txt");
        std::fs::write(&path, "Plain text body.").unwrap();

        assert_eq!(read_document(&path).unwrap(), "Plain text body.");
    }

    #[test]
    fn test_read_document_missing_file() {
        let result = read_document(Path::new("/nonexistent/voxclone/missing.pdf"));
        assert!(matches!(result, Err(PdfError::Io(_))));
    }
}
