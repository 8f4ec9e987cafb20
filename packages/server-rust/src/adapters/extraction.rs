//! Text extraction for uploaded documents.
//!
//! Dispatch by [`FileType`]:
//!
//! | type          | extractor                                    |
//! |---------------|----------------------------------------------|
//! | PDF           | `pdf-extract`, page text in order            |
//! | DOCX / DOC    | `word/document.xml` paragraphs via zip + quick-xml |
//! | TXT           | strict UTF-8 decode                          |
//! | PNG/JPG/GIF/BMP | re-encoded to PNG, then [`OcrEngine`]      |
//!
//! CPU-bound parsing runs on the blocking pool. The result is trimmed.

use std::io::{Cursor, Read};
use std::sync::Arc;

use async_trait::async_trait;
use dts_core::FileType;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use super::{AdapterError, OcrEngine, TextExtractor};

/// Main document part of an OOXML word-processing package.
const DOCX_BODY: &str = "word/document.xml";

pub struct DocumentExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl DocumentExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }
}

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract(&self, file_type: FileType, bytes: &[u8]) -> Result<String, AdapterError> {
        let text = match file_type {
            FileType::Pdf => {
                let owned = bytes.to_vec();
                blocking(file_type, move || {
                    pdf_extract::extract_text_from_mem(&owned)
                        .map_err(|e| AdapterError::extraction(file_type, e))
                })
                .await?
            }
            FileType::Docx | FileType::Doc => {
                let owned = bytes.to_vec();
                blocking(file_type, move || docx_text(file_type, &owned)).await?
            }
            FileType::Txt => std::str::from_utf8(bytes)
                .map_err(|e| AdapterError::extraction(file_type, e))?
                .to_string(),
            FileType::Png | FileType::Jpg | FileType::Gif | FileType::Bmp => {
                let owned = bytes.to_vec();
                let png = blocking(file_type, move || to_png(file_type, &owned)).await?;
                self.ocr.recognize(png).await?
            }
        };

        let text = text.trim().to_string();
        debug!(file_type = %file_type, chars = text.len(), "extracted document text");
        Ok(text)
    }
}

/// Runs `f` on the blocking pool. Panics inside parsers become extraction errors.
async fn blocking<T, F>(file_type: FileType, f: F) -> Result<T, AdapterError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AdapterError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AdapterError::extraction(file_type, format!("parser aborted: {e}")))?
}

// ---------------------------------------------------------------------------
// Office documents
// ---------------------------------------------------------------------------

/// Concatenates the paragraphs of a DOCX package, one per line.
fn docx_text(file_type: FileType, bytes: &[u8]) -> Result<String, AdapterError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| AdapterError::extraction(file_type, format!("not an OOXML package: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| AdapterError::extraction(file_type, format!("{DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| AdapterError::extraction(file_type, e))?;
    paragraphs(&xml).map_err(|e| AdapterError::extraction(file_type, e))
}

fn paragraphs(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => out.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

fn to_png(file_type: FileType, bytes: &[u8]) -> Result<Vec<u8>, AdapterError> {
    let img = image::load_from_memory(bytes).map_err(|e| AdapterError::extraction(file_type, e))?;
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageOutputFormat::Png)
        .map_err(|e| AdapterError::extraction(file_type, e))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use parking_lot::Mutex;

    use super::*;

    struct EchoOcr {
        calls: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl OcrEngine for EchoOcr {
        async fn recognize(&self, png: Vec<u8>) -> Result<String, AdapterError> {
            assert!(png.starts_with(b"\x89PNG"));
            self.calls.lock().push(png.len());
            Ok("  scanned text \n".to_string())
        }
    }

    fn extractor() -> (DocumentExtractor, Arc<EchoOcr>) {
        let ocr = Arc::new(EchoOcr {
            calls: Mutex::new(Vec::new()),
        });
        (DocumentExtractor::new(ocr.clone()), ocr)
    }

    fn docx(body: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            let options = zip::write::FileOptions::default();
            zip.start_file(DOCX_BODY, options).unwrap();
            write!(
                zip,
                r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
            )
            .unwrap();
            zip.finish().unwrap();
        }
        buf.into_inner()
    }

    #[tokio::test]
    async fn plain_text_is_trimmed() {
        let (ex, _) = extractor();
        let text = ex.extract(FileType::Txt, "  hello world\n".as_bytes()).await.unwrap();
        assert_eq!(text, "hello world");
    }

    #[tokio::test]
    async fn invalid_utf8_is_extraction_error() {
        let (ex, _) = extractor();
        let err = ex.extract(FileType::Txt, &[0xff, 0xfe, 0x00]).await.unwrap_err();
        assert!(matches!(err, AdapterError::Extraction { file_type: FileType::Txt, .. }));
    }

    #[tokio::test]
    async fn docx_paragraphs_are_joined_by_newlines() {
        let (ex, _) = extractor();
        let bytes = docx(
            "<w:p><w:r><w:t>First</w:t></w:r><w:r><w:tab/><w:t xml:space=\"preserve\">para &amp; more</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second</w:t></w:r></w:p>",
        );
        let text = ex.extract(FileType::Docx, &bytes).await.unwrap();
        assert_eq!(text, "First\tpara & more\nSecond");
    }

    #[tokio::test]
    async fn legacy_doc_fails_as_extraction_error() {
        let (ex, _) = extractor();
        let ole_header = [0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1, 0, 0, 0, 0];
        let err = ex.extract(FileType::Doc, &ole_header).await.unwrap_err();
        assert!(matches!(err, AdapterError::Extraction { file_type: FileType::Doc, .. }));
    }

    #[tokio::test]
    async fn corrupt_pdf_is_extraction_error() {
        let (ex, _) = extractor();
        let err = ex.extract(FileType::Pdf, b"not a pdf").await.unwrap_err();
        assert!(matches!(err, AdapterError::Extraction { file_type: FileType::Pdf, .. }));
    }

    #[tokio::test]
    async fn images_are_normalized_to_png_for_ocr() {
        let (ex, ocr) = extractor();
        let img = image::DynamicImage::new_rgb8(4, 4);
        let mut bmp = Vec::new();
        img.write_to(&mut Cursor::new(&mut bmp), image::ImageOutputFormat::Bmp)
            .unwrap();

        let text = ex.extract(FileType::Bmp, &bmp).await.unwrap();
        assert_eq!(text, "scanned text");
        assert_eq!(ocr.calls.lock().len(), 1);
    }

    #[tokio::test]
    async fn undecodable_image_never_reaches_ocr() {
        let (ex, ocr) = extractor();
        let err = ex.extract(FileType::Png, b"garbage").await.unwrap_err();
        assert!(matches!(err, AdapterError::Extraction { file_type: FileType::Png, .. }));
        assert!(ocr.calls.lock().is_empty());
    }
}
