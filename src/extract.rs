//! Plain-text extraction for uploaded files.
//!
//! Output keeps paragraph structure: paragraphs are separated by blank
//! lines so the chunker can pack them on real boundaries.
//!
//! | Extension | Source of text |
//! |-----------|----------------|
//! | `txt`, `md`, `markdown`, `csv`, `json`, `log` | file bytes (lossy UTF-8, `\r\n` → `\n`) |
//! | `pdf` | `pdf-extract` |
//! | `docx` | `word/document.xml`, one paragraph per `<w:p>` |
//! | `pptx` | `ppt/slides/slideN.xml` in slide order, one block per slide |

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use thiserror::Error;

/// Upper bound on bytes read from one zip entry (zip-bomb guard).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

const DOCX_BODY: &str = "word/document.xml";
const PPTX_SLIDE_PREFIX: &str = "ppt/slides/slide";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("OOXML extraction failed: {0}")]
    Ooxml(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Docx,
    Pptx,
}

impl FileKind {
    /// Detect the kind from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "md" | "markdown" | "csv" | "json" | "log" => Some(FileKind::Text),
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            "pptx" => Some(FileKind::Pptx),
            _ => None,
        }
    }
}

/// A file read from disk and reduced to text.
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub file_name: String,
    /// Lower-cased extension, e.g. `"docx"`.
    pub file_type: String,
    pub file_size: u64,
    pub content: String,
}

pub fn extract_file(path: &Path) -> Result<ExtractedFile, ExtractError> {
    let kind = FileKind::from_path(path)
        .ok_or_else(|| ExtractError::Unsupported(path.display().to_string()))?;
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let content = extract_bytes(&bytes, kind)?;
    Ok(ExtractedFile {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        file_type: path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default(),
        file_size: bytes.len() as u64,
        content,
    })
}

pub fn extract_bytes(bytes: &[u8], kind: FileKind) -> Result<String, ExtractError> {
    match kind {
        // Windows line endings would hide blank-line paragraph breaks.
        FileKind::Text => Ok(String::from_utf8_lossy(bytes).replace("\r\n", "\n")),
        FileKind::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
        }
        FileKind::Docx => extract_docx(bytes),
        FileKind::Pptx => extract_pptx(bytes),
    }
}

type Archive<'a> = zip::ZipArchive<std::io::Cursor<&'a [u8]>>;

fn open_archive(bytes: &[u8]) -> Result<Archive<'_>, ExtractError> {
    zip::ZipArchive::new(std::io::Cursor::new(bytes)).map_err(|e| ExtractError::Ooxml(e.to_string()))
}

fn read_entry(archive: &mut Archive<'_>, name: &str) -> Result<Vec<u8>, ExtractError> {
    let entry = archive
        .by_name(name)
        .map_err(|e| ExtractError::Ooxml(format!("{}: {}", name, e)))?;
    let mut out = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Ooxml(format!(
            "{} exceeds size limit ({} bytes)",
            name, MAX_XML_ENTRY_BYTES
        )));
    }
    Ok(out)
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = open_archive(bytes)?;
    let xml = read_entry(&mut archive, DOCX_BODY)?;
    Ok(xml_paragraphs(&xml)?.join("\n\n"))
}

fn extract_pptx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = open_archive(bytes)?;
    let mut slides: Vec<(u32, String)> = archive
        .file_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix(PPTX_SLIDE_PREFIX)?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    slides.sort();

    let mut blocks = Vec::new();
    for (_, name) in slides {
        let xml = read_entry(&mut archive, &name)?;
        let lines = xml_paragraphs(&xml)?;
        if !lines.is_empty() {
            blocks.push(lines.join("\n"));
        }
    }
    Ok(blocks.join("\n\n"))
}

/// Text of every `<*:p>` element, built from its `<*:t>` runs.
///
/// Works for both WordprocessingML (`w:p`/`w:t`) and DrawingML
/// (`a:p`/`a:t`) since only local names are compared.
fn xml_paragraphs(xml: &[u8]) -> Result<Vec<String>, ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::Text(te)) if in_text => {
                let text = te
                    .unescape()
                    .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    let paragraph = current.trim();
                    if !paragraph.is_empty() {
                        paragraphs.push(paragraph.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}
