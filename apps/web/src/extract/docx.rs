use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Paragraph-by-paragraph extraction of the main document part.
pub(super) fn extract(path: &Path) -> Result<String, ExtractError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::Docx(e.to_string()))?
        .read_to_string(&mut xml)?;

    Ok(body_paragraphs(&xml)?.join("\n").trim().to_string())
}

/// Text of each top-level body paragraph, in document order.
///
/// Paragraphs inside tables and nested paragraphs (text boxes) are skipped.
/// Within a run, `<w:tab/>` becomes `\t` and `<w:br/>`/`<w:cr/>` become `\n`.
fn body_paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut paragraph_depth = 0usize;
    let mut table_depth = 0usize;
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractError::Docx(e.to_string()))?;
        let collecting = current.is_some() && paragraph_depth == 1;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 && table_depth == 0 {
                        current = Some(String::new());
                    }
                }
                b"w:r" => run_depth += 1,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                let piece = match e.name().as_ref() {
                    b"w:p" if paragraph_depth == 0 && table_depth == 0 => {
                        paragraphs.push(String::new());
                        None
                    }
                    b"w:tab" if run_depth > 0 => Some('\t'),
                    b"w:br" | b"w:cr" if run_depth > 0 => Some('\n'),
                    _ => None,
                };
                if let (Some(c), true) = (piece, collecting) {
                    if let Some(text) = current.as_mut() {
                        text.push(c);
                    }
                }
            }
            Event::Text(t) if in_text && collecting => {
                let unescaped = t.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                if let Some(text) = current.as_mut() {
                    text.push_str(&unescaped);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" => {
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                    if paragraph_depth == 0 {
                        if let Some(text) = current.take() {
                            paragraphs.push(text);
                        }
                    }
                }
                b"w:r" => run_depth = run_depth.saturating_sub(1),
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
