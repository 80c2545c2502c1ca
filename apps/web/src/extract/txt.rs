use std::fs;
use std::path::Path;

use super::ExtractError;

/// Reads the file as UTF-8, falling back to Latin-1 when the bytes are not valid UTF-8.
/// Line endings are normalized to `\n`; the text is otherwise returned as read.
pub(super) fn extract(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path)?;
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => decode_latin1(err.as_bytes()),
    };
    Ok(normalize_newlines(&text))
}

/// Every byte maps to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_txt(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_utf8_text_is_returned_as_read() {
        let file = write_txt("Résumé — Rust engineer\n".as_bytes());
        assert_eq!(extract(file.path()).unwrap(), "Résumé — Rust engineer\n");
    }

    #[test]
    fn test_latin1_fallback() {
        // "Café résumé" encoded as ISO-8859-1
        let file = write_txt(b"Caf\xe9 r\xe9sum\xe9");
        assert_eq!(extract(file.path()).unwrap(), "Café résumé");
    }

    #[test]
    fn test_crlf_is_normalized() {
        let file = write_txt(b"line one\r\nline two\rline three");
        assert_eq!(
            extract(file.path()).unwrap(),
            "line one\nline two\nline three"
        );
    }

    #[test]
    fn test_decode_latin1_covers_high_bytes() {
        assert_eq!(decode_latin1(&[0x41, 0xff, 0x80]), "A\u{ff}\u{80}");
    }
}
