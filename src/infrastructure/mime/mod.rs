// ============================================================
// MIME DETECTION
// ============================================================
// Magic-byte sniffing plus a charset check for text content

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::error::{FileError, Result};

/// Bytes inspected when sniffing; enough for every `infer` matcher and a
/// reliable text/binary call on ordinary files.
const SNIFF_LEN: u64 = 64 * 1024;

const OCTET_STREAM: &str = "application/octet-stream";

/// Produces `<type>/<subtype>; charset=<encoding>` strings for files on disk.
pub struct MimeDetector {
    matcher: infer::Infer,
}

impl Default for MimeDetector {
    fn default() -> Self {
        Self {
            matcher: infer::Infer::new(),
        }
    }
}

impl MimeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detect the composite mime string of the file at `path`.
    pub fn detect_file(&self, path: &Path) -> Result<String> {
        let mut file = File::open(path)
            .map_err(|e| FileError::io(path, format!("File info could not open the resource: {e}")))?;

        let mut buffer = Vec::new();
        file.by_ref()
            .take(SNIFF_LEN)
            .read_to_end(&mut buffer)
            .map_err(|e| FileError::io(path, format!("File info could not read the resource: {e}")))?;

        Ok(self.detect_bytes(&buffer))
    }

    pub fn detect_bytes(&self, bytes: &[u8]) -> String {
        if bytes.is_empty() {
            return "inode/x-empty; charset=binary".to_string();
        }

        if let Some(kind) = self.matcher.get(bytes) {
            let charset = match kind.matcher_type() {
                infer::MatcherType::Text => detect_charset(bytes).unwrap_or("binary"),
                _ => "binary",
            };
            return format!("{}; charset={}", kind.mime_type(), charset);
        }

        match detect_charset(bytes) {
            Some(charset) => format!("text/plain; charset={}", charset),
            None => format!("{}; charset=binary", OCTET_STREAM),
        }
    }
}

/// Charset of a text sample, or `None` if the bytes look binary.
///
/// A sample cut in the middle of a multi-byte sequence still counts as UTF-8.
fn detect_charset(bytes: &[u8]) -> Option<&'static str> {
    if bytes.iter().any(|&b| is_binary_control_char(b)) {
        return None;
    }

    if bytes.is_ascii() {
        return Some("us-ascii");
    }

    match std::str::from_utf8(bytes) {
        Ok(_) => Some("utf-8"),
        Err(e) if e.error_len().is_none() => Some("utf-8"),
        Err(_) => Some("iso-8859-1"),
    }
}

/// Control bytes that never show up in text. Tab, line feed, form feed,
/// carriage return and escape are allowed.
#[inline]
fn is_binary_control_char(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F | 0x7F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_text() {
        let detector = MimeDetector::new();
        assert_eq!(
            detector.detect_bytes(b"a,b,c\n1,2,3\n"),
            "text/plain; charset=us-ascii"
        );
    }

    #[test]
    fn test_utf8_text() {
        let detector = MimeDetector::new();
        assert_eq!(
            detector.detect_bytes("año,ciudad\n".as_bytes()),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_truncated_utf8_sample_is_still_utf8() {
        let bytes = "ñ".as_bytes();
        assert_eq!(detect_charset(&bytes[..1]), Some("utf-8"));
    }

    #[test]
    fn test_latin1_text() {
        let detector = MimeDetector::new();
        // "año" in ISO-8859-1
        assert_eq!(
            detector.detect_bytes(&[b'a', 0xF1, b'o', b'\n']),
            "text/plain; charset=iso-8859-1"
        );
    }

    #[test]
    fn test_png_magic() {
        let detector = MimeDetector::new();
        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        assert_eq!(
            detector.detect_bytes(&png_header),
            "image/png; charset=binary"
        );
    }

    #[test]
    fn test_binary_and_empty() {
        let detector = MimeDetector::new();
        assert_eq!(
            detector.detect_bytes(&[0x00, 0x01, 0x02, 0x03]),
            "application/octet-stream; charset=binary"
        );
        assert_eq!(detector.detect_bytes(&[]), "inode/x-empty; charset=binary");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let detector = MimeDetector::new();
        let err = detector
            .detect_file(Path::new("/definitely/not/here.bin"))
            .unwrap_err();
        assert!(matches!(err, FileError::Io { .. }));
    }
}
