use encoding_rs::{Encoding, UTF_8};

const BOM: char = '\u{FEFF}';

const ASCII_LABELS: [&str; 3] = ["us-ascii", "ascii", "ansi_x3.4-1968"];

/// Source encoding for a detected mime charset.
///
/// `binary` and empty charsets have no text encoding and give `None`. ASCII
/// is read as UTF-8, since only a prefix of the file is sniffed and later
/// bytes may be multi-byte UTF-8. Other labels follow the WHATWG table, so
/// `iso-8859-1` resolves to windows-1252.
pub fn encoding_for_charset(charset: &str) -> Option<&'static Encoding> {
    let charset = charset.trim();
    if charset.is_empty() || charset.eq_ignore_ascii_case("binary") {
        return None;
    }
    if ASCII_LABELS.iter().any(|label| charset.eq_ignore_ascii_case(label)) {
        return Some(UTF_8);
    }
    Encoding::for_label(charset.as_bytes())
}

/// Converts raw CSV fields from the file's encoding into the target encoding.
#[derive(Debug, Clone, Copy)]
pub struct AutoEncoder {
    source: &'static Encoding,
    target: &'static Encoding,
}

impl AutoEncoder {
    pub fn new(source: &'static Encoding, target: &'static Encoding) -> Self {
        Self { source, target }
    }

    /// Decode without touching whitespace.
    ///
    /// Malformed sequences become U+FFFD. For a non-UTF-8 target the text is
    /// passed through that encoding, so characters it cannot represent come
    /// back as decimal numeric character references.
    pub fn decode(&self, raw: &[u8]) -> String {
        let (text, _) = self.source.decode_without_bom_handling(raw);

        let target = self.target.output_encoding();
        if target == UTF_8 {
            return text.into_owned();
        }

        let (bytes, _, _) = target.encode(&text);
        let (round_trip, _) = target.decode_without_bom_handling(&bytes);
        round_trip.into_owned()
    }

    /// Decode, drop a leading byte order mark and trim surrounding whitespace.
    pub fn encode_field(&self, raw: &[u8]) -> String {
        let text = self.decode(raw);
        text.trim_start_matches(BOM).trim().to_string()
    }
}
