use serde::{Deserialize, Serialize};

/// Parsed form of a `<type>/<subtype>; charset=<encoding>` mime string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeInfo {
    /// The composite string exactly as the detector produced it.
    pub raw: String,
    pub mime_type: String,
    /// Empty when the composite carries no `charset=` parameter.
    pub encoding: String,
}

impl MimeInfo {
    /// Splits on `;` for the type and on `=` inside the second segment for
    /// the encoding. Surrounding whitespace is dropped from both parts.
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw.split(';');
        let mime_type = segments.next().unwrap_or_default().trim().to_string();
        let encoding = segments
            .next()
            .and_then(|param| param.split('=').nth(1))
            .map(|value| value.trim().to_string())
            .unwrap_or_default();

        Self {
            raw: raw.to_string(),
            mime_type,
            encoding,
        }
    }

    pub fn is_text(&self) -> bool {
        self.mime_type.starts_with("text/")
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}
