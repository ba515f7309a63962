// ============================================================
// CSV READER
// ============================================================
// Sequential CSV rows over a lazily opened file handle

use csv::{ByteRecord, Reader, ReaderBuilder};
use encoding_rs::{Encoding, UTF_8};
use once_cell::unsync::OnceCell;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, warn};

use super::encoding::{encoding_for_charset, AutoEncoder};
use crate::domain::csv::{CsvConfig, RawRow, Row};
use crate::domain::error::{FileError, Result};
use crate::infrastructure::file::FileHandle;

/// Byte source for the csv parser that opens the handle on first read.
struct LazySource(FileHandle);

impl Read for LazySource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let reader = self
            .0
            .resource()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        reader.read(buf)
    }
}

/// CSV reader with optional header mapping and auto-encoding.
///
/// Records follow RFC 4180: fields may be quoted, quoted fields may hold the
/// delimiter and line breaks, and a doubled quote is a literal quote.
pub struct CsvReader {
    reader: Reader<LazySource>,
    raw_headers: Option<Vec<Vec<u8>>>,
    headers: Option<Vec<String>>,
    row_count: usize,
    headers_enabled: bool,
    auto_encode_enabled: bool,
    target_encoding: &'static Encoding,
    source_encoding: OnceCell<&'static Encoding>,
}

impl CsvReader {
    /// Create a reader with default settings
    pub fn new(handle: FileHandle) -> Result<Self> {
        Self::with_config(handle, &CsvConfig::default())
    }

    /// Open `path` in `rb` mode and wrap it
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(FileHandle::open(path)?)
    }

    pub fn with_config(handle: FileHandle, config: &CsvConfig) -> Result<Self> {
        if !handle.mode().is_readable() {
            return Err(FileError::Unsupported {
                path: handle.path().to_path_buf(),
                message: format!("CSV reader needs a readable handle, got mode '{}'", handle.mode()),
            });
        }
        config.validate().map_err(FileError::Config)?;
        let target_encoding = lookup_target(handle.path(), &config.target_encoding)?;

        // Header handling lives here, not in the parser, so the first record
        // can still be read as data.
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(config.delimiter as u8)
            .quote(config.quote as u8)
            .from_reader(LazySource(handle));

        Ok(Self {
            reader,
            raw_headers: None,
            headers: None,
            row_count: 0,
            headers_enabled: config.headers_enabled,
            auto_encode_enabled: config.auto_encode_enabled,
            target_encoding,
            source_encoding: OnceCell::new(),
        })
    }

    pub fn handle(&self) -> &FileHandle {
        &self.reader.get_ref().0
    }

    /// Mutable access to the handle. Seeking or reading through it moves the
    /// stream under the parser.
    pub fn handle_mut(&mut self) -> &mut FileHandle {
        &mut self.reader.get_mut().0
    }

    pub fn path(&self) -> &Path {
        self.handle().path()
    }

    /// Give back the wrapped handle. Data the parser had buffered is lost.
    pub fn into_inner(self) -> FileHandle {
        self.reader.into_inner().0
    }

    /// Column names from the first record, read once and cached.
    ///
    /// Fails with [`FileError::HeadersAlreadyRead`] if they were never read
    /// and a data row has already been consumed. An empty file has no
    /// headers. With auto-encoding off the names must be UTF-8; see
    /// [`CsvReader::raw_headers`] for the bytes as stored.
    pub fn headers(&mut self) -> Result<&[String]> {
        if self.headers.is_none() {
            self.load_raw_headers()?;
            let raw = self.raw_headers.as_deref().unwrap_or_default();
            let headers = if self.auto_encode_enabled {
                let encoder = self.encoder()?;
                raw.iter()
                    .map(|field| encoder.decode(field).trim_start_matches('\u{FEFF}').to_string())
                    .collect()
            } else {
                self.utf8_fields(raw.iter().map(Vec::as_slice))?
            };
            self.headers = Some(headers);
        }
        Ok(self.headers.as_deref().unwrap_or_default())
    }

    /// Header record exactly as parsed, under the same rules as
    /// [`CsvReader::headers`].
    pub fn raw_headers(&mut self) -> Result<&[Vec<u8>]> {
        self.load_raw_headers()?;
        Ok(self.raw_headers.as_deref().unwrap_or_default())
    }

    /// Header name at `index`
    pub fn header(&mut self, index: usize) -> Result<&str> {
        let path = self.path().to_path_buf();
        let headers = self.headers()?;
        headers
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| FileError::HeaderOutOfRange {
                path,
                index,
                len: headers.len(),
            })
    }

    fn load_raw_headers(&mut self) -> Result<()> {
        if self.raw_headers.is_some() {
            return Ok(());
        }
        if self.row_count > 0 {
            return Err(FileError::HeadersAlreadyRead {
                path: self.path().to_path_buf(),
            });
        }

        let headers: Vec<Vec<u8>> = match self.read_record()? {
            Some(record) => record.iter().map(<[u8]>::to_vec).collect(),
            None => Vec::new(),
        };
        debug!(path = %self.path().display(), count = headers.len(), "Read CSV headers");
        self.raw_headers = Some(headers);
        Ok(())
    }

    /// Next row, or `None` at end of stream.
    ///
    /// With headers enabled the header row is read first if needed, and each
    /// row maps header names to values in header order. When a row and the
    /// headers differ in length the extra entries on the longer side are
    /// dropped.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        if self.headers_enabled {
            self.headers()?;
        }

        let Some(record) = self.read_record()? else {
            return Ok(None);
        };

        let values: Vec<String> = if self.auto_encode_enabled {
            let encoder = self.encoder()?;
            record.iter().map(|field| encoder.encode_field(field)).collect()
        } else {
            self.utf8_fields(record.iter())?
        };

        let row = match &self.headers {
            Some(headers) if self.headers_enabled && !headers.is_empty() => {
                if headers.len() != values.len() {
                    debug!(
                        path = %self.path().display(),
                        line = record.position().map(|p| p.line()).unwrap_or_default(),
                        headers = headers.len(),
                        fields = values.len(),
                        "CSV row length differs from headers"
                    );
                }
                Row::keyed(headers, values)
            }
            _ => Row::Positional(values),
        };

        self.row_count += 1;
        Ok(Some(row))
    }

    /// Next row with every field left as the parsed bytes.
    ///
    /// Header mapping and the row counter work as in [`CsvReader::next_row`];
    /// the auto-encode setting is ignored.
    pub fn next_raw_row(&mut self) -> Result<Option<RawRow>> {
        if self.headers_enabled {
            self.load_raw_headers()?;
        }

        let Some(record) = self.read_record()? else {
            return Ok(None);
        };
        let values: Vec<Vec<u8>> = record.iter().map(<[u8]>::to_vec).collect();

        let row = match &self.raw_headers {
            Some(headers) if self.headers_enabled && !headers.is_empty() => {
                RawRow::keyed(headers, values)
            }
            _ => RawRow::Positional(values),
        };

        self.row_count += 1;
        Ok(Some(row))
    }

    /// Number of rows returned so far.
    pub fn count_lines(&self) -> usize {
        self.row_count
    }

    /// Re-encode one raw value from the file's encoding into the target
    /// encoding and trim it.
    pub fn auto_encode(&self, value: &[u8]) -> Result<String> {
        Ok(self.encoder()?.encode_field(value))
    }

    pub fn headers_enabled(&self) -> bool {
        self.headers_enabled
    }

    pub fn auto_encode_enabled(&self) -> bool {
        self.auto_encode_enabled
    }

    pub fn target_encoding(&self) -> &'static str {
        self.target_encoding.name()
    }

    pub fn enable_headers(&mut self) -> &mut Self {
        self.headers_enabled = true;
        self
    }

    pub fn with_headers(&mut self) -> &mut Self {
        self.enable_headers()
    }

    pub fn disable_headers(&mut self) -> &mut Self {
        self.headers_enabled = false;
        self
    }

    pub fn enable_auto_encode(&mut self) -> &mut Self {
        self.auto_encode_enabled = true;
        self
    }

    pub fn disable_auto_encode(&mut self) -> &mut Self {
        self.auto_encode_enabled = false;
        self
    }

    pub fn set_target_encoding(&mut self, label: &str) -> Result<&mut Self> {
        self.target_encoding = lookup_target(self.path(), label)?;
        Ok(self)
    }

    fn read_record(&mut self) -> Result<Option<ByteRecord>> {
        let mut record = ByteRecord::new();
        match self.reader.read_byte_record(&mut record) {
            Ok(true) => Ok(Some(record)),
            Ok(false) => Ok(None),
            Err(e) => Err(self.map_csv_error(e)),
        }
    }

    fn utf8_fields<'a>(&self, fields: impl Iterator<Item = &'a [u8]>) -> Result<Vec<String>> {
        fields
            .enumerate()
            .map(|(index, field)| {
                String::from_utf8(field.to_vec()).map_err(|e| {
                    FileError::encoding(
                        self.path(),
                        format!(
                            "Field {} is not UTF-8 and auto-encoding is off, use next_raw_row: {e}",
                            index
                        ),
                    )
                })
            })
            .collect()
    }

    fn encoder(&self) -> Result<AutoEncoder> {
        let source = self.source_encoding.get_or_try_init(|| {
            let charset = self.handle().mime_encoding()?;
            Ok::<_, FileError>(match encoding_for_charset(charset) {
                Some(encoding) => encoding,
                None => {
                    warn!(
                        path = %self.path().display(),
                        charset = %charset,
                        "No text encoding detected, decoding as UTF-8"
                    );
                    UTF_8
                }
            })
        })?;
        Ok(AutoEncoder::new(*source, self.target_encoding))
    }

    /// Recover errors raised by the handle itself; everything else is a
    /// malformed record.
    fn map_csv_error(&self, err: csv::Error) -> FileError {
        let position = err.position().map(|p| p.line());
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => match io_err.into_inner() {
                Some(inner) => match inner.downcast::<FileError>() {
                    Ok(file_err) => *file_err,
                    Err(other) => FileError::io(self.path(), other.to_string()),
                },
                None => FileError::io(self.path(), "Could not read the file"),
            },
            kind => {
                let message = match position {
                    Some(line) => format!("line {}: {:?}", line, kind),
                    None => format!("{:?}", kind),
                };
                FileError::csv(self.path(), message)
            }
        }
    }
}

impl Iterator for CsvReader {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

fn lookup_target(path: &Path, label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| FileError::encoding(path, format!("Unknown target encoding '{}'", label)))
}
