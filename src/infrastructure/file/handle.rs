// ============================================================
// FILE HANDLE
// ============================================================
// Lazily opened file resource with whole-file helpers

use once_cell::unsync::OnceCell;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::domain::error::{FileError, Result};
use crate::domain::mime::MimeInfo;
use crate::domain::open_mode::OpenMode;
use crate::domain::path_info::PathInfo;
use crate::infrastructure::mime::MimeDetector;

#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Suffix appended to the file stem when duplicating without a target.
const DUPLICATE_SUFFIX: &str = "-2";

/// A file on disk plus the OS resource used to read and write it.
///
/// Nothing is opened at construction. The first read, line read or write
/// opens the file in the stored mode; the resource is released by
/// [`FileHandle::close`] or when the handle is dropped.
#[derive(Debug)]
pub struct FileHandle {
    path: PathBuf,
    mode: OpenMode,
    resource: Option<BufReader<File>>,
    mime: OnceCell<MimeInfo>,
    path_info: OnceCell<PathInfo>,
}

impl FileHandle {
    /// Build a handle over `path`.
    ///
    /// Read modes (`r`, `rb`, `r+`) fail with [`FileError::NotFound`] when the
    /// path does not exist.
    pub fn new(path: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if mode.requires_existing() && !path.exists() {
            return Err(FileError::NotFound { path });
        }

        Ok(Self {
            path,
            mode,
            resource: None,
            mime: OnceCell::new(),
            path_info: OnceCell::new(),
        })
    }

    /// Build a handle with the default `rb` mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(path, OpenMode::default())
    }

    /// Build a handle from an fopen-style mode string such as `"r+b"`.
    pub fn with_mode(path: impl AsRef<Path>, mode: &str) -> Result<Self> {
        let parsed = mode.parse::<OpenMode>().map_err(|message| FileError::Unsupported {
            path: path.as_ref().to_path_buf(),
            message,
        })?;
        Self::new(path, parsed)
    }

    /// Create (or truncate) the file and return a `w` handle already holding
    /// the open resource.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let mut handle = Self::new(path, OpenMode::WRITE)?;
        handle.resource()?;
        Ok(handle)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn is_open(&self) -> bool {
        self.resource.is_some()
    }

    /// The open resource, opening it first if needed.
    pub(crate) fn resource(&mut self) -> Result<&mut BufReader<File>> {
        let reader = match self.resource.take() {
            Some(reader) => reader,
            None => {
                let file = self.mode.to_open_options().open(&self.path).map_err(|e| {
                    FileError::io(&self.path, format!("Could not open the file: {e}"))
                })?;
                debug!(path = %self.path.display(), mode = %self.mode, "Opened file");
                BufReader::new(file)
            }
        };
        Ok(self.resource.insert(reader))
    }

    /// Release the open resource, if any.
    ///
    /// Written data is synced to disk first. The resource is gone after this
    /// call even when the sync fails.
    pub fn close(&mut self) -> Result<()> {
        let Some(reader) = self.resource.take() else {
            return Ok(());
        };

        let file = reader.into_inner();
        if self.mode.is_writable() {
            file.sync_data().map_err(|e| {
                FileError::io(&self.path, format!("Could not close the file: {e}"))
            })?;
        }
        debug!(path = %self.path.display(), "Closed file");
        Ok(())
    }

    /// Read up to `length` bytes from the current position, or the whole file
    /// when `length` is `None`.
    ///
    /// Fewer bytes (possibly none) come back at end of file. Whole-file reads
    /// go straight to disk and leave the open resource and its cursor alone.
    pub fn read(&mut self, length: Option<usize>) -> Result<Vec<u8>> {
        let Some(length) = length else {
            return fs::read(&self.path)
                .map_err(|e| FileError::io(&self.path, format!("Could not read the file: {e}")));
        };

        let path = self.path.clone();
        let reader = self.resource()?;
        let mut buffer = Vec::with_capacity(length.min(64 * 1024));
        reader
            .by_ref()
            .take(length as u64)
            .read_to_end(&mut buffer)
            .map_err(|e| FileError::io(&path, format!("Could not read the file: {e}")))?;
        Ok(buffer)
    }

    /// [`FileHandle::read`] decoded as UTF-8.
    pub fn read_to_string(&mut self, length: Option<usize>) -> Result<String> {
        let bytes = self.read(length)?;
        String::from_utf8(bytes)
            .map_err(|e| FileError::encoding(&self.path, format!("Content is not UTF-8: {e}")))
    }

    /// Next line including its terminator, the trailing partial line at end
    /// of file, or `None` once nothing is left.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let path = self.path.clone();
        let reader = self.resource()?;
        let mut line = Vec::new();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| FileError::io(&path, format!("Could not read the file: {e}")))?;
        if read == 0 {
            return Ok(None);
        }

        String::from_utf8(line)
            .map(Some)
            .map_err(|e| FileError::encoding(&path, format!("Line is not UTF-8: {e}")))
    }

    /// Write `content` at the current position. Returns the bytes written.
    pub fn write(&mut self, content: impl AsRef<[u8]>) -> Result<usize> {
        let content = content.as_ref();
        let path = self.path.clone();
        let reader = self.resource()?;

        // Read-ahead moved the OS cursor past the logical position.
        if !reader.buffer().is_empty() {
            reader
                .seek(SeekFrom::Current(0))
                .map_err(|e| FileError::io(&path, format!("Could not write the file: {e}")))?;
        }

        reader
            .get_mut()
            .write_all(content)
            .map_err(|e| FileError::io(&path, format!("Could not write the file: {e}")))?;
        Ok(content.len())
    }

    /// Write `content` followed by the platform line terminator.
    pub fn write_line(&mut self, content: impl AsRef<[u8]>) -> Result<usize> {
        let mut line = content.as_ref().to_vec();
        line.extend_from_slice(LINE_ENDING.as_bytes());
        self.write(line)
    }

    /// Move the cursor of the open resource back to the start.
    pub fn rewind(&mut self) -> Result<()> {
        let Some(reader) = self.resource.as_mut() else {
            return Err(FileError::io(&self.path, "No open resource to rewind"));
        };
        reader
            .rewind()
            .map_err(|e| FileError::io(&self.path, format!("Could not rewind the file: {e}")))
    }

    /// Release the resource and remove the file.
    ///
    /// `Ok(false)` when there was no file to remove.
    pub fn delete(&mut self) -> Result<bool> {
        self.close()?;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Deleted file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FileError::io(
                &self.path,
                format!("Could not delete the file: {e}"),
            )),
        }
    }

    /// Copy the file to `target` and return an `rb` handle over the copy.
    ///
    /// Without a target the copy lands next to the original as
    /// `<stem>-2.<ext>`.
    pub fn duplicate(&self, target: Option<&Path>) -> Result<FileHandle> {
        let target = match target {
            Some(target) => target.to_path_buf(),
            None => self.path_info().sibling_with_suffix(DUPLICATE_SUFFIX),
        };

        fs::copy(&self.path, &target).map_err(|e| {
            FileError::io(
                &self.path,
                format!("Could not duplicate the file to {}: {e}", target.display()),
            )
        })?;
        info!(
            source = %self.path.display(),
            target = %target.display(),
            "Duplicated file"
        );

        FileHandle::open(target)
    }

    /// Rename the file within its directory. The handle follows the file.
    pub fn rename(&mut self, new_name: &str) -> Result<()> {
        let is_plain_name = Path::new(new_name)
            .file_name()
            .is_some_and(|name| name == new_name);
        if !is_plain_name {
            return Err(FileError::io(
                &self.path,
                format!("Invalid file name '{}'", new_name),
            ));
        }

        let target = self.path.with_file_name(new_name);
        if target.exists() {
            return Err(FileError::io(
                &self.path,
                format!("Could not rename: {} already exists", target.display()),
            ));
        }

        self.close()?;
        fs::rename(&self.path, &target)
            .map_err(|e| FileError::io(&self.path, format!("Could not rename the file: {e}")))?;
        info!(
            from = %self.path.display(),
            to = %target.display(),
            "Renamed file"
        );

        self.path = target;
        self.path_info = OnceCell::new();
        Ok(())
    }

    /// Size of the file on disk in bytes.
    pub fn size(&self) -> Result<u64> {
        fs::metadata(&self.path)
            .map(|meta| meta.len())
            .map_err(|e| FileError::io(&self.path, format!("Could not stat the file: {e}")))
    }

    pub fn path_info(&self) -> &PathInfo {
        self.path_info.get_or_init(|| PathInfo::from_path(&self.path))
    }

    /// Parsed mime data, detected on first use and cached after.
    pub fn mime(&self) -> Result<&MimeInfo> {
        self.mime.get_or_try_init(|| {
            let raw = MimeDetector::new().detect_file(&self.path)?;
            debug!(path = %self.path.display(), mime = %raw, "Detected mime");
            Ok::<_, FileError>(MimeInfo::parse(&raw))
        })
    }

    /// The composite `<type>; charset=<encoding>` string.
    pub fn mime_raw(&self) -> Result<&str> {
        Ok(&self.mime()?.raw)
    }

    pub fn mime_type(&self) -> Result<&str> {
        Ok(&self.mime()?.mime_type)
    }

    pub fn mime_encoding(&self) -> Result<&str> {
        Ok(&self.mime()?.encoding)
    }
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "Failed to close file on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_dir::TestDir;

    #[test]
    fn test_missing_file_fails_on_construction() {
        let dir = TestDir::new("filewrap-handle");
        let err = FileHandle::open(dir.join("NotExistingFile.txt")).unwrap_err();
        assert!(matches!(err, FileError::NotFound { .. }));

        let err = FileHandle::with_mode(dir.join("missing.txt"), "r").unwrap_err();
        assert!(matches!(err, FileError::NotFound { .. }));
    }

    #[test]
    fn test_write_modes_accept_missing_file() {
        let dir = TestDir::new("filewrap-handle");
        let handle = FileHandle::with_mode(dir.join("new.txt"), "w").unwrap();
        assert!(!handle.is_open());
        assert!(!handle.exists());
    }

    #[test]
    fn test_invalid_mode_string() {
        let dir = TestDir::new("filewrap-handle");
        let err = FileHandle::with_mode(dir.join("a.txt"), "rw").unwrap_err();
        assert!(matches!(err, FileError::Unsupported { .. }));
    }

    #[test]
    fn test_open_is_lazy() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("lazy.txt", "hello");
        let mut handle = FileHandle::open(&path).unwrap();
        assert!(!handle.is_open());

        assert_eq!(handle.read(Some(2)).unwrap(), b"he");
        assert!(handle.is_open());

        handle.close().unwrap();
        assert!(!handle.is_open());
    }

    #[test]
    fn test_write_then_read_whole_file() {
        let dir = TestDir::new("filewrap-handle");
        let content = "The quick brown fox jumps over the lazy dog.";

        let mut handle = FileHandle::create(dir.join("originalFile.txt")).unwrap();
        assert_eq!(handle.write(content).unwrap(), content.len());
        assert_eq!(handle.read(None).unwrap(), content.as_bytes());
        assert_eq!(handle.read_to_string(None).unwrap(), content);
    }

    #[test]
    fn test_partial_reads_stop_at_eof() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("data.bin", "abcdef");
        let mut handle = FileHandle::open(&path).unwrap();

        assert_eq!(handle.read(Some(4)).unwrap(), b"abcd");
        assert_eq!(handle.read(Some(4)).unwrap(), b"ef");
        assert!(handle.read(Some(4)).unwrap().is_empty());

        // whole-file read ignores the cursor
        assert_eq!(handle.read(None).unwrap(), b"abcdef");
    }

    #[test]
    fn test_read_line() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("lines.txt", "first\nsecond\nlast");
        let mut handle = FileHandle::open(&path).unwrap();

        assert_eq!(handle.read_line().unwrap().as_deref(), Some("first\n"));
        assert_eq!(handle.read_line().unwrap().as_deref(), Some("second\n"));
        assert_eq!(handle.read_line().unwrap().as_deref(), Some("last"));
        assert_eq!(handle.read_line().unwrap(), None);
    }

    #[test]
    fn test_write_line_appends_terminator() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.join("out.txt");
        {
            let mut handle = FileHandle::create(&path).unwrap();
            let written = handle.write_line("row").unwrap();
            assert_eq!(written, 3 + LINE_ENDING.len());
        }
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("row{}", LINE_ENDING)
        );
    }

    #[test]
    fn test_append_mode() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("log.txt", "one\n");
        {
            let mut handle = FileHandle::new(&path, OpenMode::APPEND).unwrap();
            handle.write("two\n").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_write_after_read_lands_at_logical_position() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("mixed.txt", "abcdef");
        {
            let mut handle = FileHandle::with_mode(&path, "r+").unwrap();
            assert_eq!(handle.read(Some(2)).unwrap(), b"ab");
            handle.write("XY").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abXYef");
    }

    #[test]
    fn test_rewind_requires_open_resource() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("rewind.txt", "abc");
        let mut handle = FileHandle::open(&path).unwrap();
        assert!(matches!(handle.rewind(), Err(FileError::Io { .. })));

        assert_eq!(handle.read(Some(3)).unwrap(), b"abc");
        handle.rewind().unwrap();
        assert_eq!(handle.read(Some(1)).unwrap(), b"a");
    }

    #[test]
    fn test_read_on_write_only_handle_fails() {
        let dir = TestDir::new("filewrap-handle");
        let mut handle = FileHandle::create(dir.join("w.txt")).unwrap();
        assert!(matches!(handle.read(Some(1)), Err(FileError::Io { .. })));
    }

    #[test]
    fn test_delete_reports_outcome() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.join("originalFile.txt");
        let mut handle = FileHandle::create(&path).unwrap();
        handle.write("to be removed").unwrap();
        assert!(path.exists());

        assert!(handle.delete().unwrap());
        assert!(!path.exists());
        assert!(!handle.is_open());
        assert!(!handle.delete().unwrap());
    }

    #[test]
    fn test_duplicate_default_target() {
        let dir = TestDir::new("filewrap-handle");
        let content = "Lorem ipsum dolor sit amet.";
        let mut original = FileHandle::create(dir.join("originalFile.txt")).unwrap();
        original.write(content).unwrap();

        let mut copy = original.duplicate(None).unwrap();
        assert_eq!(copy.path(), dir.join("originalFile-2.txt"));
        assert_ne!(copy.path(), original.path());
        assert_eq!(copy.read(None).unwrap(), content.as_bytes());

        assert!(original.delete().unwrap());
        assert!(copy.delete().unwrap());
    }

    #[test]
    fn test_duplicate_explicit_target() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("a.csv", "x,y\n");
        let handle = FileHandle::open(&path).unwrap();

        let target = dir.join("b.csv");
        let mut copy = handle.duplicate(Some(&target)).unwrap();
        assert_eq!(copy.path(), target.as_path());
        assert_eq!(copy.read_to_string(None).unwrap(), "x,y\n");
    }

    #[test]
    fn test_duplicate_into_missing_dir_fails() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("a.txt", "x");
        let handle = FileHandle::open(&path).unwrap();
        let target = dir.join("nope").join("b.txt");
        assert!(matches!(
            handle.duplicate(Some(&target)),
            Err(FileError::Io { .. })
        ));
    }

    #[test]
    fn test_rename_follows_file() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("old.txt", "content");
        let mut handle = FileHandle::open(&path).unwrap();
        assert_eq!(handle.path_info().basename, "old.txt");
        handle.read(Some(1)).unwrap();

        handle.rename("new.txt").unwrap();
        assert!(!path.exists());
        assert_eq!(handle.path(), dir.join("new.txt"));
        assert_eq!(handle.path_info().basename, "new.txt");
        assert_eq!(handle.read(None).unwrap(), b"content");
    }

    #[test]
    fn test_rename_rejects_paths_and_collisions() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("a.txt", "1");
        dir.file("b.txt", "2");
        let mut handle = FileHandle::open(&path).unwrap();

        assert!(handle.rename("sub/c.txt").is_err());
        assert!(handle.rename("b.txt").is_err());
        assert_eq!(std::fs::read_to_string(dir.join("b.txt")).unwrap(), "2");
    }

    #[test]
    fn test_size_is_requeried() {
        let dir = TestDir::new("filewrap-handle");
        let mut handle = FileHandle::create(dir.join("grow.txt")).unwrap();
        assert_eq!(handle.size().unwrap(), 0);
        handle.write("12345").unwrap();
        assert_eq!(handle.size().unwrap(), 5);
    }

    #[test]
    fn test_mime_detection_is_cached() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.file("notes.txt", "plain ascii text\n");
        let handle = FileHandle::open(&path).unwrap();

        assert_eq!(handle.mime_type().unwrap(), "text/plain");
        assert_eq!(handle.mime_encoding().unwrap(), "us-ascii");
        assert_eq!(handle.mime_raw().unwrap(), "text/plain; charset=us-ascii");

        // cached value survives a content change
        std::fs::write(&path, [0u8, 1, 2, 3]).unwrap();
        assert_eq!(handle.mime_type().unwrap(), "text/plain");
    }

    #[test]
    fn test_mime_of_missing_file_is_io_error() {
        let dir = TestDir::new("filewrap-handle");
        let handle = FileHandle::new(dir.join("ghost.txt"), OpenMode::WRITE).unwrap();
        assert!(matches!(handle.mime_type(), Err(FileError::Io { .. })));
    }

    #[test]
    fn test_drop_releases_and_persists_writes() {
        let dir = TestDir::new("filewrap-handle");
        let path = dir.join("dropped.txt");
        {
            let mut handle = FileHandle::create(&path).unwrap();
            handle.write("persisted").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "persisted");
    }
}
