// ============================================================
// OPEN MODE
// ============================================================
// fopen-style mode strings mapped onto std::fs::OpenOptions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;

/// How a file handle opens its underlying resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
    /// `r`: read only, the file must exist.
    Read,
    /// `r+`: read and write, the file must exist.
    ReadWrite,
    /// `w`: write only, create or truncate.
    Write,
    /// `w+`: read and write, create or truncate.
    WriteRead,
    /// `a`: append only, create if missing.
    Append,
    /// `a+`: read anywhere, append writes, create if missing.
    AppendRead,
    /// `x`: write only, fail if the file exists.
    CreateNew,
    /// `x+`: read and write, fail if the file exists.
    CreateNewRead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenMode {
    pub access: Access,
    /// The `b` flag. Has no effect on how bytes are read on any platform Rust
    /// targets; kept so modes round-trip through their string form.
    pub binary: bool,
}

impl OpenMode {
    pub const READ: OpenMode = OpenMode::new(Access::Read, false);
    pub const READ_BINARY: OpenMode = OpenMode::new(Access::Read, true);
    pub const WRITE: OpenMode = OpenMode::new(Access::Write, false);
    pub const WRITE_BINARY: OpenMode = OpenMode::new(Access::Write, true);
    pub const APPEND: OpenMode = OpenMode::new(Access::Append, false);
    pub const APPEND_BINARY: OpenMode = OpenMode::new(Access::Append, true);

    pub const fn new(access: Access, binary: bool) -> Self {
        Self { access, binary }
    }

    /// Modes that require the file to exist before a handle can be built.
    pub fn requires_existing(&self) -> bool {
        matches!(self.access, Access::Read | Access::ReadWrite)
    }

    pub fn is_readable(&self) -> bool {
        !matches!(
            self.access,
            Access::Write | Access::Append | Access::CreateNew
        )
    }

    pub fn is_writable(&self) -> bool {
        self.access != Access::Read
    }

    pub fn as_str(&self) -> &'static str {
        match (self.access, self.binary) {
            (Access::Read, false) => "r",
            (Access::Read, true) => "rb",
            (Access::ReadWrite, false) => "r+",
            (Access::ReadWrite, true) => "r+b",
            (Access::Write, false) => "w",
            (Access::Write, true) => "wb",
            (Access::WriteRead, false) => "w+",
            (Access::WriteRead, true) => "w+b",
            (Access::Append, false) => "a",
            (Access::Append, true) => "ab",
            (Access::AppendRead, false) => "a+",
            (Access::AppendRead, true) => "a+b",
            (Access::CreateNew, false) => "x",
            (Access::CreateNew, true) => "xb",
            (Access::CreateNewRead, false) => "x+",
            (Access::CreateNewRead, true) => "x+b",
        }
    }

    pub fn to_open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self.access {
            Access::Read => {
                options.read(true);
            }
            Access::ReadWrite => {
                options.read(true).write(true);
            }
            Access::Write => {
                options.write(true).create(true).truncate(true);
            }
            Access::WriteRead => {
                options.read(true).write(true).create(true).truncate(true);
            }
            Access::Append => {
                options.append(true).create(true);
            }
            Access::AppendRead => {
                options.read(true).append(true).create(true);
            }
            Access::CreateNew => {
                options.write(true).create_new(true);
            }
            Access::CreateNewRead => {
                options.read(true).write(true).create_new(true);
            }
        }
        options
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        OpenMode::READ_BINARY
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpenMode {
    type Err = String;

    /// Accepts the fopen spellings, with `b` or `t` anywhere after the
    /// leading letter (`rb+` and `r+b` are the same mode).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let base = chars
            .next()
            .ok_or_else(|| "empty open mode".to_string())?;

        let mut plus = false;
        let mut binary = false;
        for c in chars {
            match c {
                '+' if !plus => plus = true,
                'b' if !binary => binary = true,
                't' => {}
                _ => return Err(format!("invalid open mode '{}'", s)),
            }
        }

        let access = match (base, plus) {
            ('r', false) => Access::Read,
            ('r', true) => Access::ReadWrite,
            ('w', false) => Access::Write,
            ('w', true) => Access::WriteRead,
            ('a', false) => Access::Append,
            ('a', true) => Access::AppendRead,
            ('x', false) => Access::CreateNew,
            ('x', true) => Access::CreateNewRead,
            _ => return Err(format!("invalid open mode '{}'", s)),
        };

        Ok(OpenMode::new(access, binary))
    }
}
