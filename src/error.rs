use std::{error, fmt, io, result};

/// An error that occurred while opening or parsing a Mach-O file.
#[derive(Debug)]
pub struct Error {
    inner: ErrorInner,
}

#[derive(Debug)]
enum ErrorInner {
    Io(io::Error),
    TooLarge { size: u64, limit: u64 },
    Parse(ErrorKind, &'static str),
}

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file does not exist.
    NotFound,
    /// The file could not be opened due to its permissions.
    PermissionDenied,
    /// Some other I/O error occurred while opening or reading the file.
    ///
    /// An empty file is reported as `Io(io::ErrorKind::UnexpectedEof)`.
    Io(io::ErrorKind),
    /// The file is larger than the configured maximum size.
    TooLarge,
    /// The file does not start with a recognized Mach-O magic number.
    InvalidMagic,
    /// An entry in the fat architecture table lies outside the file.
    TruncatedFatHeader,
    /// The fat architecture table is larger than the file.
    TooManyArchitectures,
    /// An architecture slice is shorter than its mach header.
    TruncatedHeader,
    /// A load command has an invalid size.
    MalformedCommand,
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            ErrorInner::Io(e) => e.fmt(f),
            ErrorInner::TooLarge { size, limit } => write!(
                f,
                "File size {} exceeds the maximum of {} bytes",
                size, limit
            ),
            ErrorInner::Parse(_, message) => f.write_str(message),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match &self.inner {
            ErrorInner::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::io(error)
    }
}

impl Error {
    /// Get the kind of error.
    pub fn kind(&self) -> ErrorKind {
        match &self.inner {
            ErrorInner::Io(e) => match e.kind() {
                io::ErrorKind::NotFound => ErrorKind::NotFound,
                io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
                kind => ErrorKind::Io(kind),
            },
            ErrorInner::TooLarge { .. } => ErrorKind::TooLarge,
            ErrorInner::Parse(kind, _) => *kind,
        }
    }

    pub(crate) fn io(error: io::Error) -> Self {
        Self {
            inner: ErrorInner::Io(error),
        }
    }

    pub(crate) fn too_large(size: u64, limit: u64) -> Self {
        Self {
            inner: ErrorInner::TooLarge { size, limit },
        }
    }

    pub(crate) fn parse(kind: ErrorKind, message: &'static str) -> Self {
        Self {
            inner: ErrorInner::Parse(kind, message),
        }
    }
}

/// The `Result` type for this library.
pub type Result<T> = result::Result<T, Error>;

/// Attach an error kind and message to a failed bounds check.
pub(crate) trait ReadError<T> {
    fn read_error(self, kind: ErrorKind, message: &'static str) -> Result<T>;
}

impl<T> ReadError<T> for result::Result<T, ()> {
    fn read_error(self, kind: ErrorKind, message: &'static str) -> Result<T> {
        self.map_err(|()| Error::parse(kind, message))
    }
}

impl<T> ReadError<T> for Option<T> {
    fn read_error(self, kind: ErrorKind, message: &'static str) -> Result<T> {
        self.ok_or_else(|| Error::parse(kind, message))
    }
}
