use std::fs;
use std::io::{self, Read};
use std::path::Path;

#[cfg(feature = "logging")]
use log::debug;

use crate::error::{Error, Result};

/// How the contents of a file are made available for parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    /// Map the file into memory with `mmap`.
    Mmap,
    /// Read the whole file into a heap buffer.
    ///
    /// Use this when the file may be modified by another process while it is
    /// being parsed.
    Read,
}

/// Options for opening a file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct OpenOptions {
    /// How the file contents are accessed.
    ///
    /// Defaults to [`MapMode::Mmap`].
    pub map_mode: MapMode,
    /// The largest file that will be opened, in bytes.
    ///
    /// `None` disables the limit. Defaults to 1 GiB.
    pub max_size: Option<u64>,
}

/// The default value of [`OpenOptions::max_size`].
pub const DEFAULT_MAX_SIZE: u64 = 1 << 30;

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            map_mode: MapMode::Mmap,
            max_size: Some(DEFAULT_MAX_SIZE),
        }
    }
}

impl OpenOptions {
    /// Set [`OpenOptions::map_mode`].
    pub fn map_mode(mut self, map_mode: MapMode) -> Self {
        self.map_mode = map_mode;
        self
    }

    /// Set [`OpenOptions::max_size`].
    pub fn max_size(mut self, max_size: Option<u64>) -> Self {
        self.max_size = max_size;
        self
    }
}

#[derive(Debug)]
enum FileData {
    Mmap(memmap2::Mmap),
    Buffer(Vec<u8>),
}

/// An open file and a read-only view of its entire contents.
///
/// The descriptor and the mapping are released when this is dropped.
#[derive(Debug)]
pub(crate) struct MappedFile {
    data: FileData,
    // Keep the descriptor open for as long as the mapping.
    _file: fs::File,
}

impl MappedFile {
    pub(crate) fn open(path: &Path, options: &OpenOptions) -> Result<Self> {
        let mut file = fs::File::open(path).map_err(Error::io)?;
        let size = file.metadata().map_err(Error::io)?.len();
        if size == 0 {
            return Err(Error::io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "File is empty",
            )));
        }
        if let Some(limit) = options.max_size {
            if size > limit {
                return Err(Error::too_large(size, limit));
            }
        }
        let len: usize = size
            .try_into()
            .map_err(|_| Error::too_large(size, usize::MAX as u64))?;

        let data = match options.map_mode {
            MapMode::Mmap => {
                // Safety: the mapping is read-only and never outlives `file`.
                // Concurrent modification of the file by another process is
                // outside our control; use `MapMode::Read` to avoid it.
                let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(Error::io)?;
                FileData::Mmap(mmap)
            }
            MapMode::Read => {
                let mut buffer = Vec::new();
                buffer.try_reserve_exact(len).map_err(|_| {
                    Error::io(io::Error::new(
                        io::ErrorKind::OutOfMemory,
                        "Failed to allocate file buffer",
                    ))
                })?;
                (&mut file)
                    .take(size)
                    .read_to_end(&mut buffer)
                    .map_err(Error::io)?;
                FileData::Buffer(buffer)
            }
        };

        let mapped = MappedFile { data, _file: file };
        if mapped.data().len() != len {
            return Err(Error::io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "File size changed while it was being opened",
            )));
        }
        #[cfg(feature = "logging")]
        debug!(
            "Opened '{}' ({} bytes, {:?})",
            path.display(),
            len,
            options.map_mode
        );
        Ok(mapped)
    }

    #[inline]
    pub(crate) fn data(&self) -> &[u8] {
        match &self.data {
            FileData::Mmap(mmap) => mmap,
            FileData::Buffer(buffer) => buffer,
        }
    }
}
