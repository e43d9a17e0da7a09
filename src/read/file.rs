use std::path::{Path, PathBuf};

#[cfg(feature = "logging")]
use log::debug;

use crate::endian::Endianness;
use crate::error::Result;
use crate::read::{architectures, classify, ArchitectureSlice, MachOClass, MappedFile, OpenOptions};

/// An open Mach-O file.
///
/// The file descriptor and the mapped contents are owned by this object and
/// released when it is dropped. Slices and load commands borrow the object,
/// so they cannot be used after it is released.
///
/// ```no_run
/// # fn main() -> macho_audit::Result<()> {
/// let file = macho_audit::MachOObject::open("/bin/ls")?;
/// for arch in file.architectures()? {
///     for command in arch.commands()? {
///         let command = command?;
///         println!("{}", macho_audit::load_command_name(command.cmd()));
///     }
/// }
/// file.release();
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MachOObject {
    path: PathBuf,
    base_name: String,
    class: MachOClass,
    endian: Endianness,
    map: MappedFile,
}

impl MachOObject {
    /// Open and classify a file using the default [`OpenOptions`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &OpenOptions::default())
    }

    /// Open and classify a file.
    ///
    /// Fails if the file cannot be read, or if it does not start with a
    /// Mach-O magic. Nothing stays open on failure.
    pub fn open_with<P: AsRef<Path>>(path: P, options: &OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        let map = MappedFile::open(path, options)?;
        let (class, endian) = classify(map.data())?;
        #[cfg(feature = "logging")]
        debug!("Classified '{}' as {}, {}", path.display(), class, endian);
        let base_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(MachOObject {
            path: path.to_path_buf(),
            base_name,
            class,
            endian,
            map,
        })
    }

    /// The path that was opened.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The final component of the path, for display.
    #[inline]
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// The container class determined from the magic.
    #[inline]
    pub fn class(&self) -> MachOClass {
        self.class
    }

    /// The byte order determined from the magic.
    ///
    /// For a universal file this is the byte order of the fat table; each
    /// slice has its own.
    #[inline]
    pub fn endian(&self) -> Endianness {
        self.endian
    }

    /// The length of the file in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.map.data().len() as u64
    }

    /// Return true if the file is empty.
    ///
    /// Empty files fail to open, so this is always false.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.data().is_empty()
    }

    /// The entire contents of the file.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.map.data()
    }

    /// Resolve the architecture slices.
    ///
    /// There is always at least one slice for a single image. A universal
    /// file gives one slice per fat table entry, in file order.
    pub fn architectures(&self) -> Result<Vec<ArchitectureSlice<'_>>> {
        architectures(self.map.data(), self.class, self.endian)
    }

    /// Unmap the contents and close the file.
    ///
    /// This is the same as dropping the object.
    pub fn release(self) {
        #[cfg(feature = "logging")]
        debug!("Releasing '{}'", self.path.display());
    }
}
