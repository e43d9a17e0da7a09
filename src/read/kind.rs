use core::fmt;

use crate::endian::{BigEndian, Endianness, U32};
use crate::error::{Error, ErrorKind, ReadError, Result};
use crate::macho;
use crate::read::ReadRef;

/// The container class of a Mach-O file, as determined by its magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachOClass {
    /// A single 32-bit image starting with `MH_MAGIC` or `MH_CIGAM`.
    MachO32,
    /// A single 64-bit image starting with `MH_MAGIC_64` or `MH_CIGAM_64`.
    MachO64,
    /// A universal file starting with `FAT_MAGIC` or `FAT_CIGAM`.
    Fat,
    /// A universal file starting with `FAT_MAGIC_64` or `FAT_CIGAM_64`.
    ///
    /// The architecture table uses 64-bit offsets and sizes.
    Fat64,
    /// The magic is not recognized.
    Unknown,
}

impl MachOClass {
    /// Determine the class and byte order from the first four bytes of a file.
    ///
    /// Returns `(MachOClass::Unknown, Endianness::Big)` if the magic is not recognized.
    pub fn from_magic(magic: [u8; 4]) -> (MachOClass, Endianness) {
        match U32::<BigEndian>::from_bytes(magic).get(BigEndian) {
            macho::MH_MAGIC => (MachOClass::MachO32, Endianness::Big),
            macho::MH_CIGAM => (MachOClass::MachO32, Endianness::Little),
            macho::MH_MAGIC_64 => (MachOClass::MachO64, Endianness::Big),
            macho::MH_CIGAM_64 => (MachOClass::MachO64, Endianness::Little),
            macho::FAT_MAGIC => (MachOClass::Fat, Endianness::Big),
            macho::FAT_CIGAM => (MachOClass::Fat, Endianness::Little),
            macho::FAT_MAGIC_64 => (MachOClass::Fat64, Endianness::Big),
            macho::FAT_CIGAM_64 => (MachOClass::Fat64, Endianness::Little),
            _ => (MachOClass::Unknown, Endianness::Big),
        }
    }

    /// Return true for a universal file.
    #[inline]
    pub fn is_fat(self) -> bool {
        matches!(self, MachOClass::Fat | MachOClass::Fat64)
    }
}

impl fmt::Display for MachOClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MachOClass::MachO32 => "Mach-O 32-bit",
            MachOClass::MachO64 => "Mach-O 64-bit",
            MachOClass::Fat => "Mach-O fat",
            MachOClass::Fat64 => "Mach-O fat 64-bit",
            MachOClass::Unknown => "unknown",
        })
    }
}

/// Classify a file from its leading magic number.
///
/// Only the first four bytes are examined; no other parsing is done.
/// Fails with [`ErrorKind::InvalidMagic`] if fewer than four bytes are
/// available or the magic is not recognized.
pub fn classify(data: &[u8]) -> Result<(MachOClass, Endianness)> {
    let magic = data
        .read_at::<[u8; 4]>(0)
        .read_error(ErrorKind::InvalidMagic, "File too short for Mach-O magic")?;
    match MachOClass::from_magic(*magic) {
        (MachOClass::Unknown, _) => Err(Error::parse(
            ErrorKind::InvalidMagic,
            "Unrecognized Mach-O magic",
        )),
        result => Ok(result),
    }
}
