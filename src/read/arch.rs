use crate::endian::Endianness;
use crate::error::{Error, ErrorKind, ReadError, Result};
use crate::macho;
use crate::read::{
    classify, FatArchInfo, Header, LoadCommandIterator, MachOClass, SecurityProperties,
};

/// The word size of an architecture slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bitness {
    /// A 32-bit image with a [`macho::MachHeader32`].
    Bits32,
    /// A 64-bit image with a [`macho::MachHeader64`].
    Bits64,
}

/// A single-architecture Mach-O image within a file.
///
/// This is a bounded view of the file data and is only valid while the
/// [`MachOObject`](crate::read::MachOObject) it came from is alive.
#[derive(Debug, Clone, Copy)]
pub struct ArchitectureSlice<'data> {
    data: &'data [u8],
    offset: u64,
    endian: Endianness,
    bitness: Bitness,
    fat_arch: Option<FatArchInfo>,
}

impl<'data> ArchitectureSlice<'data> {
    /// A slice covering all of a single-architecture file.
    pub(super) fn single(data: &'data [u8], endian: Endianness, bitness: Bitness) -> Self {
        ArchitectureSlice {
            data,
            offset: 0,
            endian,
            bitness,
            fat_arch: None,
        }
    }

    /// A slice for an entry of a fat table.
    ///
    /// The byte order and bitness are determined by the image's own magic.
    pub(super) fn parse(
        data: &'data [u8],
        offset: u64,
        fat_arch: Option<FatArchInfo>,
    ) -> Result<Self> {
        let (class, endian) = classify(data)?;
        let bitness = match class {
            MachOClass::MachO32 => Bitness::Bits32,
            MachOClass::MachO64 => Bitness::Bits64,
            _ => {
                return Err(Error::parse(
                    ErrorKind::InvalidMagic,
                    "Mach-O fat architecture is not a single image",
                ))
            }
        };
        Ok(ArchitectureSlice {
            data,
            offset,
            endian,
            bitness,
            fat_arch,
        })
    }

    /// The offset of the slice within the file.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// The size of the slice in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// The byte order of every field in the slice.
    #[inline]
    pub fn endian(&self) -> Endianness {
        self.endian
    }

    /// Whether the image is 32-bit or 64-bit.
    #[inline]
    pub fn bitness(&self) -> Bitness {
        self.bitness
    }

    /// Return true for a 64-bit image.
    #[inline]
    pub fn is_64(&self) -> bool {
        self.bitness == Bitness::Bits64
    }

    /// The raw bytes of the slice.
    #[inline]
    pub fn data(&self) -> &'data [u8] {
        self.data
    }

    /// The fat table entry for this slice, if the file is a universal file.
    #[inline]
    pub fn fat_arch(&self) -> Option<FatArchInfo> {
        self.fat_arch
    }

    /// Parse the mach header at the start of the slice.
    pub fn header(&self) -> Result<Header> {
        match self.bitness {
            Bitness::Bits32 => {
                Header::parse::<macho::MachHeader32<Endianness>>(self.data, self.endian)
            }
            Bitness::Bits64 => {
                Header::parse::<macho::MachHeader64<Endianness>>(self.data, self.endian)
            }
        }
    }

    /// Return an iterator over the load commands.
    ///
    /// Each call starts a new walk from the first command.
    pub fn commands(&self) -> Result<LoadCommandIterator<'data>> {
        let header = self.header()?;
        let data = self
            .data
            .get(header.size..)
            .read_error(ErrorKind::TruncatedHeader, "Mach-O header is truncated")?;
        Ok(LoadCommandIterator::new(
            self.endian,
            data,
            header.ncmds,
            header.sizeofcmds,
            header.size,
        ))
    }

    /// Collect the security relevant properties of the image.
    pub fn properties(&self) -> Result<SecurityProperties<'data>> {
        SecurityProperties::parse(self)
    }
}
