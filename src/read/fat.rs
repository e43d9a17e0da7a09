use core::fmt::Debug;
use core::mem;

#[cfg(feature = "logging")]
use log::debug;

use crate::endian::{Endian, Endianness};
use crate::error::{Error, ErrorKind, ReadError, Result};
use crate::macho;
use crate::pod::Pod;
use crate::read::{ArchitectureSlice, Bitness, MachOClass, ReadRef};

/// A trait for generic access to [`macho::FatArch32`] and [`macho::FatArch64`].
#[allow(missing_docs)]
pub trait FatArch: Pod + Debug {
    type Word: Into<u64>;
    type Endian: Endian;

    fn cputype(&self, endian: Self::Endian) -> u32;
    fn cpusubtype(&self, endian: Self::Endian) -> u32;
    fn offset(&self, endian: Self::Endian) -> Self::Word;
    fn size(&self, endian: Self::Endian) -> Self::Word;
    fn align(&self, endian: Self::Endian) -> u32;

    /// Return the offset and size of the architecture within the file.
    fn file_range(&self, endian: Self::Endian) -> (u64, u64) {
        (self.offset(endian).into(), self.size(endian).into())
    }

    /// Return the fields that describe the architecture in the fat table.
    fn info(&self, endian: Self::Endian) -> FatArchInfo {
        FatArchInfo {
            cputype: self.cputype(endian),
            cpusubtype: self.cpusubtype(endian),
            align: self.align(endian),
        }
    }
}

impl<E: Endian> FatArch for macho::FatArch32<E> {
    type Word = u32;
    type Endian = E;

    fn cputype(&self, endian: E) -> u32 {
        self.cputype.get(endian)
    }

    fn cpusubtype(&self, endian: E) -> u32 {
        self.cpusubtype.get(endian)
    }

    fn offset(&self, endian: E) -> Self::Word {
        self.offset.get(endian)
    }

    fn size(&self, endian: E) -> Self::Word {
        self.size.get(endian)
    }

    fn align(&self, endian: E) -> u32 {
        self.align.get(endian)
    }
}

impl<E: Endian> FatArch for macho::FatArch64<E> {
    type Word = u64;
    type Endian = E;

    fn cputype(&self, endian: E) -> u32 {
        self.cputype.get(endian)
    }

    fn cpusubtype(&self, endian: E) -> u32 {
        self.cpusubtype.get(endian)
    }

    fn offset(&self, endian: E) -> Self::Word {
        self.offset.get(endian)
    }

    fn size(&self, endian: E) -> Self::Word {
        self.size.get(endian)
    }

    fn align(&self, endian: E) -> u32 {
        self.align.get(endian)
    }
}

/// The fields of a fat table entry that are not used to locate the slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatArchInfo {
    /// The CPU type declared in the fat table.
    pub cputype: u32,
    /// The CPU subtype declared in the fat table.
    pub cpusubtype: u32,
    /// The alignment of the slice as a power of 2.
    pub align: u32,
}

/// Resolve the architecture slices of a classified file.
///
/// A single image always yields one slice covering all of `data`.
/// A universal file yields one slice per fat table entry, in table order.
pub fn architectures<'data>(
    data: &'data [u8],
    class: MachOClass,
    endian: Endianness,
) -> Result<Vec<ArchitectureSlice<'data>>> {
    match class {
        MachOClass::MachO32 => Ok(vec![ArchitectureSlice::single(data, endian, Bitness::Bits32)]),
        MachOClass::MachO64 => Ok(vec![ArchitectureSlice::single(data, endian, Bitness::Bits64)]),
        MachOClass::Fat => parse_fat::<macho::FatArch32<Endianness>>(data, endian),
        MachOClass::Fat64 => parse_fat::<macho::FatArch64<Endianness>>(data, endian),
        MachOClass::Unknown => Err(Error::parse(
            ErrorKind::InvalidMagic,
            "Unrecognized Mach-O magic",
        )),
    }
}

fn parse_fat<'data, Fat: FatArch<Endian = Endianness>>(
    data: &'data [u8],
    endian: Endianness,
) -> Result<Vec<ArchitectureSlice<'data>>> {
    let header = data
        .read_at::<macho::FatHeader<Endianness>>(0)
        .read_error(ErrorKind::TruncatedFatHeader, "Mach-O fat header is truncated")?;
    let nfat_arch = header.nfat_arch.get(endian);
    if nfat_arch == 0 {
        return Err(Error::parse(
            ErrorKind::TruncatedFatHeader,
            "Mach-O fat file has no architectures",
        ));
    }
    let header_size = mem::size_of::<macho::FatHeader<Endianness>>() as u64;
    let available = data.len() as u64 - header_size;
    let table_size = u64::from(nfat_arch)
        .checked_mul(mem::size_of::<Fat>() as u64)
        .filter(|&size| size <= available)
        .read_error(
            ErrorKind::TooManyArchitectures,
            "Mach-O fat architecture count exceeds the file size",
        )?;
    let table_end = header_size + table_size;
    #[cfg(feature = "logging")]
    debug!("Mach-O fat table has {} architectures", nfat_arch);

    let mut offset = header_size;
    let arches = data
        .read_slice::<Fat>(&mut offset, nfat_arch as usize)
        .read_error(
            ErrorKind::TooManyArchitectures,
            "Mach-O fat architecture count exceeds the file size",
        )?;
    let mut slices = Vec::with_capacity(arches.len());
    for arch in arches {
        let (offset, size) = arch.file_range(endian);
        if offset < table_end {
            return Err(Error::parse(
                ErrorKind::TruncatedFatHeader,
                "Mach-O fat architecture overlaps the fat table",
            ));
        }
        let slice = data.read_bytes_at(offset, size).read_error(
            ErrorKind::TruncatedFatHeader,
            "Mach-O fat architecture exceeds the file size",
        )?;
        #[cfg(feature = "logging")]
        debug!(
            "Mach-O fat architecture at offset 0x{:x}, size 0x{:x}",
            offset, size
        );
        slices.push(ArchitectureSlice::parse(
            slice,
            offset,
            Some(arch.info(endian)),
        )?);
    }
    Ok(slices)
}
