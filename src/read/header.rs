use core::fmt::Debug;
use std::borrow::Cow;

use crate::endian::{BigEndian, Endian, Endianness};
use crate::error::{ErrorKind, ReadError, Result};
use crate::macho;
use crate::names;
use crate::pod::Pod;
use crate::read::ReadRef;

/// A trait for generic access to [`macho::MachHeader32`] and [`macho::MachHeader64`].
#[allow(missing_docs)]
pub trait MachHeader: Debug + Pod {
    type Endian: Endian;

    fn magic(&self) -> u32;
    fn cputype(&self, endian: Self::Endian) -> u32;
    fn cpusubtype(&self, endian: Self::Endian) -> u32;
    fn filetype(&self, endian: Self::Endian) -> u32;
    fn ncmds(&self, endian: Self::Endian) -> u32;
    fn sizeofcmds(&self, endian: Self::Endian) -> u32;
    fn flags(&self, endian: Self::Endian) -> u32;

    /// Read the header at the start of the given slice data.
    fn parse<'data, R: ReadRef<'data>>(data: R) -> Result<&'data Self> {
        data.read_at::<Self>(0)
            .read_error(ErrorKind::TruncatedHeader, "Mach-O header is truncated")
    }
}

impl<E: Endian> MachHeader for macho::MachHeader32<E> {
    type Endian = E;

    fn magic(&self) -> u32 {
        self.magic.get(BigEndian)
    }

    fn cputype(&self, endian: Self::Endian) -> u32 {
        self.cputype.get(endian)
    }

    fn cpusubtype(&self, endian: Self::Endian) -> u32 {
        self.cpusubtype.get(endian)
    }

    fn filetype(&self, endian: Self::Endian) -> u32 {
        self.filetype.get(endian)
    }

    fn ncmds(&self, endian: Self::Endian) -> u32 {
        self.ncmds.get(endian)
    }

    fn sizeofcmds(&self, endian: Self::Endian) -> u32 {
        self.sizeofcmds.get(endian)
    }

    fn flags(&self, endian: Self::Endian) -> u32 {
        self.flags.get(endian)
    }
}

impl<E: Endian> MachHeader for macho::MachHeader64<E> {
    type Endian = E;

    fn magic(&self) -> u32 {
        self.magic.get(BigEndian)
    }

    fn cputype(&self, endian: Self::Endian) -> u32 {
        self.cputype.get(endian)
    }

    fn cpusubtype(&self, endian: Self::Endian) -> u32 {
        self.cpusubtype.get(endian)
    }

    fn filetype(&self, endian: Self::Endian) -> u32 {
        self.filetype.get(endian)
    }

    fn ncmds(&self, endian: Self::Endian) -> u32 {
        self.ncmds.get(endian)
    }

    fn sizeofcmds(&self, endian: Self::Endian) -> u32 {
        self.sizeofcmds.get(endian)
    }

    fn flags(&self, endian: Self::Endian) -> u32 {
        self.flags.get(endian)
    }
}

/// The decoded fields of a 32-bit or 64-bit mach header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// The magic number, read as big endian.
    pub magic: u32,
    /// One of the `CPU_TYPE_*` constants.
    pub cputype: u32,
    /// The machine specifier.
    pub cpusubtype: u32,
    /// One of the `MH_*` file type constants.
    pub filetype: u32,
    /// The number of load commands.
    pub ncmds: u32,
    /// The size in bytes of the load command table.
    pub sizeofcmds: u32,
    /// The `MH_*` flag bits.
    pub flags: u32,
    /// The size in bytes of the header itself.
    pub size: usize,
}

impl Header {
    pub(crate) fn parse<Mach: MachHeader<Endian = Endianness>>(
        data: &[u8],
        endian: Endianness,
    ) -> Result<Self> {
        let header = Mach::parse(data)?;
        Ok(Header {
            magic: header.magic(),
            cputype: header.cputype(endian),
            cpusubtype: header.cpusubtype(endian),
            filetype: header.filetype(endian),
            ncmds: header.ncmds(endian),
            sizeofcmds: header.sizeofcmds(endian),
            flags: header.flags(endian),
            size: core::mem::size_of::<Mach>(),
        })
    }

    /// The canonical name of the file type.
    pub fn filetype_name(&self) -> Cow<'static, str> {
        names::filetype_name(self.filetype)
    }

    /// The name of the CPU type.
    pub fn cputype_name(&self) -> Cow<'static, str> {
        names::cputype_name(self.cputype)
    }

    /// The names of the flags that are set.
    pub fn flag_names(&self) -> names::FlagNames {
        names::header_flag_names(self.flags)
    }

    /// Return true if the image is loaded at a random address (`MH_PIE`).
    #[inline]
    pub fn is_pie(&self) -> bool {
        self.flags & macho::MH_PIE != 0
    }

    /// Return true if all stacks are given execute permission
    /// (`MH_ALLOW_STACK_EXECUTION`).
    #[inline]
    pub fn allows_stack_execution(&self) -> bool {
        self.flags & macho::MH_ALLOW_STACK_EXECUTION != 0
    }

    /// Return true if the heap is forced to be non-executable
    /// (`MH_NO_HEAP_EXECUTION`).
    #[inline]
    pub fn no_heap_execution(&self) -> bool {
        self.flags & macho::MH_NO_HEAP_EXECUTION != 0
    }
}
