use core::mem;

#[cfg(feature = "logging")]
use log::{debug, trace};

use crate::endian::Endianness;
use crate::error::{Error, ErrorKind, ReadError, Result};
use crate::macho;
use crate::pod::{Bytes, Pod};

/// An iterator over the load commands of one architecture slice.
///
/// Created by [`ArchitectureSlice::commands`](crate::read::ArchitectureSlice::commands).
/// The iterator is a cheap copy, and calling `commands` again restarts the walk.
#[derive(Debug, Clone, Copy)]
pub struct LoadCommandIterator<'data> {
    endian: Endianness,
    // From the cursor to the end of the slice.
    data: Bytes<'data>,
    ncmds: u32,
    // Bytes of `sizeofcmds` not yet consumed.
    remaining: u32,
    position: usize,
    header_size: usize,
}

impl<'data> LoadCommandIterator<'data> {
    pub(super) fn new(
        endian: Endianness,
        data: &'data [u8],
        ncmds: u32,
        sizeofcmds: u32,
        header_size: usize,
    ) -> Self {
        LoadCommandIterator {
            endian,
            data: Bytes(data),
            ncmds,
            remaining: sizeofcmds,
            position: 0,
            header_size,
        }
    }

    /// The offset of the cursor from the start of the load command table.
    ///
    /// After all commands have been read this is the sum of their sizes.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The number of commands that have not been read yet.
    pub fn remaining_commands(&self) -> u32 {
        self.ncmds
    }

    /// Return the next load command.
    ///
    /// After an error, no more commands are returned.
    pub fn next(&mut self) -> Result<Option<LoadCommand<'data>>> {
        if self.ncmds == 0 {
            return Ok(None);
        }
        match self.parse_next() {
            Ok(command) => Ok(Some(command)),
            Err(error) => {
                self.ncmds = 0;
                self.data = Bytes(&[]);
                Err(error)
            }
        }
    }

    fn parse_next(&mut self) -> Result<LoadCommand<'data>> {
        let header_size = mem::size_of::<macho::LoadCommand<Endianness>>();
        if (self.remaining as usize) < header_size {
            return Err(Error::parse(
                ErrorKind::MalformedCommand,
                "Mach-O load command header exceeds sizeofcmds",
            ));
        }
        let header = self.data.read_at::<macho::LoadCommand<Endianness>>(0).read_error(
            ErrorKind::MalformedCommand,
            "Mach-O load command header exceeds the architecture slice",
        )?;
        let cmd = header.cmd.get(self.endian);
        let cmdsize = header.cmdsize.get(self.endian);
        if (cmdsize as usize) < header_size {
            return Err(Error::parse(
                ErrorKind::MalformedCommand,
                "Mach-O load command size is too small",
            ));
        }
        if cmdsize > self.remaining {
            return Err(Error::parse(
                ErrorKind::MalformedCommand,
                "Mach-O load command exceeds sizeofcmds",
            ));
        }
        let data = self.data.read_bytes(cmdsize as usize).read_error(
            ErrorKind::MalformedCommand,
            "Mach-O load command exceeds the architecture slice",
        )?;
        let offset = self.header_size + self.position;
        self.position += cmdsize as usize;
        self.remaining -= cmdsize;
        self.ncmds -= 1;
        #[cfg(feature = "logging")]
        trace!(
            "Load command 0x{:x} at offset 0x{:x}, size {}",
            cmd,
            offset,
            cmdsize
        );
        #[cfg(feature = "logging")]
        if self.ncmds == 0 && self.remaining != 0 {
            debug!(
                "Ignoring {} bytes after the last load command",
                self.remaining
            );
        }
        Ok(LoadCommand {
            cmd,
            offset,
            data,
            endian: self.endian,
        })
    }
}

impl<'data> Iterator for LoadCommandIterator<'data> {
    type Item = Result<LoadCommand<'data>>;

    fn next(&mut self) -> Option<Self::Item> {
        LoadCommandIterator::next(self).transpose()
    }
}

/// A single load command within an architecture slice.
#[derive(Debug, Clone, Copy)]
pub struct LoadCommand<'data> {
    cmd: u32,
    offset: usize,
    // Includes the header.
    data: Bytes<'data>,
    endian: Endianness,
}

impl<'data> LoadCommand<'data> {
    /// Return the `cmd` field of the load command.
    ///
    /// This is one of the `LC_` constants.
    #[inline]
    pub fn cmd(&self) -> u32 {
        self.cmd
    }

    /// Return the `cmdsize` field of the load command.
    #[inline]
    pub fn cmdsize(&self) -> u32 {
        self.data.len() as u32
    }

    /// The offset of the load command from the start of its architecture slice.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The byte order of the architecture slice containing this command.
    #[inline]
    pub fn endian(&self) -> Endianness {
        self.endian
    }

    /// Raw bytes of this load command, including the `cmd` and `cmdsize` fields.
    #[inline]
    pub fn raw_data(&self) -> &'data [u8] {
        self.data.0
    }

    /// Parse the data as the given type.
    ///
    /// Fails if the command is too small for the type.
    #[inline]
    pub fn data<T: Pod>(&self) -> Result<&'data T> {
        self.data.read_at(0).read_error(
            ErrorKind::MalformedCommand,
            "Mach-O load command is too small for its type",
        )
    }

    /// Parse a load command string value.
    ///
    /// Strings used by load commands are specified by offsets that are
    /// relative to the load command header. The string must be null
    /// terminated within the command.
    pub fn string(&self, s: macho::LcStr<Endianness>) -> Result<&'data [u8]> {
        self.data
            .read_string_at(s.offset.get(self.endian) as usize)
            .read_error(
                ErrorKind::MalformedCommand,
                "Invalid Mach-O load command string offset",
            )
    }

    /// Parse the command data according to the `cmd` field.
    pub fn variant(&self) -> Result<LoadCommandVariant<'data>> {
        Ok(match self.cmd {
            macho::LC_SEGMENT => {
                let mut data = self.data;
                let segment = data.read().read_error(
                    ErrorKind::MalformedCommand,
                    "Mach-O segment command is too small",
                )?;
                LoadCommandVariant::Segment32(segment, data.0)
            }
            macho::LC_SEGMENT_64 => {
                let mut data = self.data;
                let segment = data.read().read_error(
                    ErrorKind::MalformedCommand,
                    "Mach-O segment command is too small",
                )?;
                LoadCommandVariant::Segment64(segment, data.0)
            }
            macho::LC_LOAD_DYLIB
            | macho::LC_LOAD_WEAK_DYLIB
            | macho::LC_REEXPORT_DYLIB
            | macho::LC_LAZY_LOAD_DYLIB
            | macho::LC_LOAD_UPWARD_DYLIB => LoadCommandVariant::Dylib(self.data()?),
            macho::LC_ID_DYLIB => LoadCommandVariant::IdDylib(self.data()?),
            macho::LC_LOAD_DYLINKER => LoadCommandVariant::LoadDylinker(self.data()?),
            macho::LC_ID_DYLINKER => LoadCommandVariant::IdDylinker(self.data()?),
            macho::LC_RPATH => LoadCommandVariant::Rpath(self.data()?),
            macho::LC_UUID => LoadCommandVariant::Uuid(self.data()?),
            macho::LC_CODE_SIGNATURE => LoadCommandVariant::CodeSignature(self.data()?),
            macho::LC_ENCRYPTION_INFO => LoadCommandVariant::EncryptionInfo32(self.data()?),
            macho::LC_ENCRYPTION_INFO_64 => LoadCommandVariant::EncryptionInfo64(self.data()?),
            macho::LC_MAIN => LoadCommandVariant::EntryPoint(self.data()?),
            _ => LoadCommandVariant::Other,
        })
    }

    /// Try to parse this command as a 32-bit or 64-bit segment command.
    pub fn segment(&self) -> Result<Option<Segment<'data>>> {
        let e = self.endian;
        Ok(match self.variant()? {
            LoadCommandVariant::Segment32(segment, _) => Some(Segment {
                name: segname(&segment.segname),
                vmaddr: segment.vmaddr.get(e).into(),
                vmsize: segment.vmsize.get(e).into(),
                fileoff: segment.fileoff.get(e).into(),
                filesize: segment.filesize.get(e).into(),
                maxprot: segment.maxprot.get(e),
                initprot: segment.initprot.get(e),
                nsects: segment.nsects.get(e),
                flags: segment.flags.get(e),
            }),
            LoadCommandVariant::Segment64(segment, _) => Some(Segment {
                name: segname(&segment.segname),
                vmaddr: segment.vmaddr.get(e),
                vmsize: segment.vmsize.get(e),
                fileoff: segment.fileoff.get(e),
                filesize: segment.filesize.get(e),
                maxprot: segment.maxprot.get(e),
                initprot: segment.initprot.get(e),
                nsects: segment.nsects.get(e),
                flags: segment.flags.get(e),
            }),
            _ => None,
        })
    }
}

// Segment names are padded with nulls, and are not null terminated if they
// use all 16 bytes.
fn segname(name: &[u8; 16]) -> &[u8] {
    match memchr::memchr(b'\0', name) {
        Some(end) => &name[..end],
        None => &name[..],
    }
}

/// A load command decoded according to its `cmd` field.
///
/// Only the commands that are relevant for auditing are decoded.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum LoadCommandVariant<'data> {
    /// `LC_SEGMENT`, and the data following the command (the section headers).
    Segment32(&'data macho::SegmentCommand32<Endianness>, &'data [u8]),
    /// `LC_SEGMENT_64`, and the data following the command (the section headers).
    Segment64(&'data macho::SegmentCommand64<Endianness>, &'data [u8]),
    /// `LC_LOAD_DYLIB`, `LC_LOAD_WEAK_DYLIB`, `LC_REEXPORT_DYLIB`,
    /// `LC_LAZY_LOAD_DYLIB`, or `LC_LOAD_UPWARD_DYLIB`
    Dylib(&'data macho::DylibCommand<Endianness>),
    /// `LC_ID_DYLIB`
    IdDylib(&'data macho::DylibCommand<Endianness>),
    /// `LC_LOAD_DYLINKER`
    LoadDylinker(&'data macho::DylinkerCommand<Endianness>),
    /// `LC_ID_DYLINKER`
    IdDylinker(&'data macho::DylinkerCommand<Endianness>),
    /// `LC_RPATH`
    Rpath(&'data macho::RpathCommand<Endianness>),
    /// `LC_UUID`
    Uuid(&'data macho::UuidCommand<Endianness>),
    /// `LC_CODE_SIGNATURE`
    CodeSignature(&'data macho::LinkeditDataCommand<Endianness>),
    /// `LC_ENCRYPTION_INFO`
    EncryptionInfo32(&'data macho::EncryptionInfoCommand32<Endianness>),
    /// `LC_ENCRYPTION_INFO_64`
    EncryptionInfo64(&'data macho::EncryptionInfoCommand64<Endianness>),
    /// `LC_MAIN`
    EntryPoint(&'data macho::EntryPointCommand<Endianness>),
    /// Some other command.
    Other,
}

/// The fields of a 32-bit or 64-bit segment command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'data> {
    /// The segment name, without padding.
    pub name: &'data [u8],
    /// Memory address of the segment.
    pub vmaddr: u64,
    /// Memory size of the segment.
    pub vmsize: u64,
    /// File offset of the segment.
    pub fileoff: u64,
    /// Amount to map from the file.
    pub filesize: u64,
    /// Maximum VM protection (`VM_PROT_*`).
    pub maxprot: u32,
    /// Initial VM protection (`VM_PROT_*`).
    pub initprot: u32,
    /// Number of sections in the segment.
    pub nsects: u32,
    /// Segment flags.
    pub flags: u32,
}

impl<'data> Segment<'data> {
    /// Return true if the segment is initially mapped both writable and executable.
    pub fn is_writable_and_executable(&self) -> bool {
        let wx = macho::VM_PROT_WRITE | macho::VM_PROT_EXECUTE;
        self.initprot & wx == wx
    }

    /// Return true if the segment may later be made both writable and executable.
    pub fn may_become_writable_and_executable(&self) -> bool {
        let wx = macho::VM_PROT_WRITE | macho::VM_PROT_EXECUTE;
        self.maxprot & wx == wx
    }
}
