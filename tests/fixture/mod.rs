//! Builders for synthetic Mach-O images.
#![allow(dead_code)]

use std::io::Write;

use macho_audit::macho;
use macho_audit::Endianness;

/// Appends integers in a fixed byte order.
pub struct Writer {
    endian: Endianness,
    pub buf: Vec<u8>,
}

impl Writer {
    pub fn new(endian: Endianness) -> Self {
        Writer {
            endian,
            buf: Vec::new(),
        }
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        match self.endian {
            Endianness::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
            Endianness::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
        }
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        match self.endian {
            Endianness::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
            Endianness::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
        }
        self
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn pad_to(&mut self, len: usize) -> &mut Self {
        self.buf.resize(len, 0);
        self
    }
}

/// A single-architecture image.
#[derive(Clone)]
pub struct Image {
    endian: Endianness,
    is_64: bool,
    cputype: u32,
    filetype: u32,
    flags: u32,
    commands: Vec<u8>,
    ncmds: u32,
    padding: usize,
    sizeofcmds: Option<u32>,
}

impl Image {
    pub fn new(endian: Endianness, is_64: bool) -> Self {
        Image {
            endian,
            is_64,
            cputype: if is_64 {
                macho::CPU_TYPE_X86_64
            } else {
                macho::CPU_TYPE_X86
            },
            filetype: macho::MH_EXECUTE,
            flags: 0,
            commands: Vec::new(),
            ncmds: 0,
            padding: 0,
            sizeofcmds: None,
        }
    }

    fn writer(&self) -> Writer {
        Writer::new(self.endian)
    }

    fn align(&self) -> usize {
        if self.is_64 {
            8
        } else {
            4
        }
    }

    pub fn cputype(mut self, cputype: u32) -> Self {
        self.cputype = cputype;
        self
    }

    pub fn filetype(mut self, filetype: u32) -> Self {
        self.filetype = filetype;
        self
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Bytes inside `sizeofcmds` after the last command.
    pub fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /// Override the computed `sizeofcmds`.
    pub fn sizeofcmds(mut self, sizeofcmds: u32) -> Self {
        self.sizeofcmds = Some(sizeofcmds);
        self
    }

    /// A command with the given total size, and zeroed contents.
    pub fn command(self, cmd: u32, cmdsize: u32) -> Self {
        self.raw_command(cmd, cmdsize, cmdsize as usize)
    }

    /// A command whose declared size differs from the number of bytes written.
    pub fn raw_command(self, cmd: u32, cmdsize: u32, len: usize) -> Self {
        let mut w = self.writer();
        w.u32(cmd).u32(cmdsize).pad_to(len.max(8));
        self.push(w)
    }

    fn push(mut self, w: Writer) -> Self {
        self.commands.extend(w.buf);
        self.ncmds += 1;
        self
    }

    fn string_command(self, cmd: u32, fixed: &[u8], s: &[u8]) -> Self {
        let header_size = 8 + fixed.len();
        let align = self.align();
        let cmdsize = (header_size + s.len() + 1 + align - 1) & !(align - 1);
        let mut w = self.writer();
        w.u32(cmd)
            .u32(cmdsize as u32)
            .bytes(fixed)
            .bytes(s)
            .pad_to(cmdsize);
        self.push(w)
    }

    fn lc_str(&self, offset: u32) -> Writer {
        let mut w = self.writer();
        w.u32(offset);
        w
    }

    pub fn dylib(self, cmd: u32, name: &[u8]) -> Self {
        let mut fixed = self.lc_str(24);
        fixed.u32(2).u32(0x1_0000).u32(0x1_0000);
        self.string_command(cmd, &fixed.buf, name)
    }

    pub fn dylinker(self, name: &[u8]) -> Self {
        let fixed = self.lc_str(12);
        self.string_command(macho::LC_LOAD_DYLINKER, &fixed.buf, name)
    }

    pub fn rpath(self, path: &[u8]) -> Self {
        let fixed = self.lc_str(12);
        self.string_command(macho::LC_RPATH, &fixed.buf, path)
    }

    pub fn uuid(self, uuid: [u8; 16]) -> Self {
        let mut w = self.writer();
        w.u32(macho::LC_UUID).u32(24).bytes(&uuid);
        self.push(w)
    }

    pub fn code_signature(self, dataoff: u32, datasize: u32) -> Self {
        let mut w = self.writer();
        w.u32(macho::LC_CODE_SIGNATURE)
            .u32(16)
            .u32(dataoff)
            .u32(datasize);
        self.push(w)
    }

    pub fn encryption_info(self, cryptid: u32) -> Self {
        let mut w = self.writer();
        if self.is_64 {
            w.u32(macho::LC_ENCRYPTION_INFO_64).u32(24);
        } else {
            w.u32(macho::LC_ENCRYPTION_INFO).u32(20);
        }
        w.u32(0x4000).u32(0x1000).u32(cryptid);
        if self.is_64 {
            w.u32(0);
        }
        self.push(w)
    }

    pub fn entry_point(self, entryoff: u64) -> Self {
        let mut w = self.writer();
        w.u32(macho::LC_MAIN).u32(24).u64(entryoff).u64(0);
        self.push(w)
    }

    pub fn segment(
        self,
        name: &str,
        vmaddr: u64,
        vmsize: u64,
        maxprot: u32,
        initprot: u32,
    ) -> Self {
        let mut segname = [0u8; 16];
        segname[..name.len()].copy_from_slice(name.as_bytes());
        let mut w = self.writer();
        if self.is_64 {
            w.u32(macho::LC_SEGMENT_64)
                .u32(72)
                .bytes(&segname)
                .u64(vmaddr)
                .u64(vmsize)
                .u64(0)
                .u64(0);
        } else {
            w.u32(macho::LC_SEGMENT)
                .u32(56)
                .bytes(&segname)
                .u32(vmaddr as u32)
                .u32(vmsize as u32)
                .u32(0)
                .u32(0);
        }
        w.u32(maxprot).u32(initprot).u32(0).u32(0);
        self.push(w)
    }

    pub fn header_size(&self) -> usize {
        if self.is_64 {
            32
        } else {
            28
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let sizeofcmds = self
            .sizeofcmds
            .unwrap_or((self.commands.len() + self.padding) as u32);
        let mut w = self.writer();
        w.u32(if self.is_64 {
            macho::MH_MAGIC_64
        } else {
            macho::MH_MAGIC
        })
        .u32(self.cputype)
        .u32(3)
        .u32(self.filetype)
        .u32(self.ncmds)
        .u32(sizeofcmds)
        .u32(self.flags);
        if self.is_64 {
            w.u32(0);
        }
        w.bytes(&self.commands);
        let len = w.buf.len() + self.padding;
        w.pad_to(len);
        w.buf
    }
}

/// Offset alignment used for fat slices.
pub const FAT_ALIGN: usize = 0x1000;

/// Build a fat file with the slices at `FAT_ALIGN` boundaries.
pub fn fat(endian: Endianness, is_64: bool, slices: &[(u32, Vec<u8>)]) -> Vec<u8> {
    let mut w = Writer::new(endian);
    w.u32(if is_64 {
        macho::FAT_MAGIC_64
    } else {
        macho::FAT_MAGIC
    })
    .u32(slices.len() as u32);
    let mut offset = FAT_ALIGN;
    for (cputype, data) in slices {
        w.u32(*cputype).u32(3);
        if is_64 {
            w.u64(offset as u64).u64(data.len() as u64).u32(12).u32(0);
        } else {
            w.u32(offset as u32).u32(data.len() as u32).u32(12);
        }
        offset += (data.len() + FAT_ALIGN - 1) & !(FAT_ALIGN - 1);
    }
    let mut offset = FAT_ALIGN;
    for (_, data) in slices {
        w.pad_to(offset);
        w.bytes(data);
        offset += (data.len() + FAT_ALIGN - 1) & !(FAT_ALIGN - 1);
    }
    w.buf
}

/// A fat table with raw `(offset, size)` entries and no slice data.
///
/// Entries are truncated to 32 bits unless `is_64` is set.
pub fn fat_table(
    endian: Endianness,
    is_64: bool,
    nfat_arch: u32,
    entries: &[(u64, u64)],
    len: usize,
) -> Vec<u8> {
    let mut w = Writer::new(endian);
    w.u32(if is_64 {
        macho::FAT_MAGIC_64
    } else {
        macho::FAT_MAGIC
    })
    .u32(nfat_arch);
    for &(offset, size) in entries {
        w.u32(macho::CPU_TYPE_ARM64).u32(0);
        if is_64 {
            w.u64(offset).u64(size).u32(0).u32(0);
        } else {
            w.u32(offset as u32).u32(size as u32).u32(0);
        }
    }
    w.pad_to(len.max(w.buf.len()));
    w.buf
}

/// Write `data` to a new temporary file.
pub fn temp_file(data: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}
