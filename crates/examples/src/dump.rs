use std::io::{self, Write};
use std::{fmt, str};

use macho_audit::{
    cputype_name, load_command_name, ArchitectureSlice, Bitness, FatArchInfo, Header,
    LoadCommand, LoadCommandVariant, MachOObject, SecurityProperties,
};

/// Select the parts of a file to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    pub header: bool,
    pub arches: bool,
    pub load_commands: bool,
    pub security: bool,
}

impl PrintOptions {
    pub fn all() -> Self {
        PrintOptions {
            header: true,
            arches: true,
            load_commands: true,
            security: true,
        }
    }

    pub fn none() -> Self {
        PrintOptions {
            header: false,
            arches: false,
            load_commands: false,
            security: false,
        }
    }
}

/// Print the selected parts of an open file.
///
/// Parse errors are written to `e` and printing continues with the next
/// architecture. Only errors writing to `w` or `e` are returned.
pub fn print(
    w: &mut dyn Write,
    e: &mut dyn Write,
    file: &MachOObject,
    options: &PrintOptions,
) -> io::Result<()> {
    let mut p = Printer::new(w, e, options);
    p.field("Format", format_args!("{} ({})", file.class(), file.endian()))?;
    p.field_inline_string("Name", file.base_name().as_bytes())?;
    p.field_hex("Size", file.len())?;
    let Some(arches) = file.architectures().print_err(&mut p)? else {
        return Ok(());
    };
    for arch in &arches {
        print_arch(&mut p, arch)?;
    }
    Ok(())
}

struct Printer<'a> {
    w: &'a mut dyn Write,
    e: &'a mut dyn Write,
    options: &'a PrintOptions,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn new(w: &'a mut dyn Write, e: &'a mut dyn Write, options: &'a PrintOptions) -> Self {
        Self {
            w,
            e,
            options,
            indent: 0,
        }
    }

    fn print_indent(&mut self) -> io::Result<()> {
        if self.indent != 0 {
            write!(self.w, "{:-1$}", " ", self.indent * 4)?;
        }
        Ok(())
    }

    fn print_string(&mut self, s: &[u8]) -> io::Result<()> {
        if let Ok(s) = str::from_utf8(s) {
            write!(self.w, "\"{}\"", s)
        } else {
            write!(self.w, "{:X?}", s)
        }
    }

    fn group<F>(&mut self, name: &str, f: F) -> io::Result<()>
    where
        F: FnOnce(&mut Self) -> io::Result<()>,
    {
        self.print_indent()?;
        writeln!(self.w, "{} {{", name)?;
        self.indent += 1;
        let result = f(self);
        self.indent -= 1;
        result?;
        self.print_indent()?;
        writeln!(self.w, "}}")
    }

    fn field_name(&mut self, name: &str) -> io::Result<()> {
        self.print_indent()?;
        if !name.is_empty() {
            write!(self.w, "{}: ", name)?;
        }
        Ok(())
    }

    fn field<T: fmt::Display>(&mut self, name: &str, value: T) -> io::Result<()> {
        self.field_name(name)?;
        writeln!(self.w, "{}", value)
    }

    fn field_hex<T: fmt::UpperHex>(&mut self, name: &str, value: T) -> io::Result<()> {
        self.field_name(name)?;
        writeln!(self.w, "0x{:X}", value)
    }

    fn field_bool(&mut self, name: &str, value: bool) -> io::Result<()> {
        self.field(name, if value { "yes" } else { "no" })
    }

    fn field_name_hex<N: fmt::Display>(&mut self, name: &str, value: u32, s: N) -> io::Result<()> {
        self.field_name(name)?;
        writeln!(self.w, "{} (0x{:X})", s, value)
    }

    fn field_inline_string(&mut self, name: &str, s: &[u8]) -> io::Result<()> {
        self.field_name(name)?;
        self.print_string(s)?;
        writeln!(self.w)
    }

    fn field_strings(&mut self, name: &str, strings: &[&[u8]]) -> io::Result<()> {
        for s in strings {
            self.field_inline_string(name, s)?;
        }
        Ok(())
    }
}

trait PrintErr<T> {
    fn print_err(self, p: &mut Printer<'_>) -> io::Result<Option<T>>;
}

impl<T, E: fmt::Display> PrintErr<T> for Result<T, E> {
    fn print_err(self, p: &mut Printer<'_>) -> io::Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(err) => {
                writeln!(p.e, "Error: {}", err)?;
                Ok(None)
            }
        }
    }
}

fn print_arch(p: &mut Printer<'_>, arch: &ArchitectureSlice<'_>) -> io::Result<()> {
    p.group("Architecture", |p| {
        if p.options.arches {
            p.field_hex("Offset", arch.offset())?;
            p.field_hex("Size", arch.size())?;
            p.field("Endian", arch.endian())?;
            p.field(
                "Bitness",
                match arch.bitness() {
                    Bitness::Bits32 => 32,
                    Bitness::Bits64 => 64,
                },
            )?;
            if let Some(fat_arch) = arch.fat_arch() {
                print_fat_arch(p, &fat_arch)?;
            }
        }
        if let Some(header) = arch.header().print_err(p)? {
            if p.options.header {
                print_header(p, &header)?;
            }
        } else {
            return Ok(());
        }
        if p.options.load_commands {
            print_load_commands(p, arch)?;
        }
        if p.options.security {
            if let Some(properties) = arch.properties().print_err(p)? {
                print_security(p, &properties)?;
            }
        }
        Ok(())
    })
}

fn print_fat_arch(p: &mut Printer<'_>, fat_arch: &FatArchInfo) -> io::Result<()> {
    p.group("FatArch", |p| {
        p.field_name_hex("CpuType", fat_arch.cputype, cputype_name(fat_arch.cputype))?;
        p.field_hex("CpuSubtype", fat_arch.cpusubtype)?;
        p.field("Align", fat_arch.align)
    })
}

fn print_header(p: &mut Printer<'_>, header: &Header) -> io::Result<()> {
    p.group("MachHeader", |p| {
        p.field_hex("Magic", header.magic)?;
        p.field_name_hex("CpuType", header.cputype, header.cputype_name())?;
        p.field_hex("CpuSubtype", header.cpusubtype)?;
        p.field_name_hex("FileType", header.filetype, header.filetype_name())?;
        p.field("NumberOfCmds", header.ncmds)?;
        p.field_hex("SizeOfCmds", header.sizeofcmds)?;
        p.field_hex("Flags", header.flags)?;
        p.indent += 1;
        for name in header.flag_names() {
            p.print_indent()?;
            writeln!(p.w, "{}", name)?;
        }
        p.indent -= 1;
        Ok(())
    })
}

fn print_load_commands(p: &mut Printer<'_>, arch: &ArchitectureSlice<'_>) -> io::Result<()> {
    if let Some(mut commands) = arch.commands().print_err(p)? {
        while let Some(Some(command)) = commands.next().print_err(p)? {
            print_load_command(p, &command)?;
        }
    }
    Ok(())
}

fn print_load_command(p: &mut Printer<'_>, command: &LoadCommand<'_>) -> io::Result<()> {
    p.group("LoadCommand", |p| {
        p.field_name_hex("Cmd", command.cmd(), load_command_name(command.cmd()))?;
        p.field_hex("Offset", command.offset())?;
        p.field_hex("CmdSize", command.cmdsize())?;
        let Some(variant) = command.variant().print_err(p)? else {
            return Ok(());
        };
        match variant {
            LoadCommandVariant::Segment32(..) | LoadCommandVariant::Segment64(..) => {
                if let Some(Some(segment)) = command.segment().print_err(p)? {
                    p.field_inline_string("SegmentName", segment.name)?;
                    p.field_hex("VmAddress", segment.vmaddr)?;
                    p.field_hex("VmSize", segment.vmsize)?;
                    p.field_hex("FileOffset", segment.fileoff)?;
                    p.field_hex("FileSize", segment.filesize)?;
                    p.field_hex("MaxProt", segment.maxprot)?;
                    p.field_hex("InitProt", segment.initprot)?;
                    p.field("NumberOfSections", segment.nsects)?;
                    p.field_hex("Flags", segment.flags)?;
                }
            }
            LoadCommandVariant::Dylib(x) | LoadCommandVariant::IdDylib(x) => {
                if let Some(name) = command.string(x.dylib.name).print_err(p)? {
                    p.field_inline_string("Name", name)?;
                }
            }
            LoadCommandVariant::LoadDylinker(x) | LoadCommandVariant::IdDylinker(x) => {
                if let Some(name) = command.string(x.name).print_err(p)? {
                    p.field_inline_string("Name", name)?;
                }
            }
            LoadCommandVariant::Rpath(x) => {
                if let Some(path) = command.string(x.path).print_err(p)? {
                    p.field_inline_string("Path", path)?;
                }
            }
            LoadCommandVariant::Uuid(x) => {
                p.field_name("Uuid")?;
                for byte in x.uuid {
                    write!(p.w, "{:02X}", byte)?;
                }
                writeln!(p.w)?;
            }
            LoadCommandVariant::CodeSignature(x) => {
                p.field_hex("DataOffset", x.dataoff.get(command.endian()))?;
                p.field_hex("DataSize", x.datasize.get(command.endian()))?;
            }
            LoadCommandVariant::EncryptionInfo32(x) => {
                p.field("CryptId", x.cryptid.get(command.endian()))?;
            }
            LoadCommandVariant::EncryptionInfo64(x) => {
                p.field("CryptId", x.cryptid.get(command.endian()))?;
            }
            LoadCommandVariant::EntryPoint(x) => {
                p.field_hex("EntryOffset", x.entryoff.get(command.endian()))?;
                p.field_hex("StackSize", x.stacksize.get(command.endian()))?;
            }
            _ => {}
        }
        Ok(())
    })
}

fn print_security(p: &mut Printer<'_>, properties: &SecurityProperties<'_>) -> io::Result<()> {
    p.group("Security", |p| {
        p.field_bool("Pie", properties.pie)?;
        p.field_bool("AllowStackExecution", properties.allow_stack_execution)?;
        p.field_bool("NoHeapExecution", properties.no_heap_execution)?;
        p.field_bool("CodeSignature", properties.code_signature)?;
        p.field_bool("Encrypted", properties.encrypted)?;
        p.field_bool("PageZero", properties.page_zero)?;
        p.field_strings("WritableExecutableSegment", &properties.writable_executable_segments)?;
        if let Some(entry) = properties.entry_offset {
            p.field_hex("EntryOffset", entry)?;
        }
        if let Some(dylinker) = properties.dylinker {
            p.field_inline_string("Dylinker", dylinker)?;
        }
        p.field_strings("Rpath", &properties.rpaths)?;
        p.field_strings("Dylib", &properties.dylibs)
    })
}
