//! Display names for Mach-O constants.
//!
//! All lookups are total: a value without a known name is formatted as
//! `unknown (0x...)` instead of failing, so a report can always be produced.

use std::borrow::Cow;

use crate::macho::*;

#[derive(Debug, Clone, Copy)]
struct Name {
    value: u32,
    name: &'static str,
}

macro_rules! names {
    ($($name:ident),+ $(,)?) => ( [ $(Name { value: $name, name: stringify!($name), }),+ ] )
}

static FILETYPES: &[Name] = &names!(
    MH_OBJECT,
    MH_EXECUTE,
    MH_FVMLIB,
    MH_CORE,
    MH_PRELOAD,
    MH_DYLIB,
    MH_DYLINKER,
    MH_BUNDLE,
    MH_DYLIB_STUB,
    MH_DSYM,
    MH_KEXT_BUNDLE,
    MH_FILESET,
);

static CPUTYPES: &[Name] = &names!(
    CPU_TYPE_ANY,
    CPU_TYPE_VAX,
    CPU_TYPE_MC680X0,
    CPU_TYPE_X86,
    CPU_TYPE_X86_64,
    CPU_TYPE_MIPS,
    CPU_TYPE_MC98000,
    CPU_TYPE_HPPA,
    CPU_TYPE_ARM,
    CPU_TYPE_ARM64,
    CPU_TYPE_ARM64_32,
    CPU_TYPE_MC88000,
    CPU_TYPE_SPARC,
    CPU_TYPE_I860,
    CPU_TYPE_ALPHA,
    CPU_TYPE_POWERPC,
    CPU_TYPE_POWERPC64,
);

static HEADER_FLAGS: &[Name] = &names!(
    MH_NOUNDEFS,
    MH_INCRLINK,
    MH_DYLDLINK,
    MH_BINDATLOAD,
    MH_PREBOUND,
    MH_SPLIT_SEGS,
    MH_LAZY_INIT,
    MH_TWOLEVEL,
    MH_FORCE_FLAT,
    MH_NOMULTIDEFS,
    MH_NOFIXPREBINDING,
    MH_PREBINDABLE,
    MH_ALLMODSBOUND,
    MH_SUBSECTIONS_VIA_SYMBOLS,
    MH_CANONICAL,
    MH_WEAK_DEFINES,
    MH_BINDS_TO_WEAK,
    MH_ALLOW_STACK_EXECUTION,
    MH_ROOT_SAFE,
    MH_SETUID_SAFE,
    MH_NO_REEXPORTED_DYLIBS,
    MH_PIE,
    MH_DEAD_STRIPPABLE_DYLIB,
    MH_HAS_TLV_DESCRIPTORS,
    MH_NO_HEAP_EXECUTION,
    MH_APP_EXTENSION_SAFE,
    MH_NLIST_OUTOFSYNC_WITH_DYLDINFO,
    MH_SIM_SUPPORT,
    MH_DYLIB_IN_CACHE,
);

static LOAD_COMMANDS: &[Name] = &names!(
    LC_SEGMENT,
    LC_SYMTAB,
    LC_THREAD,
    LC_UNIXTHREAD,
    LC_DYSYMTAB,
    LC_LOAD_DYLIB,
    LC_ID_DYLIB,
    LC_LOAD_DYLINKER,
    LC_ID_DYLINKER,
    LC_LOAD_WEAK_DYLIB,
    LC_SEGMENT_64,
    LC_UUID,
    LC_RPATH,
    LC_CODE_SIGNATURE,
    LC_REEXPORT_DYLIB,
    LC_LAZY_LOAD_DYLIB,
    LC_ENCRYPTION_INFO,
    LC_DYLD_INFO,
    LC_DYLD_INFO_ONLY,
    LC_LOAD_UPWARD_DYLIB,
    LC_VERSION_MIN_MACOSX,
    LC_FUNCTION_STARTS,
    LC_MAIN,
    LC_DATA_IN_CODE,
    LC_SOURCE_VERSION,
    LC_ENCRYPTION_INFO_64,
    LC_BUILD_VERSION,
    LC_DYLD_EXPORTS_TRIE,
    LC_DYLD_CHAINED_FIXUPS,
);

fn lookup(names: &[Name], value: u32) -> Cow<'static, str> {
    match names.iter().find(|name| name.value == value) {
        Some(name) => Cow::Borrowed(name.name),
        None => Cow::Owned(format!("unknown (0x{:x})", value)),
    }
}

/// Return the canonical name of a Mach-O file type code (`MachHeader*::filetype`).
///
/// ```
/// assert_eq!(macho_audit::filetype_name(macho_audit::macho::MH_EXECUTE), "MH_EXECUTE");
/// assert_eq!(macho_audit::filetype_name(0x42), "unknown (0x42)");
/// ```
pub fn filetype_name(filetype: u32) -> Cow<'static, str> {
    lookup(FILETYPES, filetype)
}

/// Return the name of a CPU type (`MachHeader*::cputype` or `FatArch*::cputype`).
pub fn cputype_name(cputype: u32) -> Cow<'static, str> {
    lookup(CPUTYPES, cputype)
}

/// Return the name of a load command type (`LoadCommand::cmd`).
pub fn load_command_name(cmd: u32) -> Cow<'static, str> {
    lookup(LOAD_COMMANDS, cmd)
}

/// Return an iterator over the names of the `MH_*` flags set in `flags`.
///
/// Bits without a known name are reported together in a final
/// `unknown (0x...)` entry.
pub fn header_flag_names(flags: u32) -> FlagNames {
    FlagNames {
        remaining: flags,
        index: 0,
    }
}

/// An iterator over the names of the flags in a `MachHeader*::flags` value.
#[derive(Debug, Clone)]
pub struct FlagNames {
    remaining: u32,
    index: usize,
}

impl Iterator for FlagNames {
    type Item = Cow<'static, str>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(flag) = HEADER_FLAGS.get(self.index) {
            self.index += 1;
            if self.remaining & flag.value != 0 {
                self.remaining &= !flag.value;
                return Some(Cow::Borrowed(flag.name));
            }
        }
        if self.remaining != 0 {
            let unknown = self.remaining;
            self.remaining = 0;
            return Some(Cow::Owned(format!("unknown (0x{:x})", unknown)));
        }
        None
    }
}
