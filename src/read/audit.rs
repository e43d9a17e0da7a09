use crate::endian::Endianness;
use crate::error::Result;
use crate::macho;
use crate::read::{ArchitectureSlice, Header, LoadCommand, LoadCommandVariant, Segment};

/// The exploit mitigation properties of one architecture slice.
///
/// Built from the mach header flags and a single walk of the load commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityProperties<'data> {
    /// The mach header of the slice.
    pub header: Header,
    /// `MH_PIE` is set.
    pub pie: bool,
    /// `MH_ALLOW_STACK_EXECUTION` is set.
    pub allow_stack_execution: bool,
    /// `MH_NO_HEAP_EXECUTION` is set.
    pub no_heap_execution: bool,
    /// An `LC_CODE_SIGNATURE` command is present.
    ///
    /// The signature itself is not verified.
    pub code_signature: bool,
    /// An `LC_ENCRYPTION_INFO` or `LC_ENCRYPTION_INFO_64` command has a
    /// nonzero `cryptid`.
    pub encrypted: bool,
    /// A `__PAGEZERO` segment maps address zero with no access.
    pub page_zero: bool,
    /// Names of segments that are initially both writable and executable.
    pub writable_executable_segments: Vec<&'data [u8]>,
    /// The `LC_MAIN` entry point offset.
    pub entry_offset: Option<u64>,
    /// The `LC_UUID` value.
    pub uuid: Option<[u8; 16]>,
    /// The path of the dynamic linker from `LC_LOAD_DYLINKER`.
    pub dylinker: Option<&'data [u8]>,
    /// The `LC_RPATH` entries, in command order.
    pub rpaths: Vec<&'data [u8]>,
    /// The paths of the dependent libraries, in command order.
    pub dylibs: Vec<&'data [u8]>,
}

impl<'data> SecurityProperties<'data> {
    pub(super) fn parse(slice: &ArchitectureSlice<'data>) -> Result<Self> {
        let header = slice.header()?;
        let mut properties = SecurityProperties {
            header,
            pie: header.is_pie(),
            allow_stack_execution: header.allows_stack_execution(),
            no_heap_execution: header.no_heap_execution(),
            code_signature: false,
            encrypted: false,
            page_zero: false,
            writable_executable_segments: Vec::new(),
            entry_offset: None,
            uuid: None,
            dylinker: None,
            rpaths: Vec::new(),
            dylibs: Vec::new(),
        };
        let mut commands = slice.commands()?;
        while let Some(command) = commands.next()? {
            properties.add(slice.endian(), &command)?;
        }
        Ok(properties)
    }

    fn add(&mut self, endian: Endianness, command: &LoadCommand<'data>) -> Result<()> {
        match command.variant()? {
            LoadCommandVariant::Segment32(..) | LoadCommandVariant::Segment64(..) => {
                if let Some(segment) = command.segment()? {
                    self.add_segment(&segment);
                }
            }
            LoadCommandVariant::Dylib(dylib) => {
                self.dylibs.push(command.string(dylib.dylib.name)?);
            }
            LoadCommandVariant::LoadDylinker(dylinker) => {
                self.dylinker = Some(command.string(dylinker.name)?);
            }
            LoadCommandVariant::Rpath(rpath) => {
                self.rpaths.push(command.string(rpath.path)?);
            }
            LoadCommandVariant::Uuid(uuid) => self.uuid = Some(uuid.uuid),
            LoadCommandVariant::CodeSignature(_) => self.code_signature = true,
            LoadCommandVariant::EncryptionInfo32(info) => {
                self.encrypted |= info.cryptid.get(endian) != 0;
            }
            LoadCommandVariant::EncryptionInfo64(info) => {
                self.encrypted |= info.cryptid.get(endian) != 0;
            }
            LoadCommandVariant::EntryPoint(entry) => {
                self.entry_offset = Some(entry.entryoff.get(endian));
            }
            _ => {}
        }
        Ok(())
    }

    fn add_segment(&mut self, segment: &Segment<'data>) {
        if segment.is_writable_and_executable() {
            self.writable_executable_segments.push(segment.name);
        }
        if segment.name == b"__PAGEZERO"
            && segment.vmaddr == 0
            && segment.vmsize != 0
            && segment.initprot
                & (macho::VM_PROT_READ | macho::VM_PROT_WRITE | macho::VM_PROT_EXECUTE)
                == 0
        {
            self.page_zero = true;
        }
    }

    /// Return true if the image has no writable and executable segments
    /// and does not request an executable stack.
    pub fn is_wx_clean(&self) -> bool {
        !self.allow_stack_execution && self.writable_executable_segments.is_empty()
    }
}
