//! # `macho-audit`
//!
//! The `macho-audit` crate reads Mach-O files to extract the properties that
//! matter for exploit mitigation auditing.
//!
//! It opens a file, classifies it as a 32-bit, 64-bit or universal ("fat")
//! container, resolves the architecture slices, and walks the load commands
//! of each slice. Every offset and size read from the file is bounds checked,
//! so malformed input results in an [`Error`] rather than a panic.
//!
//! See the [`MachOObject` struct](./read/struct.MachOObject.html) for details.
//!
//! ## Example
//!
//! ```no_run
//! # fn main() -> macho_audit::Result<()> {
//! let file = macho_audit::MachOObject::open("/usr/lib/dyld")?;
//! for arch in file.architectures()? {
//!     let properties = arch.properties()?;
//!     println!(
//!         "{} pie={} code_signature={}",
//!         properties.header.filetype_name(),
//!         properties.pie,
//!         properties.code_signature,
//!     );
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

pub mod endian;
pub use endian::*;

pub mod macho;

mod pod;
pub use pod::{Bytes, Pod};

mod error;
pub use error::{Error, ErrorKind, Result};

pub mod names;
pub use names::{cputype_name, filetype_name, header_flag_names, load_command_name};

pub mod read;
pub use read::*;
