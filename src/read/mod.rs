//! Interface for reading Mach-O files.

mod read_ref;
pub use read_ref::*;

mod mapper;
pub use mapper::{MapMode, OpenOptions, DEFAULT_MAX_SIZE};
pub(crate) use mapper::MappedFile;

mod kind;
pub use kind::*;

mod header;
pub use header::*;

mod fat;
pub use fat::*;

mod arch;
pub use arch::*;

mod load_command;
pub use load_command::*;

mod audit;
pub use audit::*;

mod file;
pub use file::*;
