mod handle;
mod reader;
mod status;

pub use handle::{IMAGE_DOS_SIGNATURE, ProcessMemory};
pub use reader::{ReadMemory, WriteMemory};
pub use status::ProcessStatus;
