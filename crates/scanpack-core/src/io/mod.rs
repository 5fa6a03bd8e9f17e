//! I/O helpers shared by extraction and creation.

pub mod copy;
pub mod counting;

pub use copy::CopyBuffer;
pub use copy::copy_entry;
pub use counting::CountingReader;
pub use counting::CountingWriter;
