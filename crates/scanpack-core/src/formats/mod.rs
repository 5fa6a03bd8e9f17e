//! Archive formats exposed as sequential entry streams.

pub mod detect;
pub mod tar;
pub mod traits;
pub mod zip;

pub use detect::ArchiveKind;
pub use detect::detect_kind;
pub use tar::TarEntryStream;
pub use tar::TarSource;
pub use tar::open_tar;
pub use traits::ArchiveEntry;
pub use traits::EntryStream;
pub use zip::ZipEntryStream;
