//! Archive creation: named path sets packaged with the routing layout.

pub mod archives;
pub mod context;
pub mod report;
pub mod tar;
pub mod walker;
pub mod writer;
pub mod zip;

pub use archives::ArchiveAssembler;
pub use archives::ArchivesCreationResult;
pub use archives::BINARIES_ARCHIVE_NAME;
pub use archives::SOURCECODE_ARCHIVE_NAME;
pub use archives::compress_folder;
pub use archives::create_archives;
pub use archives::delete_archives;
pub use context::CreationContext;
pub use context::CreationPathSet;
pub use context::ROOT_REFERENCE_NAME;
pub use report::CreationReport;
pub use writer::ArchiveWriter;
pub use writer::write_archive;
