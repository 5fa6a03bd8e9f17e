//! Safe packaging and extraction of scan archives.
//!
//! `scanpack-core` bundles source code, binaries and other named content sets
//! into tar and zip archives, and extracts them again while treating every
//! archive as hostile input: entry paths are confined to the output
//! directory, and a [`Safeguard`](security::Safeguard) bounds uncompressed
//! size, entry count, directory depth and wall-clock time.
//!
//! One archive can carry several content sets. Root content uses bare entry
//! paths; a named set lives under `__data__/<name>/`. A [`RoutingConfig`]
//! selects the sets a scan wants and strips the prefix on extraction.
//!
//! # Examples
//!
//! ```no_run
//! use scanpack_core::ArchiveKind;
//! use scanpack_core::ExtractionConstraints;
//! use scanpack_core::RoutingConfig;
//! use scanpack_core::extract;
//! use std::fs::File;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let routing = RoutingConfig::new(true, ["api"]);
//! let result = extract(
//!     ArchiveKind::Zip,
//!     File::open("sourcecode.zip")?,
//!     "sourcecode.zip",
//!     Path::new("/tmp/scan"),
//!     Some(&routing),
//!     Some(&ExtractionConstraints::default()),
//! )?;
//! println!("Extracted {} files", result.extracted_file_count);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod constraints;
pub mod creation;
pub mod error;
pub mod extraction;
pub mod filter;
pub mod formats;
pub mod io;
pub mod report;
pub mod routing;
pub mod security;
pub mod size;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export main API types
pub use api::extract;
pub use api::extract_file;
pub use api::extract_tar;
pub use archive::Archive;
pub use archive::ArchiveBuilder;
pub use constraints::CreationConstraints;
pub use constraints::ExtractionConstraints;
pub use creation::ArchiveAssembler;
pub use creation::ArchivesCreationResult;
pub use creation::CreationContext;
pub use creation::CreationReport;
pub use creation::compress_folder;
pub use creation::create_archives;
pub use creation::delete_archives;
pub use error::Result;
pub use error::SafeguardViolation;
pub use error::ScanpackError;
pub use filter::GlobFilter;
pub use formats::ArchiveKind;
pub use report::ExtractionResult;
pub use routing::KEEP_AS_IS;
pub use routing::PathTransformer;
pub use routing::RoutingConfig;
pub use routing::ScanConfiguration;
pub use routing::ScanType;
pub use routing::TransformDecision;
pub use size::Size;
