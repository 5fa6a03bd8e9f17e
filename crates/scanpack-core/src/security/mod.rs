//! Defenses against hostile archives.

pub mod path;
pub mod safeguard;
pub mod zipbomb;

pub use path::resolve_entry_path;
pub use safeguard::Safeguard;
pub use safeguard::SourceBudget;
pub use safeguard::SourceReader;
pub use zipbomb::validate_compression_ratio;
pub use zipbomb::validate_created_archive;
