//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use scanpack_core::ArchiveKind;
use scanpack_core::ScanType;
use scanpack_core::Size;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scanpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract archive contents
    Extract(ExtractArgs),
    /// Create the source code and binaries archives of a scan configuration
    Create(CreateArgs),
    /// Compress a plain folder into one archive
    Compress(CompressArgs),
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Archive kind (default: from the file extension, falling back to tar)
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<ArchiveKind>,

    /// Maximum total uncompressed size, e.g. 512KB, 20MB, 1GB
    #[arg(long, default_value = "1GB", value_parser = parse_size)]
    pub max_size: Size,

    /// Maximum number of file entries
    #[arg(long, default_value = "100000", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_entries: u64,

    /// Maximum directory depth
    #[arg(long, default_value = "128", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_depth: u64,

    /// Timeout for the whole extraction, in seconds
    #[arg(long, default_value = "3600", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Scan configuration (JSON) used to route content sets
    #[arg(long, value_name = "FILE", requires = "scan_type")]
    pub scan_config: Option<PathBuf>,

    /// Scan type the archive is extracted for, e.g. code-scan
    #[arg(long, value_parser = parse_scan_type, requires = "scan_config")]
    pub scan_type: Option<ScanType>,

    /// Include pattern applied after routing (glob, can be repeated)
    #[arg(long = "include", short = 'i', value_name = "PATTERN", requires = "scan_config")]
    pub include: Vec<String>,

    /// Exclude pattern applied after routing (glob, can be repeated)
    #[arg(long = "exclude", short = 'x', value_name = "PATTERN", requires = "scan_config")]
    pub exclude: Vec<String>,
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Scan configuration (JSON)
    #[arg(value_name = "SCAN_CONFIG")]
    pub scan_config: PathBuf,

    /// Directory configured paths are relative to
    #[arg(value_name = "WORKING_DIR")]
    pub working_dir: PathBuf,

    /// Directory receiving the archives
    #[arg(value_name = "TARGET_DIR")]
    pub target_dir: PathBuf,

    /// Create empty placeholders for missing configured paths
    #[arg(long)]
    pub create_missing_files: bool,
}

#[derive(clap::Args)]
pub struct CompressArgs {
    /// Folder to compress
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Archive file to write (replaced if it exists)
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Archive kind (default: from the target extension, falling back to tar)
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<ArchiveKind>,
}

fn parse_kind(s: &str) -> Result<ArchiveKind, String> {
    s.parse().map_err(|e: scanpack_core::ScanpackError| e.to_string())
}

fn parse_size(s: &str) -> Result<Size, String> {
    Size::parse(s).map_err(|e| e.to_string())
}

fn parse_scan_type(s: &str) -> Result<ScanType, String> {
    s.parse().map_err(|e: scanpack_core::ScanpackError| e.to_string())
}
