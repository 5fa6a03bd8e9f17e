//! Routing of archive entries to the content sets a scan wants.
//!
//! Archives carry root content as bare paths and named content sets under
//! `__data__/<reference-name>/`. A [`RoutingConfig`] decides per entry path
//! whether it is extracted and where it lands.

mod scan_config;

pub use scan_config::BINARIES_ARCHIVE_ROOT_REFERENCE;
pub use scan_config::SOURCECODE_ARCHIVE_ROOT_REFERENCE;
pub use scan_config::ApiConfiguration;
pub use scan_config::ClientCertificateConfiguration;
pub use scan_config::CodeScanConfiguration;
pub use scan_config::DataConfiguration;
pub use scan_config::DataConfigurationObject;
pub use scan_config::FileSystemConfiguration;
pub use scan_config::HeaderConfiguration;
pub use scan_config::RoutingConfigBuilder;
pub use scan_config::ScanConfiguration;
pub use scan_config::ScanType;
pub use scan_config::UsageConfiguration;
pub use scan_config::WebScanConfiguration;

use std::collections::BTreeSet;

use crate::filter::GlobFilter;

/// Reserved top-level folder holding named content sets.
pub const DATA_SECTION_FOLDER: &str = "__data__";

/// Outcome of routing one entry path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformDecision {
    /// Whether the entry is extracted at all.
    pub accepted: bool,
    /// Output path when it differs from the entry path.
    pub rewritten_path: Option<String>,
}

impl TransformDecision {
    /// Accepts the entry under its original path.
    #[must_use]
    pub const fn unchanged() -> Self {
        Self {
            accepted: true,
            rewritten_path: None,
        }
    }

    /// Accepts the entry under `path`.
    #[must_use]
    pub fn rewritten(path: impl Into<String>) -> Self {
        Self {
            accepted: true,
            rewritten_path: Some(path.into()),
        }
    }

    /// Skips the entry.
    #[must_use]
    pub const fn rejected() -> Self {
        Self {
            accepted: false,
            rewritten_path: None,
        }
    }

    /// Returns the path the entry is written to, or `None` if rejected.
    #[must_use]
    pub fn output_path<'a>(&'a self, original: &'a str) -> Option<&'a str> {
        if !self.accepted {
            return None;
        }
        Some(self.rewritten_path.as_deref().unwrap_or(original))
    }
}

/// Decides acceptance and output path of archive entries.
pub trait PathTransformer {
    /// Routes a raw entry path.
    fn transform(&self, path: &str) -> TransformDecision;
}

/// Transformer accepting every entry under its original path.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAsIs;

/// Stateless accept-all transformer used for trusted archives.
pub const KEEP_AS_IS: KeepAsIs = KeepAsIs;

impl PathTransformer for KeepAsIs {
    fn transform(&self, _path: &str) -> TransformDecision {
        TransformDecision::unchanged()
    }
}

/// Per-scan routing: which content sets are extracted and which files within
/// them are wanted.
///
/// # Examples
///
/// ```
/// use scanpack_core::{PathTransformer, RoutingConfig};
///
/// let routing = RoutingConfig::new(false, ["src", "api"]);
///
/// let decision = routing.transform("__data__/src/Main.x");
/// assert_eq!(decision.output_path("__data__/src/Main.x"), Some("Main.x"));
/// assert!(!routing.transform("__data__/other/readme.txt").accepted);
/// assert!(!routing.transform("notes.txt").accepted);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoutingConfig {
    root_folder_accepted: bool,
    accepted_reference_names: BTreeSet<String>,
    filter: GlobFilter,
}

impl RoutingConfig {
    /// Creates a routing configuration without file filters.
    pub fn new<I>(root_folder_accepted: bool, accepted_reference_names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            root_folder_accepted,
            accepted_reference_names: accepted_reference_names
                .into_iter()
                .map(Into::into)
                .collect(),
            filter: GlobFilter::new(),
        }
    }

    /// Starts building a routing configuration from a scan configuration.
    #[must_use]
    pub fn builder<'a>() -> RoutingConfigBuilder<'a> {
        RoutingConfigBuilder::default()
    }

    /// Replaces the include/exclude filter applied after routing.
    #[must_use]
    pub fn with_filter(mut self, filter: GlobFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Whether root (non data-section) content is extracted.
    #[must_use]
    pub const fn is_root_folder_accepted(&self) -> bool {
        self.root_folder_accepted
    }

    /// Accepted reference names in sorted order.
    pub fn accepted_reference_names(&self) -> impl Iterator<Item = &str> {
        self.accepted_reference_names.iter().map(String::as_str)
    }

    /// Include/exclude filter applied to accepted entries.
    #[must_use]
    pub const fn filter(&self) -> &GlobFilter {
        &self.filter
    }

    /// Finds the accepted reference name owning `remainder`.
    ///
    /// The longest matching name wins, so `src2/x` belongs to `src2` even when
    /// `src` is accepted as well.
    fn owning_reference_name(&self, remainder: &str) -> Option<&str> {
        self.accepted_reference_names
            .iter()
            .filter(|name| {
                remainder
                    .strip_prefix(name.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|name| name.len())
            .map(String::as_str)
    }

    fn route(&self, path: &str) -> TransformDecision {
        let Some(remainder) = data_section_remainder(path) else {
            return if self.root_folder_accepted {
                TransformDecision::unchanged()
            } else {
                TransformDecision::rejected()
            };
        };

        match self.owning_reference_name(remainder) {
            Some(name) => TransformDecision::rewritten(&remainder[name.len() + 1..]),
            None => TransformDecision::rejected(),
        }
    }
}

impl PathTransformer for RoutingConfig {
    fn transform(&self, path: &str) -> TransformDecision {
        let decision = self.route(path);
        match decision.output_path(path) {
            Some(output) if self.filter.matches(output) => decision,
            _ => TransformDecision::rejected(),
        }
    }
}

/// Returns the part after `__data__/`, or `""` for the bare folder name.
fn data_section_remainder(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(DATA_SECTION_FOLDER)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix('/')
}
