//! Scan configuration model and its derivation into a [`RoutingConfig`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use super::RoutingConfig;
use crate::Result;
use crate::ScanpackError;
use crate::filter::GlobFilter;

/// Reference marking the root of the source code archive.
pub const SOURCECODE_ARCHIVE_ROOT_REFERENCE: &str = "__sourcecode_archive_root__";

/// Reference marking the root of the binaries archive.
pub const BINARIES_ARCHIVE_ROOT_REFERENCE: &str = "__binaries_archive_root__";

/// Files and folders of one content set, relative to the working directory
/// or absolute inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileSystemConfiguration {
    /// Single files.
    pub files: Vec<String>,
    /// Folders, packaged recursively.
    pub folders: Vec<String>,
}

/// One named entry of `data.sources` or `data.binaries`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataConfigurationObject {
    /// Unique reference name.
    pub name: String,
    /// Paths belonging to the set.
    pub file_system: Option<FileSystemConfiguration>,
    /// Include patterns.
    pub includes: Vec<String>,
    /// Exclude patterns.
    pub excludes: Vec<String>,
}

/// Named content sets available to scans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataConfiguration {
    /// Source sets, packaged into the zip archive.
    pub sources: Vec<DataConfigurationObject>,
    /// Binary sets, packaged into the tar archive.
    pub binaries: Vec<DataConfigurationObject>,
}

/// Code scan section, including the legacy root file system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeScanConfiguration {
    /// Legacy paths packaged at the archive root.
    pub file_system: Option<FileSystemConfiguration>,
    /// Include patterns for the legacy paths.
    pub includes: Vec<String>,
    /// Exclude patterns for the legacy paths.
    pub excludes: Vec<String>,
    /// Referenced content sets.
    #[serde(rename = "use")]
    pub uses: Vec<String>,
}

/// Scan section that only references content sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageConfiguration {
    /// Referenced content sets.
    #[serde(rename = "use")]
    pub uses: Vec<String>,
}

/// API definition of a web scan.
pub type ApiConfiguration = UsageConfiguration;

/// Client certificate of a web scan.
pub type ClientCertificateConfiguration = UsageConfiguration;

/// Header definition of a web scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfiguration {
    /// Header name.
    pub name: String,
    /// Referenced content sets holding header values.
    #[serde(rename = "use")]
    pub uses: Vec<String>,
}

/// Web scan section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebScanConfiguration {
    /// API definition.
    pub api: Option<ApiConfiguration>,
    /// Client certificate.
    pub client_certificate: Option<ClientCertificateConfiguration>,
    /// Additional headers.
    pub headers: Vec<HeaderConfiguration>,
}

/// The subset of a scan job configuration relevant to archives.
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanConfiguration {
    /// Code scan setup.
    pub code_scan: Option<CodeScanConfiguration>,
    /// Web scan setup.
    pub web_scan: Option<WebScanConfiguration>,
    /// License scan setup.
    pub license_scan: Option<UsageConfiguration>,
    /// Secret scan setup.
    pub secret_scan: Option<UsageConfiguration>,
    /// Infrastructure-as-code scan setup.
    pub iac_scan: Option<UsageConfiguration>,
    /// Named content sets.
    pub data: Option<DataConfiguration>,
}

impl ScanConfiguration {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidConfiguration` for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ScanpackError::config(format!("invalid scan configuration: {e}")))
    }

    fn references_for(&self, scan_type: ScanType) -> impl Iterator<Item = &str> {
        let mut lists: Vec<&[String]> = Vec::new();

        match scan_type {
            ScanType::CodeScan => {
                if let Some(code_scan) = &self.code_scan {
                    lists.push(&code_scan.uses);
                }
            }
            ScanType::WebScan => {
                if let Some(web_scan) = &self.web_scan {
                    if let Some(api) = &web_scan.api {
                        lists.push(&api.uses);
                    }
                    if let Some(certificate) = &web_scan.client_certificate {
                        lists.push(&certificate.uses);
                    }
                    for header in &web_scan.headers {
                        lists.push(&header.uses);
                    }
                }
            }
            ScanType::LicenseScan => {
                if let Some(section) = &self.license_scan {
                    lists.push(&section.uses);
                }
            }
            ScanType::SecretScan => {
                if let Some(section) = &self.secret_scan {
                    lists.push(&section.uses);
                }
            }
            ScanType::IacScan => {
                if let Some(section) = &self.iac_scan {
                    lists.push(&section.uses);
                }
            }
            ScanType::InfraScan | ScanType::Analytics => {}
        }

        lists.into_iter().flatten().map(String::as_str)
    }
}

/// Kind of scan an archive is extracted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanType {
    /// Static code analysis.
    CodeScan,
    /// Web application scan.
    WebScan,
    /// Infrastructure scan.
    InfraScan,
    /// License scan.
    LicenseScan,
    /// Secret scan.
    SecretScan,
    /// Infrastructure-as-code scan.
    IacScan,
    /// Code analytics.
    Analytics,
}

impl ScanType {
    const ALL: [Self; 7] = [
        Self::CodeScan,
        Self::WebScan,
        Self::InfraScan,
        Self::LicenseScan,
        Self::SecretScan,
        Self::IacScan,
        Self::Analytics,
    ];

    /// Returns the kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CodeScan => "code-scan",
            Self::WebScan => "web-scan",
            Self::InfraScan => "infra-scan",
            Self::LicenseScan => "license-scan",
            Self::SecretScan => "secret-scan",
            Self::IacScan => "iac-scan",
            Self::Analytics => "analytics",
        }
    }

    /// Scan types that see root content regardless of references.
    const fn always_accepts_root(self) -> bool {
        matches!(self, Self::CodeScan | Self::Analytics)
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanType {
    type Err = ScanpackError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|scan_type| scan_type.as_str() == wanted)
            .ok_or_else(|| ScanpackError::config(format!("unknown scan type: {s}")))
    }
}

/// Builds a [`RoutingConfig`] for one scan from a [`ScanConfiguration`].
///
/// # Examples
///
/// ```
/// use scanpack_core::RoutingConfig;
/// use scanpack_core::ScanConfiguration;
/// use scanpack_core::ScanType;
///
/// let model = ScanConfiguration::from_json(r#"{"licenseScan": {"use": ["sbom"]}}"#)?;
/// let routing = RoutingConfig::builder()
///     .model(&model)
///     .scan_type(ScanType::LicenseScan)
///     .build()?;
///
/// assert!(!routing.is_root_folder_accepted());
/// assert_eq!(routing.accepted_reference_names().collect::<Vec<_>>(), ["sbom"]);
/// # Ok::<(), scanpack_core::ScanpackError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct RoutingConfigBuilder<'a> {
    model: Option<&'a ScanConfiguration>,
    scan_type: Option<ScanType>,
    includes: Vec<String>,
    excludes: Vec<String>,
}

impl<'a> RoutingConfigBuilder<'a> {
    /// Sets the scan configuration.
    #[must_use]
    pub fn model(mut self, model: &'a ScanConfiguration) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the scan type.
    #[must_use]
    pub fn scan_type(mut self, scan_type: ScanType) -> Self {
        self.scan_type = Some(scan_type);
        self
    }

    /// Adds include patterns.
    #[must_use]
    pub fn include_patterns<I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.includes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds exclude patterns.
    #[must_use]
    pub fn exclude_patterns<I>(mut self, patterns: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Derives the routing configuration.
    ///
    /// # Errors
    ///
    /// Returns `ScanpackError::InvalidConfiguration` if the model or scan type
    /// is missing, and `ScanpackError::InvalidGlobPattern` for bad patterns.
    pub fn build(self) -> Result<RoutingConfig> {
        let model = self
            .model
            .ok_or_else(|| ScanpackError::config("scan configuration model is required"))?;
        let scan_type = self
            .scan_type
            .ok_or_else(|| ScanpackError::config("scan type is required"))?;

        let mut root_folder_accepted = scan_type.always_accepts_root();
        let mut accepted_reference_names = BTreeSet::new();

        for reference in model.references_for(scan_type) {
            if reference == SOURCECODE_ARCHIVE_ROOT_REFERENCE
                || reference == BINARIES_ARCHIVE_ROOT_REFERENCE
            {
                root_folder_accepted = true;
            } else {
                accepted_reference_names.insert(reference.to_string());
            }
        }

        let filter = GlobFilter::with_patterns(self.includes, self.excludes)?;

        Ok(RoutingConfig {
            root_folder_accepted,
            accepted_reference_names,
            filter,
        })
    }
}
