//! Page configuration embedded by the server as a JSON document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator_host::SelectOption;

/// Element id of the `<script type="application/json">` carrying [`PageConfig`].
pub const PAGE_CONFIG_ELEMENT_ID: &str = "itb-validator-config";

#[derive(Debug, Error)]
/// Configuration loading failures.
pub enum ConfigError {
    /// The configuration element is missing from the page.
    #[error("configuration element `{0}` not found")]
    Missing(String),
    /// The configuration document is not valid JSON for [`PageConfig`].
    #[error("invalid validator configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// The configuration document is valid JSON but not an object.
    #[error("validator configuration must be a JSON object")]
    NotAnObject,
}

/// Whether an optional input applies to a validation profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactPolicy {
    /// The input is not offered.
    #[default]
    None,
    /// The input is offered and may be left out.
    Optional,
    /// The input is offered and expected.
    Required,
}

impl ArtifactPolicy {
    /// Returns whether the input is offered at all.
    pub const fn is_offered(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Per-profile policy plus the default state of the matching checkbox.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfilePolicyTable {
    /// Policy by profile key.
    pub choice: BTreeMap<String, ArtifactPolicy>,
    /// Default checked state by profile key.
    pub default_checked: BTreeMap<String, bool>,
}

impl ProfilePolicyTable {
    /// Policy for `profile_key`; unknown keys are [`ArtifactPolicy::None`].
    pub fn policy_for(&self, profile_key: &str) -> ArtifactPolicy {
        self.choice.get(profile_key).copied().unwrap_or_default()
    }

    /// Default checkbox state for `profile_key`.
    pub fn default_checked_for(&self, profile_key: &str) -> bool {
        self.default_checked
            .get(profile_key)
            .copied()
            .unwrap_or(false)
    }
}

/// Query input support.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuerySupport {
    /// Whether query input is offered.
    pub enabled: bool,
    /// Whether the endpoint URL input is shown (and then required).
    pub endpoint_input: bool,
    /// Whether credential inputs are shown.
    pub credentials_input: bool,
    /// Whether credentials are always required.
    pub credentials_mandatory: bool,
}

/// Localised labels used by the form controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormLabels {
    /// Label of the query content-type option.
    pub content_query_option: String,
    /// Label of the empty syntax choice for file input.
    pub syntax_default: String,
    /// Label of the empty syntax choice for URI input.
    pub syntax_default_for_uri: String,
}

impl Default for FormLabels {
    fn default() -> Self {
        Self {
            content_query_option: "SPARQL query".to_string(),
            syntax_default: "--Determine from file extension--".to_string(),
            syntax_default_for_uri: "--Determine from content type--".to_string(),
        }
    }
}

/// Upload form configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormConfig {
    /// Labels.
    pub labels: FormLabels,
    /// Query input support.
    pub query: QuerySupport,
    /// "Load imports" policy table.
    pub load_imports: ProfilePolicyTable,
    /// "Merge models" policy table.
    pub merge_models: ProfilePolicyTable,
    /// Support for user-supplied external shape files.
    pub external_artifacts: ArtifactPolicy,
    /// Profile used when the page has no profile selector.
    pub default_profile: Option<String>,
}

/// Localised labels used on the results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultsLabels {
    /// Banner message for failed downloads.
    pub download_error: String,
    /// Banner message for a failed content load.
    pub content_error: String,
    /// Banner message for a failed serialized report load.
    pub report_error: String,
    /// Label of the PDF export choice.
    pub pdf: String,
}

impl Default for ResultsLabels {
    fn default() -> Self {
        Self {
            download_error: "The requested file could not be downloaded.".to_string(),
            content_error: "The validated content could not be loaded.".to_string(),
            report_error: "The validation report could not be loaded.".to_string(),
            pdf: "PDF".to_string(),
        }
    }
}

/// Results page configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultsConfig {
    /// Identifier of the report being shown.
    pub report_id: String,
    /// Identifier of the validated content when it is stored separately.
    pub content_id: Option<String>,
    /// Number of findings in the report.
    pub report_item_count: usize,
    /// Largest finding count for which PDF rendering is offered.
    pub report_item_detail_max: usize,
    /// Whether the shapes download block is hidden.
    pub hide_download_shapes: bool,
    /// Path segment under which validated content is fetched.
    pub content_path: String,
    /// Syntax mode for the source viewer.
    pub viewer_mode: String,
    /// Export syntaxes offered for the report.
    pub report_syntaxes: Vec<SelectOption>,
    /// Export syntaxes offered for content and shapes.
    pub content_syntaxes: Vec<SelectOption>,
    /// Labels.
    pub labels: ResultsLabels,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            report_id: String::new(),
            content_id: None,
            report_item_count: 0,
            report_item_detail_max: 5000,
            hide_download_shapes: false,
            content_path: "input".to_string(),
            viewer_mode: "xml".to_string(),
            report_syntaxes: Vec::new(),
            content_syntaxes: Vec::new(),
            labels: ResultsLabels::default(),
        }
    }
}

/// Whole-page configuration; either section may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageConfig {
    /// Upload form section.
    pub form: Option<FormConfig>,
    /// Results section.
    pub results: Option<ResultsConfig>,
}

impl PageConfig {
    /// Parses the embedded JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when `raw` is not a valid configuration document and
    /// [`ConfigError::NotAnObject`] when the top-level value is not an object.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let document: serde_json::Value = serde_json::from_str(raw)?;
        if !document.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        Ok(serde_json::from_value(document)?)
    }

    /// Parses the text of the configuration element, if the page has one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `text` is `None`, otherwise as
    /// [`PageConfig::from_json`].
    pub fn from_element(text: Option<String>) -> Result<Self, ConfigError> {
        let raw = text.ok_or_else(|| ConfigError::Missing(PAGE_CONFIG_ELEMENT_ID.to_string()))?;
        Self::from_json(&raw)
    }
}
