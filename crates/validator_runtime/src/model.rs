use serde::{Deserialize, Serialize};
use validator_host::SelectOption;

use crate::config::FormLabels;

/// Value of the synthetic "use the default syntax" choice.
pub const EMPTY_SYNTAX_VALUE: &str = "empty";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContentSourceKind {
    File,
    Uri,
    InlineText,
    Query,
}

impl ContentSourceKind {
    pub const fn token(self) -> &'static str {
        match self {
            Self::File => "fileType",
            Self::Uri => "uriType",
            Self::InlineText => "stringType",
            Self::Query => "queryType",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "fileType" => Some(Self::File),
            "uriType" => Some(Self::Uri),
            "stringType" => Some(Self::InlineText),
            "queryType" => Some(Self::Query),
            _ => None,
        }
    }

    /// File and URI input may leave the syntax to be detected; the others need it stated.
    pub const fn allows_default_syntax(self) -> bool {
        matches!(self, Self::File | Self::Uri)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryInputs {
    pub endpoint: String,
    pub authenticate: bool,
    pub username: String,
    pub password: String,
    pub query: String,
}

/// Buffers of every content source; only the active one is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInputs {
    pub active: ContentSourceKind,
    pub file_name: String,
    pub uri: String,
    pub text: String,
    pub query: QueryInputs,
}

impl Default for ContentInputs {
    fn default() -> Self {
        Self {
            active: ContentSourceKind::File,
            file_name: String::new(),
            uri: String::new(),
            text: String::new(),
            query: QueryInputs::default(),
        }
    }
}

/// The active content source and the data it submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource<'a> {
    File { file_name: &'a str },
    Uri { uri: &'a str },
    InlineText { text: &'a str },
    Query(&'a QueryInputs),
}

impl ContentInputs {
    pub fn active_source(&self) -> ContentSource<'_> {
        match self.active {
            ContentSourceKind::File => ContentSource::File {
                file_name: &self.file_name,
            },
            ContentSourceKind::Uri => ContentSource::Uri { uri: &self.uri },
            ContentSourceKind::InlineText => ContentSource::InlineText { text: &self.text },
            ContentSourceKind::Query => ContentSource::Query(&self.query),
        }
    }
}

/// Option list of a syntax selector and its current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxChoice {
    pub options: Vec<SelectOption>,
    pub selected: Option<String>,
}

impl SyntaxChoice {
    pub fn new(options: Vec<SelectOption>) -> Self {
        let selected = options.first().map(|option| option.value.clone());
        Self { options, selected }
    }

    /// Drops any empty default choice, then prepends (and selects) a fresh one when `kind`
    /// allows detecting the syntax. Repeated calls never stack defaults.
    pub fn apply_default_rule(&mut self, kind: ContentSourceKind, labels: &FormLabels) {
        self.options
            .retain(|option| option.value != EMPTY_SYNTAX_VALUE);
        let label = match kind {
            ContentSourceKind::File => Some(&labels.syntax_default),
            ContentSourceKind::Uri => Some(&labels.syntax_default_for_uri),
            ContentSourceKind::InlineText | ContentSourceKind::Query => None,
        };
        if let Some(label) = label {
            self.options
                .insert(0, SelectOption::new(EMPTY_SYNTAX_VALUE, label.clone()));
            self.selected = Some(EMPTY_SYNTAX_VALUE.to_string());
        } else if !self.contains(self.selected.as_deref()) {
            self.selected = self.options.first().map(|option| option.value.clone());
        }
    }

    /// Swaps in a new option list, keeping the selection while it is still offered.
    pub fn replace_options(&mut self, options: Vec<SelectOption>) {
        let previous = self.selected.take();
        self.options = options;
        self.selected = previous
            .filter(|value| self.contains(Some(value.as_str())))
            .or_else(|| self.options.first().map(|option| option.value.clone()));
    }

    pub fn select(&mut self, value: Option<String>) {
        self.selected = value.filter(|value| self.contains(Some(value.as_str())));
    }

    /// The selected syntax when it names a real format.
    pub fn explicit(&self) -> Option<&str> {
        self.selected
            .as_deref()
            .filter(|value| !value.is_empty() && *value != EMPTY_SYNTAX_VALUE)
    }

    pub fn has_default_choice(&self) -> bool {
        self.contains(Some(EMPTY_SYNTAX_VALUE))
    }

    fn contains(&self, value: Option<&str>) -> bool {
        value.is_some_and(|value| self.options.iter().any(|option| option.value == value))
    }
}

/// Selected validation type with its optional sub-option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationProfile {
    pub validation_type: String,
    pub option: Option<String>,
}

impl ValidationProfile {
    pub fn new(validation_type: impl Into<String>) -> Self {
        Self {
            validation_type: validation_type.into(),
            option: None,
        }
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into()).filter(|option| !option.is_empty());
        self
    }

    /// Key into the per-profile policy tables (`type` or `type.option`).
    pub fn key(&self) -> String {
        match &self.option {
            Some(option) => format!("{}.{option}", self.validation_type),
            None => self.validation_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionSection {
    pub visible: bool,
    pub checked: bool,
}

/// One user-supplied external shape input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalArtifactRow {
    pub index: usize,
    pub kind: ContentSourceKind,
    pub file_name: String,
    pub uri: String,
    pub text: String,
    pub syntax: SyntaxChoice,
}

impl ExternalArtifactRow {
    /// Rows start in file mode with a snapshot of the master syntax list.
    pub fn new(index: usize, master_options: &[SelectOption]) -> Self {
        Self {
            index,
            kind: ContentSourceKind::File,
            file_name: String::new(),
            uri: String::new(),
            text: String::new(),
            syntax: SyntaxChoice::new(master_options.to_vec()),
        }
    }

    pub fn dom_id(&self) -> String {
        row_dom_id(self.index)
    }
}

pub fn row_dom_id(index: usize) -> String {
    format!("external_default-{index}")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub ready: bool,
    pub inputs: ContentInputs,
    pub syntax: SyntaxChoice,
    pub syntax_selector_present: bool,
    pub profile_selector_present: bool,
    pub profile: Option<ValidationProfile>,
    pub load_imports: OptionSection,
    pub merge_models: OptionSection,
    pub rows: Vec<ExternalArtifactRow>,
    pub query_option_added: bool,
}

impl FormState {
    pub fn row(&self, index: usize) -> Option<&ExternalArtifactRow> {
        self.rows.iter().find(|row| row.index == index)
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut ExternalArtifactRow> {
        self.rows.iter_mut().find(|row| row.index == index)
    }

    /// Text written to the hidden query field on submit.
    pub fn submitted_query(&self) -> &str {
        match self.inputs.active_source() {
            ContentSource::Query(query) => &query.query,
            _ => "",
        }
    }
}
