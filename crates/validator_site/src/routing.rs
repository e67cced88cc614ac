//! Maps DOM events on form and results elements to runtime actions.
//!
//! The page is wired with a few delegated listeners; every event is reduced to a
//! [`TargetSnapshot`] and routed here by element id, so the mapping stays testable
//! without a browser.

use validator_runtime::{
    view::ids, ContentSourceKind, DownloadKind, FormAction, ValidationProfile,
};

/// Separator between an element prefix and the row it belongs to.
const ROW_MARKER: &str = "-external_default-";

/// DOM event categories the site listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomEventKind {
    /// `change`
    Change,
    /// `input`
    Input,
    /// `click`
    Click,
}

impl DomEventKind {
    /// Every category, in registration order.
    pub const ALL: [Self; 3] = [Self::Change, Self::Input, Self::Click];

    /// DOM event name.
    pub const fn event_name(self) -> &'static str {
        match self {
            Self::Change => "change",
            Self::Input => "input",
            Self::Click => "click",
        }
    }
}

/// What a listener read from the event target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSnapshot {
    /// Id of the nearest element carrying one.
    pub id: String,
    /// Current value of an input, select, or text area.
    pub value: String,
    /// Checkbox state.
    pub checked: bool,
    /// Name of the first picked file of a file input.
    pub file_name: Option<String>,
}

impl TargetSnapshot {
    /// Snapshot carrying only an id.
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Sets the value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// Splits `<prefix>-external_default-<n>` into the prefix and row index.
pub fn split_row_element(id: &str) -> Option<(&str, usize)> {
    let (prefix, index) = id.rsplit_once(ROW_MARKER)?;
    if prefix.is_empty() {
        return None;
    }
    Some((prefix, index.parse().ok()?))
}

fn selected(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Form action for an event on `target`, if the element drives one.
pub fn form_action(kind: DomEventKind, target: &TargetSnapshot) -> Option<FormAction> {
    if let Some((prefix, index)) = split_row_element(&target.id) {
        return row_action(kind, prefix, index, target);
    }
    let value = target.value.clone();
    let action = match (kind, target.id.as_str()) {
        (DomEventKind::Change, ids::CONTENT_TYPE) => FormAction::SetContentSource {
            kind: ContentSourceKind::from_token(&value)?,
        },
        (DomEventKind::Change, ids::FILE_INPUT) => FormAction::SetFileName {
            file_name: target.file_name.clone().unwrap_or_default(),
        },
        (DomEventKind::Input, ids::URI) => FormAction::SetUri { uri: value },
        (DomEventKind::Input, ids::TEXT_EDITOR) => FormAction::SetText { text: value },
        (DomEventKind::Change, ids::SYNTAX_SELECT) => FormAction::SelectSyntax {
            value: selected(&value),
        },
        (DomEventKind::Input, ids::QUERY_ENDPOINT) => {
            FormAction::SetQueryEndpoint { endpoint: value }
        }
        (DomEventKind::Change, ids::QUERY_AUTHENTICATE) => FormAction::SetQueryAuthenticate {
            enabled: target.checked,
        },
        (DomEventKind::Input, ids::QUERY_USERNAME) => {
            FormAction::SetQueryUsername { username: value }
        }
        (DomEventKind::Input, ids::QUERY_PASSWORD) => {
            FormAction::SetQueryPassword { password: value }
        }
        (DomEventKind::Input, ids::QUERY_EDITOR) => FormAction::SetQueryText { query: value },
        (DomEventKind::Change, ids::LOAD_IMPORTS_CHECK) => FormAction::SetLoadImports {
            checked: target.checked,
        },
        (DomEventKind::Change, ids::MERGE_MODELS_CHECK) => FormAction::SetMergeModels {
            checked: target.checked,
        },
        (DomEventKind::Click, ids::ROW_ANCHOR) => FormAction::AddExternalArtifactRow,
        _ => return None,
    };
    Some(action)
}

fn row_action(
    kind: DomEventKind,
    prefix: &str,
    index: usize,
    target: &TargetSnapshot,
) -> Option<FormAction> {
    let value = target.value.clone();
    let action = match (kind, prefix) {
        (DomEventKind::Change, ids::CONTENT_TYPE) => FormAction::SetRowContentType {
            index,
            kind: ContentSourceKind::from_token(&value)?,
        },
        (DomEventKind::Change, ids::FILE_INPUT) => FormAction::SetRowFileName {
            index,
            file_name: target.file_name.clone().unwrap_or_default(),
        },
        (DomEventKind::Input, ids::URI) => FormAction::SetRowUri { index, uri: value },
        (DomEventKind::Input, ids::TEXT_EDITOR) => FormAction::SetRowText { index, text: value },
        (DomEventKind::Change, ids::SYNTAX_SELECT) => FormAction::SelectRowSyntax {
            index,
            value: selected(&value),
        },
        (DomEventKind::Click, ids::ROW_REMOVE) => FormAction::RemoveExternalArtifactRow { index },
        _ => return None,
    };
    Some(action)
}

/// Whether a change on `id` re-reads the profile selectors.
pub fn is_profile_selector(id: &str) -> bool {
    matches!(id, ids::VALIDATION_TYPE | ids::VALIDATION_OPTION)
}

/// Profile selection from the two selector values.
pub fn profile_action(validation_type: Option<String>, option: Option<String>) -> FormAction {
    let profile = validation_type
        .filter(|value| !value.is_empty())
        .map(|value| ValidationProfile::new(value).with_option(option.unwrap_or_default()));
    FormAction::SelectProfile { profile }
}

/// File input opened by a click on the read-only file name box `id`.
pub fn file_picker_for(id: &str) -> Option<String> {
    if id == ids::FILE_NAME {
        return Some(ids::FILE_INPUT.to_string());
    }
    let (prefix, _) = split_row_element(id)?;
    (prefix == ids::FILE_NAME).then(|| id.replacen(ids::FILE_NAME, ids::FILE_INPUT, 1))
}

/// Class of the menu entries that trigger a `kind` export.
pub const fn download_trigger_class(kind: DownloadKind) -> &'static str {
    match kind {
        DownloadKind::Report => "downloadReport",
        DownloadKind::Content => "downloadContent",
        DownloadKind::Shapes => "downloadShapes",
    }
}

/// Attribute of a trigger carrying the requested syntax.
pub const fn download_syntax_attribute(kind: DownloadKind) -> &'static str {
    match kind {
        DownloadKind::Report => "data-report-type",
        DownloadKind::Content | DownloadKind::Shapes => "data-content-type",
    }
}

/// Id of the menu list the export choices for `kind` are rendered into.
pub fn download_menu_id(kind: DownloadKind) -> String {
    format!("{}Menu", kind.button_id())
}

/// Export kind triggered by an element carrying `classes`.
pub fn download_kind_for(classes: &str) -> Option<DownloadKind> {
    [DownloadKind::Report, DownloadKind::Content, DownloadKind::Shapes]
        .into_iter()
        .find(|kind| {
            classes
                .split_whitespace()
                .any(|class| class == download_trigger_class(*kind))
        })
}
