//! Pure projection of the form state onto page elements, plus the diffing writer.

use validator_host::FormSurface;

use crate::{
    config::{ArtifactPolicy, FormConfig},
    model::{ContentSourceKind, ExternalArtifactRow, FormState, OptionSection, SyntaxChoice},
    validators::{credentials_required, is_submittable, ValidatorRegistry},
};

/// Well-known element ids of the upload form.
pub mod ids {
    /// Content source selector.
    pub const CONTENT_TYPE: &str = "contentType";
    /// File input group.
    pub const FILE_GROUP: &str = "fileToValidate";
    /// URI input group.
    pub const URI_GROUP: &str = "uriToValidate";
    /// Inline text group.
    pub const STRING_GROUP: &str = "stringToValidate";
    /// Query input group.
    pub const QUERY_GROUP: &str = "queryToValidate";
    /// File picker.
    pub const FILE_INPUT: &str = "inputFile";
    /// Displayed name of the picked file.
    pub const FILE_NAME: &str = "inputFileName";
    /// URI input.
    pub const URI: &str = "uri";
    /// Inline content editor.
    pub const TEXT_EDITOR: &str = "text-editor";
    /// Syntax selector cell.
    pub const SYNTAX_DIV: &str = "contentSyntaxTypeDiv";
    /// Syntax selector.
    pub const SYNTAX_SELECT: &str = "contentSyntaxType";
    /// Validation profile selector.
    pub const VALIDATION_TYPE: &str = "validationType";
    /// Validation profile sub-option selector.
    pub const VALIDATION_OPTION: &str = "validationTypeOption";
    /// Advanced options wrapper.
    pub const OPTIONS_DIV: &str = "optionsDiv";
    /// "Load imports" section.
    pub const LOAD_IMPORTS_DIV: &str = "loadImportsDiv";
    /// "Load imports" checkbox.
    pub const LOAD_IMPORTS_CHECK: &str = "loadImportsCheck";
    /// "Merge models" section.
    pub const MERGE_MODELS_DIV: &str = "mergeModelsDiv";
    /// "Merge models" checkbox.
    pub const MERGE_MODELS_CHECK: &str = "mergeModelsCheck";
    /// Query endpoint input.
    pub const QUERY_ENDPOINT: &str = "queryEndpoint";
    /// Query authentication checkbox.
    pub const QUERY_AUTHENTICATE: &str = "queryAuthenticate";
    /// Query credentials wrapper.
    pub const QUERY_CREDENTIALS_DIV: &str = "queryCredentialsDiv";
    /// Query username input.
    pub const QUERY_USERNAME: &str = "queryUsername";
    /// Query password input.
    pub const QUERY_PASSWORD: &str = "queryPassword";
    /// Query editor.
    pub const QUERY_EDITOR: &str = "query-editor";
    /// Hidden field carrying the submitted query.
    pub const QUERY_EDITOR_VALUE: &str = "query-editor-value";
    /// Submit button.
    pub const SUBMIT: &str = "inputFileSubmit";
    /// Template cloned for each external artifact row.
    pub const ROW_TEMPLATE: &str = "external_defaultTemplate";
    /// Element new rows are inserted in front of.
    pub const ROW_ANCHOR: &str = "external_defaultAddButton";
    /// Per-row remove button.
    pub const ROW_REMOVE: &str = "removeButton";

    /// Id of a per-row element (`<prefix>-<row id>`).
    pub fn row_element(prefix: &str, row_id: &str) -> String {
        format!("{prefix}-{row_id}")
    }
}

/// Width class of a row's syntax selector cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Shared layout once several rows exist.
    Narrow,
    /// A sole mandatory row.
    Wide,
}

impl ColumnWidth {
    /// Every width class, for swapping.
    pub const CLASSES: [&'static str; 2] = ["col-sm-3", "col-sm-4"];

    /// Bootstrap column class.
    pub const fn class(self) -> &'static str {
        match self {
            Self::Narrow => "col-sm-3",
            Self::Wide => "col-sm-4",
        }
    }

    /// A single row under a REQUIRED policy is wide; anything else is narrow.
    pub fn for_rows(policy: ArtifactPolicy, row_count: usize) -> Self {
        if policy == ArtifactPolicy::Required && row_count == 1 {
            Self::Wide
        } else {
            Self::Narrow
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub row_id: String,
    pub kind: ContentSourceKind,
    pub syntax: SyntaxChoice,
    pub width: ColumnWidth,
    pub file_name: String,
    pub uri: String,
    pub text: String,
}

impl RowView {
    fn project(row: &ExternalArtifactRow, width: ColumnWidth) -> Self {
        Self {
            row_id: row.dom_id(),
            kind: row.kind,
            syntax: row.syntax.clone(),
            width,
            file_name: row.file_name.clone(),
            uri: row.uri.clone(),
            text: row.text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub active_source: ContentSourceKind,
    pub file_name: String,
    pub syntax: Option<SyntaxChoice>,
    pub load_imports: OptionSection,
    pub merge_models: OptionSection,
    pub options_visible: bool,
    pub authenticate_checked: bool,
    pub authenticate_disabled: bool,
    pub credentials_visible: bool,
    pub rows: Vec<RowView>,
    pub submit_enabled: bool,
}

impl FormView {
    /// Derives every element state from `state`.
    pub fn project(state: &FormState, config: &FormConfig, registry: &ValidatorRegistry) -> Self {
        let width = ColumnWidth::for_rows(config.external_artifacts, state.rows.len());
        Self {
            active_source: state.inputs.active,
            file_name: state.inputs.file_name.clone(),
            syntax: state.syntax_selector_present.then(|| state.syntax.clone()),
            load_imports: state.load_imports,
            merge_models: state.merge_models,
            options_visible: state.load_imports.visible || state.merge_models.visible,
            authenticate_checked: state.inputs.query.authenticate,
            authenticate_disabled: config.query.credentials_mandatory,
            credentials_visible: credentials_required(&state.inputs.query, config),
            rows: state
                .rows
                .iter()
                .map(|row| RowView::project(row, width))
                .collect(),
            submit_enabled: is_submittable(state, config, registry),
        }
    }
}

fn source_group(kind: ContentSourceKind) -> &'static str {
    match kind {
        ContentSourceKind::File => ids::FILE_GROUP,
        ContentSourceKind::Uri => ids::URI_GROUP,
        ContentSourceKind::InlineText => ids::STRING_GROUP,
        ContentSourceKind::Query => ids::QUERY_GROUP,
    }
}

fn changed<T: PartialEq>(prev: Option<&T>, next: &T) -> bool {
    prev != Some(next)
}

fn write_syntax(surface: &dyn FormSurface, id: &str, syntax: &SyntaxChoice) {
    surface.replace_options(id, &syntax.options, syntax.selected.as_deref());
}

fn write_section(surface: &dyn FormSurface, div: &str, check: &str, section: OptionSection) {
    surface.set_hidden(div, !section.visible);
    surface.set_checked(check, section.checked);
}

/// Writes the parts of `next` that differ from `prev` (everything when `prev` is `None`).
///
/// Rows missing from `prev` are written in full since their elements are fresh.
pub fn apply_view(surface: &dyn FormSurface, prev: Option<&FormView>, next: &FormView) {
    if changed(prev.map(|p| &p.active_source), &next.active_source) {
        surface.set_value(ids::CONTENT_TYPE, next.active_source.token());
        for kind in [
            ContentSourceKind::File,
            ContentSourceKind::Uri,
            ContentSourceKind::InlineText,
            ContentSourceKind::Query,
        ] {
            surface.set_hidden(source_group(kind), kind != next.active_source);
        }
        surface.set_hidden(
            ids::SYNTAX_DIV,
            next.active_source == ContentSourceKind::Query,
        );
    }
    if changed(prev.map(|p| &p.file_name), &next.file_name) {
        surface.set_value(ids::FILE_NAME, &next.file_name);
    }
    if changed(prev.map(|p| &p.syntax), &next.syntax) {
        if let Some(syntax) = &next.syntax {
            write_syntax(surface, ids::SYNTAX_SELECT, syntax);
        }
    }
    if changed(prev.map(|p| &p.load_imports), &next.load_imports) {
        write_section(
            surface,
            ids::LOAD_IMPORTS_DIV,
            ids::LOAD_IMPORTS_CHECK,
            next.load_imports,
        );
    }
    if changed(prev.map(|p| &p.merge_models), &next.merge_models) {
        write_section(
            surface,
            ids::MERGE_MODELS_DIV,
            ids::MERGE_MODELS_CHECK,
            next.merge_models,
        );
    }
    if changed(prev.map(|p| &p.options_visible), &next.options_visible) {
        surface.set_hidden(ids::OPTIONS_DIV, !next.options_visible);
    }
    if changed(
        prev.map(|p| &p.authenticate_checked),
        &next.authenticate_checked,
    ) {
        surface.set_checked(ids::QUERY_AUTHENTICATE, next.authenticate_checked);
    }
    if changed(
        prev.map(|p| &p.authenticate_disabled),
        &next.authenticate_disabled,
    ) {
        surface.set_disabled(ids::QUERY_AUTHENTICATE, next.authenticate_disabled);
    }
    if changed(
        prev.map(|p| &p.credentials_visible),
        &next.credentials_visible,
    ) {
        surface.set_hidden(ids::QUERY_CREDENTIALS_DIV, !next.credentials_visible);
    }
    for row in &next.rows {
        let before = prev.and_then(|p| p.rows.iter().find(|r| r.row_id == row.row_id));
        apply_row(surface, before, row);
    }
    if changed(prev.map(|p| &p.submit_enabled), &next.submit_enabled) {
        surface.set_disabled(ids::SUBMIT, !next.submit_enabled);
    }
}

fn apply_row(surface: &dyn FormSurface, prev: Option<&RowView>, next: &RowView) {
    let id = |prefix: &str| ids::row_element(prefix, &next.row_id);
    if changed(prev.map(|p| &p.kind), &next.kind) {
        surface.set_value(&id(ids::CONTENT_TYPE), next.kind.token());
        for kind in [
            ContentSourceKind::File,
            ContentSourceKind::Uri,
            ContentSourceKind::InlineText,
        ] {
            surface.set_hidden(&id(source_group(kind)), kind != next.kind);
        }
    }
    if changed(prev.map(|p| &p.syntax), &next.syntax) {
        write_syntax(surface, &id(ids::SYNTAX_SELECT), &next.syntax);
    }
    if changed(prev.map(|p| &p.width), &next.width) {
        surface.set_class_variant(&id(ids::SYNTAX_DIV), &ColumnWidth::CLASSES, next.width.class());
    }
    if changed(prev.map(|p| &p.file_name), &next.file_name) {
        surface.set_value(&id(ids::FILE_NAME), &next.file_name);
    }
    if changed(prev.map(|p| &p.uri), &next.uri) {
        surface.set_value(&id(ids::URI), &next.uri);
    }
    if changed(prev.map(|p| &p.text), &next.text) {
        surface.set_value(&id(ids::TEXT_EDITOR), &next.text);
    }
}
