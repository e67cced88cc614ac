//! Form actions, side-effect intents, and the transition logic of the upload form.

use thiserror::Error;
use validator_host::SelectOption;

use crate::{
    config::{ArtifactPolicy, FormConfig, ProfilePolicyTable},
    events::FormEvent,
    model::{
        row_dom_id, ContentSourceKind, ExternalArtifactRow, FormState, OptionSection,
        SyntaxChoice, ValidationProfile,
    },
    session::SessionState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Actions accepted by [`reduce_form`].
pub enum FormAction {
    /// The page finished rendering the form.
    FormReady {
        /// Master syntax options; `None` when the page has no syntax selector.
        master_syntax: Option<Vec<SelectOption>>,
        /// Whether the page renders a validation profile selector.
        profile_selector_present: bool,
        /// Content source selected in the markup.
        initial_source: ContentSourceKind,
        /// Profile selected in the markup.
        initial_profile: Option<ValidationProfile>,
    },
    /// Switch the main content source.
    SetContentSource {
        /// New source.
        kind: ContentSourceKind,
    },
    /// A file was picked for upload.
    SetFileName {
        /// Picked file name (empty when cleared).
        file_name: String,
    },
    /// The content URI was edited.
    SetUri {
        /// URI text.
        uri: String,
    },
    /// The inline content editor changed.
    SetText {
        /// Editor contents.
        text: String,
    },
    /// A main syntax option was selected.
    SelectSyntax {
        /// Selected option value.
        value: Option<String>,
    },
    /// The query endpoint was edited.
    SetQueryEndpoint {
        /// Endpoint URL.
        endpoint: String,
    },
    /// The "authenticate" box was toggled.
    SetQueryAuthenticate {
        /// New checked state.
        enabled: bool,
    },
    /// The query username was edited.
    SetQueryUsername {
        /// Username.
        username: String,
    },
    /// The query password was edited.
    SetQueryPassword {
        /// Password.
        password: String,
    },
    /// The query editor changed.
    SetQueryText {
        /// Query text.
        query: String,
    },
    /// A validation profile was selected (or cleared).
    SelectProfile {
        /// Selected profile.
        profile: Option<ValidationProfile>,
    },
    /// The "load imports" box was toggled.
    SetLoadImports {
        /// New checked state.
        checked: bool,
    },
    /// The "merge models" box was toggled.
    SetMergeModels {
        /// New checked state.
        checked: bool,
    },
    /// Append an external artifact row.
    AddExternalArtifactRow,
    /// Remove an external artifact row.
    RemoveExternalArtifactRow {
        /// Row index.
        index: usize,
    },
    /// Switch the content source of one row.
    SetRowContentType {
        /// Row index.
        index: usize,
        /// New source.
        kind: ContentSourceKind,
    },
    /// A file was picked for a row.
    SetRowFileName {
        /// Row index.
        index: usize,
        /// Picked file name.
        file_name: String,
    },
    /// A row URI was edited.
    SetRowUri {
        /// Row index.
        index: usize,
        /// URI text.
        uri: String,
    },
    /// A row's inline content changed.
    SetRowText {
        /// Row index.
        index: usize,
        /// Inline text.
        text: String,
    },
    /// A row syntax option was selected.
    SelectRowSyntax {
        /// Row index.
        index: usize,
        /// Selected option value.
        value: Option<String>,
    },
    /// The master syntax list was edited on the page.
    SetMasterSyntaxOptions {
        /// New option list.
        options: Vec<SelectOption>,
    },
    /// The form is about to be submitted.
    PrepareSubmit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_form`] for the controller to execute.
pub enum FormEffect {
    /// Add the query choice to the content-type selector.
    AppendContentTypeOption(SelectOption),
    /// Re-layout the query editor once it is visible.
    RefreshQueryEditor,
    /// Clone the row template for a new row.
    InstantiateRow {
        /// Row element id.
        row_id: String,
    },
    /// Remove a row's elements.
    RemoveRowElement {
        /// Row element id.
        row_id: String,
    },
    /// Move focus into a row's first input.
    FocusRowInput {
        /// Row element id.
        row_id: String,
    },
    /// Write the query text into the hidden submitted field.
    WriteSubmittedQuery(String),
    /// Notify observers.
    Publish(FormEvent),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for actions the current form cannot honour.
pub enum FormError {
    /// The action referenced a row that does not exist.
    #[error("external artifact row {0} not found")]
    RowNotFound(usize),
    /// The form does not accept external artifacts.
    #[error("external artifacts are not supported by this form")]
    ExternalArtifactsUnsupported,
    /// Query input is not enabled (or not allowed for rows).
    #[error("query input is not supported here")]
    QueryUnsupported,
}

/// Read-only inputs of a transition.
#[derive(Debug, Clone, Copy)]
pub struct FormContext<'a> {
    /// Form configuration.
    pub config: &'a FormConfig,
    /// Session identifiers (row counter).
    pub session: &'a SessionState,
}

/// Applies a [`FormAction`] to the form state and collects resulting side effects.
///
/// Edits to hidden or absent features are accepted and ignored; only actions that name
/// something the form cannot have fail.
///
/// # Errors
///
/// Returns [`FormError::RowNotFound`] for unknown rows,
/// [`FormError::ExternalArtifactsUnsupported`] when adding rows to a form without them, and
/// [`FormError::QueryUnsupported`] when switching to query input where it is not offered.
pub fn reduce_form(
    state: &mut FormState,
    ctx: FormContext<'_>,
    action: FormAction,
) -> Result<Vec<FormEffect>, FormError> {
    let config = ctx.config;
    let mut effects = Vec::new();
    match action {
        FormAction::FormReady {
            master_syntax,
            profile_selector_present,
            initial_source,
            initial_profile,
        } => {
            if initial_source == ContentSourceKind::Query && !config.query.enabled {
                return Err(FormError::QueryUnsupported);
            }
            state.syntax_selector_present = master_syntax.is_some();
            state.syntax = SyntaxChoice::new(master_syntax.unwrap_or_default());
            state.profile_selector_present = profile_selector_present;
            state.profile = initial_profile.or_else(|| {
                config
                    .default_profile
                    .clone()
                    .filter(|_| !profile_selector_present)
                    .map(ValidationProfile::new)
            });
            state.inputs.active = initial_source;
            state.inputs.query.authenticate |= config.query.credentials_mandatory;
            if state.syntax_selector_present {
                state.syntax.apply_default_rule(initial_source, &config.labels);
            }
            if config.query.enabled && !state.query_option_added {
                state.query_option_added = true;
                effects.push(FormEffect::AppendContentTypeOption(SelectOption::new(
                    ContentSourceKind::Query.token(),
                    config.labels.content_query_option.clone(),
                )));
            }
            evaluate_profile_sections(state, config);
            state.ready = true;
            if config.external_artifacts == ArtifactPolicy::Required && state.rows.is_empty() {
                add_row(state, ctx, &mut effects);
            }
        }
        FormAction::SetContentSource { kind } => {
            if kind == ContentSourceKind::Query && !config.query.enabled {
                return Err(FormError::QueryUnsupported);
            }
            state.inputs.active = kind;
            if state.syntax_selector_present {
                state.syntax.apply_default_rule(kind, &config.labels);
            }
            if kind == ContentSourceKind::Query {
                effects.push(FormEffect::RefreshQueryEditor);
            }
            effects.push(FormEffect::Publish(FormEvent::ContentTypeChanged(kind)));
        }
        FormAction::SetFileName { file_name } => state.inputs.file_name = file_name,
        FormAction::SetUri { uri } => state.inputs.uri = uri,
        FormAction::SetText { text } => state.inputs.text = text,
        FormAction::SelectSyntax { value } => state.syntax.select(value),
        FormAction::SetQueryEndpoint { endpoint } => state.inputs.query.endpoint = endpoint,
        FormAction::SetQueryAuthenticate { enabled } => {
            if !config.query.credentials_mandatory {
                state.inputs.query.authenticate = enabled;
            }
        }
        FormAction::SetQueryUsername { username } => state.inputs.query.username = username,
        FormAction::SetQueryPassword { password } => state.inputs.query.password = password,
        FormAction::SetQueryText { query } => state.inputs.query.query = query,
        FormAction::SelectProfile { profile } => {
            state.profile = profile;
            evaluate_profile_sections(state, config);
            effects.push(FormEffect::Publish(FormEvent::ProfileChanged(
                state.profile.clone(),
            )));
        }
        FormAction::SetLoadImports { checked } => {
            if state.load_imports.visible {
                state.load_imports.checked = checked;
            }
        }
        FormAction::SetMergeModels { checked } => {
            if state.merge_models.visible {
                state.merge_models.checked = checked;
            }
        }
        FormAction::AddExternalArtifactRow => {
            if !config.external_artifacts.is_offered() {
                return Err(FormError::ExternalArtifactsUnsupported);
            }
            add_row(state, ctx, &mut effects);
        }
        FormAction::RemoveExternalArtifactRow { index } => {
            let position = state
                .rows
                .iter()
                .position(|row| row.index == index)
                .ok_or(FormError::RowNotFound(index))?;
            let row = state.rows.remove(position);
            effects.push(FormEffect::RemoveRowElement {
                row_id: row.dom_id(),
            });
            effects.push(FormEffect::Publish(FormEvent::ExternalRowRemoved { index }));
        }
        FormAction::SetRowContentType { index, kind } => {
            if kind == ContentSourceKind::Query {
                return Err(FormError::QueryUnsupported);
            }
            let row = state.row_mut(index).ok_or(FormError::RowNotFound(index))?;
            row.kind = kind;
            row.syntax.apply_default_rule(kind, &config.labels);
            effects.push(FormEffect::Publish(
                FormEvent::ExternalRowContentTypeChanged { index, kind },
            ));
        }
        FormAction::SetRowFileName { index, file_name } => {
            state.row_mut(index).ok_or(FormError::RowNotFound(index))?.file_name = file_name;
        }
        FormAction::SetRowUri { index, uri } => {
            state.row_mut(index).ok_or(FormError::RowNotFound(index))?.uri = uri;
        }
        FormAction::SetRowText { index, text } => {
            state.row_mut(index).ok_or(FormError::RowNotFound(index))?.text = text;
        }
        FormAction::SelectRowSyntax { index, value } => {
            state
                .row_mut(index)
                .ok_or(FormError::RowNotFound(index))?
                .syntax
                .select(value);
        }
        FormAction::SetMasterSyntaxOptions { options } => {
            // Existing rows keep the list they were created with.
            state.syntax_selector_present = true;
            state.syntax.replace_options(options);
        }
        FormAction::PrepareSubmit => {
            effects.push(FormEffect::WriteSubmittedQuery(
                state.submitted_query().to_string(),
            ));
        }
    }
    Ok(effects)
}

fn add_row(state: &mut FormState, ctx: FormContext<'_>, effects: &mut Vec<FormEffect>) {
    let index = ctx.session.allocate_row_index();
    state
        .rows
        .push(ExternalArtifactRow::new(index, &state.syntax.options));
    let row_id = row_dom_id(index);
    effects.push(FormEffect::InstantiateRow {
        row_id: row_id.clone(),
    });
    effects.push(FormEffect::FocusRowInput { row_id });
    effects.push(FormEffect::Publish(FormEvent::ExternalRowAdded { index }));
}

/// Recomputes both optional sections from scratch so repeated evaluation converges.
fn evaluate_profile_sections(state: &mut FormState, config: &FormConfig) {
    let key = state.profile.as_ref().map(ValidationProfile::key);
    state.load_imports = section_for(&config.load_imports, key.as_deref());
    state.merge_models = section_for(&config.merge_models, key.as_deref());
}

fn section_for(table: &ProfilePolicyTable, key: Option<&str>) -> OptionSection {
    match key {
        Some(key) if table.policy_for(key).is_offered() => OptionSection {
            visible: true,
            checked: table.default_checked_for(key),
        },
        _ => OptionSection::default(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{config::QuerySupport, model::EMPTY_SYNTAX_VALUE};

    fn syntaxes() -> Vec<SelectOption> {
        vec![
            SelectOption::new("text/turtle", "Turtle"),
            SelectOption::new("application/ld+json", "JSON-LD"),
        ]
    }

    fn policy_table(entries: &[(&str, ArtifactPolicy, bool)]) -> ProfilePolicyTable {
        ProfilePolicyTable {
            choice: entries
                .iter()
                .map(|(key, policy, _)| ((*key).to_string(), *policy))
                .collect::<BTreeMap<_, _>>(),
            default_checked: entries
                .iter()
                .map(|(key, _, checked)| ((*key).to_string(), *checked))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn config() -> FormConfig {
        FormConfig {
            query: QuerySupport {
                enabled: true,
                endpoint_input: true,
                credentials_input: true,
                credentials_mandatory: false,
            },
            load_imports: policy_table(&[
                ("X", ArtifactPolicy::Required, true),
                ("Y", ArtifactPolicy::None, true),
                ("Z", ArtifactPolicy::Optional, false),
            ]),
            merge_models: policy_table(&[("Z", ArtifactPolicy::Optional, true)]),
            external_artifacts: ArtifactPolicy::Optional,
            ..FormConfig::default()
        }
    }

    fn dispatch(
        state: &mut FormState,
        config: &FormConfig,
        session: &SessionState,
        action: FormAction,
    ) -> Result<Vec<FormEffect>, FormError> {
        reduce_form(state, FormContext { config, session }, action)
    }

    fn ready(config: &FormConfig, session: &SessionState) -> (FormState, Vec<FormEffect>) {
        let mut state = FormState::default();
        let effects = dispatch(
            &mut state,
            config,
            session,
            FormAction::FormReady {
                master_syntax: Some(syntaxes()),
                profile_selector_present: true,
                initial_source: ContentSourceKind::File,
                initial_profile: None,
            },
        )
        .expect("form ready");
        (state, effects)
    }

    fn select_profile(
        state: &mut FormState,
        config: &FormConfig,
        session: &SessionState,
        key: &str,
    ) {
        dispatch(
            state,
            config,
            session,
            FormAction::SelectProfile {
                profile: Some(ValidationProfile::new(key)),
            },
        )
        .expect("select profile");
    }

    #[test]
    fn form_ready_appends_query_option_once_and_applies_default_syntax() {
        let config = config();
        let session = SessionState::default();
        let (mut state, effects) = ready(&config, &session);
        assert_eq!(
            effects,
            vec![FormEffect::AppendContentTypeOption(SelectOption::new(
                "queryType",
                config.labels.content_query_option.clone()
            ))]
        );
        assert_eq!(state.syntax.options[0].value, EMPTY_SYNTAX_VALUE);

        let rendered = state.syntax.options.clone();
        let again = dispatch(
            &mut state,
            &config,
            &session,
            FormAction::FormReady {
                master_syntax: Some(rendered),
                profile_selector_present: true,
                initial_source: ContentSourceKind::File,
                initial_profile: None,
            },
        )
        .expect("second ready");
        assert!(again.is_empty());
        assert_eq!(state.syntax.options.len(), 3);
    }

    #[test]
    fn profile_policies_drive_sections() {
        let config = config();
        let session = SessionState::default();
        let (mut state, _) = ready(&config, &session);

        select_profile(&mut state, &config, &session, "X");
        assert_eq!(state.load_imports, OptionSection { visible: true, checked: true });
        assert_eq!(state.merge_models, OptionSection::default());

        dispatch(&mut state, &config, &session, FormAction::SetLoadImports { checked: false })
            .expect("toggle");
        assert!(!state.load_imports.checked);

        select_profile(&mut state, &config, &session, "X");
        assert!(state.load_imports.checked, "reselecting restores the default");

        select_profile(&mut state, &config, &session, "Y");
        assert_eq!(state.load_imports, OptionSection::default());

        select_profile(&mut state, &config, &session, "Z");
        assert_eq!(state.load_imports, OptionSection { visible: true, checked: false });
        assert_eq!(state.merge_models, OptionSection { visible: true, checked: true });
    }

    #[test]
    fn hidden_sections_ignore_toggles() {
        let config = config();
        let session = SessionState::default();
        let (mut state, _) = ready(&config, &session);
        select_profile(&mut state, &config, &session, "Y");
        dispatch(&mut state, &config, &session, FormAction::SetLoadImports { checked: true })
            .expect("toggle");
        assert!(!state.load_imports.checked);
    }

    #[test]
    fn option_variants_use_their_own_key() {
        let mut config = config();
        config.load_imports = policy_table(&[("X.v2", ArtifactPolicy::Optional, true)]);
        let session = SessionState::default();
        let (mut state, _) = ready(&config, &session);
        dispatch(
            &mut state,
            &config,
            &session,
            FormAction::SelectProfile {
                profile: Some(ValidationProfile::new("X").with_option("v2")),
            },
        )
        .expect("select");
        assert!(state.load_imports.visible);
        select_profile(&mut state, &config, &session, "X");
        assert!(!state.load_imports.visible);
    }

    #[test]
    fn query_round_trip_keeps_a_single_default_option() {
        let config = config();
        let session = SessionState::default();
        let (mut state, _) = ready(&config, &session);
        for _ in 0..3 {
            let effects = dispatch(
                &mut state,
                &config,
                &session,
                FormAction::SetContentSource {
                    kind: ContentSourceKind::Query,
                },
            )
            .expect("query");
            assert!(effects.contains(&FormEffect::RefreshQueryEditor));
            dispatch(
                &mut state,
                &config,
                &session,
                FormAction::SetContentSource {
                    kind: ContentSourceKind::File,
                },
            )
            .expect("file");
        }
        let defaults: Vec<_> = state
            .syntax
            .options
            .iter()
            .filter(|option| option.value == EMPTY_SYNTAX_VALUE)
            .collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(state.syntax.selected.as_deref(), Some(EMPTY_SYNTAX_VALUE));
    }

    #[test]
    fn query_source_requires_support() {
        let config = FormConfig::default();
        let session = SessionState::default();
        let (mut state, effects) = ready(&config, &session);
        assert!(effects.is_empty());
        let err = dispatch(
            &mut state,
            &config,
            &session,
            FormAction::SetContentSource {
                kind: ContentSourceKind::Query,
            },
        )
        .expect_err("query disabled");
        assert_eq!(err, FormError::QueryUnsupported);
        assert_eq!(state.inputs.active, ContentSourceKind::File);
    }

    #[test]
    fn mandatory_credentials_pin_authentication() {
        let mut config = config();
        config.query.credentials_mandatory = true;
        let session = SessionState::default();
        let (mut state, _) = ready(&config, &session);
        assert!(state.inputs.query.authenticate);
        dispatch(
            &mut state,
            &config,
            &session,
            FormAction::SetQueryAuthenticate { enabled: false },
        )
        .expect("toggle");
        assert!(state.inputs.query.authenticate);
    }

    #[test]
    fn rows_snapshot_the_master_list_and_use_fresh_indices() {
        let config = config();
        let session = SessionState::default();
        let (mut state, _) = ready(&config, &session);
        let effects = dispatch(&mut state, &config, &session, FormAction::AddExternalArtifactRow)
            .expect("add");
        assert_eq!(
            effects,
            vec![
                FormEffect::InstantiateRow {
                    row_id: "external_default-0".to_string()
                },
                FormEffect::FocusRowInput {
                    row_id: "external_default-0".to_string()
                },
                FormEffect::Publish(FormEvent::ExternalRowAdded { index: 0 }),
            ]
        );
        assert_eq!(state.rows[0].syntax.options, state.syntax.options);

        dispatch(
            &mut state,
            &config,
            &session,
            FormAction::SetMasterSyntaxOptions {
                options: vec![SelectOption::new("text/n3", "N3")],
            },
        )
        .expect("edit master");
        assert_eq!(state.rows[0].syntax.options.len(), 3);

        dispatch(&mut state, &config, &session, FormAction::AddExternalArtifactRow).expect("add");
        assert_eq!(state.rows[1].syntax.options, vec![SelectOption::new("text/n3", "N3")]);

        dispatch(
            &mut state,
            &config,
            &session,
            FormAction::RemoveExternalArtifactRow { index: 0 },
        )
        .expect("remove");
        dispatch(&mut state, &config, &session, FormAction::AddExternalArtifactRow).expect("add");
        let indices: Vec<_> = state.rows.iter().map(|row| row.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn row_actions_validate_their_target() {
        let config = config();
        let session = SessionState::default();
        let (mut state, _) = ready(&config, &session);
        assert_eq!(
            dispatch(
                &mut state,
                &config,
                &session,
                FormAction::RemoveExternalArtifactRow { index: 9 }
            ),
            Err(FormError::RowNotFound(9))
        );
        dispatch(&mut state, &config, &session, FormAction::AddExternalArtifactRow).expect("add");
        assert_eq!(
            dispatch(
                &mut state,
                &config,
                &session,
                FormAction::SetRowContentType {
                    index: 0,
                    kind: ContentSourceKind::Query
                }
            ),
            Err(FormError::QueryUnsupported)
        );

        let no_rows = FormConfig::default();
        assert_eq!(
            dispatch(&mut state, &no_rows, &session, FormAction::AddExternalArtifactRow),
            Err(FormError::ExternalArtifactsUnsupported)
        );
    }

    #[test]
    fn row_content_type_applies_the_default_rule_to_that_row_only() {
        let config = config();
        let session = SessionState::default();
        let (mut state, _) = ready(&config, &session);
        dispatch(&mut state, &config, &session, FormAction::AddExternalArtifactRow).expect("add");
        dispatch(&mut state, &config, &session, FormAction::AddExternalArtifactRow).expect("add");

        dispatch(
            &mut state,
            &config,
            &session,
            FormAction::SetRowContentType {
                index: 1,
                kind: ContentSourceKind::InlineText,
            },
        )
        .expect("inline");
        assert!(!state.rows[1].syntax.has_default_choice());
        assert!(state.rows[0].syntax.has_default_choice());

        dispatch(
            &mut state,
            &config,
            &session,
            FormAction::SetRowContentType {
                index: 1,
                kind: ContentSourceKind::Uri,
            },
        )
        .expect("uri");
        assert_eq!(
            state.rows[1].syntax.options[0].label,
            config.labels.syntax_default_for_uri
        );
    }

    #[test]
    fn required_artifacts_start_with_one_row() {
        let mut config = config();
        config.external_artifacts = ArtifactPolicy::Required;
        let session = SessionState::default();
        let (state, effects) = ready(&config, &session);
        assert_eq!(state.rows.len(), 1);
        assert!(effects.contains(&FormEffect::InstantiateRow {
            row_id: "external_default-0".to_string()
        }));
    }

    #[test]
    fn prepare_submit_writes_query_only_when_active() {
        let config = config();
        let session = SessionState::default();
        let (mut state, _) = ready(&config, &session);
        dispatch(
            &mut state,
            &config,
            &session,
            FormAction::SetQueryText {
                query: "SELECT * WHERE { ?s ?p ?o }".to_string(),
            },
        )
        .expect("query text");
        assert_eq!(
            dispatch(&mut state, &config, &session, FormAction::PrepareSubmit),
            Ok(vec![FormEffect::WriteSubmittedQuery(String::new())])
        );
        dispatch(
            &mut state,
            &config,
            &session,
            FormAction::SetContentSource {
                kind: ContentSourceKind::Query,
            },
        )
        .expect("query");
        assert_eq!(
            dispatch(&mut state, &config, &session, FormAction::PrepareSubmit),
            Ok(vec![FormEffect::WriteSubmittedQuery(
                "SELECT * WHERE { ?s ?p ?o }".to_string()
            )])
        );
    }

    #[test]
    fn default_profile_applies_without_selector() {
        let mut config = config();
        config.default_profile = Some("X".to_string());
        let session = SessionState::default();
        let mut state = FormState::default();
        dispatch(
            &mut state,
            &config,
            &session,
            FormAction::FormReady {
                master_syntax: None,
                profile_selector_present: false,
                initial_source: ContentSourceKind::Uri,
                initial_profile: None,
            },
        )
        .expect("ready");
        assert_eq!(state.profile, Some(ValidationProfile::new("X")));
        assert!(state.load_imports.checked);
        assert!(!state.syntax_selector_present);
    }
}
