//! Submit-enablement predicates and the per-source validator registry.

use std::{collections::BTreeMap, fmt};

use crate::{
    config::FormConfig,
    model::{ContentInputs, ContentSource, ContentSourceKind, FormState, QueryInputs},
};

/// Extra check run for one content source kind on top of its required data.
pub type SourceValidator = fn(&ContentInputs, &FormConfig) -> bool;

#[derive(Clone, Default)]
/// Validators keyed by the content source they apply to.
pub struct ValidatorRegistry {
    validators: BTreeMap<ContentSourceKind, SourceValidator>,
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.validators.keys()).finish()
    }
}

impl ValidatorRegistry {
    /// Registry with the query validator installed.
    pub fn standard() -> Self {
        let mut registry = Self::default();
        registry.register(ContentSourceKind::Query, validate_query_inputs);
        registry
    }

    /// Installs `validator` for `kind`, returning the one it replaces.
    pub fn register(
        &mut self,
        kind: ContentSourceKind,
        validator: SourceValidator,
    ) -> Option<SourceValidator> {
        self.validators.insert(kind, validator)
    }

    /// Runs the validator of the active source; sources without one pass.
    pub fn validate(&self, inputs: &ContentInputs, config: &FormConfig) -> bool {
        self.validators
            .get(&inputs.active)
            .map_or(true, |validator| validator(inputs, config))
    }
}

/// Query input is complete: endpoint when its input is shown, credentials when authentication
/// applies, and a non-empty query.
pub fn validate_query_inputs(inputs: &ContentInputs, config: &FormConfig) -> bool {
    let support = &config.query;
    if !support.enabled {
        return false;
    }
    let query = &inputs.query;
    let endpoint_ok = !support.endpoint_input || !query.endpoint.is_empty();
    let credentials_ok = !credentials_required(query, config)
        || (!query.username.is_empty() && !query.password.is_empty());
    endpoint_ok && credentials_ok && !query.query.is_empty()
}

/// Whether the credential inputs must be filled.
pub fn credentials_required(query: &QueryInputs, config: &FormConfig) -> bool {
    config.query.credentials_input && (query.authenticate || config.query.credentials_mandatory)
}

/// Whether the active source carries the data it submits.
pub fn has_required_data(state: &FormState) -> bool {
    match state.inputs.active_source() {
        ContentSource::File { file_name } => !file_name.is_empty(),
        ContentSource::Uri { uri } => !uri.is_empty(),
        ContentSource::InlineText { text } => {
            !text.is_empty() && (!state.syntax_selector_present || state.syntax.explicit().is_some())
        }
        ContentSource::Query(query) => !query.query.is_empty(),
    }
}

/// The submit control is enabled exactly when this holds.
pub fn is_submittable(state: &FormState, config: &FormConfig, registry: &ValidatorRegistry) -> bool {
    state.ready
        && has_required_data(state)
        && registry.validate(&state.inputs, config)
        && (!state.profile_selector_present || state.profile.is_some())
}

#[cfg(test)]
mod tests {
    use validator_host::SelectOption;

    use super::*;
    use crate::{
        config::QuerySupport,
        model::{SyntaxChoice, ValidationProfile},
    };

    fn query_config(endpoint_input: bool, credentials_input: bool, mandatory: bool) -> FormConfig {
        FormConfig {
            query: QuerySupport {
                enabled: true,
                endpoint_input,
                credentials_input,
                credentials_mandatory: mandatory,
            },
            ..FormConfig::default()
        }
    }

    fn filled_state() -> FormState {
        let mut state = FormState {
            ready: true,
            syntax_selector_present: true,
            syntax: SyntaxChoice::new(vec![SelectOption::new("text/turtle", "Turtle")]),
            ..FormState::default()
        };
        state.inputs.file_name = "shapes.ttl".to_string();
        state.inputs.uri = "https://example.org/data.ttl".to_string();
        state.inputs.text = "@prefix ex: <http://example.org/> .".to_string();
        state.inputs.query = QueryInputs {
            endpoint: "https://example.org/sparql".to_string(),
            authenticate: true,
            username: "user".to_string(),
            password: "secret".to_string(),
            query: "CONSTRUCT WHERE { ?s ?p ?o }".to_string(),
        };
        state
    }

    #[test]
    fn empty_required_field_blocks_submit_for_every_source() {
        let config = query_config(true, true, false);
        let registry = ValidatorRegistry::standard();
        let cases: [(ContentSourceKind, fn(&mut FormState)); 4] = [
            (ContentSourceKind::File, |s| s.inputs.file_name.clear()),
            (ContentSourceKind::Uri, |s| s.inputs.uri.clear()),
            (ContentSourceKind::InlineText, |s| s.inputs.text.clear()),
            (ContentSourceKind::Query, |s| s.inputs.query.query.clear()),
        ];
        for (kind, clear) in cases {
            let mut state = filled_state();
            state.inputs.active = kind;
            assert!(is_submittable(&state, &config, &registry), "{kind:?} filled");
            clear(&mut state);
            assert!(!is_submittable(&state, &config, &registry), "{kind:?} cleared");
        }
    }

    #[test]
    fn inline_text_needs_an_explicit_syntax_when_selector_exists() {
        let config = FormConfig::default();
        let registry = ValidatorRegistry::standard();
        let mut state = filled_state();
        state.inputs.active = ContentSourceKind::InlineText;
        state.syntax.selected = None;
        assert!(!is_submittable(&state, &config, &registry));

        state.syntax_selector_present = false;
        assert!(is_submittable(&state, &config, &registry));
    }

    #[test]
    fn query_validator_checks_endpoint_and_credentials() {
        let mut inputs = filled_state().inputs;
        inputs.active = ContentSourceKind::Query;

        let config = query_config(true, true, false);
        assert!(validate_query_inputs(&inputs, &config));

        inputs.query.endpoint.clear();
        assert!(!validate_query_inputs(&inputs, &config));
        assert!(validate_query_inputs(&inputs, &query_config(false, true, false)));

        inputs.query.endpoint = "https://example.org/sparql".to_string();
        inputs.query.password.clear();
        assert!(!validate_query_inputs(&inputs, &config));
        inputs.query.authenticate = false;
        assert!(validate_query_inputs(&inputs, &config));
        assert!(!validate_query_inputs(&inputs, &query_config(true, true, true)));
        assert!(validate_query_inputs(&inputs, &query_config(true, false, true)));
    }

    #[test]
    fn query_is_never_valid_without_support() {
        let mut inputs = filled_state().inputs;
        inputs.active = ContentSourceKind::Query;
        assert!(!validate_query_inputs(&inputs, &FormConfig::default()));
    }

    #[test]
    fn profile_selector_requires_a_selection() {
        let config = FormConfig::default();
        let registry = ValidatorRegistry::standard();
        let mut state = filled_state();
        state.profile_selector_present = true;
        assert!(!is_submittable(&state, &config, &registry));
        state.profile = Some(ValidationProfile::new("basic"));
        assert!(is_submittable(&state, &config, &registry));
    }

    #[test]
    fn sources_without_validator_pass_the_registry() {
        let registry = ValidatorRegistry::default();
        let mut inputs = ContentInputs::default();
        inputs.active = ContentSourceKind::Query;
        assert!(registry.validate(&inputs, &FormConfig::default()));
        assert!(!ValidatorRegistry::standard().validate(&inputs, &FormConfig::default()));
    }
}
