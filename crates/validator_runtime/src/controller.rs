//! Form controller: owns the form state, runs reducer effects, and keeps the page in sync.

use std::{cell::RefCell, rc::Rc};

use leptos::logging;
use validator_host::FormSurface;

use crate::{
    config::FormConfig,
    events::FormEvents,
    model::{ContentSourceKind, FormState, ValidationProfile},
    reducer::{reduce_form, FormAction, FormContext, FormEffect},
    session::SessionState,
    validators::{is_submittable, ValidatorRegistry},
    view::{apply_view, ids, FormView},
};

/// Drives the upload form against a [`FormSurface`].
///
/// Every dispatch reduces the action, executes DOM effects, rewrites changed elements, then
/// runs focus/refresh effects and publishes events. Invalid actions are logged and dropped.
pub struct FormController {
    state: RefCell<FormState>,
    rendered: RefCell<Option<FormView>>,
    surface: Rc<dyn FormSurface>,
    config: FormConfig,
    registry: ValidatorRegistry,
    session: SessionState,
    events: FormEvents,
}

impl FormController {
    /// Creates a controller with the standard validator registry.
    pub fn new(
        surface: Rc<dyn FormSurface>,
        config: FormConfig,
        session: SessionState,
        events: FormEvents,
    ) -> Self {
        Self {
            state: RefCell::new(FormState::default()),
            rendered: RefCell::new(None),
            surface,
            config,
            registry: ValidatorRegistry::standard(),
            session,
            events,
        }
    }

    /// Reads the rendered form from the surface and dispatches [`FormAction::FormReady`].
    pub fn ready(&self) {
        let surface = &self.surface;
        let initial_profile = surface
            .value(ids::VALIDATION_TYPE)
            .filter(|value| !value.is_empty())
            .map(|value| {
                ValidationProfile::new(value)
                    .with_option(surface.value(ids::VALIDATION_OPTION).unwrap_or_default())
            });
        self.dispatch(FormAction::FormReady {
            master_syntax: surface.options(ids::SYNTAX_SELECT),
            profile_selector_present: surface.contains(ids::VALIDATION_TYPE),
            initial_source: surface
                .value(ids::CONTENT_TYPE)
                .and_then(|token| ContentSourceKind::from_token(&token))
                .unwrap_or(ContentSourceKind::File),
            initial_profile,
        });
    }

    /// Applies `action` and brings the page up to date.
    pub fn dispatch(&self, action: FormAction) {
        if matches!(action, FormAction::AddExternalArtifactRow) {
            self.sync_master_syntax();
        }
        let result = {
            let mut state = self.state.borrow_mut();
            reduce_form(
                &mut state,
                FormContext {
                    config: &self.config,
                    session: &self.session,
                },
                action,
            )
        };
        let effects = match result {
            Ok(effects) => effects,
            Err(err) => {
                logging::warn!("form action ignored: {err}");
                return;
            }
        };

        let (before_render, after_render): (Vec<_>, Vec<_>) = effects
            .into_iter()
            .partition(|effect| !runs_after_render(effect));
        for effect in before_render {
            self.run_effect(effect);
        }
        self.render();
        for effect in after_render {
            self.run_effect(effect);
        }
    }

    /// Current submit-enablement predicate.
    pub fn is_submittable(&self) -> bool {
        is_submittable(&self.state.borrow(), &self.config, &self.registry)
    }

    /// Snapshot of the form state.
    pub fn state(&self) -> FormState {
        self.state.borrow().clone()
    }

    /// Event channels this controller publishes on.
    pub fn events(&self) -> &FormEvents {
        &self.events
    }

    /// Form configuration.
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    fn render(&self) {
        let next = FormView::project(&self.state.borrow(), &self.config, &self.registry);
        // Surface writes may fire page events that dispatch again before this returns.
        let prev = self.rendered.borrow_mut().take();
        apply_view(self.surface.as_ref(), prev.as_ref(), &next);
        let mut rendered = self.rendered.borrow_mut();
        if rendered.is_none() {
            *rendered = Some(next);
        }
    }

    /// New rows copy the master list as it is on the page, including edits made by page
    /// scripts after the form was rendered.
    fn sync_master_syntax(&self) {
        let Some(options) = self.surface.options(ids::SYNTAX_SELECT) else {
            return;
        };
        let edited = options != self.state.borrow().syntax.options;
        if edited {
            self.dispatch(FormAction::SetMasterSyntaxOptions { options });
        }
    }

    fn run_effect(&self, effect: FormEffect) {
        let surface = self.surface.as_ref();
        match effect {
            FormEffect::AppendContentTypeOption(option) => {
                surface.append_option(ids::CONTENT_TYPE, &option);
            }
            FormEffect::RefreshQueryEditor => surface.refresh_editor(ids::QUERY_EDITOR),
            FormEffect::InstantiateRow { row_id } => {
                surface.instantiate_row(ids::ROW_TEMPLATE, ids::ROW_ANCHOR, &row_id);
            }
            FormEffect::RemoveRowElement { row_id } => surface.remove(&row_id),
            FormEffect::FocusRowInput { row_id } => {
                surface.focus(&ids::row_element(ids::FILE_NAME, &row_id));
            }
            FormEffect::WriteSubmittedQuery(query) => {
                surface.set_value(ids::QUERY_EDITOR_VALUE, &query);
            }
            FormEffect::Publish(event) => self.events.publish(&event),
        }
    }
}

fn runs_after_render(effect: &FormEffect) -> bool {
    matches!(
        effect,
        FormEffect::RefreshQueryEditor | FormEffect::FocusRowInput { .. } | FormEffect::Publish(_)
    )
}
