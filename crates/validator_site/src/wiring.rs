//! Browser wiring: delegated DOM listeners feeding the form controller and the report
//! annotator.

use std::rc::Rc;

use leptos::{logging, spawn_local};
use validator_host::HostServices;
use validator_host_web::{
    build_host_services, element_text, on_report_item_click, scrape_report_items, show_modal,
    watch_editor,
};
use validator_runtime::{
    report::{SOURCE_MODAL, SOURCE_PANE, VIEW_INPUT_BUTTON},
    view::ids,
    AnnotatorServices, DownloadChoice, DownloadKind, FormAction, FormConfig, FormController,
    FormEvents, PageConfig, ReportAnnotator, ReportFinding, ResultsConfig, SessionState,
    PAGE_CONFIG_ELEMENT_ID,
};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement,
};

use crate::{
    routing::{
        download_kind_for, download_menu_id, download_syntax_attribute, download_trigger_class,
        file_picker_for, form_action, is_profile_selector, profile_action, DomEventKind,
        TargetSnapshot,
    },
    ALERT_CONTAINER_ID,
};

/// Serialization fetched alongside the validated content when a results page mounts.
const PREFETCH_REPORT_FORMAT: &str = "rdf";

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn on_document(event_name: &str, handler: impl FnMut(Event) + 'static) {
    let Some(document) = document() else {
        return;
    };
    let listener = Closure::<dyn FnMut(Event)>::new(handler);
    let _ = document.add_event_listener_with_callback(event_name, listener.as_ref().unchecked_ref());
    // Page-lifetime listener.
    listener.forget();
}

fn target_element(event: &Event, selector: &str) -> Option<Element> {
    event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(selector)
        .ok()?
}

fn snapshot(event: &Event) -> Option<TargetSnapshot> {
    let element = target_element(event, "[id]")?;
    let mut target = TargetSnapshot::id(element.id());
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        target.value = input.value();
        target.checked = input.checked();
        target.file_name = input
            .files()
            .and_then(|files| files.get(0))
            .map(|file| file.name());
    } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        target.value = select.value();
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        target.value = area.value();
    }
    Some(target)
}

fn click_element(id: &str) {
    if let Some(element) = document()
        .and_then(|document| document.get_element_by_id(id))
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    {
        element.click();
    }
}

/// Reads the page configuration and mounts whichever sections it names.
pub fn mount_page() {
    let config = match PageConfig::from_element(element_text(PAGE_CONFIG_ELEMENT_ID)) {
        Ok(config) => config,
        Err(err) => {
            logging::error!("validator page not mounted: {err}");
            return;
        }
    };
    let host = build_host_services(ALERT_CONTAINER_ID);
    let session = SessionState::default();
    let events = FormEvents::default();
    if let Some(form) = config.form {
        mount_form(form, &host, session.clone(), events.clone());
    }
    if let Some(results) = config.results {
        mount_results(results, &host, session, events);
    }
    logging::log!("validator page mounted");
}

fn mount_form(config: FormConfig, host: &HostServices, session: SessionState, events: FormEvents) {
    let controller = Rc::new(FormController::new(
        Rc::clone(&host.surface),
        config,
        session,
        events,
    ));
    controller.ready();

    for kind in DomEventKind::ALL {
        let controller = Rc::clone(&controller);
        let surface = Rc::clone(&host.surface);
        on_document(kind.event_name(), move |event| {
            let Some(target) = snapshot(&event) else {
                return;
            };
            if kind == DomEventKind::Click {
                if let Some(picker) = file_picker_for(&target.id) {
                    click_element(&picker);
                    return;
                }
            }
            if kind == DomEventKind::Change && is_profile_selector(&target.id) {
                controller.dispatch(profile_action(
                    surface.value(ids::VALIDATION_TYPE),
                    surface.value(ids::VALIDATION_OPTION),
                ));
                return;
            }
            if let Some(action) = form_action(kind, &target) {
                controller.dispatch(action);
            }
        });
    }

    let text_controller = Rc::clone(&controller);
    watch_editor(ids::TEXT_EDITOR, move |text| {
        text_controller.dispatch(FormAction::SetText { text });
    });
    let query_controller = Rc::clone(&controller);
    watch_editor(ids::QUERY_EDITOR, move |query| {
        query_controller.dispatch(FormAction::SetQueryText { query });
    });

    on_document("submit", move |_| controller.dispatch(FormAction::PrepareSubmit));
}

fn mount_results(
    config: ResultsConfig,
    host: &HostServices,
    session: SessionState,
    events: FormEvents,
) {
    let report_id = config.report_id.clone();
    let content_id = config.content_id.clone();
    let annotator = ReportAnnotator::new(config, session, events, AnnotatorServices::from(host));
    for kind in [DownloadKind::Report, DownloadKind::Content, DownloadKind::Shapes] {
        render_download_menu(kind, &annotator.download_choices(kind));
    }
    annotator.on_results_loaded(&report_id, content_id);

    let loader = annotator.clone();
    spawn_local(async move {
        if let Err(err) = loader.prefetch(PREFETCH_REPORT_FORMAT).await {
            logging::warn!("results prefetch incomplete: {err}");
        }
    });

    let findings: Rc<Vec<ReportFinding>> = Rc::new(match scrape_report_items() {
        Ok(items) => items.iter().map(ReportFinding::from_record).collect(),
        Err(err) => {
            logging::warn!("report items could not be read: {err}");
            Vec::new()
        }
    });

    {
        let annotator = annotator.clone();
        let findings = Rc::clone(&findings);
        on_report_item_click(move |index| {
            let findings = Rc::clone(&findings);
            annotator.when_content_loaded(move |annotator| {
                open_source_view(annotator, &findings, Some(index));
            });
        });
    }

    on_document("click", move |event| {
        if target_element(&event, &format!("#{VIEW_INPUT_BUTTON}")).is_some() {
            let findings = Rc::clone(&findings);
            annotator.when_content_loaded(move |annotator| {
                open_source_view(annotator, &findings, None);
            });
            return;
        }
        let Some(trigger) = target_element(&event, "[class]") else {
            return;
        };
        let Some(kind) = download_kind_for(&trigger.class_name()) else {
            return;
        };
        event.prevent_default();
        let syntax = trigger
            .get_attribute(download_syntax_attribute(kind))
            .unwrap_or_default();
        let annotator = annotator.clone();
        spawn_local(async move {
            if let Err(err) = annotator.request_download(kind, &syntax).await {
                logging::warn!("export not saved: {err}");
            }
        });
    });
}

fn open_source_view(annotator: &ReportAnnotator, findings: &[ReportFinding], focus: Option<usize>) {
    if let Err(err) = annotator.render_annotated_view(SOURCE_PANE, findings) {
        logging::warn!("source view not rendered: {err}");
        return;
    }
    let annotator = annotator.clone();
    let finding = focus.and_then(|index| findings.get(index).cloned());
    show_modal(SOURCE_MODAL, move || {
        if let Some(finding) = finding {
            if let Err(err) = annotator.focus_finding(&finding) {
                logging::warn!("finding not focused: {err}");
            }
        }
    });
}

fn render_download_menu(kind: DownloadKind, choices: &[DownloadChoice]) {
    let Some(document) = document() else {
        return;
    };
    let Some(menu) = document.get_element_by_id(&download_menu_id(kind)) else {
        return;
    };
    // Server-rendered menus are kept as they are.
    if menu.child_element_count() > 0 {
        return;
    }
    for choice in choices {
        let Ok(item) = document.create_element("li") else {
            continue;
        };
        match choice {
            DownloadChoice::Divider => {
                item.set_class_name("divider");
                let _ = item.set_attribute("role", "separator");
            }
            DownloadChoice::Syntax(option) => {
                let Ok(link) = document.create_element("a") else {
                    continue;
                };
                let _ = link.set_attribute("href", "#");
                link.set_class_name(download_trigger_class(kind));
                let _ = link.set_attribute(download_syntax_attribute(kind), &option.value);
                link.set_text_content(Some(&option.label));
                let _ = item.append_child(&link);
            }
        }
        let _ = menu.append_child(&item);
    }
}
