//! `web-sys` form surface addressed by element id.

use validator_host::{FormSurface, SelectOption};

use crate::bridge;

/// Attribute naming an element inside a row template; instances get
/// `<attribute value>-<row id>` as their id.
pub const ROW_ELEMENT_ATTRIBUTE: &str = "data-row-id";

#[derive(Debug, Clone, Copy, Default)]
/// Browser form surface over `document.getElementById`.
///
/// Inputs enhanced with CodeMirror are read and written through the editor instance. Writes
/// that would not change a value are skipped, so projecting a view never moves the caret.
pub struct WebFormSurface;

impl FormSurface for WebFormSurface {
    fn contains(&self, id: &str) -> bool {
        imp::contains(id)
    }

    fn set_hidden(&self, id: &str, hidden: bool) {
        imp::toggle_class(id, "hidden", hidden);
    }

    fn set_disabled(&self, id: &str, disabled: bool) {
        imp::set_disabled(id, disabled);
    }

    fn set_checked(&self, id: &str, checked: bool) {
        imp::set_checked(id, checked);
    }

    fn set_value(&self, id: &str, value: &str) {
        if bridge::set_editor_value(id, value) {
            return;
        }
        if imp::value(id).as_deref() != Some(value) {
            imp::set_value(id, value);
        }
    }

    fn value(&self, id: &str) -> Option<String> {
        bridge::editor_value(id).or_else(|| imp::value(id))
    }

    fn set_class_variant(&self, id: &str, variants: &[&str], active: &str) {
        for variant in variants.iter().filter(|variant| **variant != active) {
            imp::toggle_class(id, variant, false);
        }
        imp::toggle_class(id, active, true);
    }

    fn replace_options(&self, id: &str, options: &[SelectOption], selected: Option<&str>) {
        let selected = selected
            .filter(|value| options.iter().any(|option| option.value == *value))
            .or_else(|| options.first().map(|option| option.value.as_str()));
        imp::replace_options(id, options, selected);
    }

    fn append_option(&self, id: &str, option: &SelectOption) {
        imp::append_option(id, option);
    }

    fn options(&self, id: &str) -> Option<Vec<SelectOption>> {
        imp::options(id)
    }

    fn instantiate_row(&self, template_id: &str, anchor_id: &str, row_id: &str) {
        imp::instantiate_row(template_id, anchor_id, row_id);
    }

    fn remove(&self, id: &str) {
        imp::remove(id);
    }

    fn focus(&self, id: &str) {
        imp::focus(id);
    }

    fn refresh_editor(&self, id: &str) {
        bridge::refresh_editor(id);
    }
}

/// Calls `on_change` with the full text whenever the CodeMirror editor over `id` changes.
///
/// Returns `false` when no editor is attached to the element.
pub fn watch_editor(id: &str, on_change: impl FnMut(String) + 'static) -> bool {
    bridge::watch_editor(id, Box::new(on_change))
}

/// Text content of an element, used for embedded JSON documents.
pub fn element_text(id: &str) -> Option<String> {
    imp::text(id)
}

#[cfg(target_arch = "wasm32")]
mod imp {
    use validator_host::SelectOption;
    use wasm_bindgen::JsCast;
    use web_sys::{
        Document, Element, HtmlElement, HtmlInputElement, HtmlOptionElement, HtmlSelectElement,
        HtmlTextAreaElement,
    };

    use super::ROW_ELEMENT_ATTRIBUTE;

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn element(id: &str) -> Option<Element> {
        document()?.get_element_by_id(id)
    }

    fn select(id: &str) -> Option<HtmlSelectElement> {
        element(id)?.dyn_into::<HtmlSelectElement>().ok()
    }

    fn new_option(option: &SelectOption) -> Option<HtmlOptionElement> {
        HtmlOptionElement::new_with_text_and_value(&option.label, &option.value).ok()
    }

    pub fn contains(id: &str) -> bool {
        element(id).is_some()
    }

    pub fn text(id: &str) -> Option<String> {
        element(id)?.text_content()
    }

    pub fn toggle_class(id: &str, class_name: &str, present: bool) {
        if let Some(element) = element(id) {
            let _ = element.class_list().toggle_with_force(class_name, present);
        }
    }

    pub fn set_disabled(id: &str, disabled: bool) {
        if let Some(element) = element(id) {
            let _ = element.toggle_attribute_with_force("disabled", disabled);
        }
    }

    pub fn set_checked(id: &str, checked: bool) {
        if let Some(input) = element(id).and_then(|el| el.dyn_into::<HtmlInputElement>().ok()) {
            input.set_checked(checked);
        }
    }

    pub fn value(id: &str) -> Option<String> {
        let element = element(id)?;
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            return Some(input.value());
        }
        if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            return Some(select.value());
        }
        element
            .dyn_ref::<HtmlTextAreaElement>()
            .map(HtmlTextAreaElement::value)
    }

    pub fn set_value(id: &str, value: &str) {
        let Some(element) = element(id) else {
            return;
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        }
    }

    pub fn replace_options(id: &str, options: &[SelectOption], selected: Option<&str>) {
        let Some(select) = select(id) else {
            return;
        };
        select.set_length(0);
        for option in options.iter().filter_map(new_option) {
            let _ = select.add_with_html_option_element(&option);
        }
        if let Some(value) = selected {
            select.set_value(value);
        }
    }

    pub fn append_option(id: &str, option: &SelectOption) {
        if let (Some(select), Some(option)) = (select(id), new_option(option)) {
            let _ = select.add_with_html_option_element(&option);
        }
    }

    pub fn options(id: &str) -> Option<Vec<SelectOption>> {
        let collection = select(id)?.options();
        let options = (0..collection.length())
            .filter_map(|index| collection.item(index))
            .filter_map(|item| item.dyn_into::<HtmlOptionElement>().ok())
            .map(|option| SelectOption::new(option.value(), option.text()))
            .collect();
        Some(options)
    }

    pub fn instantiate_row(template_id: &str, anchor_id: &str, row_id: &str) {
        let (Some(template), Some(anchor)) = (element(template_id), element(anchor_id)) else {
            return;
        };
        let Some(parent) = anchor.parent_node() else {
            return;
        };
        let Some(row) = template
            .clone_node_with_deep(true)
            .ok()
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            return;
        };
        row.set_id(row_id);
        let _ = row.class_list().remove_1("hidden");
        if let Ok(named) = row.query_selector_all(&format!("[{ROW_ELEMENT_ATTRIBUTE}]")) {
            for index in 0..named.length() {
                let Some(child) = named
                    .item(index)
                    .and_then(|node| node.dyn_into::<Element>().ok())
                else {
                    continue;
                };
                if let Some(prefix) = child.get_attribute(ROW_ELEMENT_ATTRIBUTE) {
                    child.set_id(&format!("{prefix}-{row_id}"));
                }
            }
        }
        let _ = parent.insert_before(&row, Some(&anchor));
    }

    pub fn remove(id: &str) {
        if let Some(element) = element(id) {
            element.remove();
        }
    }

    pub fn focus(id: &str) {
        if let Some(element) = element(id).and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
            let _ = element.focus();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use validator_host::SelectOption;

    pub fn contains(_id: &str) -> bool {
        false
    }

    pub fn text(_id: &str) -> Option<String> {
        None
    }

    pub fn toggle_class(_id: &str, _class_name: &str, _present: bool) {}

    pub fn set_disabled(_id: &str, _disabled: bool) {}

    pub fn set_checked(_id: &str, _checked: bool) {}

    pub fn value(_id: &str) -> Option<String> {
        None
    }

    pub fn set_value(_id: &str, _value: &str) {}

    pub fn replace_options(_id: &str, _options: &[SelectOption], _selected: Option<&str>) {}

    pub fn append_option(_id: &str, _option: &SelectOption) {}

    pub fn options(_id: &str) -> Option<Vec<SelectOption>> {
        None
    }

    pub fn instantiate_row(_template_id: &str, _anchor_id: &str, _row_id: &str) {}

    pub fn remove(_id: &str) {}

    pub fn focus(_id: &str) {}
}
