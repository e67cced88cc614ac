//! Element-id addressed DOM access used by the form controller and the results page.
//!
//! Every operation targets a well-known element id. A missing element is never an error:
//! writes are skipped and reads return `None`, since a feature may be absent from a given
//! page variant.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

use serde::{Deserialize, Serialize};

/// One `<option>` of a select element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,
    /// Visible label.
    pub label: String,
}

impl SelectOption {
    /// Creates an option from a value and label.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Host surface for reading and writing form elements by id.
pub trait FormSurface {
    /// Returns whether an element with `id` exists.
    fn contains(&self, id: &str) -> bool;

    /// Shows or hides an element (the `hidden` class).
    fn set_hidden(&self, id: &str, hidden: bool);

    /// Enables or disables a control.
    fn set_disabled(&self, id: &str, disabled: bool);

    /// Checks or unchecks a checkbox.
    fn set_checked(&self, id: &str, checked: bool);

    /// Writes the value of an input.
    fn set_value(&self, id: &str, value: &str);

    /// Reads the value of an input or select.
    fn value(&self, id: &str) -> Option<String>;

    /// Removes every class in `variants` and adds `active`.
    fn set_class_variant(&self, id: &str, variants: &[&str], active: &str);

    /// Replaces the option list of a select and selects `selected` when present.
    fn replace_options(&self, id: &str, options: &[SelectOption], selected: Option<&str>);

    /// Appends one option to a select.
    fn append_option(&self, id: &str, option: &SelectOption);

    /// Reads the option list of a select.
    fn options(&self, id: &str) -> Option<Vec<SelectOption>>;

    /// Clones the row template `template_id` (substituting `row_id`) in front of `anchor_id`.
    fn instantiate_row(&self, template_id: &str, anchor_id: &str, row_id: &str);

    /// Removes an element from the page.
    fn remove(&self, id: &str);

    /// Moves keyboard focus to an element.
    fn focus(&self, id: &str);

    /// Asks an embedded editor to recompute its layout once the current event settles.
    fn refresh_editor(&self, id: &str);
}

#[derive(Debug, Clone, Copy, Default)]
/// Surface with no elements; every write is skipped.
pub struct NoopFormSurface;

impl FormSurface for NoopFormSurface {
    fn contains(&self, _id: &str) -> bool {
        false
    }

    fn set_hidden(&self, _id: &str, _hidden: bool) {}

    fn set_disabled(&self, _id: &str, _disabled: bool) {}

    fn set_checked(&self, _id: &str, _checked: bool) {}

    fn set_value(&self, _id: &str, _value: &str) {}

    fn value(&self, _id: &str) -> Option<String> {
        None
    }

    fn set_class_variant(&self, _id: &str, _variants: &[&str], _active: &str) {}

    fn replace_options(&self, _id: &str, _options: &[SelectOption], _selected: Option<&str>) {}

    fn append_option(&self, _id: &str, _option: &SelectOption) {}

    fn options(&self, _id: &str) -> Option<Vec<SelectOption>> {
        None
    }

    fn instantiate_row(&self, _template_id: &str, _anchor_id: &str, _row_id: &str) {}

    fn remove(&self, _id: &str) {}

    fn focus(&self, _id: &str) {}

    fn refresh_editor(&self, _id: &str) {}
}

/// Snapshot of one element tracked by [`MemoryFormSurface`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementState {
    /// Whether the `hidden` class is set.
    pub hidden: bool,
    /// Whether the control is disabled.
    pub disabled: bool,
    /// Checkbox state.
    pub checked: bool,
    /// Input value.
    pub value: String,
    /// Class list.
    pub classes: BTreeSet<String>,
    /// Option list when the element is a select.
    pub options: Option<Vec<SelectOption>>,
    /// Number of focus requests.
    pub focus_count: u32,
    /// Number of editor refresh requests.
    pub refresh_count: u32,
}

#[derive(Debug, Default)]
struct MemoryDom {
    elements: BTreeMap<String, ElementState>,
    row_templates: BTreeMap<String, Vec<String>>,
    instantiated_rows: Vec<String>,
}

#[derive(Debug, Clone, Default)]
/// In-memory element tree keyed by id.
///
/// Only registered ids exist; writes to any other id are dropped, which is how a page
/// variant without a feature behaves.
pub struct MemoryFormSurface {
    inner: Rc<RefCell<MemoryDom>>,
}

impl MemoryFormSurface {
    /// Registers plain elements.
    pub fn with_elements(self, ids: &[&str]) -> Self {
        {
            let mut dom = self.inner.borrow_mut();
            for id in ids {
                dom.elements.entry((*id).to_string()).or_default();
            }
        }
        self
    }

    /// Registers a select element with its initial options; the first option is selected.
    pub fn with_select(self, id: &str, options: Vec<SelectOption>) -> Self {
        {
            let mut dom = self.inner.borrow_mut();
            let element = dom.elements.entry(id.to_string()).or_default();
            element.value = options
                .first()
                .map(|option| option.value.clone())
                .unwrap_or_default();
            element.options = Some(options);
        }
        self
    }

    /// Registers a row template whose element ids contain the `{row}` placeholder.
    pub fn with_row_template(self, template_id: &str, id_patterns: &[&str]) -> Self {
        self.inner.borrow_mut().row_templates.insert(
            template_id.to_string(),
            id_patterns.iter().map(|p| (*p).to_string()).collect(),
        );
        self
    }

    /// Returns a snapshot of an element.
    pub fn element(&self, id: &str) -> Option<ElementState> {
        self.inner.borrow().elements.get(id).cloned()
    }

    /// Returns whether an element is hidden (`None` when absent).
    pub fn is_hidden(&self, id: &str) -> Option<bool> {
        self.element(id).map(|element| element.hidden)
    }

    /// Returns whether a checkbox is checked (`None` when absent).
    pub fn is_checked(&self, id: &str) -> Option<bool> {
        self.element(id).map(|element| element.checked)
    }

    /// Returns whether a control is disabled (`None` when absent).
    pub fn is_disabled(&self, id: &str) -> Option<bool> {
        self.element(id).map(|element| element.disabled)
    }

    /// Returns whether an element carries `class_name`.
    pub fn has_class(&self, id: &str, class_name: &str) -> bool {
        self.element(id)
            .is_some_and(|element| element.classes.contains(class_name))
    }

    /// Row ids instantiated so far, in order.
    pub fn instantiated_rows(&self) -> Vec<String> {
        self.inner.borrow().instantiated_rows.clone()
    }

    fn with_element(&self, id: &str, f: impl FnOnce(&mut ElementState)) {
        if let Some(element) = self.inner.borrow_mut().elements.get_mut(id) {
            f(element);
        }
    }
}

impl FormSurface for MemoryFormSurface {
    fn contains(&self, id: &str) -> bool {
        self.inner.borrow().elements.contains_key(id)
    }

    fn set_hidden(&self, id: &str, hidden: bool) {
        self.with_element(id, |element| element.hidden = hidden);
    }

    fn set_disabled(&self, id: &str, disabled: bool) {
        self.with_element(id, |element| element.disabled = disabled);
    }

    fn set_checked(&self, id: &str, checked: bool) {
        self.with_element(id, |element| element.checked = checked);
    }

    fn set_value(&self, id: &str, value: &str) {
        self.with_element(id, |element| element.value = value.to_string());
    }

    fn value(&self, id: &str) -> Option<String> {
        self.element(id).map(|element| element.value)
    }

    fn set_class_variant(&self, id: &str, variants: &[&str], active: &str) {
        self.with_element(id, |element| {
            for variant in variants {
                element.classes.remove(*variant);
            }
            element.classes.insert(active.to_string());
        });
    }

    fn replace_options(&self, id: &str, options: &[SelectOption], selected: Option<&str>) {
        self.with_element(id, |element| {
            element.options = Some(options.to_vec());
            element.value = selected
                .filter(|value| options.iter().any(|option| option.value == *value))
                .map(str::to_string)
                .or_else(|| options.first().map(|option| option.value.clone()))
                .unwrap_or_default();
        });
    }

    fn append_option(&self, id: &str, option: &SelectOption) {
        self.with_element(id, |element| {
            element
                .options
                .get_or_insert_with(Vec::new)
                .push(option.clone());
        });
    }

    fn options(&self, id: &str) -> Option<Vec<SelectOption>> {
        self.element(id).and_then(|element| element.options)
    }

    fn instantiate_row(&self, template_id: &str, anchor_id: &str, row_id: &str) {
        let mut dom = self.inner.borrow_mut();
        if !dom.elements.contains_key(anchor_id) {
            return;
        }
        let Some(patterns) = dom.row_templates.get(template_id).cloned() else {
            return;
        };
        for pattern in patterns {
            dom.elements
                .entry(pattern.replace("{row}", row_id))
                .or_default();
        }
        dom.instantiated_rows.push(row_id.to_string());
    }

    fn remove(&self, id: &str) {
        let mut dom = self.inner.borrow_mut();
        dom.elements.remove(id);
        // Removing a row container drops every element instantiated for it.
        if dom.instantiated_rows.iter().any(|row| row == id) {
            let suffix = format!("-{id}");
            dom.elements.retain(|key, _| !key.ends_with(&suffix));
            dom.instantiated_rows.retain(|row| row != id);
        }
    }

    fn focus(&self, id: &str) {
        self.with_element(id, |element| element.focus_count += 1);
    }

    fn refresh_editor(&self, id: &str) {
        self.with_element(id, |element| element.refresh_count += 1);
    }
}
