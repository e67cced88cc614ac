//! Page-script bridge for the pieces of the validator page that live in JavaScript.
//!
//! CodeMirror editors and viewers, the page alert helpers, the Bootstrap modal, and the
//! rendered report items are reached through one inline module. Non-`wasm32` builds get an
//! inert shim so the adapters compile and unit-test off-browser.

#[cfg(target_arch = "wasm32")]
mod imp {
    use js_sys::Function;
    use wasm_bindgen::{prelude::*, JsCast};

    #[wasm_bindgen(inline_js = r#"
const viewers = new Map();
let nextViewer = 1;

function codeMirrorOf(id) {
  const host = document.getElementById(id);
  if (!host) {
    return null;
  }
  if (host.CodeMirror) {
    return host.CodeMirror;
  }
  const sibling = host.nextElementSibling;
  if (sibling && sibling.CodeMirror) {
    return sibling.CodeMirror;
  }
  const nested = host.querySelector('.CodeMirror');
  return nested && nested.CodeMirror ? nested.CodeMirror : null;
}

function withViewer(handle, fn, fallback) {
  const entry = viewers.get(handle);
  return entry ? fn(entry) : fallback;
}

export function jsEditorValue(id) {
  const cm = codeMirrorOf(id);
  return cm ? cm.getValue() : undefined;
}

export function jsSetEditorValue(id, value) {
  const cm = codeMirrorOf(id);
  if (!cm) {
    return false;
  }
  if (cm.getValue() !== value) {
    cm.setValue(value);
  }
  return true;
}

export function jsRefreshEditor(id) {
  setTimeout(() => {
    const cm = codeMirrorOf(id);
    if (cm) {
      cm.refresh();
    }
  }, 0);
}

export function jsWatchEditor(id, callback) {
  const cm = codeMirrorOf(id);
  if (!cm) {
    return false;
  }
  cm.on('change', (instance) => callback(instance.getValue()));
  return true;
}

export function jsViewerOpen(containerId, content, mode) {
  const container = document.getElementById(containerId);
  if (!container) {
    throw new Error(`viewer container #${containerId} is missing`);
  }
  if (typeof globalThis.CodeMirror !== 'function') {
    throw new Error('CodeMirror is not loaded');
  }
  container.innerHTML = '';
  const editor = globalThis.CodeMirror(container, {
    value: content,
    mode,
    lineNumbers: true,
    readOnly: true,
    dragDrop: false,
  });
  const handle = nextViewer++;
  viewers.set(handle, { editor, marks: new Map(), nextMark: 1 });
  return handle;
}

export function jsViewerClose(handle) {
  viewers.delete(handle);
}

export function jsViewerAddLineWidget(handle, line, className, iconClass, text) {
  withViewer(handle, ({ editor }) => {
    const widget = document.createElement('div');
    widget.className = className;
    const iconWrap = document.createElement('span');
    iconWrap.className = 'indicator-icon';
    const icon = document.createElement('i');
    icon.className = iconClass;
    iconWrap.appendChild(icon);
    const desc = document.createElement('span');
    desc.className = 'indicator-desc';
    desc.textContent = text;
    widget.appendChild(iconWrap);
    widget.appendChild(desc);
    editor.addLineWidget(line, widget, { coverGutter: false, noHScroll: true, above: true });
  });
}

export function jsViewerAddLineClass(handle, line, where, className) {
  withViewer(handle, ({ editor }) => editor.getDoc().addLineClass(line, where, className));
}

export function jsViewerRemoveLineClass(handle, line, where, className) {
  withViewer(handle, ({ editor }) => editor.getDoc().removeLineClass(line, where, className));
}

export function jsViewerMarkText(handle, fromLine, fromCh, toLine, toCh, className) {
  return withViewer(handle, (entry) => {
    const mark = entry.editor.markText(
      { line: fromLine, ch: fromCh },
      { line: toLine, ch: toCh },
      { className },
    );
    const id = entry.nextMark++;
    entry.marks.set(id, mark);
    return id;
  }, 0);
}

export function jsViewerClearMark(handle, id) {
  withViewer(handle, (entry) => {
    const mark = entry.marks.get(id);
    if (mark) {
      mark.clear();
      entry.marks.delete(id);
    }
  });
}

export function jsViewerLineTop(handle, line) {
  return withViewer(handle, ({ editor }) => editor.charCoords({ line, ch: 0 }, 'local').top, 0);
}

export function jsViewerViewportHeight(handle) {
  return withViewer(handle, ({ editor }) => editor.getScrollerElement().offsetHeight, 0);
}

export function jsViewerScrollTo(handle, top) {
  withViewer(handle, ({ editor }) => editor.scrollTo(null, top));
}

export function jsViewerRefresh(handle) {
  withViewer(handle, ({ editor }) => editor.refresh());
}

export function jsShowAlert(containerId, message) {
  if (typeof globalThis.raiseAlert === 'function') {
    if (typeof globalThis.clearMessages === 'function') {
      globalThis.clearMessages();
    }
    globalThis.raiseAlert(message, true);
    return;
  }
  const container = document.getElementById(containerId);
  if (!container) {
    return;
  }
  container.innerHTML = '';
  const alert = document.createElement('div');
  alert.className = 'alert alert-danger';
  alert.setAttribute('role', 'alert');
  alert.textContent = message;
  container.appendChild(alert);
}

export function jsClearAlerts(containerId) {
  if (typeof globalThis.clearMessages === 'function') {
    globalThis.clearMessages();
    return;
  }
  const container = document.getElementById(containerId);
  if (container) {
    container.innerHTML = '';
  }
}

export function jsShowModal(id, onShown) {
  const jq = globalThis.jQuery;
  if (jq && jq.fn && typeof jq.fn.modal === 'function') {
    const modal = jq(`#${id}`);
    modal.one('shown.bs.modal', () => onShown());
    modal.modal('show');
    return;
  }
  const element = document.getElementById(id);
  if (element) {
    element.classList.remove('hidden');
  }
  onShown();
}

export function jsScrapeReportItems() {
  const items = Array.from(document.querySelectorAll('.item-info')).map((item) => {
    const location = item.querySelector('.item-info-location');
    const text = item.querySelector('.item-info-text');
    return {
      location: location ? location.textContent : '',
      message: text ? text.textContent : '',
      error: item.querySelector('.item-info-error') !== null,
      warning: item.querySelector('.item-info-warning') !== null,
    };
  });
  return JSON.stringify(items);
}

export function jsWatchReportItems(callback) {
  document.querySelectorAll('.item-info').forEach((item, index) => {
    item.addEventListener('click', () => callback(index));
  });
}
"#)]
    extern "C" {
        #[wasm_bindgen(js_name = jsEditorValue)]
        fn js_editor_value(id: &str) -> Option<String>;
        #[wasm_bindgen(js_name = jsSetEditorValue)]
        fn js_set_editor_value(id: &str, value: &str) -> bool;
        #[wasm_bindgen(js_name = jsRefreshEditor)]
        fn js_refresh_editor(id: &str);
        #[wasm_bindgen(js_name = jsWatchEditor)]
        fn js_watch_editor(id: &str, callback: &Function) -> bool;

        #[wasm_bindgen(catch, js_name = jsViewerOpen)]
        fn js_viewer_open(container_id: &str, content: &str, mode: &str) -> Result<u32, JsValue>;
        #[wasm_bindgen(js_name = jsViewerClose)]
        fn js_viewer_close(handle: u32);
        #[wasm_bindgen(js_name = jsViewerAddLineWidget)]
        fn js_viewer_add_line_widget(
            handle: u32,
            line: u32,
            class_name: &str,
            icon_class: &str,
            text: &str,
        );
        #[wasm_bindgen(js_name = jsViewerAddLineClass)]
        fn js_viewer_add_line_class(handle: u32, line: u32, layer: &str, class_name: &str);
        #[wasm_bindgen(js_name = jsViewerRemoveLineClass)]
        fn js_viewer_remove_line_class(handle: u32, line: u32, layer: &str, class_name: &str);
        #[wasm_bindgen(js_name = jsViewerMarkText)]
        fn js_viewer_mark_text(
            handle: u32,
            from_line: u32,
            from_ch: u32,
            to_line: u32,
            to_ch: u32,
            class_name: &str,
        ) -> f64;
        #[wasm_bindgen(js_name = jsViewerClearMark)]
        fn js_viewer_clear_mark(handle: u32, mark: f64);
        #[wasm_bindgen(js_name = jsViewerLineTop)]
        fn js_viewer_line_top(handle: u32, line: u32) -> f64;
        #[wasm_bindgen(js_name = jsViewerViewportHeight)]
        fn js_viewer_viewport_height(handle: u32) -> f64;
        #[wasm_bindgen(js_name = jsViewerScrollTo)]
        fn js_viewer_scroll_to(handle: u32, top: f64);
        #[wasm_bindgen(js_name = jsViewerRefresh)]
        fn js_viewer_refresh(handle: u32);

        #[wasm_bindgen(js_name = jsShowAlert)]
        fn js_show_alert(container_id: &str, message: &str);
        #[wasm_bindgen(js_name = jsClearAlerts)]
        fn js_clear_alerts(container_id: &str);
        #[wasm_bindgen(js_name = jsShowModal)]
        fn js_show_modal(id: &str, on_shown: &Function);

        #[wasm_bindgen(js_name = jsScrapeReportItems)]
        fn js_scrape_report_items() -> String;
        #[wasm_bindgen(js_name = jsWatchReportItems)]
        fn js_watch_report_items(callback: &Function);
    }

    fn js_error_to_string(err: JsValue) -> String {
        if let Some(text) = err.as_string() {
            return text;
        }
        if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
            if let Some(text) = message.as_string() {
                return text;
            }
        }
        format!("{err:?}")
    }

    fn line_arg(line: usize) -> u32 {
        u32::try_from(line).unwrap_or(u32::MAX)
    }

    pub fn editor_value(id: &str) -> Option<String> {
        js_editor_value(id)
    }

    pub fn set_editor_value(id: &str, value: &str) -> bool {
        js_set_editor_value(id, value)
    }

    pub fn refresh_editor(id: &str) {
        js_refresh_editor(id);
    }

    pub fn watch_editor(id: &str, on_change: Box<dyn FnMut(String)>) -> bool {
        let callback = Closure::wrap(on_change);
        let attached = js_watch_editor(id, callback.as_ref().unchecked_ref());
        // Editors live as long as the page.
        callback.forget();
        attached
    }

    pub fn viewer_open(container_id: &str, content: &str, mode: &str) -> Result<u32, String> {
        js_viewer_open(container_id, content, mode).map_err(js_error_to_string)
    }

    pub fn viewer_close(handle: u32) {
        js_viewer_close(handle);
    }

    pub fn viewer_add_line_widget(
        handle: u32,
        line: usize,
        class_name: &str,
        icon_class: &str,
        text: &str,
    ) {
        js_viewer_add_line_widget(handle, line_arg(line), class_name, icon_class, text);
    }

    pub fn viewer_add_line_class(handle: u32, line: usize, layer: &str, class_name: &str) {
        js_viewer_add_line_class(handle, line_arg(line), layer, class_name);
    }

    pub fn viewer_remove_line_class(handle: u32, line: usize, layer: &str, class_name: &str) {
        js_viewer_remove_line_class(handle, line_arg(line), layer, class_name);
    }

    pub fn viewer_mark_text(
        handle: u32,
        from: (usize, usize),
        to: (usize, usize),
        class_name: &str,
    ) -> u64 {
        let id = js_viewer_mark_text(
            handle,
            line_arg(from.0),
            line_arg(from.1),
            line_arg(to.0),
            line_arg(to.1),
            class_name,
        );
        id as u64
    }

    pub fn viewer_clear_mark(handle: u32, mark: u64) {
        js_viewer_clear_mark(handle, mark as f64);
    }

    pub fn viewer_line_top(handle: u32, line: usize) -> f64 {
        js_viewer_line_top(handle, line_arg(line))
    }

    pub fn viewer_viewport_height(handle: u32) -> f64 {
        js_viewer_viewport_height(handle)
    }

    pub fn viewer_scroll_to(handle: u32, top: f64) {
        js_viewer_scroll_to(handle, top);
    }

    pub fn viewer_refresh(handle: u32) {
        js_viewer_refresh(handle);
    }

    pub fn show_alert(container_id: &str, message: &str) {
        js_show_alert(container_id, message);
    }

    pub fn clear_alerts(container_id: &str) {
        js_clear_alerts(container_id);
    }

    pub fn show_modal(id: &str, on_shown: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(on_shown);
        js_show_modal(id, callback.unchecked_ref());
    }

    pub fn scrape_report_items() -> Result<String, String> {
        Ok(js_scrape_report_items())
    }

    pub fn watch_report_items(on_click: Box<dyn FnMut(u32)>) {
        let callback = Closure::wrap(on_click);
        js_watch_report_items(callback.as_ref().unchecked_ref());
        callback.forget();
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    fn unsupported() -> String {
        "Page script APIs are only available when compiled for wasm32".to_string()
    }

    pub fn editor_value(_id: &str) -> Option<String> {
        None
    }

    pub fn set_editor_value(_id: &str, _value: &str) -> bool {
        false
    }

    pub fn refresh_editor(_id: &str) {}

    pub fn watch_editor(_id: &str, _on_change: Box<dyn FnMut(String)>) -> bool {
        false
    }

    pub fn viewer_open(_container_id: &str, _content: &str, _mode: &str) -> Result<u32, String> {
        Err(unsupported())
    }

    pub fn viewer_close(_handle: u32) {}

    pub fn viewer_add_line_widget(
        _handle: u32,
        _line: usize,
        _class_name: &str,
        _icon_class: &str,
        _text: &str,
    ) {
    }

    pub fn viewer_add_line_class(_handle: u32, _line: usize, _layer: &str, _class_name: &str) {}

    pub fn viewer_remove_line_class(_handle: u32, _line: usize, _layer: &str, _class_name: &str) {
    }

    pub fn viewer_mark_text(
        _handle: u32,
        _from: (usize, usize),
        _to: (usize, usize),
        _class_name: &str,
    ) -> u64 {
        0
    }

    pub fn viewer_clear_mark(_handle: u32, _mark: u64) {}

    pub fn viewer_line_top(_handle: u32, _line: usize) -> f64 {
        0.0
    }

    pub fn viewer_viewport_height(_handle: u32) -> f64 {
        0.0
    }

    pub fn viewer_scroll_to(_handle: u32, _top: f64) {}

    pub fn viewer_refresh(_handle: u32) {}

    pub fn show_alert(_container_id: &str, _message: &str) {}

    pub fn clear_alerts(_container_id: &str) {}

    pub fn show_modal(_id: &str, on_shown: Box<dyn FnOnce()>) {
        on_shown();
    }

    pub fn scrape_report_items() -> Result<String, String> {
        Err(unsupported())
    }

    pub fn watch_report_items(_on_click: Box<dyn FnMut(u32)>) {}
}

pub use imp::*;
