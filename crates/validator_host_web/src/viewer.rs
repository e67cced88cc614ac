//! CodeMirror-backed read-only viewer.

use validator_host::{
    CodeViewer, CodeViewerFactory, LineLayer, LineWidget, TextMark, TextPosition,
};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Opens CodeMirror viewers in page containers.
pub struct WebCodeViewerFactory;

impl CodeViewerFactory for WebCodeViewerFactory {
    fn open(
        &self,
        container_id: &str,
        content: &str,
        mode: &str,
    ) -> Result<Box<dyn CodeViewer>, String> {
        let handle = bridge::viewer_open(container_id, content, mode)?;
        Ok(Box::new(WebCodeViewer { handle }))
    }
}

#[derive(Debug)]
/// A mounted CodeMirror instance; released from the bridge registry when dropped.
pub struct WebCodeViewer {
    handle: u32,
}

impl CodeViewer for WebCodeViewer {
    fn add_line_widget(&self, line: usize, widget: &LineWidget) {
        bridge::viewer_add_line_widget(
            self.handle,
            line,
            &widget.class_name,
            &widget.icon_class,
            &widget.text,
        );
    }

    fn add_line_class(&self, line: usize, layer: LineLayer, class_name: &str) {
        bridge::viewer_add_line_class(self.handle, line, layer.token(), class_name);
    }

    fn remove_line_class(&self, line: usize, layer: LineLayer, class_name: &str) {
        bridge::viewer_remove_line_class(self.handle, line, layer.token(), class_name);
    }

    fn mark_text(&self, from: TextPosition, to: TextPosition, class_name: &str) -> TextMark {
        TextMark(bridge::viewer_mark_text(
            self.handle,
            (from.line, from.ch),
            (to.line, to.ch),
            class_name,
        ))
    }

    fn clear_mark(&self, mark: TextMark) {
        bridge::viewer_clear_mark(self.handle, mark.0);
    }

    fn line_top(&self, line: usize) -> f64 {
        bridge::viewer_line_top(self.handle, line)
    }

    fn viewport_height(&self) -> f64 {
        bridge::viewer_viewport_height(self.handle)
    }

    fn scroll_to_y(&self, top: f64) {
        bridge::viewer_scroll_to(self.handle, top);
    }

    fn refresh(&self) {
        bridge::viewer_refresh(self.handle);
    }
}

impl Drop for WebCodeViewer {
    fn drop(&mut self) {
        bridge::viewer_close(self.handle);
    }
}
