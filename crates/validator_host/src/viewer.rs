//! Read-only, line-numbered code viewer contract.
//!
//! The annotator needs five things from a viewer: line widgets, line classes, range marks,
//! line coordinates, and scrolling. `refresh` and `viewport_height` support the last two.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    rc::Rc,
};

/// Layer of a line that a class is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LineLayer {
    /// The line's background element.
    Background,
    /// The line's text element.
    Text,
    /// The wrapper around the whole line.
    Wrap,
}

impl LineLayer {
    /// Token understood by the viewer widget.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Text => "text",
            Self::Wrap => "wrap",
        }
    }
}

/// Zero-based position in the viewer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPosition {
    /// Zero-based line.
    pub line: usize,
    /// Zero-based column.
    pub ch: usize,
}

/// Handle to a range mark, used to clear it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextMark(pub u64);

/// Non-reflowing block rendered above a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWidget {
    /// Classes of the widget container.
    pub class_name: String,
    /// Classes of the icon element.
    pub icon_class: String,
    /// Text shown next to the icon.
    pub text: String,
}

/// A mounted read-only viewer.
pub trait CodeViewer {
    /// Anchors `widget` above `line`.
    fn add_line_widget(&self, line: usize, widget: &LineWidget);

    /// Adds `class_name` to a layer of `line`.
    fn add_line_class(&self, line: usize, layer: LineLayer, class_name: &str);

    /// Removes `class_name` from a layer of `line`.
    fn remove_line_class(&self, line: usize, layer: LineLayer, class_name: &str);

    /// Applies `class_name` to the text between `from` and `to`.
    fn mark_text(&self, from: TextPosition, to: TextPosition, class_name: &str) -> TextMark;

    /// Removes a mark created by [`CodeViewer::mark_text`].
    fn clear_mark(&self, mark: TextMark);

    /// Top offset of `line` in pixels, local to the document.
    fn line_top(&self, line: usize) -> f64;

    /// Height in pixels of the visible scroller.
    fn viewport_height(&self) -> f64;

    /// Scrolls vertically to `top`.
    fn scroll_to_y(&self, top: f64);

    /// Recomputes layout after the viewer became visible.
    fn refresh(&self);
}

/// Creates viewers inside page containers.
pub trait CodeViewerFactory {
    /// Mounts a read-only viewer over `content` in `container_id`, replacing previous contents.
    fn open(
        &self,
        container_id: &str,
        content: &str,
        mode: &str,
    ) -> Result<Box<dyn CodeViewer>, String>;
}

#[derive(Debug, Default)]
struct MemoryViewerState {
    content: String,
    mode: String,
    widgets: Vec<(usize, LineWidget)>,
    line_classes: BTreeSet<(usize, LineLayer, String)>,
    marks: BTreeMap<u64, (TextPosition, TextPosition, String)>,
    next_mark: u64,
    scroll_top: Option<f64>,
    refresh_count: u32,
}

#[derive(Debug, Clone)]
/// In-memory viewer with a fixed line height.
pub struct MemoryCodeViewer {
    inner: Rc<RefCell<MemoryViewerState>>,
    line_height: f64,
    viewport_height: f64,
}

impl MemoryCodeViewer {
    /// Creates a viewer with the given line height and viewport height in pixels.
    pub fn new(line_height: f64, viewport_height: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryViewerState::default())),
            line_height,
            viewport_height,
        }
    }

    /// Document text.
    pub fn content(&self) -> String {
        self.inner.borrow().content.clone()
    }

    /// Syntax mode the viewer was opened with.
    pub fn mode(&self) -> String {
        self.inner.borrow().mode.clone()
    }

    /// Widgets in insertion order.
    pub fn widgets(&self) -> Vec<(usize, LineWidget)> {
        self.inner.borrow().widgets.clone()
    }

    /// Lines carrying `class_name` on `layer`.
    pub fn lines_with_class(&self, layer: LineLayer, class_name: &str) -> Vec<usize> {
        self.inner
            .borrow()
            .line_classes
            .iter()
            .filter(|(_, l, c)| *l == layer && c == class_name)
            .map(|(line, _, _)| *line)
            .collect()
    }

    /// Active marks as `(from, to, class)`.
    pub fn marks(&self) -> Vec<(TextPosition, TextPosition, String)> {
        self.inner.borrow().marks.values().cloned().collect()
    }

    /// Last scroll position.
    pub fn scroll_top(&self) -> Option<f64> {
        self.inner.borrow().scroll_top
    }

    /// Number of refresh calls.
    pub fn refresh_count(&self) -> u32 {
        self.inner.borrow().refresh_count
    }

    fn load(&self, content: &str, mode: &str) {
        let mut state = self.inner.borrow_mut();
        *state = MemoryViewerState {
            content: content.to_string(),
            mode: mode.to_string(),
            ..MemoryViewerState::default()
        };
    }
}

impl CodeViewer for MemoryCodeViewer {
    fn add_line_widget(&self, line: usize, widget: &LineWidget) {
        self.inner.borrow_mut().widgets.push((line, widget.clone()));
    }

    fn add_line_class(&self, line: usize, layer: LineLayer, class_name: &str) {
        self.inner
            .borrow_mut()
            .line_classes
            .insert((line, layer, class_name.to_string()));
    }

    fn remove_line_class(&self, line: usize, layer: LineLayer, class_name: &str) {
        self.inner
            .borrow_mut()
            .line_classes
            .remove(&(line, layer, class_name.to_string()));
    }

    fn mark_text(&self, from: TextPosition, to: TextPosition, class_name: &str) -> TextMark {
        let mut state = self.inner.borrow_mut();
        state.next_mark += 1;
        let id = state.next_mark;
        state.marks.insert(id, (from, to, class_name.to_string()));
        TextMark(id)
    }

    fn clear_mark(&self, mark: TextMark) {
        self.inner.borrow_mut().marks.remove(&mark.0);
    }

    fn line_top(&self, line: usize) -> f64 {
        line as f64 * self.line_height
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_to_y(&self, top: f64) {
        self.inner.borrow_mut().scroll_top = Some(top);
    }

    fn refresh(&self) {
        self.inner.borrow_mut().refresh_count += 1;
    }
}

#[derive(Debug, Clone)]
/// Factory handing out one shared [`MemoryCodeViewer`], reloaded on every open.
pub struct MemoryCodeViewerFactory {
    viewer: MemoryCodeViewer,
    opened: Rc<RefCell<Vec<String>>>,
}

impl MemoryCodeViewerFactory {
    /// Creates a factory around `viewer`.
    pub fn new(viewer: MemoryCodeViewer) -> Self {
        Self {
            viewer,
            opened: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// The shared viewer.
    pub fn viewer(&self) -> MemoryCodeViewer {
        self.viewer.clone()
    }

    /// Container ids passed to `open`, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.borrow().clone()
    }
}

impl CodeViewerFactory for MemoryCodeViewerFactory {
    fn open(
        &self,
        container_id: &str,
        content: &str,
        mode: &str,
    ) -> Result<Box<dyn CodeViewer>, String> {
        self.opened.borrow_mut().push(container_id.to_string());
        self.viewer.load(content, mode);
        Ok(Box::new(self.viewer.clone()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn reopening_resets_viewer_state() {
        let factory = MemoryCodeViewerFactory::new(MemoryCodeViewer::new(10.0, 200.0));
        let viewer = factory.open("pane", "a\nb", "xml").expect("open");
        viewer.add_line_class(1, LineLayer::Background, "marked");
        assert_eq!(
            factory.viewer().lines_with_class(LineLayer::Background, "marked"),
            vec![1]
        );

        factory.open("pane", "c", "turtle").expect("reopen");
        assert!(factory
            .viewer()
            .lines_with_class(LineLayer::Background, "marked")
            .is_empty());
        assert_eq!(factory.viewer().mode(), "turtle");
        assert_eq!(factory.opened(), vec!["pane", "pane"]);
    }

    #[test]
    fn marks_can_be_cleared() {
        let viewer = MemoryCodeViewer::new(10.0, 200.0);
        let mark = viewer.mark_text(
            TextPosition { line: 2, ch: 0 },
            TextPosition { line: 3, ch: 0 },
            "selected",
        );
        assert_eq!(viewer.marks().len(), 1);
        viewer.clear_mark(mark);
        assert!(viewer.marks().is_empty());
    }
}
