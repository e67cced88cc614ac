//! Session-scoped identifiers shared by the form controller and the report annotator.

use std::{cell::RefCell, rc::Rc};

#[derive(Debug, Default)]
struct SessionIds {
    report_id: Option<String>,
    content_id: Option<String>,
    next_row_index: usize,
}

#[derive(Debug, Clone, Default)]
/// Active report id, content id, and the external-row counter for one page session.
///
/// Clones share the same state.
pub struct SessionState {
    inner: Rc<RefCell<SessionIds>>,
}

impl SessionState {
    /// Records the report (and optional content) being displayed.
    pub fn set_report(&self, report_id: impl Into<String>, content_id: Option<String>) {
        let mut ids = self.inner.borrow_mut();
        ids.report_id = Some(report_id.into());
        ids.content_id = content_id;
    }

    /// Active report id.
    pub fn report_id(&self) -> Option<String> {
        self.inner.borrow().report_id.clone()
    }

    /// Active content id.
    pub fn content_id(&self) -> Option<String> {
        self.inner.borrow().content_id.clone()
    }

    /// Hands out the next external-row index. Indices are never reused.
    pub fn allocate_row_index(&self) -> usize {
        let mut ids = self.inner.borrow_mut();
        let index = ids.next_row_index;
        ids.next_row_index += 1;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let session = SessionState::default();
        let other = session.clone();
        session.set_report("r1", Some("c1".to_string()));
        assert_eq!(other.report_id().as_deref(), Some("r1"));
        assert_eq!(other.content_id().as_deref(), Some("c1"));
    }

    #[test]
    fn row_indices_are_monotonic() {
        let session = SessionState::default();
        assert_eq!(session.allocate_row_index(), 0);
        assert_eq!(session.allocate_row_index(), 1);
        assert_eq!(session.clone().allocate_row_index(), 2);
    }
}
